//! Frame-coherent mouse state tracker.
//!
//! [`MouseState`] accumulates winit pointer events between redraws and
//! exposes what the viewer cares about: the latest cursor position, whether
//! it moved this frame, and completed clicks.

use glam::Vec2;
use winit::event::{ElementState, MouseButton};

/// Maps a [`MouseButton`] to an index 0..3.
fn button_index(button: MouseButton) -> usize {
    match button {
        MouseButton::Left => 0,
        MouseButton::Right => 1,
        MouseButton::Middle => 2,
        MouseButton::Back | MouseButton::Forward | MouseButton::Other(_) => 3,
    }
}

/// Frame-coherent mouse state.
///
/// # Usage
///
/// 1. Forward winit events via the `on_*` methods during event collection.
/// 2. Query state with the public accessors.
/// 3. Call [`clear_transients`](Self::clear_transients) at end of frame.
#[derive(Debug, Clone)]
pub struct MouseState {
    position: Vec2,
    moved: bool,
    pressed: [bool; 4],
    clicks: u32,
}

impl Default for MouseState {
    fn default() -> Self {
        Self::new()
    }
}

impl MouseState {
    /// Creates a new `MouseState` with all fields zeroed/false.
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec2::ZERO,
            moved: false,
            pressed: [false; 4],
            clicks: 0,
        }
    }

    // ── Event handlers ──────────────────────────────────────────────

    /// Process a `CursorMoved` event (physical pixels, origin top-left).
    pub fn on_cursor_moved(&mut self, x: f64, y: f64) {
        self.position = Vec2::new(x as f32, y as f32);
        self.moved = true;
    }

    /// Process a `MouseInput` event.
    ///
    /// A primary-button release that follows a press inside the window
    /// counts as one click.
    pub fn on_button(&mut self, button: MouseButton, state: ElementState) {
        let pressed = &mut self.pressed[button_index(button)];
        match state {
            ElementState::Pressed => *pressed = true,
            ElementState::Released => {
                if *pressed && button == MouseButton::Left {
                    self.clicks += 1;
                    tracing::debug!("Click at ({:.0}, {:.0})", self.position.x, self.position.y);
                }
                *pressed = false;
            }
        }
    }

    /// Clears per-frame transients: the moved flag and clicks.
    pub fn clear_transients(&mut self) {
        self.moved = false;
        self.clicks = 0;
    }

    // ── Queries ─────────────────────────────────────────────────────

    /// Latest cursor position in physical pixels.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Whether at least one `CursorMoved` arrived since the last clear.
    #[must_use]
    pub fn moved(&self) -> bool {
        self.moved
    }

    /// Completed primary clicks since the last clear.
    #[must_use]
    pub fn clicks(&self) -> u32 {
        self.clicks
    }
}
