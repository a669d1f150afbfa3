//! Input events and the single-consumer queue that carries them to the
//! frame loop.

use crossbeam_channel::{Receiver, Sender, TrySendError};
use glam::{Vec2, Vec3};

/// Something that happened between two ticks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AnimationEvent {
    /// The pointer moved. `light_position` is the ray-cast point the light
    /// snaps to; `uv` is the pointer in display UV space.
    PointerMoved { uv: Vec2, light_position: Vec3 },
    /// The viewport changed size, in physical pixels.
    Resized { width: u32, height: u32 },
    /// A primary-button click.
    Clicked,
}

/// Cloneable producer handle for [`EventQueue`].
#[derive(Clone, Debug)]
pub struct EventSender {
    tx: Sender<AnimationEvent>,
}

impl EventSender {
    /// Enqueues an event. Returns `false` once the queue is gone.
    pub fn send(&self, event: AnimationEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Unbounded FIFO with any number of producers and one consumer.
///
/// The consumer drains it once per tick, before the frame update.
#[derive(Debug)]
pub struct EventQueue {
    tx: Sender<AnimationEvent>,
    rx: Receiver<AnimationEvent>,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventQueue {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> EventSender {
        EventSender {
            tx: self.tx.clone(),
        }
    }

    /// Enqueues from the consumer's own thread.
    pub fn push(&self, event: AnimationEvent) {
        // The queue holds its own receiver, so the channel cannot be disconnected.
        let _ = self.tx.send(event);
    }

    /// Removes and returns every pending event in arrival order.
    pub fn drain(&self) -> Vec<AnimationEvent> {
        let mut events = Vec::with_capacity(self.rx.len());
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
