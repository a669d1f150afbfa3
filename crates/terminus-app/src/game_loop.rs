//! Fixed-timestep driver for the animation.
//!
//! Every animation constant is a per-tick delta, so ticks run at a fixed
//! 60 Hz regardless of the display's refresh rate. [`FixedStep`] is the pure
//! accumulator; [`GameLoop`] feeds it wall-clock frame times.

use std::time::Instant;
use tracing::warn;

/// One animation tick: 60 Hz.
pub const FIXED_DT: f64 = 1.0 / 60.0;

/// Longest frame the loop catches up on. Anything longer is dropped, which
/// slows the animation instead of replaying dozens of ticks.
pub const MAX_FRAME_TIME: f64 = 0.25;

/// Accumulates frame time and releases it in [`FIXED_DT`] ticks.
#[derive(Debug, Clone, Default)]
pub struct FixedStep {
    accumulator: f64,
    sim_time: f64,
    ticks: u64,
}

impl FixedStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `frame_time` seconds and calls `tick_fn(now)` once per whole tick,
    /// where `now` is the simulation clock at the end of that tick.
    ///
    /// Returns how many ticks ran.
    pub fn advance(&mut self, frame_time: f64, mut tick_fn: impl FnMut(f64)) -> u32 {
        let frame_time = if frame_time > MAX_FRAME_TIME {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                frame_time * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
            MAX_FRAME_TIME
        } else {
            frame_time.max(0.0)
        };

        self.accumulator += frame_time;
        let mut ran = 0;
        while self.accumulator >= FIXED_DT {
            self.accumulator -= FIXED_DT;
            self.sim_time += FIXED_DT;
            self.ticks += 1;
            ran += 1;
            tick_fn(self.sim_time);
        }
        ran
    }

    /// Fraction of a tick left in the accumulator, in `[0, 1)`.
    pub fn alpha(&self) -> f64 {
        self.accumulator / FIXED_DT
    }

    /// Seconds of simulated time.
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

/// [`FixedStep`] plus a frame counter and an [`Instant`] clock.
pub struct GameLoop {
    previous_time: Instant,
    step: FixedStep,
    frame_count: u64,
}

impl GameLoop {
    pub fn new() -> Self {
        Self {
            previous_time: Instant::now(),
            step: FixedStep::new(),
            frame_count: 0,
        }
    }

    /// Wall-clock seconds since the previous call.
    pub fn measure(&mut self) -> f64 {
        let now = Instant::now();
        let frame_time = now.duration_since(self.previous_time).as_secs_f64();
        self.previous_time = now;
        frame_time
    }

    /// Counts one frame and runs the ticks `frame_time` covers. Returns how
    /// many ticks ran; zero is normal on displays faster than 60 Hz.
    pub fn advance(&mut self, frame_time: f64, tick_fn: impl FnMut(f64)) -> u32 {
        self.frame_count += 1;
        self.step.advance(frame_time, tick_fn)
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn tick_count(&self) -> u64 {
        self.step.ticks()
    }

    pub fn sim_time(&self) -> f64 {
        self.step.sim_time()
    }
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::new()
    }
}
