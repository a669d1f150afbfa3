//! Click-triggered linear opacity fade.

/// A one-shot linear ramp from `start` to `target` over `duration` seconds.
#[derive(Clone, Debug, PartialEq)]
pub struct CloudFade {
    start: f32,
    target: f32,
    started_at: f64,
    duration: f64,
}

impl CloudFade {
    pub fn new(start: f32, target: f32, started_at: f64, duration: f64) -> Self {
        Self {
            start,
            target,
            started_at,
            duration,
        }
    }

    /// Progress in `[0, 1]` at `now`. A non-positive duration completes at once.
    pub fn progress(&self, now: f64) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.started_at) / self.duration).clamp(0.0, 1.0)
    }

    pub fn is_complete(&self, now: f64) -> bool {
        self.progress(now) >= 1.0
    }

    /// Opacity at `now`. Exactly `target` once complete.
    pub fn sample(&self, now: f64) -> f32 {
        let t = self.progress(now);
        if t >= 1.0 {
            self.target
        } else {
            self.start + (self.target - self.start) * t as f32
        }
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn started_at(&self) -> f64 {
        self.started_at
    }
}
