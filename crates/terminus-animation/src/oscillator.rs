//! Two-state cloud opacity oscillator.

/// Ramps a value up and down between two bounds by a fixed step per tick.
///
/// Reaching a bound snaps the value onto it and flips the direction, so the
/// bounds are hit exactly despite accumulated float error.
#[derive(Clone, Debug, PartialEq)]
pub struct CloudOscillator {
    value: f32,
    fading_in: bool,
    min: f32,
    max: f32,
    step: f32,
}

impl CloudOscillator {
    pub fn new(value: f32, fading_in: bool, min: f32, max: f32, step: f32) -> Self {
        Self {
            value,
            fading_in,
            min,
            max,
            step,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn is_fading_in(&self) -> bool {
        self.fading_in
    }

    /// Advances one tick and returns the new value.
    pub fn step(&mut self) -> f32 {
        if self.fading_in {
            self.value += self.step;
            if self.value >= self.max {
                self.value = self.max;
                self.fading_in = false;
            }
        } else {
            self.value -= self.step;
            if self.value <= self.min {
                self.value = self.min;
                self.fading_in = true;
            }
        }
        self.value
    }

    /// Takes over an externally written value and heads in the given direction.
    ///
    /// The value may lie outside the bounds; stepping walks it back in.
    pub fn resume_from(&mut self, value: f32, fading_in: bool) {
        self.value = value;
        self.fading_in = fading_in;
    }
}
