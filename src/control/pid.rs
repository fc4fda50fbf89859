// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Discrete PI controller for closed-loop motor control.
//!
//! Runs once per task release, so the integral is a plain per-cycle error sum scaled by
//! `ki / 1024` rather than a time integral. Works in `no_std` and does not allocate memory.

/// Scale applied to the accumulated error before `ki`.
pub const INTEGRAL_DIVISOR: f32 = 1024.0;

/// PI controller with output clamping and an optional minimum-power floor.
#[derive(Debug, Clone, Copy)]
pub struct Pi {
    /// Proportional gain
    kp: f32,
    /// Integral gain, applied to `sum / 1024`
    ki: f32,

    /// Error accumulator
    sum: i32,

    /// Output clamp
    out_min: i32,
    out_max: i32,

    /// Positive outputs below this are raised to it
    min_positive: i32,
}

impl Pi {
    /// Create a new controller with output limits of `-100..=100` and no floor.
    pub fn new(kp: f32, ki: f32) -> Self {
        Self {
            kp,
            ki,
            sum: 0,
            out_min: -100,
            out_max: 100,
            min_positive: 0,
        }
    }

    /// Set output limits.
    pub fn with_output_limits(mut self, min: i32, max: i32) -> Self {
        self.out_min = min;
        self.out_max = max;
        self
    }

    /// Raise positive outputs below `floor` to `floor`. Negative outputs are left alone.
    pub fn with_min_positive(mut self, floor: i32) -> Self {
        self.min_positive = floor;
        self
    }

    /// Clear the error accumulator.
    pub fn reset(&mut self) {
        self.sum = 0;
    }

    /// Accumulated error.
    #[inline]
    pub fn integral(&self) -> i32 {
        self.sum
    }

    /// Feed one error sample and return the clamped, floored command.
    pub fn update(&mut self, error: i32) -> i32 {
        self.sum = self.sum.saturating_add(error);

        // Truncates toward zero.
        let raw = (self.kp * error as f32 + self.ki * self.sum as f32 / INTEGRAL_DIVISOR) as i32;

        let out = raw.clamp(self.out_min, self.out_max);

        if out > 0 {
            out.max(self.min_positive)
        } else {
            out
        }
    }
}
