// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Straight-line heading correction for a differential drive.
//!
//! Compares the two wheel encoder counts and shifts power from the wheel that is ahead to the
//! one that is behind. Counts must be reset together before a straight run starts.

use crate::config::StraightConfig;
use crate::control::Pi;
use crate::hw::{clamp_power, Motor};

pub struct HeadingCorrector {
    pi: Pi,
}

impl HeadingCorrector {
    pub fn new(cfg: StraightConfig) -> Self {
        Self {
            pi: Pi::new(cfg.kp, cfg.ki).with_output_limits(-cfg.max_delta, cfg.max_delta),
        }
    }

    /// Forget the accumulated drift.
    pub fn reset(&mut self) {
        self.pi.reset();
    }

    /// Power delta for the current count difference (right minus left).
    pub fn correction(&mut self, right_count: i32, left_count: i32) -> i32 {
        self.pi.update(right_count.wrapping_sub(left_count))
    }

    /// Drive both wheels at `power`, corrected. Zero power stops both wheels.
    pub fn drive<M: Motor>(&mut self, right: &mut M, left: &mut M, power: i8) {
        if power == 0 {
            right.stop();
            left.stop();
            return;
        }

        let delta = self.correction(right.count(), left.count());
        let (r, l) = split(power, delta);
        right.set_pwm(r);
        left.set_pwm(l);
    }
}

/// Right and left power for a base `power` and correction `delta`.
///
/// Driving backwards the wheel that is "ahead" has the more negative count, so the sign of the
/// correction flips.
pub fn split(power: i8, delta: i32) -> (i8, i8) {
    let p = power as i32;
    if p >= 0 {
        (clamp_power(p - delta), clamp_power(p + delta))
    } else {
        (clamp_power(p + delta), clamp_power(p - delta))
    }
}
