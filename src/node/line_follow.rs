// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Edge-following on the main light sensor.
//!
//! Before it can follow, the robot learns the edge brightness by sweeping the sensor across the
//! line: rotate one half-sweep one way, sample, rotate a full sweep back, sample, and return to
//! the original heading. The edge is the mean of the two samples. Following is then a
//! proportional steer around that value.
//!
//! The follower owns no motors: navigation lends it the [`Wheels`] every cycle.

use crate::config::LineFollowConfig;
use crate::hw::{clamp_power, reached, LightSensor, Motor};

/// The two drive wheels.
pub struct Wheels<M> {
    pub right: M,
    pub left: M,
}

impl<M: Motor> Wheels<M> {
    pub fn new(right: M, left: M) -> Self {
        Self { right, left }
    }

    /// Stop both wheels and zero both encoders.
    pub fn reset(&mut self) {
        self.right.reset();
        self.left.reset();
    }

    pub fn stop(&mut self) {
        self.right.stop();
        self.left.stop();
    }

    pub fn drive(&mut self, right: i8, left: i8) {
        self.right.set_pwm(right);
        self.left.set_pwm(left);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SweepStep {
    /// Spin in place until the right wheel has turned `half_sweeps` half-sweeps.
    Rotate { half_sweeps: i32, dir: i8 },
    Pause,
    Sample,
}

const SWEEP: [SweepStep; 7] = [
    SweepStep::Rotate { half_sweeps: 1, dir: -1 },
    SweepStep::Pause,
    SweepStep::Sample,
    SweepStep::Rotate { half_sweeps: 2, dir: 1 },
    SweepStep::Pause,
    SweepStep::Sample,
    SweepStep::Rotate { half_sweeps: 1, dir: -1 },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Calibration {
    Pending,
    Sweeping {
        index: usize,
        entered: bool,
        until_ms: u32,
    },
    Done,
}

pub struct LineFollower<L> {
    light: L,
    cfg: LineFollowConfig,
    cal: Calibration,
    samples: [i16; 2],
    taken: usize,
    edge: i16,
}

impl<L: LightSensor> LineFollower<L> {
    pub fn new(light: L, cfg: LineFollowConfig) -> Self {
        Self {
            light,
            cfg,
            cal: Calibration::Pending,
            samples: [0; 2],
            taken: 0,
            edge: 0,
        }
    }

    #[inline]
    pub fn is_calibrated(&self) -> bool {
        self.cal == Calibration::Done
    }

    /// Learned edge brightness, valid once calibrated.
    #[inline]
    pub fn edge(&self) -> Option<i16> {
        self.is_calibrated().then_some(self.edge)
    }

    /// Advance the calibration sweep by one cycle. Returns `true` once calibrated.
    pub fn calibrate<M: Motor>(&mut self, wheels: &mut Wheels<M>, now_ms: u32) -> bool {
        let (index, entered, until_ms) = match self.cal {
            Calibration::Done => return true,
            Calibration::Pending => (0, false, now_ms),
            Calibration::Sweeping {
                index,
                entered,
                until_ms,
            } => (index, entered, until_ms),
        };

        let mut until = until_ms;
        let finished = match SWEEP[index] {
            SweepStep::Rotate { half_sweeps, dir } => {
                if !entered {
                    let p = self.cfg.rotate_power;
                    wheels.reset();
                    wheels.drive(dir * p, -dir * p);
                }
                let done = wheels.right.count().abs() >= half_sweeps * self.cfg.sweep_ticks;
                if done {
                    wheels.stop();
                }
                done
            }
            SweepStep::Pause => {
                if !entered {
                    until = now_ms.wrapping_add(self.cfg.sample_pause_ms);
                }
                entered && reached(now_ms, until)
            }
            SweepStep::Sample => {
                self.samples[self.taken.min(1)] = self.light.brightness();
                self.taken += 1;
                true
            }
        };

        if !finished {
            self.cal = Calibration::Sweeping {
                index,
                entered: true,
                until_ms: until,
            };
            return false;
        }

        if index + 1 < SWEEP.len() {
            self.cal = Calibration::Sweeping {
                index: index + 1,
                entered: false,
                until_ms: now_ms,
            };
            false
        } else {
            self.edge = ((self.samples[0] as i32 + self.samples[1] as i32) / 2) as i16;
            self.cal = Calibration::Done;
            crate::log_info!("line edge at {}", self.edge);
            true
        }
    }

    /// One steering cycle. Stops the wheels if the edge is not known yet.
    pub fn follow<M: Motor>(&mut self, wheels: &mut Wheels<M>) {
        if !self.is_calibrated() {
            wheels.stop();
            return;
        }
        let b = self.light.brightness();
        let (r, l) = steer(self.cfg, self.edge, b);
        wheels.drive(r, l);
    }
}

/// Right and left power for brightness `b` around `edge`.
pub fn steer(cfg: LineFollowConfig, edge: i16, b: i16) -> (i8, i8) {
    let diff = (edge as i32 - b as i32) / cfg.scale.max(1) as i32;
    let base = cfg.base_power as i32;
    (clamp_power(base + diff), clamp_power(base - diff))
}
