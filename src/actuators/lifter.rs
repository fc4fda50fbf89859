// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Closed-loop controller for the ring lifter.
//!
//! The lifter homes against its base touch switch, then holds `Idle` until the orchestrator
//! publishes a new absolute target in encoder ticks. `Moving` runs a PI loop toward it and only
//! reports arrival once the error has stayed inside the tolerance for
//! [`LifterConfig::settle_cycles`] consecutive cycles. The orchestrator acts the moment
//! `arrived` rises, so a single in-tolerance sample is never enough.
//!
//! Heights are converted with [`inches_to_ticks`]; the encoder zero is the height at which the
//! base switch trips.

#[allow(unused_imports)]
use micromath::F32Ext;

use crate::config::LifterConfig;
use crate::control::{Consecutive, Pi};
use crate::hw::{Motor, Speaker, TouchSensor};
use crate::node::lines;
use crate::sched::{Context, Task};
use crate::share::SharedState;

/// Convert a lifter height in inches to an absolute encoder target.
pub fn inches_to_ticks(inches: f32, ticks_per_inch: f32, offset: f32) -> i32 {
    (inches * ticks_per_inch + offset).round() as i32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LifterState {
    /// Waiting for the start flag.
    Parked,
    /// Driving up until the base switch releases.
    HomeRaise,
    /// Driving down until the base switch trips.
    HomeLower,
    Idle,
    Moving,
}

/// Slots the lifter shares with the slave orchestrator.
pub struct LifterShares {
    /// Written by the orchestrator, read by the lifter.
    pub start: SharedState<bool>,
    /// Absolute target in ticks. Written by the orchestrator, read by the lifter.
    pub target: SharedState<i32>,
    /// Written by the lifter, read by the orchestrator.
    pub arrived: SharedState<bool>,
}

impl LifterShares {
    pub const fn new() -> Self {
        Self {
            start: SharedState::new(false),
            target: SharedState::new(0),
            arrived: SharedState::new(false),
        }
    }

    pub fn reset_from_interrupt(&self, cs: critical_section::CriticalSection<'_>) {
        self.start.put_from_interrupt(cs, false);
        self.target.put_from_interrupt(cs, 0);
        self.arrived.put_from_interrupt(cs, false);
    }
}

impl Default for LifterShares {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Lifter<'a, M, T, S> {
    motor: M,
    base_touch: T,
    speaker: S,
    shares: &'a LifterShares,
    cfg: LifterConfig,
    pi: Pi,
    settle: Consecutive,
    /// Last target reached.
    reached: i32,
    state: LifterState,
}

impl<'a, M: Motor, T: TouchSensor, S: Speaker> Lifter<'a, M, T, S> {
    pub fn new(
        motor: M,
        base_touch: T,
        speaker: S,
        shares: &'a LifterShares,
        cfg: LifterConfig,
    ) -> Self {
        let pi = Pi::new(cfg.kp, cfg.ki)
            .with_output_limits(cfg.down_max as i32, cfg.up_max as i32)
            .with_min_positive(cfg.min_power as i32);
        Self {
            motor,
            base_touch,
            speaker,
            shares,
            cfg,
            pi,
            settle: Consecutive::new(cfg.settle_cycles),
            reached: 0,
            state: LifterState::Parked,
        }
    }

    #[inline]
    pub fn state(&self) -> LifterState {
        self.state
    }

    pub fn motor(&self) -> &M {
        &self.motor
    }

    /// One control cycle.
    pub fn step(&mut self, cx: &mut Context<'_>) {
        match self.state {
            LifterState::Parked => {
                if self.shares.start.get() {
                    self.motor.reset();
                    self.motor.set_brake(true);
                    self.motor.set_pwm(self.cfg.home_power);
                    self.state = LifterState::HomeRaise;
                }
            }

            LifterState::HomeRaise => {
                if !self.base_touch.is_pressed() {
                    self.motor.stop();
                    self.motor.set_pwm(-self.cfg.home_power);
                    self.state = LifterState::HomeLower;
                }
            }

            LifterState::HomeLower => {
                if self.base_touch.is_pressed() {
                    // Stops the motor and zeroes the encoder at the switch.
                    self.motor.reset();
                    self.reached = 0;
                    self.shares.arrived.put(true);
                    cx.diag.write_line(lines::LIFTER, "Lifter Ready");
                    crate::log_info!("lifter homed");
                    self.state = LifterState::Idle;
                }
            }

            LifterState::Idle => {
                self.pi.reset();
                self.settle.reset();
                let target = self.shares.target.get();
                if target != self.reached {
                    crate::log_debug!("lifter -> {}", target);
                    self.shares.arrived.put(false);
                    self.state = LifterState::Moving;
                }
            }

            LifterState::Moving => {
                let target = self.shares.target.get();
                let error = target - self.motor.count();

                if self.settle.sample(error.abs() < self.cfg.tolerance) {
                    self.motor.stop();
                    self.shares.arrived.put(true);
                    self.reached = target;
                    self.state = LifterState::Idle;
                    self.speaker.play_tone(500, 50);
                } else {
                    let power = self.pi.update(error);
                    self.motor.set_pwm(power as i8);
                }
            }
        }
    }
}

impl<M: Motor, T: TouchSensor, S: Speaker> Task for Lifter<'_, M, T, S> {
    fn name(&self) -> &'static str {
        "lifter"
    }

    fn period_ms(&self) -> u32 {
        self.cfg.period_ms
    }

    fn run(&mut self, cx: &mut Context<'_>) {
        self.step(cx);
    }
}
