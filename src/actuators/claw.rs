// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Ring claw.
//!
//! One motor and one touch switch. The switch is tripped by the jaw linkage while it passes the
//! open stop and again when the jaws close on a ring stack, so "fully open" is defined as the
//! moment the switch releases after being pressed on the way open.
//!
//! ```text
//!             Close cmd               pressed
//!   Open ─────────────────► Closing ───────────► Closed
//!    ▲                                             │ Open cmd
//!    │ pressed, then released                      ▼
//!   Opening ◄───────────────────────────────── CheckTouch
//!                  released (never while pressed)
//! ```
//!
//! `arrived` drops when a command is accepted and rises on entering `Open` or `Closed`; nothing
//! else moves the claw.

use crate::config::ClawConfig;
use crate::hw::{Motor, TouchSensor};
use crate::node::lines;
use crate::sched::{Context, Task};
use crate::share::SharedState;

/// Commanded jaw position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClawCommand {
    #[default]
    Open,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClawState {
    /// Waiting for the start flag.
    Parked,
    /// Driving open to find the open stop.
    Calibrating { seen_press: bool },
    Open,
    Closing,
    Closed,
    /// Backing off a just-released close before trusting the switch again.
    CheckTouch,
    Opening { seen_press: bool },
}

/// Slots the claw shares with the slave orchestrator.
pub struct ClawShares {
    /// Written by the orchestrator, read by the claw.
    pub start: SharedState<bool>,
    /// Written by the orchestrator, read by the claw. Defaults to `Open`, matching the
    /// position calibration leaves the jaws in.
    pub command: SharedState<ClawCommand>,
    /// Written by the claw, read by the orchestrator.
    pub arrived: SharedState<bool>,
}

impl ClawShares {
    pub const fn new() -> Self {
        Self {
            start: SharedState::new(false),
            command: SharedState::new(ClawCommand::Open),
            arrived: SharedState::new(false),
        }
    }

    pub fn reset_from_interrupt(&self, cs: critical_section::CriticalSection<'_>) {
        self.start.put_from_interrupt(cs, false);
        self.command.put_from_interrupt(cs, ClawCommand::Open);
        self.arrived.put_from_interrupt(cs, false);
    }
}

impl Default for ClawShares {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Claw<'a, M, T> {
    motor: M,
    touch: T,
    shares: &'a ClawShares,
    cfg: ClawConfig,
    state: ClawState,
}

impl<'a, M: Motor, T: TouchSensor> Claw<'a, M, T> {
    pub fn new(motor: M, touch: T, shares: &'a ClawShares, cfg: ClawConfig) -> Self {
        Self {
            motor,
            touch,
            shares,
            cfg,
            state: ClawState::Parked,
        }
    }

    #[inline]
    pub fn state(&self) -> ClawState {
        self.state
    }

    pub fn motor(&self) -> &M {
        &self.motor
    }

    /// One control cycle.
    pub fn step(&mut self, cx: &mut Context<'_>) {
        let pressed = self.touch.is_pressed();

        self.state = match self.state {
            ClawState::Parked => {
                if !self.shares.start.get() {
                    return;
                }
                self.motor.reset();
                self.motor.set_brake(true);
                self.motor.set_pwm(self.cfg.open_power);
                ClawState::Calibrating { seen_press: false }
            }

            ClawState::Calibrating { seen_press } => match self.open_edge(seen_press, pressed) {
                Some(next) => ClawState::Calibrating { seen_press: next },
                None => {
                    self.motor.stop();
                    self.shares.arrived.put(true);
                    cx.diag.write_line(lines::CLAW, "Claw Ready");
                    crate::log_info!("claw calibrated");
                    ClawState::Open
                }
            },

            ClawState::Open => {
                self.motor.stop();
                if self.shares.command.get() == ClawCommand::Close {
                    self.shares.arrived.put(false);
                    ClawState::Closing
                } else {
                    ClawState::Open
                }
            }

            ClawState::Closing => {
                self.motor.set_pwm(self.cfg.close_power);
                if pressed {
                    self.shares.arrived.put(true);
                    ClawState::Closed
                } else {
                    ClawState::Closing
                }
            }

            ClawState::Closed => {
                self.motor.set_pwm(self.cfg.hold_power);
                if self.shares.command.get() == ClawCommand::Open {
                    self.shares.arrived.put(false);
                    ClawState::CheckTouch
                } else {
                    ClawState::Closed
                }
            }

            ClawState::CheckTouch => {
                self.motor.set_pwm(self.cfg.open_power);
                if pressed {
                    ClawState::CheckTouch
                } else {
                    ClawState::Opening { seen_press: false }
                }
            }

            ClawState::Opening { seen_press } => match self.open_edge(seen_press, pressed) {
                Some(next) => ClawState::Opening { seen_press: next },
                None => {
                    self.motor.stop();
                    self.shares.arrived.put(true);
                    ClawState::Open
                }
            },
        };
    }

    /// Drive open until the switch has been pressed and released again.
    ///
    /// Returns the updated `seen_press`, or `None` once the release edge is seen.
    fn open_edge(&mut self, seen_press: bool, pressed: bool) -> Option<bool> {
        self.motor.set_pwm(self.cfg.open_power);
        match (seen_press, pressed) {
            (true, false) => None,
            (_, p) => Some(seen_press || p),
        }
    }
}

impl<M: Motor, T: TouchSensor> Task for Claw<'_, M, T> {
    fn name(&self) -> &'static str {
        "claw"
    }

    fn period_ms(&self) -> u32 {
        self.cfg.period_ms
    }

    fn run(&mut self, cx: &mut Context<'_>) {
        self.step(cx);
    }
}
