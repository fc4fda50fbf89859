// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Tower deployment.
//!
//! One-shot: swing the tower arm out on a two-speed profile, report `arrived` and never drive
//! the motor again. There is no timeout; a stalled arm leaves the task waiting.

use crate::config::TowerConfig;
use crate::hw::Motor;
use crate::node::lines;
use crate::sched::{Context, Task};
use crate::share::SharedState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TowerState {
    Parked,
    Fast,
    Slow,
    Done,
}

/// Slots the tower shares with the slave orchestrator.
pub struct TowerShares {
    /// Written by the orchestrator, read by the tower.
    pub start: SharedState<bool>,
    /// Written by the tower, read by the orchestrator.
    pub arrived: SharedState<bool>,
}

impl TowerShares {
    pub const fn new() -> Self {
        Self {
            start: SharedState::new(false),
            arrived: SharedState::new(false),
        }
    }

    pub fn reset_from_interrupt(&self, cs: critical_section::CriticalSection<'_>) {
        self.start.put_from_interrupt(cs, false);
        self.arrived.put_from_interrupt(cs, false);
    }
}

impl Default for TowerShares {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Tower<'a, M> {
    motor: M,
    shares: &'a TowerShares,
    cfg: TowerConfig,
    state: TowerState,
}

impl<'a, M: Motor> Tower<'a, M> {
    pub fn new(motor: M, shares: &'a TowerShares, cfg: TowerConfig) -> Self {
        Self {
            motor,
            shares,
            cfg,
            state: TowerState::Parked,
        }
    }

    #[inline]
    pub fn state(&self) -> TowerState {
        self.state
    }

    pub fn motor(&self) -> &M {
        &self.motor
    }

    pub fn step(&mut self, cx: &mut Context<'_>) {
        match self.state {
            TowerState::Parked => {
                if self.shares.start.get() {
                    self.motor.reset();
                    self.motor.set_brake(true);
                    self.motor.set_pwm(self.cfg.fast_power);
                    self.state = TowerState::Fast;
                }
            }
            TowerState::Fast => {
                if self.motor.count() >= self.cfg.fast_until {
                    self.motor.set_pwm(self.cfg.slow_power);
                    self.state = TowerState::Slow;
                }
            }
            TowerState::Slow => {
                if self.motor.count() >= self.cfg.slow_until {
                    self.motor.stop();
                    self.shares.arrived.put(true);
                    cx.diag.write_line(lines::TOWER, "Tower Ready");
                    crate::log_info!("tower deployed");
                    self.state = TowerState::Done;
                }
            }
            TowerState::Done => {}
        }
    }
}

impl<M: Motor> Task for Tower<'_, M> {
    fn name(&self) -> &'static str {
        "tower"
    }

    fn period_ms(&self) -> u32 {
        self.cfg.period_ms
    }

    fn run(&mut self, cx: &mut Context<'_>) {
        self.step(cx);
    }
}
