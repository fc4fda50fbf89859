// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Slave orchestrator.
//!
//! Brings the arm up in a fixed order (link, tower, lifter, claw), announces
//! [`DataId::InitDone`] to the master, then serves one command at a time:
//!
//! | Command              | Steps                                           | Response        |
//! | -------------------- | ----------------------------------------------- | --------------- |
//! | `PrepForGrabRings`   | claw open + lifter to pre-grab                  | `ReadyToGrab`   |
//! | `GrabRings`          | lifter to grab, claw close, lifter to post-grab | `GrabbedRings`  |
//! | `PrepForPlacement`   | lifter to pre-release                           | `ReadyToPlace`  |
//! | `PlaceRings`         | lifter to release, claw open, lifter to post-release | `PlacedRings` |
//!
//! Every step waits on the actuators' `arrived` flags, but only after a [`SettleGate`] has
//! refused the first polls following the command: until the actuator task has run, the flag
//! still describes the previous target.

use crate::actuators::{inches_to_ticks, ClawCommand, ClawShares, LifterShares, TowerShares};
use crate::config::SlaveConfig;
use crate::control::SettleGate;
use crate::hw::reached;
use crate::node::comm::CommShares;
use crate::node::lines;
use crate::protocol::DataId;
use crate::sched::{Context, Task};

/// Every shared slot on the slave node.
pub struct SlaveShares {
    pub comm: CommShares,
    pub tower: TowerShares,
    pub lifter: LifterShares,
    pub claw: ClawShares,
}

impl SlaveShares {
    pub const fn new() -> Self {
        Self {
            comm: CommShares::new(),
            tower: TowerShares::new(),
            lifter: LifterShares::new(),
            claw: ClawShares::new(),
        }
    }

    /// Put every slot back to its safe default. Call before the scheduler starts.
    pub fn reset_from_interrupt(&self, cs: critical_section::CriticalSection<'_>) {
        self.comm.reset_from_interrupt(cs);
        self.tower.reset_from_interrupt(cs);
        self.lifter.reset_from_interrupt(cs);
        self.claw.reset_from_interrupt(cs);
    }
}

impl Default for SlaveShares {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlaveState {
    Boot,
    WaitComm,
    WaitTower,
    TowerPause { until_ms: u32 },
    WaitLifter,
    LifterPause { until_ms: u32 },
    WaitClaw,
    Idle,
    Prep2Grab,
    Grab,
    Prep2Place,
    Place,
}

/// Lifter targets in ticks.
#[derive(Debug, Clone, Copy)]
struct Targets {
    pre_grab: i32,
    grab: i32,
    post_grab: i32,
    pre_release: i32,
    release: i32,
    post_release: i32,
}

impl Targets {
    fn from_config(cfg: &SlaveConfig) -> Self {
        let t = |inches| inches_to_ticks(inches, cfg.ticks_per_inch, cfg.tick_offset);
        let h = &cfg.heights;
        Self {
            pre_grab: t(h.pre_grab),
            grab: t(h.grab),
            post_grab: t(h.post_grab),
            pre_release: t(h.pre_release),
            release: t(h.release),
            post_release: t(h.post_release),
        }
    }
}

pub struct SlaveMind<'a> {
    shares: &'a SlaveShares,
    cfg: SlaveConfig,
    targets: Targets,
    state: SlaveState,
    stage: u8,
    gate: SettleGate,
}

impl<'a> SlaveMind<'a> {
    pub fn new(shares: &'a SlaveShares, cfg: SlaveConfig) -> Self {
        Self {
            shares,
            targets: Targets::from_config(&cfg),
            gate: SettleGate::new(cfg.settle_polls),
            cfg,
            state: SlaveState::Boot,
            stage: 0,
        }
    }

    #[inline]
    pub fn state(&self) -> SlaveState {
        self.state
    }

    /// Sub-stage of `Grab` / `Place`.
    #[inline]
    pub fn stage(&self) -> u8 {
        self.stage
    }

    pub fn step(&mut self, cx: &mut Context<'_>) {
        let s = self.shares;
        let now = cx.now_ms;

        match self.state {
            // ---------------- bring-up ----------------
            SlaveState::Boot => {
                s.comm.start.put(true);
                self.state = SlaveState::WaitComm;
            }
            SlaveState::WaitComm => {
                if s.comm.ready.get() {
                    s.tower.start.put(true);
                    self.state = SlaveState::WaitTower;
                }
            }
            SlaveState::WaitTower => {
                if s.tower.arrived.get() {
                    self.state = SlaveState::TowerPause {
                        until_ms: now.wrapping_add(self.cfg.init_pause_ms),
                    };
                }
            }
            SlaveState::TowerPause { until_ms } => {
                if reached(now, until_ms) {
                    s.lifter.start.put(true);
                    self.state = SlaveState::WaitLifter;
                }
            }
            SlaveState::WaitLifter => {
                if s.lifter.arrived.get() {
                    self.state = SlaveState::LifterPause {
                        until_ms: now.wrapping_add(self.cfg.init_pause_ms),
                    };
                }
            }
            SlaveState::LifterPause { until_ms } => {
                if reached(now, until_ms) {
                    s.claw.start.put(true);
                    self.state = SlaveState::WaitClaw;
                }
            }
            SlaveState::WaitClaw => {
                if s.claw.arrived.get() {
                    s.comm.handshake.post(DataId::InitDone);
                    cx.diag.write_line(lines::MIND, "SlaveMind Ready");
                    crate::log_info!("slave ready");
                    self.state = SlaveState::Idle;
                }
            }

            // ---------------- mission ----------------
            SlaveState::Idle => {
                if let Some(id) = s.comm.handshake.take() {
                    let next = match id {
                        DataId::PrepForGrabRings => SlaveState::Prep2Grab,
                        DataId::GrabRings => SlaveState::Grab,
                        DataId::PrepForPlacement => SlaveState::Prep2Place,
                        DataId::PlaceRings => SlaveState::Place,
                        other => {
                            crate::log_warn!("slave: ignoring {:?}", other);
                            SlaveState::Idle
                        }
                    };
                    if next != SlaveState::Idle {
                        crate::log_info!("slave: {:?}", next);
                        self.enter(next);
                    }
                }
            }

            SlaveState::Prep2Grab => {
                s.claw.command.put(ClawCommand::Open);
                s.lifter.target.put(self.targets.pre_grab);
                if self.gate.ready() && s.claw.arrived.get() && s.lifter.arrived.get() {
                    self.respond(cx, DataId::ReadyToGrab);
                }
            }

            SlaveState::Grab => match self.stage {
                0 => self.lift_stage(self.targets.grab),
                1 => self.claw_stage(ClawCommand::Close),
                _ => {
                    if self.lift_to(self.targets.post_grab) {
                        self.respond(cx, DataId::GrabbedRings);
                    }
                }
            },

            SlaveState::Prep2Place => {
                if self.lift_to(self.targets.pre_release) {
                    self.respond(cx, DataId::ReadyToPlace);
                }
            }

            SlaveState::Place => match self.stage {
                0 => self.lift_stage(self.targets.release),
                1 => self.claw_stage(ClawCommand::Open),
                _ => {
                    if self.lift_to(self.targets.post_release) {
                        self.respond(cx, DataId::PlacedRings);
                    }
                }
            },
        }
    }

    fn enter(&mut self, state: SlaveState) {
        self.state = state;
        self.stage = 0;
        self.gate.reset();
    }

    /// Command the lifter; `true` once it has settled there.
    fn lift_to(&mut self, ticks: i32) -> bool {
        self.shares.lifter.target.put(ticks);
        self.gate.ready() && self.shares.lifter.arrived.get()
    }

    fn lift_stage(&mut self, ticks: i32) {
        if self.lift_to(ticks) {
            self.next_stage();
        }
    }

    fn claw_stage(&mut self, cmd: ClawCommand) {
        self.shares.claw.command.put(cmd);
        if self.gate.ready() && self.shares.claw.arrived.get() {
            self.next_stage();
        }
    }

    fn next_stage(&mut self) {
        self.stage += 1;
        self.gate.reset();
    }

    fn respond(&mut self, cx: &mut Context<'_>, id: DataId) {
        self.shares.comm.handshake.post(id);
        cx.diag.write_line(lines::MIND, "Slave Idle");
        crate::log_info!("slave: done, sent {:?}", id);
        self.enter(SlaveState::Idle);
    }
}

impl Task for SlaveMind<'_> {
    fn name(&self) -> &'static str {
        "slave-mind"
    }

    fn period_ms(&self) -> u32 {
        self.cfg.period_ms
    }

    fn run(&mut self, cx: &mut Context<'_>) {
        self.step(cx);
    }
}
