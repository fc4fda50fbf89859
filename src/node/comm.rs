// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Link task, identical on both nodes apart from its [`BootRole`].
//!
//! ## Boot
//!
//! The link is brought up with a two-byte exchange before anything else is trusted:
//!
//! ```text
//!   Initiator (master)            Responder (slave)
//!       WakeMsg  ───────────────────►   (polls until it sees WakeMsg)
//!       (resends every 200 ms)
//!                ◄───────────────────   AckMsg
//!       ready = true                     ready = true
//! ```
//!
//! ## Steady state
//!
//! Every cycle moves at most one byte. An inbound id is published to the [`Handshake`] slots
//! and wins over a pending outbound id, which then goes out on a later cycle.
//!
//! Boot bytes are never published. If the responder's Ack is lost, the initiator keeps
//! sending `WakeMsg`; the responder answers each one with another `AckMsg`, and the
//! initiator drops any extra Acks that arrive once it is running.

use crate::config::CommConfig;
use crate::hw::reached;
use crate::node::lines;
use crate::protocol::{DataId, Link, Message};
use crate::sched::{Context, Task};
use crate::share::SharedState;

/// Which side opens the boot exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootRole {
    /// Sends `WakeMsg` until `AckMsg` comes back.
    Initiator,
    /// Waits for `WakeMsg` and answers `AckMsg`.
    Responder,
}

/// Application-level message handoff between the link task and the orchestrator.
///
/// Each id slot has one writer. The two flags are handoff flags: the producer sets, the
/// consumer clears.
pub struct Handshake {
    /// Last id received. Written by the link task.
    pub inbound: SharedState<DataId>,
    /// Set by the link task when `inbound` is unread, cleared by the orchestrator.
    pub ready_to_get: SharedState<bool>,
    /// Id to transmit. Written by the orchestrator.
    pub outbound: SharedState<DataId>,
    /// Set by the orchestrator once `outbound` is written, cleared by the link task.
    pub ready_to_send: SharedState<bool>,
}

impl Handshake {
    pub const fn new() -> Self {
        Self {
            inbound: SharedState::new(DataId::NoMsg),
            ready_to_get: SharedState::new(false),
            outbound: SharedState::new(DataId::NoMsg),
            ready_to_send: SharedState::new(false),
        }
    }

    /// Queue `id` for transmission, replacing any id not yet sent.
    pub fn post(&self, id: DataId) {
        self.outbound.put(id);
        self.ready_to_send.put(true);
    }

    /// Consume the unread inbound id, if any.
    pub fn take(&self) -> Option<DataId> {
        if self.ready_to_get.get() {
            self.ready_to_get.put(false);
            Some(self.inbound.get())
        } else {
            None
        }
    }

    pub fn reset_from_interrupt(&self, cs: critical_section::CriticalSection<'_>) {
        self.inbound.put_from_interrupt(cs, DataId::NoMsg);
        self.ready_to_get.put_from_interrupt(cs, false);
        self.outbound.put_from_interrupt(cs, DataId::NoMsg);
        self.ready_to_send.put_from_interrupt(cs, false);
    }
}

impl Default for Handshake {
    fn default() -> Self {
        Self::new()
    }
}

/// Slots the link task shares with its node's orchestrator.
pub struct CommShares {
    /// Written by the orchestrator, read by the link task.
    pub start: SharedState<bool>,
    /// Written by the link task once the boot exchange completed.
    pub ready: SharedState<bool>,
    pub handshake: Handshake,
}

impl CommShares {
    pub const fn new() -> Self {
        Self {
            start: SharedState::new(false),
            ready: SharedState::new(false),
            handshake: Handshake::new(),
        }
    }

    pub fn reset_from_interrupt(&self, cs: critical_section::CriticalSection<'_>) {
        self.start.put_from_interrupt(cs, false);
        self.ready.put_from_interrupt(cs, false);
        self.handshake.reset_from_interrupt(cs);
    }
}

impl Default for CommShares {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommState {
    Parked,
    /// Boot exchange in progress; the initiator resends at `next_wake_ms`.
    Booting { next_wake_ms: u32 },
    Running,
}

pub struct Comm<'a, L> {
    link: L,
    msg: Message,
    role: BootRole,
    shares: &'a CommShares,
    cfg: CommConfig,
    state: CommState,
}

impl<'a, L: Link> Comm<'a, L> {
    pub fn new(link: L, role: BootRole, shares: &'a CommShares, cfg: CommConfig) -> Self {
        Self {
            link,
            msg: Message::new(),
            role,
            shares,
            cfg,
            state: CommState::Parked,
        }
    }

    #[inline]
    pub fn state(&self) -> CommState {
        self.state
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn step(&mut self, cx: &mut Context<'_>) {
        match self.state {
            CommState::Parked => {
                if !self.shares.start.get() {
                    return;
                }
                let hs = &self.shares.handshake;
                hs.inbound.put(DataId::NoMsg);
                hs.ready_to_get.put(false);
                self.msg.clear_simple();

                if self.role == BootRole::Initiator {
                    self.msg.send_simple(&mut self.link, DataId::WakeMsg);
                }
                self.state = CommState::Booting {
                    next_wake_ms: cx.now_ms.wrapping_add(self.cfg.wake_interval_ms),
                };
            }

            CommState::Booting { next_wake_ms } => {
                let got = self.msg.try_get_simple(&mut self.link);
                let done = match (self.role, got) {
                    (BootRole::Responder, Some(DataId::WakeMsg)) => {
                        self.msg.send_simple(&mut self.link, DataId::AckMsg);
                        true
                    }
                    (BootRole::Initiator, Some(DataId::AckMsg)) => true,
                    (_, Some(other)) => {
                        crate::log_debug!("boot: ignoring {:?}", other);
                        false
                    }
                    (_, None) => false,
                };

                if done {
                    self.msg.clear_simple();
                    self.shares.ready.put(true);
                    cx.diag.write_line(lines::COMM, "Comm Ready");
                    crate::log_info!("link up as {:?}", self.role);
                    self.state = CommState::Running;
                } else if self.role == BootRole::Initiator && reached(cx.now_ms, next_wake_ms) {
                    self.msg.send_simple(&mut self.link, DataId::WakeMsg);
                    self.state = CommState::Booting {
                        next_wake_ms: cx.now_ms.wrapping_add(self.cfg.wake_interval_ms),
                    };
                }
            }

            CommState::Running => {
                match self.msg.try_get_simple(&mut self.link) {
                    // Our Ack was lost and the initiator is still waking us.
                    Some(DataId::WakeMsg) => {
                        if self.role == BootRole::Responder {
                            crate::log_warn!("wake after boot, re-acking");
                            self.msg.send_simple(&mut self.link, DataId::AckMsg);
                        }
                    }
                    // Ack for a wake resent while the first Ack was in flight.
                    Some(DataId::AckMsg) => crate::log_debug!("late ack dropped"),
                    Some(id) => {
                        crate::log_debug!("rx {:?}", id);
                        let hs = &self.shares.handshake;
                        hs.inbound.put(id);
                        hs.ready_to_get.put(true);
                    }
                    None => self.send_pending(),
                }
            }
        }
    }

    fn send_pending(&mut self) {
        let hs = &self.shares.handshake;
        if hs.ready_to_send.get() {
            let id = hs.outbound.get();
            crate::log_debug!("tx {:?}", id);
            self.msg.send_simple(&mut self.link, id);
            hs.ready_to_send.put(false);
        }
    }
}

impl<L: Link> Task for Comm<'_, L> {
    fn name(&self) -> &'static str {
        "comm"
    }

    fn period_ms(&self) -> u32 {
        self.cfg.period_ms
    }

    fn run(&mut self, cx: &mut Context<'_>) {
        self.step(cx);
    }
}
