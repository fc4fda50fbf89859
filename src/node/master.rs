// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Master orchestrator.
//!
//! Brings up the link, starts navigation, then checks that the first id from the slave is
//! [`DataId::InitDone`]. Anything else is an init fault: a long tone, `ERROR!!!` and the
//! offending id on the display, and a pause before the mission starts anyway.
//!
//! The mission itself is a table of [`MissionStep`]s run in order, one at a time.

use crate::config::MasterConfig;
use crate::hw::{reached, Speaker};
use crate::node::comm::CommShares;
use crate::node::navigation::{NavShares, NavState};
use crate::node::{lines, show_value};
use crate::protocol::DataId;
use crate::sched::{Context, Task};

/// Every shared slot on the master node.
pub struct MasterShares {
    pub comm: CommShares,
    pub nav: NavShares,
}

impl MasterShares {
    pub const fn new() -> Self {
        Self {
            comm: CommShares::new(),
            nav: NavShares::new(),
        }
    }

    /// Put every slot back to its safe default. Call before the scheduler starts.
    pub fn reset_from_interrupt(&self, cs: critical_section::CriticalSection<'_>) {
        self.comm.reset_from_interrupt(cs);
        self.nav.reset_from_interrupt(cs);
    }
}

impl Default for MasterShares {
    fn default() -> Self {
        Self::new()
    }
}

/// One step of a mission script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MissionStep {
    /// Request a navigation phase and wait for navigation to leave it.
    Navigate(NavState),
    /// Send a command to the slave and wait for the matching response.
    Command { send: DataId, expect: DataId },
    /// Do nothing for `ms` milliseconds.
    Pause { ms: u32 },
}

/// Drive from the start box to the ring supply and up to the wall.
pub const SUPPLY_RUN: &[MissionStep] = &[
    MissionStep::Navigate(NavState::ToSupply),
    MissionStep::Navigate(NavState::ApproachWall),
];

const fn command(send: DataId, expect: DataId) -> MissionStep {
    MissionStep::Command { send, expect }
}

const fn pause(ms: u32) -> MissionStep {
    MissionStep::Pause { ms }
}

/// Pick up rings at the supply wall and stack them back onto the tower.
pub const GRAB_AND_PLACE: &[MissionStep] = &[
    command(DataId::PrepForGrabRings, DataId::ReadyToGrab),
    pause(1000),
    MissionStep::Navigate(NavState::ApproachWall),
    pause(1000),
    command(DataId::GrabRings, DataId::GrabbedRings),
    pause(1000),
    MissionStep::Navigate(NavState::BackUp),
    pause(1000),
    command(DataId::PrepForGrabRings, DataId::ReadyToGrab),
    command(DataId::GrabRings, DataId::GrabbedRings),
    pause(1500),
    command(DataId::PrepForPlacement, DataId::ReadyToPlace),
    pause(1500),
    command(DataId::PlaceRings, DataId::PlacedRings),
    pause(1500),
    command(DataId::PrepForGrabRings, DataId::ReadyToGrab),
    pause(1000),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MasterState {
    Boot,
    WaitComm,
    /// Waiting for the slave's first message.
    WaitSlave,
    FaultPause { until_ms: u32 },
    /// Running step `index` of the script.
    Mission { index: usize, entered: bool, until_ms: u32 },
    Done,
}

pub struct MasterMind<'a, S> {
    shares: &'a MasterShares,
    script: &'static [MissionStep],
    speaker: S,
    cfg: MasterConfig,
    state: MasterState,
    fault: Option<DataId>,
}

impl<'a, S: Speaker> MasterMind<'a, S> {
    pub fn new(
        shares: &'a MasterShares,
        script: &'static [MissionStep],
        speaker: S,
        cfg: MasterConfig,
    ) -> Self {
        Self {
            shares,
            script,
            speaker,
            cfg,
            state: MasterState::Boot,
            fault: None,
        }
    }

    #[inline]
    pub fn state(&self) -> MasterState {
        self.state
    }

    /// Id the slave sent instead of `InitDone`, if it did.
    #[inline]
    pub fn init_fault(&self) -> Option<DataId> {
        self.fault
    }

    pub fn step(&mut self, cx: &mut Context<'_>) {
        let s = self.shares;
        let now = cx.now_ms;

        match self.state {
            MasterState::Boot => {
                s.comm.start.put(true);
                self.state = MasterState::WaitComm;
            }
            MasterState::WaitComm => {
                if s.comm.ready.get() {
                    s.nav.start.put(true);
                    self.state = MasterState::WaitSlave;
                }
            }
            MasterState::WaitSlave => {
                let Some(id) = s.comm.handshake.take() else {
                    return;
                };
                if id == DataId::InitDone {
                    cx.diag.write_line(lines::MIND, "MasterMind Ready");
                    crate::log_info!("master ready");
                    self.begin_mission();
                } else {
                    self.speaker
                        .play_tone(self.cfg.fault_tone_hz, self.cfg.fault_tone_ms);
                    cx.diag.write_line(lines::MIND, "ERROR!!!");
                    show_value(cx.diag, lines::DEBUG, "", id.as_byte() as i32);
                    crate::log_error!("slave init sent {:?}", id);
                    self.fault = Some(id);
                    self.state = MasterState::FaultPause {
                        until_ms: now.wrapping_add(self.cfg.fault_pause_ms),
                    };
                }
            }
            MasterState::FaultPause { until_ms } => {
                if reached(now, until_ms) {
                    self.begin_mission();
                }
            }
            MasterState::Mission {
                index,
                entered,
                until_ms,
            } => self.mission(cx, index, entered, until_ms),
            MasterState::Done => {}
        }
    }

    fn begin_mission(&mut self) {
        self.shares.nav.line_follow_start.put(true);
        self.state = MasterState::Mission {
            index: 0,
            entered: false,
            until_ms: 0,
        };
    }

    fn mission(&mut self, cx: &mut Context<'_>, index: usize, entered: bool, until_ms: u32) {
        let s = self.shares;
        let now = cx.now_ms;

        let Some(&step) = self.script.get(index) else {
            cx.diag.write_line(lines::MIND, "Mission Done");
            crate::log_info!("mission done");
            self.state = MasterState::Done;
            return;
        };

        if !entered {
            crate::log_debug!("step {}: {:?}", index, step);
            let until_ms = match step {
                MissionStep::Navigate(phase) => {
                    s.nav.state.put(phase);
                    0
                }
                MissionStep::Command { send, .. } => {
                    s.comm.handshake.post(send);
                    0
                }
                MissionStep::Pause { ms } => now.wrapping_add(ms),
            };
            self.state = MasterState::Mission {
                index,
                entered: true,
                until_ms,
            };
            return;
        }

        let done = match step {
            MissionStep::Navigate(phase) => s.nav.state.get() != phase,
            MissionStep::Command { expect, .. } => match s.comm.handshake.take() {
                Some(id) if id == expect => true,
                Some(id) => {
                    crate::log_warn!("master: expected {:?}, got {:?}", expect, id);
                    false
                }
                None => false,
            },
            MissionStep::Pause { .. } => reached(now, until_ms),
        };

        if done {
            self.state = MasterState::Mission {
                index: index + 1,
                entered: false,
                until_ms: 0,
            };
        }
    }
}

impl<S: Speaker> Task for MasterMind<'_, S> {
    fn name(&self) -> &'static str {
        "master-mind"
    }

    fn period_ms(&self) -> u32 {
        self.cfg.period_ms
    }

    fn run(&mut self, cx: &mut Context<'_>) {
        self.step(cx);
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;
    use std::string::String;
    use std::vec::Vec;

    use super::*;
    use crate::hw::Diagnostics;

    struct Beeps<'a>(&'a Cell<u32>);

    impl Speaker for Beeps<'_> {
        fn play_tone(&mut self, _freq_hz: u16, duration_ms: u16) {
            self.0.set(self.0.get() + duration_ms as u32);
        }
    }

    #[derive(Default)]
    struct Screen(Vec<(u8, String)>);

    impl Diagnostics for Screen {
        fn write_line(&mut self, line: u8, text: &str) {
            self.0.push((line, text.into()));
        }
    }

    fn tick<'a>(m: &mut MasterMind<'a, Beeps<'a>>, now: u32, screen: &mut Screen) {
        m.step(&mut Context::new(now, screen));
    }

    /// Slave's message lands on the master's handshake.
    fn receive(shares: &MasterShares, id: DataId) {
        shares.comm.handshake.inbound.put(id);
        shares.comm.handshake.ready_to_get.put(true);
    }

    /// Id the master posted, consumed as the link task would.
    fn sent(shares: &MasterShares) -> Option<DataId> {
        let h = &shares.comm.handshake;
        if h.ready_to_send.get() {
            h.ready_to_send.put(false);
            Some(h.outbound.get())
        } else {
            None
        }
    }

    fn booted<'a>(
        shares: &'a MasterShares,
        script: &'static [MissionStep],
        beeps: &'a Cell<u32>,
        screen: &mut Screen,
    ) -> MasterMind<'a, Beeps<'a>> {
        let mut m = MasterMind::new(shares, script, Beeps(beeps), MasterConfig::default());
        tick(&mut m, 0, screen);
        assert!(shares.comm.start.get());
        assert!(!shares.nav.start.get());

        shares.comm.ready.put(true);
        tick(&mut m, 50, screen);
        assert!(shares.nav.start.get());
        assert_eq!(m.state(), MasterState::WaitSlave);
        m
    }

    #[test]
    fn init_done_starts_mission() {
        let shares = MasterShares::new();
        let beeps = Cell::new(0);
        let mut screen = Screen::default();
        let mut m = booted(&shares, SUPPLY_RUN, &beeps, &mut screen);

        tick(&mut m, 100, &mut screen);
        assert_eq!(m.state(), MasterState::WaitSlave);

        receive(&shares, DataId::InitDone);
        tick(&mut m, 150, &mut screen);
        assert!(screen.0.contains(&(lines::MIND, "MasterMind Ready".into())));
        assert!(shares.nav.line_follow_start.get());
        assert_eq!(m.init_fault(), None);
        assert_eq!(beeps.get(), 0);
    }

    #[test]
    fn wrong_first_id_is_an_init_fault() {
        let shares = MasterShares::new();
        let beeps = Cell::new(0);
        let mut screen = Screen::default();
        let mut m = booted(&shares, SUPPLY_RUN, &beeps, &mut screen);

        receive(&shares, DataId::ReadyToGrab);
        tick(&mut m, 100, &mut screen);
        assert_eq!(m.init_fault(), Some(DataId::ReadyToGrab));
        assert_eq!(beeps.get(), 1000);
        assert!(screen.0.contains(&(lines::MIND, "ERROR!!!".into())));
        assert!(screen.0.contains(&(lines::DEBUG, "50".into())));
        assert!(!shares.nav.line_follow_start.get());

        tick(&mut m, 10_050, &mut screen);
        assert!(matches!(m.state(), MasterState::FaultPause { .. }));

        tick(&mut m, 10_100, &mut screen);
        assert!(matches!(m.state(), MasterState::Mission { index: 0, .. }));
        assert!(shares.nav.line_follow_start.get());
    }

    #[test]
    fn navigate_waits_for_navigation_to_finish() {
        let shares = MasterShares::new();
        let beeps = Cell::new(0);
        let mut screen = Screen::default();
        let mut m = booted(&shares, SUPPLY_RUN, &beeps, &mut screen);
        receive(&shares, DataId::InitDone);
        tick(&mut m, 100, &mut screen);

        tick(&mut m, 150, &mut screen);
        assert_eq!(shares.nav.state.get(), NavState::ToSupply);
        for t in 0..10 {
            tick(&mut m, 200 + t * 50, &mut screen);
        }
        assert!(matches!(m.state(), MasterState::Mission { index: 0, .. }));

        shares.nav.state.put(NavState::Idle);
        tick(&mut m, 800, &mut screen);
        tick(&mut m, 850, &mut screen);
        assert_eq!(shares.nav.state.get(), NavState::ApproachWall);

        shares.nav.state.put(NavState::Idle);
        tick(&mut m, 900, &mut screen);
        tick(&mut m, 950, &mut screen);
        assert_eq!(m.state(), MasterState::Done);
        assert!(screen.0.contains(&(lines::MIND, "Mission Done".into())));
    }

    static TALK: &[MissionStep] = &[
        MissionStep::Command {
            send: DataId::PrepForGrabRings,
            expect: DataId::ReadyToGrab,
        },
        MissionStep::Pause { ms: 1000 },
        MissionStep::Command {
            send: DataId::GrabRings,
            expect: DataId::GrabbedRings,
        },
    ];

    #[test]
    fn commands_wait_for_the_matching_response() {
        let shares = MasterShares::new();
        let beeps = Cell::new(0);
        let mut screen = Screen::default();
        let mut m = booted(&shares, TALK, &beeps, &mut screen);
        receive(&shares, DataId::InitDone);
        tick(&mut m, 100, &mut screen);

        tick(&mut m, 150, &mut screen);
        assert_eq!(sent(&shares), Some(DataId::PrepForGrabRings));

        // A stray response is consumed but does not complete the step.
        receive(&shares, DataId::PlacedRings);
        tick(&mut m, 200, &mut screen);
        assert!(!shares.comm.handshake.ready_to_get.get());
        assert!(matches!(m.state(), MasterState::Mission { index: 0, .. }));

        receive(&shares, DataId::ReadyToGrab);
        tick(&mut m, 250, &mut screen);
        assert!(matches!(m.state(), MasterState::Mission { index: 1, entered: false, .. }));

        // Pause from 300 to 1300.
        tick(&mut m, 300, &mut screen);
        tick(&mut m, 1250, &mut screen);
        assert!(matches!(m.state(), MasterState::Mission { index: 1, .. }));
        tick(&mut m, 1300, &mut screen);
        tick(&mut m, 1350, &mut screen);
        assert_eq!(sent(&shares), Some(DataId::GrabRings));
    }

    #[test]
    fn scripts_end_with_the_arm_ready_to_grab() {
        assert_eq!(GRAB_AND_PLACE.len(), 17);
        let last_command = GRAB_AND_PLACE
            .iter()
            .rev()
            .find_map(|s| match s {
                MissionStep::Command { send, .. } => Some(*send),
                _ => None,
            });
        assert_eq!(last_command, Some(DataId::PrepForGrabRings));
        assert_eq!(SUPPLY_RUN.last(), Some(&MissionStep::Navigate(NavState::ApproachWall)));
    }
}
