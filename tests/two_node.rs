// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Both controllers on one host: real tasks and schedulers, simulated wire and arm.
//!
//! The wire is lossless unless a test asks for a byte to be lost.

mod common;

use common::{link_pair, Arm, Screen, SimClock, Tones};
use ringbot::actuators::{inches_to_ticks, Claw, Lifter, Tower};
use ringbot::config::{
    ClawConfig, CommConfig, LifterConfig, MasterConfig, SlaveConfig, TowerConfig,
};
use ringbot::hw::Clock;
use ringbot::node::{
    lines, BootRole, Comm, MasterMind, MasterShares, MasterState, MissionStep, NavState,
    SlaveMind, SlaveShares, SUPPLY_RUN,
};
use ringbot::protocol::{DataId, Link};
use ringbot::sched::Scheduler;

static EXCHANGE: &[MissionStep] = &[
    MissionStep::Command {
        send: DataId::PrepForGrabRings,
        expect: DataId::ReadyToGrab,
    },
    MissionStep::Command {
        send: DataId::GrabRings,
        expect: DataId::GrabbedRings,
    },
    MissionStep::Pause { ms: 200 },
    MissionStep::Command {
        send: DataId::PrepForPlacement,
        expect: DataId::ReadyToPlace,
    },
    MissionStep::Command {
        send: DataId::PlaceRings,
        expect: DataId::PlacedRings,
    },
];

fn ticks(inches: f32) -> i32 {
    let cfg = SlaveConfig::default();
    inches_to_ticks(inches, cfg.ticks_per_inch, cfg.tick_offset)
}

/// What a two-node run left behind.
struct Run {
    finished: bool,
    master_state: MasterState,
    master_sent: Vec<u8>,
    /// (byte, lifter count, claw position) each time the slave transmitted.
    replies: Vec<(u8, i32, f32)>,
    master_screen: Screen,
    slave_screen: Screen,
    tones: Tones,
}

impl Run {
    fn reply_bytes(&self) -> Vec<u8> {
        self.replies.iter().map(|r| r.0).collect()
    }

    fn commands(&self) -> Vec<u8> {
        self.master_sent
            .iter()
            .copied()
            .filter(|&b| b != DataId::WakeMsg.as_byte())
            .collect()
    }

    fn wakes(&self) -> usize {
        self.master_sent.len() - self.commands().len()
    }
}

/// Run both nodes through the `EXCHANGE` script until the master reports the mission done or
/// `limit_ms` passes. `lost` bytes are lost on the wire the first time the slave sends them.
fn run_exchange(lost: &[DataId], limit_ms: u32) -> Run {
    let clock = SimClock::default();
    let (master_link, mut slave_link) = link_pair();
    for id in lost {
        slave_link.lose_next(id.as_byte());
    }
    let master_sent = master_link.sent_log();
    let slave_sent = slave_link.sent_log();
    let arm = Arm::new();
    let tones = Tones::default();
    let master_screen = Screen::default();
    let slave_screen = Screen::default();

    let master_shares = MasterShares::new();
    let slave_shares = SlaveShares::new();

    let mut m_comm = Comm::new(
        master_link,
        BootRole::Initiator,
        &master_shares.comm,
        CommConfig::default(),
    );
    let mut m_mind = MasterMind::new(
        &master_shares,
        EXCHANGE,
        tones.clone(),
        MasterConfig::default(),
    );
    let mut s_comm = Comm::new(
        slave_link,
        BootRole::Responder,
        &slave_shares.comm,
        CommConfig::default(),
    );
    let mut s_mind = SlaveMind::new(&slave_shares, SlaveConfig::default());
    let mut tower = Tower::new(arm.tower_motor(), &slave_shares.tower, TowerConfig::default());
    let mut lifter = Lifter::new(
        arm.lifter_motor(),
        arm.base_switch(),
        tones.clone(),
        &slave_shares.lifter,
        LifterConfig::default(),
    );
    let mut claw = Claw::new(
        arm.claw_motor(),
        arm.claw_switch(),
        &slave_shares.claw,
        ClawConfig::default(),
    );

    let mut m_diag = master_screen.clone();
    let mut s_diag = slave_screen.clone();
    let mut master: Scheduler<'_, 2> = Scheduler::new(&mut m_diag);
    master.spawn(&mut m_comm).unwrap();
    master.spawn(&mut m_mind).unwrap();
    let mut slave: Scheduler<'_, 5> = Scheduler::new(&mut s_diag);
    slave.spawn(&mut s_comm).unwrap();
    slave.spawn(&mut s_mind).unwrap();
    slave.spawn(&mut tower).unwrap();
    slave.spawn(&mut lifter).unwrap();
    slave.spawn(&mut claw).unwrap();

    let mut replies: Vec<(u8, i32, f32)> = Vec::new();
    let mut finished = false;
    while clock.now_ms() < limit_ms {
        master.poll(&clock);
        slave.poll(&clock);
        arm.step(1);
        clock.advance(1);

        let sent = slave_sent.borrow();
        while replies.len() < sent.len() {
            replies.push((sent[replies.len()], arm.lifter_count(), arm.claw_pos()));
        }
        if master_screen.has(lines::MIND, "Mission Done") {
            finished = true;
            break;
        }
    }
    drop(master);
    drop(slave);

    let master_sent = master_sent.borrow().clone();
    Run {
        finished,
        master_state: m_mind.state(),
        master_sent,
        replies,
        master_screen,
        slave_screen,
        tones,
    }
}

#[test]
fn grab_and_place_exchange_moves_the_arm() {
    let run = run_exchange(&[], 60_000);
    assert!(run.finished, "mission did not finish");

    assert_eq!(run.reply_bytes(), [2, 3, 50, 51, 52, 53]);
    assert_eq!(run.commands(), [10, 11, 12, 13]);
    assert_eq!(run.master_sent[0], DataId::WakeMsg.as_byte());

    let replies = &run.replies;
    let h = SlaveConfig::default().heights;
    let near = |count: i32, inches: f32| (count - ticks(inches)).abs() < 10;
    assert!(near(replies[2].1, h.pre_grab), "ReadyToGrab at {}", replies[2].1);
    assert!(near(replies[3].1, h.post_grab), "GrabbedRings at {}", replies[3].1);
    assert!(near(replies[4].1, h.pre_release), "ReadyToPlace at {}", replies[4].1);
    assert!(near(replies[5].1, h.post_release), "PlacedRings at {}", replies[5].1);

    // Jaws shut on the rings when grabbed, back past the open stop when placed.
    assert!(replies[3].2 <= 5.0);
    assert!(replies[5].2 > 55.0);

    assert!(run.slave_screen.has(lines::MIND, "SlaveMind Ready"));
    assert!(run.slave_screen.has(lines::TOWER, "Tower Ready"));
    assert!(run.slave_screen.has(lines::LIFTER, "Lifter Ready"));
    assert!(run.slave_screen.has(lines::CLAW, "Claw Ready"));
    assert!(run.master_screen.has(lines::MIND, "MasterMind Ready"));
    assert!(!run.tones.played().contains(&(500, 1000)));
}

#[test]
fn lost_ack_is_answered_on_the_next_wake() {
    let run = run_exchange(&[DataId::AckMsg], 60_000);
    assert!(run.finished, "mission did not finish");

    // One Ack lost, the second one gets through. The repeated wake is never a command.
    assert_eq!(run.reply_bytes(), [2, 2, 3, 50, 51, 52, 53]);
    assert_eq!(run.wakes(), 2);
    assert_eq!(run.commands(), [10, 11, 12, 13]);
    assert!(run.master_screen.has(lines::MIND, "MasterMind Ready"));
    assert!(!run.tones.played().contains(&(500, 1000)));
}

#[test]
fn lost_response_leaves_the_master_waiting() {
    let run = run_exchange(&[DataId::GrabbedRings], 60_000);
    assert!(!run.finished);

    // The slave answered, the master never heard it and never moves on.
    assert_eq!(run.reply_bytes(), [2, 3, 50, 51]);
    assert_eq!(run.commands(), [10, 11]);
    assert!(matches!(
        run.master_state,
        MasterState::Mission { index: 1, entered: true, .. }
    ));
    assert!(!run.master_screen.has(lines::MIND, "Mission Done"));
}

#[test]
fn silent_slave_gets_periodic_wakes() {
    let clock = SimClock::default();
    let (master_link, _slave_end) = link_pair();
    let master_sent = master_link.sent_log();
    let screen = Screen::default();
    let shares = MasterShares::new();

    let mut comm = Comm::new(
        master_link,
        BootRole::Initiator,
        &shares.comm,
        CommConfig::default(),
    );
    let mut mind = MasterMind::new(&shares, SUPPLY_RUN, Tones::default(), MasterConfig::default());
    let mut diag = screen.clone();
    let mut sched: Scheduler<'_, 2> = Scheduler::new(&mut diag);
    sched.spawn(&mut comm).unwrap();
    sched.spawn(&mut mind).unwrap();

    while clock.now_ms() < 1000 {
        sched.poll(&clock);
        clock.advance(1);
    }

    let sent = master_sent.borrow();
    assert!((4..=6).contains(&sent.len()), "{} wakes", sent.len());
    assert!(sent.iter().all(|&b| b == DataId::WakeMsg.as_byte()));
    assert!(!shares.comm.ready.get());
    assert!(!shares.nav.start.get());
    assert!(!screen.has(lines::COMM, "Comm Ready"));
}

#[test]
fn wrong_first_message_trips_the_init_fault() {
    let clock = SimClock::default();
    let (master_link, mut fake_slave) = link_pair();
    let screen = Screen::default();
    let tones = Tones::default();
    let shares = MasterShares::new();

    let mut comm = Comm::new(
        master_link,
        BootRole::Initiator,
        &shares.comm,
        CommConfig::default(),
    );
    let mut mind = MasterMind::new(&shares, SUPPLY_RUN, tones.clone(), MasterConfig::default());
    let mut diag = screen.clone();
    let mut sched: Scheduler<'_, 2> = Scheduler::new(&mut diag);
    sched.spawn(&mut comm).unwrap();
    sched.spawn(&mut mind).unwrap();

    let mut answered = false;
    while clock.now_ms() < 12_000 {
        sched.poll(&clock);
        let mut b = [0u8; 1];
        if !answered && fake_slave.read(&mut b) == 1 && b[0] == DataId::WakeMsg.as_byte() {
            fake_slave.write(&[DataId::AckMsg.as_byte(), DataId::ReadyToGrab.as_byte()]);
            answered = true;
        }
        clock.advance(1);

        if clock.now_ms() == 5_000 {
            assert!(screen.has(lines::MIND, "ERROR!!!"));
            assert!(screen.has(lines::DEBUG, "50"));
            assert!(!shares.nav.line_follow_start.get());
        }
    }

    assert_eq!(tones.played(), vec![(500u16, 1000u16)]);
    assert!(!screen.has(lines::MIND, "MasterMind Ready"));
    // After the pause the mission starts anyway.
    assert!(shares.nav.line_follow_start.get());
    assert_eq!(shares.nav.state.get(), NavState::ToSupply);
}

#[test]
fn responder_ignores_noise_before_wake() {
    let clock = SimClock::default();
    let (mut fake_master, slave_link) = link_pair();
    let shares = SlaveShares::new();
    let mut comm = Comm::new(
        slave_link,
        BootRole::Responder,
        &shares.comm,
        CommConfig::default(),
    );
    let mut diag = Screen::default();
    let mut sched: Scheduler<'_, 1> = Scheduler::new(&mut diag);
    sched.spawn(&mut comm).unwrap();

    shares.comm.start.put(true);
    fake_master.write(&[0x77, DataId::NoMsg.as_byte(), DataId::InitDone.as_byte()]);
    for _ in 0..100 {
        sched.poll(&clock);
        clock.advance(1);
    }
    assert!(!shares.comm.ready.get());

    fake_master.write(&[DataId::WakeMsg.as_byte()]);
    for _ in 0..100 {
        sched.poll(&clock);
        clock.advance(1);
    }
    assert!(shares.comm.ready.get());

    let mut b = [0u8; 4];
    assert_eq!(fake_master.read(&mut b), 1);
    assert_eq!(b[0], DataId::AckMsg.as_byte());
}
