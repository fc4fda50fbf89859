// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Master-side drive task.
//!
//! The master requests a phase by writing [`NavShares::state`]; navigation runs it and writes
//! [`NavState::Idle`] back when the phase is complete, so the field doubles as the completion
//! flag. Navigation owns both drive wheels, and the line follower borrows them from it.
//!
//! | Phase          | Drive                                           | Ends when                   |
//! | -------------- | ----------------------------------------------- | --------------------------- |
//! | `ToSupply`     | follow, cross the centre line blind, follow     | aux sensor sees the 2nd line |
//! | `ApproachWall` | straight, PI on the wall distance               | at the wall distance        |
//! | `BackUp`       | straight in reverse, PI on the back-up distance | at the back-up distance     |
//!
//! `TurnAround` and `ToScore` are reserved and hold the wheels stopped.

use crate::config::NavConfig;
use crate::control::{HeadingCorrector, Pi};
use crate::hw::{DistanceSensor, LightSensor, Motor, Speaker};
use crate::node::line_follow::{LineFollower, Wheels};
use crate::node::{lines, show_value};
use crate::sched::{Context, Task};
use crate::share::SharedState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NavState {
    #[default]
    Idle,
    ToSupply,
    ApproachWall,
    BackUp,
    TurnAround,
    ToScore,
}

/// Slots navigation shares with the master orchestrator.
pub struct NavShares {
    /// Written by the orchestrator, read by navigation.
    pub start: SharedState<bool>,
    /// Requested phase. The orchestrator writes a phase, navigation writes `Idle` when done.
    pub state: SharedState<NavState>,
    /// Written by the orchestrator: calibrate the line follower while idle.
    pub line_follow_start: SharedState<bool>,
    /// Learned edge brightness, 0 until calibrated. Written by navigation.
    pub edge_brightness: SharedState<i16>,
}

impl NavShares {
    pub const fn new() -> Self {
        Self {
            start: SharedState::new(false),
            state: SharedState::new(NavState::Idle),
            line_follow_start: SharedState::new(false),
            edge_brightness: SharedState::new(0),
        }
    }

    pub fn reset_from_interrupt(&self, cs: critical_section::CriticalSection<'_>) {
        self.start.put_from_interrupt(cs, false);
        self.state.put_from_interrupt(cs, NavState::Idle);
        self.line_follow_start.put_from_interrupt(cs, false);
        self.edge_brightness.put_from_interrupt(cs, 0);
    }
}

impl Default for NavShares {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Navigation<'a, M, ML, AL, D, S> {
    wheels: Wheels<M>,
    follower: LineFollower<ML>,
    aux: AL,
    sonar: D,
    speaker: S,
    heading: HeadingCorrector,
    range: Pi,
    shares: &'a NavShares,
    cfg: NavConfig,
    started: bool,
    phase: NavState,
    stage: u8,
    loop_count: u8,
}

impl<'a, M, ML, AL, D, S> Navigation<'a, M, ML, AL, D, S>
where
    M: Motor,
    ML: LightSensor,
    AL: LightSensor,
    D: DistanceSensor,
    S: Speaker,
{
    pub fn new(
        wheels: Wheels<M>,
        follower: LineFollower<ML>,
        aux: AL,
        sonar: D,
        speaker: S,
        shares: &'a NavShares,
        cfg: NavConfig,
    ) -> Self {
        Self {
            wheels,
            follower,
            aux,
            sonar,
            speaker,
            heading: HeadingCorrector::new(cfg.straight),
            range: Pi::new(cfg.kp, cfg.ki),
            shares,
            cfg,
            started: false,
            phase: NavState::Idle,
            stage: 0,
            loop_count: 0,
        }
    }

    /// Phase currently being driven.
    #[inline]
    pub fn phase(&self) -> NavState {
        self.phase
    }

    /// Sub-stage of `ToSupply`.
    #[inline]
    pub fn stage(&self) -> u8 {
        self.stage
    }

    pub fn wheels(&self) -> &Wheels<M> {
        &self.wheels
    }

    pub fn follower(&self) -> &LineFollower<ML> {
        &self.follower
    }

    pub fn step(&mut self, cx: &mut Context<'_>) {
        if !self.started {
            if !self.shares.start.get() {
                return;
            }
            self.started = true;
            cx.diag.write_line(lines::NAV, "Nav Ready");
            crate::log_info!("nav started");
        }

        let requested = self.shares.state.get();
        if requested != self.phase {
            self.enter(requested);
        }

        match self.phase {
            NavState::Idle => {
                if self.shares.line_follow_start.get() && !self.follower.is_calibrated() {
                    self.calibrate(cx);
                }
            }
            NavState::ToSupply => self.to_supply(cx),
            NavState::ApproachWall => {
                let error = self.sonar.distance_cm() as f32 - self.cfg.wall_distance_cm;
                self.range_step(cx, error, 1);
            }
            NavState::BackUp => {
                let error = self.cfg.backup_distance_cm - self.sonar.distance_cm() as f32;
                self.range_step(cx, error, -1);
            }
            NavState::TurnAround | NavState::ToScore => {}
        }
    }

    fn enter(&mut self, phase: NavState) {
        crate::log_debug!("nav: {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        self.stage = 0;
        self.loop_count = 0;

        match phase {
            NavState::ApproachWall | NavState::BackUp => {
                let max = if phase == NavState::ApproachWall {
                    self.cfg.forward_power
                } else {
                    self.cfg.backup_power
                };
                self.wheels.reset();
                self.heading.reset();
                self.range = Pi::new(self.cfg.kp, self.cfg.ki)
                    .with_output_limits(self.cfg.min_power as i32, max as i32);
            }
            NavState::ToSupply => {}
            NavState::Idle | NavState::TurnAround | NavState::ToScore => self.wheels.stop(),
        }
    }

    /// Follow the line, or keep calibrating if the edge is not known yet.
    /// Returns `true` if the wheels followed the line this cycle.
    fn follow(&mut self, cx: &mut Context<'_>) -> bool {
        if self.follower.is_calibrated() {
            self.follower.follow(&mut self.wheels);
            true
        } else {
            self.calibrate(cx);
            false
        }
    }

    fn calibrate(&mut self, cx: &mut Context<'_>) {
        if self.follower.calibrate(&mut self.wheels, cx.now_ms) {
            if let Some(edge) = self.follower.edge() {
                self.shares.edge_brightness.put(edge);
                show_value(cx.diag, lines::LINE, "Edge: ", edge as i32);
            }
        }
    }

    fn to_supply(&mut self, cx: &mut Context<'_>) {
        if self.stage == 1 {
            self.heading.drive(
                &mut self.wheels.right,
                &mut self.wheels.left,
                self.cfg.cross_power,
            );
            self.loop_count = self.loop_count.saturating_add(1);
            if self.loop_count > self.cfg.cross_cycles {
                self.stage = 2;
            }
            return;
        }

        if !self.follow(cx) {
            return;
        }

        let b = self.aux.brightness();
        show_value(cx.diag, lines::NAV, "Color: ", b as i32);
        if b > self.cfg.crossing_brightness {
            if self.stage == 0 {
                // Centre line: cross it blind so the aux sensor does not stop us on it.
                self.wheels.reset();
                self.heading.reset();
                self.loop_count = 0;
                self.stage = 1;
            } else {
                self.finish(false);
            }
        }
    }

    /// One cycle of a distance-controlled straight run. `dir` is 1 forward, -1 reverse.
    fn range_step(&mut self, cx: &mut Context<'_>, error: f32, dir: i8) {
        if error <= 0.0 {
            self.finish(true);
            cx.diag.write_line(lines::NAV, "Nav Idle");
            return;
        }
        let power = self.range.update(error as i32) as i8;
        self.heading
            .drive(&mut self.wheels.right, &mut self.wheels.left, dir * power);
    }

    fn finish(&mut self, beep: bool) {
        self.wheels.stop();
        if beep {
            self.speaker
                .play_tone(self.cfg.done_tone_hz, self.cfg.done_tone_ms);
        }
        crate::log_info!("nav: {:?} done", self.phase);
        self.shares.state.put(NavState::Idle);
        self.phase = NavState::Idle;
        self.stage = 0;
    }
}

impl<M, ML, AL, D, S> Task for Navigation<'_, M, ML, AL, D, S>
where
    M: Motor,
    ML: LightSensor,
    AL: LightSensor,
    D: DistanceSensor,
    S: Speaker,
{
    fn name(&self) -> &'static str {
        "navigation"
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
    use crate::config::LineFollowConfig;
    use crate::hw::Diagnostics;

    /// Wheel whose count advances by a tenth of its power on every read.
    #[derive(Default)]
    struct SimWheel {
        pwm: Cell<i8>,
        count: Cell<i32>,
    }

    impl Motor for SimWheel {
        fn reset(&mut self) {
            self.pwm.set(0);
            self.count.set(0);
        }

        fn set_pwm(&mut self, power: i8) {
            self.pwm.set(power);
        }

        fn set_brake(&mut self, _brake: bool) {}

        fn count(&self) -> i32 {
            self.count.set(self.count.get() + self.pwm.get() as i32 / 10);
            self.count.get()
        }
    }

    struct Light<'a>(&'a Cell<i16>);

    impl LightSensor for Light<'_> {
        fn brightness(&mut self) -> i16 {
            self.0.get()
        }
    }

    struct Sonar<'a>(&'a Cell<i16>);

    impl DistanceSensor for Sonar<'_> {
        fn distance_cm(&mut self) -> i16 {
            self.0.get()
        }
    }

    struct Beeps<'a>(&'a Cell<u32>);

    impl Speaker for Beeps<'_> {
        fn play_tone(&mut self, _freq_hz: u16, _duration_ms: u16) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[derive(Default)]
    struct Screen(Vec<(u8, String)>);

    impl Diagnostics for Screen {
        fn write_line(&mut self, line: u8, text: &str) {
            self.0.push((line, text.into()));
        }
    }

    struct Rig {
        main: Cell<i16>,
        aux: Cell<i16>,
        dist: Cell<i16>,
        beeps: Cell<u32>,
        shares: NavShares,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                main: Cell::new(60),
                aux: Cell::new(20),
                dist: Cell::new(100),
                beeps: Cell::new(0),
                shares: NavShares::new(),
            }
        }

        fn nav(&self) -> TestNav<'_> {
            Navigation::new(
                Wheels::new(SimWheel::default(), SimWheel::default()),
                LineFollower::new(Light(&self.main), LineFollowConfig::default()),
                Light(&self.aux),
                Sonar(&self.dist),
                Beeps(&self.beeps),
                &self.shares,
                NavConfig::default(),
            )
        }
    }

    type TestNav<'a> = Navigation<'a, SimWheel, Light<'a>, Light<'a>, Sonar<'a>, Beeps<'a>>;

    fn tick(n: &mut TestNav<'_>, now: u32) -> Screen {
        let mut screen = Screen::default();
        n.step(&mut Context::new(now, &mut screen));
        screen
    }

    fn pwm(n: &TestNav<'_>) -> (i8, i8) {
        (n.wheels().right.pwm.get(), n.wheels().left.pwm.get())
    }

    #[test]
    fn waits_for_start() {
        let rig = Rig::new();
        let mut n = rig.nav();
        rig.shares.state.put(NavState::ApproachWall);
        for t in 0..20 {
            assert!(tick(&mut n, t * 20).0.is_empty());
        }
        assert_eq!(pwm(&n), (0, 0));

        rig.shares.start.put(true);
        let screen = tick(&mut n, 400);
        assert!(screen.0.contains(&(lines::NAV, "Nav Ready".into())));
        assert_eq!(n.phase(), NavState::ApproachWall);
    }

    #[test]
    fn approach_wall_slows_then_stops() {
        let rig = Rig::new();
        let mut n = rig.nav();
        rig.shares.start.put(true);
        rig.shares.state.put(NavState::ApproachWall);

        rig.dist.set(40);
        tick(&mut n, 0);
        assert_eq!(pwm(&n), (25, 25));

        // Under a centimetre out the floor still moves the robot.
        rig.dist.set(8);
        tick(&mut n, 20);
        let (r, l) = pwm(&n);
        assert!((15..=25).contains(&r) && (15..=25).contains(&l));

        rig.dist.set(7);
        tick(&mut n, 40);
        assert_eq!(pwm(&n), (0, 0));
        assert_eq!(rig.shares.state.get(), NavState::Idle);
        assert_eq!(n.phase(), NavState::Idle);
        assert_eq!(rig.beeps.get(), 1);
    }

    #[test]
    fn back_up_reverses_to_distance() {
        let rig = Rig::new();
        let mut n = rig.nav();
        rig.shares.start.put(true);
        rig.shares.state.put(NavState::BackUp);

        rig.dist.set(8);
        tick(&mut n, 0);
        assert_eq!(pwm(&n), (-20, -20));

        rig.dist.set(22);
        tick(&mut n, 20);
        let (r, _) = pwm(&n);
        assert!((-20..=-15).contains(&r));

        rig.dist.set(23);
        tick(&mut n, 40);
        assert_eq!(pwm(&n), (0, 0));
        assert_eq!(rig.shares.state.get(), NavState::Idle);
        assert_eq!(rig.beeps.get(), 1);
    }

    #[test]
    fn calibrates_while_idle_once_asked() {
        let rig = Rig::new();
        let mut n = rig.nav();
        rig.shares.start.put(true);
        for t in 0..10 {
            tick(&mut n, t * 20);
        }
        assert_eq!(pwm(&n), (0, 0));

        rig.shares.line_follow_start.put(true);
        let mut now = 200;
        while !n.follower().is_calibrated() {
            tick(&mut n, now);
            now += 20;
            assert!(now < 20_000);
        }
        assert_eq!(rig.shares.edge_brightness.get(), 60);
        assert_eq!(pwm(&n), (0, 0));
    }

    #[test]
    fn to_supply_crosses_centre_line_and_stops_at_second() {
        let rig = Rig::new();
        let mut n = rig.nav();
        rig.shares.start.put(true);
        rig.shares.state.put(NavState::ToSupply);

        // Calibrates first, then follows.
        let mut now = 0;
        while !n.follower().is_calibrated() {
            tick(&mut n, now);
            now += 20;
            assert!(now < 20_000);
        }
        tick(&mut n, now);
        assert_eq!(pwm(&n), (50, 50));
        assert_eq!(n.stage(), 0);

        rig.aux.set(150);
        tick(&mut n, now + 20);
        assert_eq!(n.stage(), 1);
        rig.aux.set(20);

        for i in 0..16 {
            tick(&mut n, now + 40 + i * 20);
            assert!(pwm(&n).0 > 0);
        }
        assert_eq!(n.stage(), 2);

        rig.main.set(40);
        let screen = tick(&mut n, now + 400);
        assert_eq!(pwm(&n), (70, 30));
        assert!(screen.0.contains(&(lines::NAV, "Color: 20".into())));

        rig.aux.set(150);
        tick(&mut n, now + 420);
        assert_eq!(pwm(&n), (0, 0));
        assert_eq!(rig.shares.state.get(), NavState::Idle);
        assert_eq!(rig.beeps.get(), 0);
    }

    #[test]
    fn reserved_phases_hold_still() {
        let rig = Rig::new();
        let mut n = rig.nav();
        rig.shares.start.put(true);
        rig.shares.state.put(NavState::TurnAround);
        for t in 0..10 {
            tick(&mut n, t * 20);
        }
        assert_eq!(pwm(&n), (0, 0));
        assert_eq!(rig.shares.state.get(), NavState::TurnAround);
    }
}
