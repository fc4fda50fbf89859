// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Host-side simulation of both controllers' hardware.
//!
//! Everything is single-threaded and advanced by hand, one millisecond at a time.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use ringbot::hw::{Clock, Diagnostics, Motor, Speaker, TouchSensor};
use ringbot::protocol::{Link, LinkError};

#[derive(Clone, Default)]
pub struct SimClock(Rc<Cell<u32>>);

impl SimClock {
    pub fn advance(&self, ms: u32) {
        self.0.set(self.0.get().wrapping_add(ms));
    }
}

impl Clock for SimClock {
    fn now_ms(&self) -> u32 {
        self.0.get()
    }

    fn sleep_ms(&mut self, ms: u32) {
        self.advance(ms);
    }
}

type Wire = Rc<RefCell<VecDeque<u8>>>;

/// One end of a serial cable. Every byte written is also kept in a log, including bytes the
/// cable then loses.
pub struct SimLink {
    rx: Wire,
    tx: Wire,
    sent: Rc<RefCell<Vec<u8>>>,
    lose: Vec<u8>,
}

pub fn link_pair() -> (SimLink, SimLink) {
    let a: Wire = Rc::default();
    let b: Wire = Rc::default();
    (
        SimLink {
            rx: a.clone(),
            tx: b.clone(),
            sent: Rc::default(),
            lose: Vec::new(),
        },
        SimLink {
            rx: b,
            tx: a,
            sent: Rc::default(),
            lose: Vec::new(),
        },
    )
}

impl SimLink {
    /// Handle on everything this end has written so far.
    pub fn sent_log(&self) -> Rc<RefCell<Vec<u8>>> {
        self.sent.clone()
    }

    /// Lose the next `byte` this end writes. Call once per byte to lose.
    pub fn lose_next(&mut self, byte: u8) {
        self.lose.push(byte);
    }
}

impl Link for SimLink {
    fn read_byte(&mut self) -> nb::Result<u8, LinkError> {
        self.rx.borrow_mut().pop_front().ok_or(nb::Error::WouldBlock)
    }

    fn write_byte(&mut self, byte: u8) -> nb::Result<(), LinkError> {
        self.sent.borrow_mut().push(byte);
        if let Some(i) = self.lose.iter().position(|&b| b == byte) {
            self.lose.remove(i);
        } else {
            self.tx.borrow_mut().push_back(byte);
        }
        Ok(())
    }
}

/// A motor-driven axis. Speed is proportional to power above a stiction threshold. On a
/// vertical axis gravity overcomes stiction on the way down.
#[derive(Debug, Clone, Copy)]
pub struct Joint {
    pub pos: f32,
    pub pwm: i8,
    zero: f32,
    gain: f32,
    stiction: f32,
    gravity: bool,
    min: f32,
    max: f32,
}

impl Joint {
    pub fn new(start: f32, gain: f32, stiction: f32, min: f32, max: f32) -> Self {
        Self {
            pos: start,
            pwm: 0,
            zero: start,
            gain,
            stiction,
            gravity: false,
            min,
            max,
        }
    }

    pub fn with_gravity(mut self) -> Self {
        self.gravity = true;
        self
    }

    pub fn step(&mut self, ms: u32) {
        let p = self.pwm as f32;
        let stiction = if self.gravity && p < 0.0 {
            0.0
        } else {
            self.stiction
        };
        let effective = (p.abs() - stiction).max(0.0) * p.signum();
        self.pos = (self.pos + effective * self.gain * ms as f32).clamp(self.min, self.max);
    }

    pub fn count(&self) -> i32 {
        (self.pos - self.zero).round() as i32
    }
}

pub type JointRef = Rc<RefCell<Joint>>;

pub struct SimMotor(JointRef);

impl Motor for SimMotor {
    fn reset(&mut self) {
        let mut j = self.0.borrow_mut();
        j.pwm = 0;
        j.zero = j.pos;
    }

    fn set_pwm(&mut self, power: i8) {
        self.0.borrow_mut().pwm = power.clamp(-100, 100);
    }

    fn set_brake(&mut self, _brake: bool) {}

    fn count(&self) -> i32 {
        self.0.borrow().count()
    }
}

pub struct SimSwitch {
    joint: JointRef,
    pressed: fn(&Joint) -> bool,
}

impl TouchSensor for SimSwitch {
    fn is_pressed(&mut self) -> bool {
        (self.pressed)(&self.joint.borrow())
    }
}

/// The slave's arm: tower, lifter and claw.
pub struct Arm {
    pub tower: JointRef,
    pub lifter: JointRef,
    pub claw: JointRef,
}

impl Arm {
    pub fn new() -> Self {
        Self {
            tower: Rc::new(RefCell::new(Joint::new(0.0, 0.01, 0.0, 0.0, 200.0))),
            // Starts resting on the base switch.
            lifter: Rc::new(RefCell::new(Joint::new(-100.0, 0.04, 15.0, -600.0, 6500.0).with_gravity())),
            claw: Rc::new(RefCell::new(Joint::new(20.0, 0.01, 0.0, 0.0, 60.0))),
        }
    }

    pub fn step(&self, ms: u32) {
        self.tower.borrow_mut().step(ms);
        self.lifter.borrow_mut().step(ms);
        self.claw.borrow_mut().step(ms);
    }

    pub fn tower_motor(&self) -> SimMotor {
        SimMotor(self.tower.clone())
    }

    pub fn lifter_motor(&self) -> SimMotor {
        SimMotor(self.lifter.clone())
    }

    pub fn claw_motor(&self) -> SimMotor {
        SimMotor(self.claw.clone())
    }

    pub fn base_switch(&self) -> SimSwitch {
        SimSwitch {
            joint: self.lifter.clone(),
            pressed: |j| j.pos <= 0.0,
        }
    }

    /// Pressed by the jaws closing on rings, and by the cam while swinging open past the stop.
    pub fn claw_switch(&self) -> SimSwitch {
        SimSwitch {
            joint: self.claw.clone(),
            pressed: |j| j.pos <= 5.0 || (j.pwm > 0 && (45.0..=55.0).contains(&j.pos)),
        }
    }

    pub fn lifter_count(&self) -> i32 {
        self.lifter.borrow().count()
    }

    pub fn claw_pos(&self) -> f32 {
        self.claw.borrow().pos
    }
}

/// Status display that keeps every line written.
#[derive(Clone, Default)]
pub struct Screen(Rc<RefCell<Vec<(u8, String)>>>);

impl Screen {
    pub fn has(&self, line: u8, text: &str) -> bool {
        self.0.borrow().iter().any(|(l, t)| *l == line && t == text)
    }
}

impl Diagnostics for Screen {
    fn write_line(&mut self, line: u8, text: &str) {
        self.0.borrow_mut().push((line, text.to_owned()));
    }
}

/// Speaker that records `(freq_hz, duration_ms)` per tone.
#[derive(Clone, Default)]
pub struct Tones(Rc<RefCell<Vec<(u16, u16)>>>);

impl Tones {
    pub fn played(&self) -> Vec<(u16, u16)> {
        self.0.borrow().clone()
    }
}

impl Speaker for Tones {
    fn play_tone(&mut self, freq_hz: u16, duration_ms: u16) {
        self.0.borrow_mut().push((freq_hz, duration_ms));
    }
}
