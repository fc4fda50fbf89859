// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Debounce helpers for completion checks.
//!
//! Shared "arrived" flags lag the command that invalidates them by up to one period of the
//! actuator task. Both helpers here make a consumer wait long enough that a stale `true` is
//! never taken for arrival.

/// Refuses the first `skip` polls after a reset, then passes every poll.
#[derive(Debug, Clone, Copy)]
pub struct SettleGate {
    skip: u8,
    polls: u8,
}

impl SettleGate {
    pub const fn new(skip: u8) -> Self {
        Self { skip, polls: 0 }
    }

    /// Count one poll; `true` once `skip` polls have been refused.
    pub fn ready(&mut self) -> bool {
        if self.polls >= self.skip {
            true
        } else {
            self.polls += 1;
            false
        }
    }

    pub fn reset(&mut self) {
        self.polls = 0;
    }
}

/// Asserts only after `required` consecutive `true` samples.
#[derive(Debug, Clone, Copy)]
pub struct Consecutive {
    required: u8,
    run: u8,
}

impl Consecutive {
    pub const fn new(required: u8) -> Self {
        Self { required, run: 0 }
    }

    /// Feed one sample. A `false` sample restarts the count.
    pub fn sample(&mut self, ok: bool) -> bool {
        if ok {
            self.run = self.run.saturating_add(1);
        } else {
            self.run = 0;
        }
        self.run >= self.required
    }

    pub fn reset(&mut self) {
        self.run = 0;
    }
}
