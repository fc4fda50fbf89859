// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Cooperative Scheduler
//!
//! Every behaviour on a node is a [`Task`] with a fixed period. The [`Scheduler`] runs them
//! round-robin on one stack: a task is released once its period has elapsed since its last
//! start, runs to completion, and hands the CPU back.
//!
//! A task that runs longer than its period is an **overrun**: its next release is clamped to
//! "now" rather than going negative, the overrun is counted in its [`TaskStats`], and a warning
//! is logged. Overruns are never fatal.
//!
//! ```ignore
//! let mut sched: Scheduler<'_, 4> = Scheduler::new(&mut display);
//! sched.spawn(&mut comm)?;
//! sched.spawn(&mut mind)?;
//! sched.run(&mut clock);
//! ```

mod types;

pub use types::{SpawnError, TaskStats};

use heapless::Vec;

use crate::hw::{reached, Clock, Diagnostics};

/// Per-release view handed to a task.
pub struct Context<'a> {
    /// Release time in milliseconds.
    pub now_ms: u32,
    /// Status display.
    pub diag: &'a mut dyn Diagnostics,
}

impl<'a> Context<'a> {
    pub fn new(now_ms: u32, diag: &'a mut dyn Diagnostics) -> Self {
        Self { now_ms, diag }
    }
}

/// A periodic behaviour. `run` must return promptly; waiting is expressed as state.
pub trait Task {
    fn name(&self) -> &'static str;

    fn period_ms(&self) -> u32;

    fn run(&mut self, cx: &mut Context<'_>);
}

struct Slot<'a> {
    task: &'a mut dyn Task,
    /// `None` until the first release.
    next_release_ms: Option<u32>,
    stats: TaskStats,
}

/// Round-robin executor for up to `N` tasks.
pub struct Scheduler<'a, const N: usize> {
    slots: Vec<Slot<'a>, N>,
    diag: &'a mut dyn Diagnostics,
}

impl<'a, const N: usize> Scheduler<'a, N> {
    pub fn new(diag: &'a mut dyn Diagnostics) -> Self {
        Self {
            slots: Vec::new(),
            diag,
        }
    }

    /// Register a task. It is first released on the next [`poll`](Self::poll).
    pub fn spawn(&mut self, task: &'a mut dyn Task) -> Result<(), SpawnError> {
        let name = task.name();
        self.slots
            .push(Slot {
                task,
                next_release_ms: None,
                stats: TaskStats::default(),
            })
            .map_err(|_| SpawnError::Full)?;
        crate::log_info!("spawned task {}", name);
        Ok(())
    }

    /// Run every task that is due, in spawn order. Returns milliseconds until the next release.
    pub fn poll<C: Clock + ?Sized>(&mut self, clock: &C) -> u32 {
        for slot in self.slots.iter_mut() {
            let start = clock.now_ms();
            if let Some(release) = slot.next_release_ms {
                if !reached(start, release) {
                    continue;
                }
            }

            let mut cx = Context::new(start, &mut *self.diag);
            slot.task.run(&mut cx);

            let end = clock.now_ms();
            let period = slot.task.period_ms().max(1);
            let exec = end.wrapping_sub(start);

            let mut next = start.wrapping_add(period);
            if exec > period {
                next = end;
                slot.stats.overruns = slot.stats.overruns.saturating_add(1);
                crate::log_warn!(
                    "task {} overran: {} ms of {} ms",
                    slot.task.name(),
                    exec,
                    period
                );
            }
            slot.next_release_ms = Some(next);
            slot.stats.record(exec);
        }

        let now = clock.now_ms();
        self.slots
            .iter()
            .map(|s| match s.next_release_ms {
                Some(t) if !reached(now, t) => t.wrapping_sub(now),
                _ => 0,
            })
            .min()
            .unwrap_or(0)
    }

    /// Hand the CPU to the tasks forever.
    pub fn run<C: Clock>(mut self, clock: &mut C) -> ! {
        loop {
            let wait = self.poll(clock);
            if wait > 0 {
                clock.sleep_ms(wait);
            }
        }
    }

    /// Statistics of the task spawned `index`-th.
    pub fn stats(&self, index: usize) -> Option<TaskStats> {
        self.slots.get(index).map(|s| s.stats)
    }

    /// Overruns summed over all tasks.
    pub fn total_overruns(&self) -> u32 {
        self.slots.iter().map(|s| s.stats.overruns).sum()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
