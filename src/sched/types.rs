// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Scheduler bookkeeping types.

use core::fmt;

/// Runtime statistics for a single task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TaskStats {
    /// Completed releases
    pub runs: u32,
    /// Releases that ran longer than the period
    pub overruns: u32,
    /// Duration of the last release in milliseconds
    pub last_exec_ms: u32,
    /// Longest release observed in milliseconds
    pub max_exec_ms: u32,
}

impl TaskStats {
    pub(crate) fn record(&mut self, exec_ms: u32) {
        self.runs = self.runs.saturating_add(1);
        self.last_exec_ms = exec_ms;
        if exec_ms > self.max_exec_ms {
            self.max_exec_ms = exec_ms;
        }
    }
}

/// The task table has no free slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpawnError {
    Full,
}

impl fmt::Display for SpawnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpawnError::Full => f.write_str("task table full"),
        }
    }
}
