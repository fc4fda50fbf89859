// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Node Tasks
//!
//! The tasks each controller runs, and the share registries that connect them.
//!
//! | Node   | Tasks                                                  | Registry         |
//! | ------ | ------------------------------------------------------ | ---------------- |
//! | Master | [`comm`], [`master`], [`navigation`] (+ [`line_follow`]) | [`MasterShares`] |
//! | Slave  | [`comm`], [`slave`], claw, lifter, tower               | [`SlaveShares`]  |

pub mod comm;
pub mod line_follow;
pub mod master;
pub mod navigation;
pub mod slave;

pub use comm::{BootRole, Comm, CommShares, CommState, Handshake};
pub use line_follow::{LineFollower, Wheels};
pub use master::{MasterMind, MasterShares, MasterState, MissionStep, GRAB_AND_PLACE, SUPPLY_RUN};
pub use navigation::{NavShares, NavState, Navigation};
pub use slave::{SlaveMind, SlaveShares, SlaveState};

use crate::hw::Diagnostics;

/// Status display line owned by each task.
pub mod lines {
    pub const INIT: u8 = 0;
    pub const MIND: u8 = 1;
    /// Tower on the slave, navigation on the master.
    pub const TOWER: u8 = 2;
    pub const NAV: u8 = 2;
    pub const LIFTER: u8 = 3;
    /// Claw on the slave, line follower on the master.
    pub const CLAW: u8 = 4;
    pub const LINE: u8 = 4;
    pub const COMM: u8 = 5;
    pub const DEBUG: u8 = 6;
}

/// Write `label` followed by `value` on a display line.
pub(crate) fn show_value(diag: &mut dyn Diagnostics, line: u8, label: &str, value: i32) {
    let mut num = itoa::Buffer::new();
    let mut text: heapless::String<32> = heapless::String::new();
    // Parts that do not fit are dropped.
    let _ = text.push_str(label);
    let _ = text.push_str(num.format(value));
    diag.write_line(line, &text);
}
