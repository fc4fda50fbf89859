// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Arm Actuators
//!
//! Slave-side state machines, one task per actuator. Each one calibrates against a physical
//! reference when its start flag rises and then reports through its own share group.
//!
//! ## Modules
//!
//! - [`claw`] - Open/close jaws with a touch-switch reference.
//! - [`lifter`] - PI position control of the lifter with debounced arrival.
//! - [`tower`] - One-shot tower deployment.

pub mod claw;
pub mod lifter;
pub mod tower;

pub use claw::{Claw, ClawCommand, ClawShares, ClawState};
pub use lifter::{inches_to_ticks, Lifter, LifterShares, LifterState};
pub use tower::{Tower, TowerShares, TowerState};
