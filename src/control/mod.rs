// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Control Algorithms
//!
//! Reusable building blocks for closed-loop motor control.
//!
//! ## Modules
//!
//! - [`pid`] - Discrete PI controller with output clamping and a minimum-power floor.
//! - [`settle`] - Debounce helpers for completion checks.
//! - [`straight`] - Heading correction for straight-line driving.

pub mod pid;
pub mod settle;
pub mod straight;

pub use pid::Pi;
pub use settle::{Consecutive, SettleGate};
pub use straight::HeadingCorrector;
