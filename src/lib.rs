// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Ringbot Firmware
//!
//! Firmware for a two-controller ring-stacking robot. The **master** drives the chassis and runs
//! the mission; the **slave** runs the arm (tower, lifter, claw) and answers the master's
//! commands over a serial link, one byte per message.
//!
//! Both nodes run a set of periodic tasks on a cooperative [`sched::Scheduler`]. Tasks never call
//! each other: they exchange flags and values through [`share::SharedState`] slots grouped in a
//! per-node registry ([`node::MasterShares`], [`node::SlaveShares`]).
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`share`] | Interrupt-safe shared values |
//! | [`protocol`] | Message ids, frame codec, byte link |
//! | [`sched`] | Fixed-table cooperative scheduler |
//! | [`node`] | Link task, orchestrators, navigation |
//! | [`actuators`] | Claw, lifter and tower state machines |
//! | [`control`] | PI controller, settle gates, heading correction |
//! | [`hw`] | Hardware traits, STM32F7 wrappers behind the `stm32` feature |
//! | `drivers` | Motors, switches and buzzer (`stm32` only) |
//! | [`config`] | Tuning constants |
//!
//! ## Getting Started
//!
//! Run the host tests:
//!
//! ```bash
//! cargo test
//! ```
//!
//! Flash a board:
//!
//! ```bash
//! cargo run --release --features stm32 --bin master
//! cargo run --release --features stm32 --bin slave
//! ```
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![cfg_attr(not(test), no_std)]

#[macro_use]
pub mod logging;

pub mod actuators;
pub mod config;
pub mod control;
#[cfg(feature = "stm32")]
pub mod drivers;
pub mod hw;
pub mod node;
pub mod protocol;
pub mod sched;
pub mod share;
