// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Device-Specific Drivers
//!
//! Devices that sit above the raw `hw/` layer and implement its traits for the node tasks.
//!
//! - [`dc_motor`] – brushed motor on a two-input H-bridge with a quadrature encoder
//! - [`touch`] – GPIO limit and bump switches
//! - [`buzzer`] – bit-banged piezo

pub mod buzzer;
pub mod dc_motor;
pub mod touch;

pub use buzzer::Buzzer;
pub use dc_motor::DcMotor;
pub use touch::TouchSwitch;
