// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Inter-Node Protocol
//!
//! - [`messages`] - Wire identifiers ([`DataId`], [`DataType`]).
//! - [`message`] - Framed and single-byte message codec.
//! - [`link`] - Byte transport contract.

pub mod link;
pub mod message;
pub mod messages;

pub use link::{Link, LinkError};
pub use message::{CapacityError, Frame, FrameError, Message};
pub use messages::{DataId, DataType, UnknownId};
