// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Wire identifiers shared by both nodes.
//!
//! The numeric values are part of the link format and must never change. Internal state
//! machines keep their own enums; nothing outside this module should depend on the numbers.

use core::fmt;

/// Message identifier, used as the single byte of a simple message and as the `data_id` header
/// byte of a framed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum DataId {
    #[default]
    NoMsg = 0,

    // Link bring-up
    WakeMsg = 1,
    AckMsg = 2,
    InitDone = 3,

    // Master -> Slave commands
    PrepForGrabRings = 10,
    GrabRings = 11,
    PrepForPlacement = 12,
    PlaceRings = 13,

    // Slave -> Master responses
    ReadyToGrab = 50,
    GrabbedRings = 51,
    ReadyToPlace = 52,
    PlacedRings = 53,
}

/// Payload type tag of a framed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum DataType {
    #[default]
    Unspecified = 0,
    U32 = 1,
    S32 = 2,
    Bool = 3,
    Float = 4,
    U8 = 5,
    String = 6,
}

/// A byte that does not name any known identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnknownId(pub u8);

impl fmt::Display for UnknownId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown identifier byte {}", self.0)
    }
}

impl DataId {
    #[inline]
    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

impl From<DataId> for u8 {
    fn from(id: DataId) -> u8 {
        id as u8
    }
}

impl TryFrom<u8> for DataId {
    type Error = UnknownId;

    fn try_from(b: u8) -> Result<Self, Self::Error> {
        Ok(match b {
            0 => DataId::NoMsg,
            1 => DataId::WakeMsg,
            2 => DataId::AckMsg,
            3 => DataId::InitDone,
            10 => DataId::PrepForGrabRings,
            11 => DataId::GrabRings,
            12 => DataId::PrepForPlacement,
            13 => DataId::PlaceRings,
            50 => DataId::ReadyToGrab,
            51 => DataId::GrabbedRings,
            52 => DataId::ReadyToPlace,
            53 => DataId::PlacedRings,
            _ => return Err(UnknownId(b)),
        })
    }
}

impl From<DataType> for u8 {
    fn from(t: DataType) -> u8 {
        t as u8
    }
}

impl TryFrom<u8> for DataType {
    type Error = UnknownId;

    fn try_from(b: u8) -> Result<Self, Self::Error> {
        Ok(match b {
            0 => DataType::Unspecified,
            1 => DataType::U32,
            2 => DataType::S32,
            3 => DataType::Bool,
            4 => DataType::Float,
            5 => DataType::U8,
            6 => DataType::String,
            _ => return Err(UnknownId(b)),
        })
    }
}
