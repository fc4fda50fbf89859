// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Inter-node message codec.
//!
//! Two tiers share one [`Message`] instance:
//!
//! - **Framed**: `[datatype][length][data_id][payload; length]`, one byte per header field.
//! - **Simple**: a single byte holding a [`DataId`]. This is what the nodes actually exchange.
//!
//! Frame layout:
//!
//! ```text
//!   0          1         2          3 ..
//! +----------+--------+---------+-----------------+
//! | datatype | length | data_id | payload[length] |
//! +----------+--------+---------+-----------------+
//! ```
//!
//! A `Message` is owned by exactly one task and is not meant to be shared.

use core::fmt;

use heapless::Vec;

use crate::protocol::link::Link;
use crate::protocol::messages::{DataId, DataType, UnknownId};

/// Header size in bytes.
pub const HEADER_LEN: usize = 3;

/// Buffer size used by [`Message::new`].
pub const DEFAULT_CAPACITY: usize = 15;

/// Largest buffer a [`Message`] can be configured with.
pub const MAX_CAPACITY: usize = 64;

/// Largest payload any frame can carry.
pub const MAX_PAYLOAD: usize = MAX_CAPACITY - HEADER_LEN;

/// Requested capacity cannot hold a header or exceeds [`MAX_CAPACITY`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CapacityError(pub usize);

impl fmt::Display for CapacityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "capacity {} outside {}..={}",
            self.0, HEADER_LEN, MAX_CAPACITY
        )
    }
}

/// Why the buffer could not be decoded as a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// `datatype` header byte is not a [`DataType`].
    DataType(u8),
    /// `data_id` header byte is not a [`DataId`].
    DataId(u8),
    /// `length` header byte does not fit the buffer.
    Length(u8),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::DataType(b) => write!(f, "unknown datatype {}", b),
            FrameError::DataId(b) => write!(f, "unknown data id {}", b),
            FrameError::Length(n) => write!(f, "payload length {} exceeds buffer", n),
        }
    }
}

/// A decoded frame with its own copy of the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub data_type: DataType,
    pub data_id: DataId,
    pub payload: Vec<u8, MAX_PAYLOAD>,
}

impl Frame {
    #[inline]
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

/// Fixed-capacity message buffer plus the simple-message memory.
pub struct Message {
    buf: [u8; MAX_CAPACITY],
    capacity: usize,
    /// Bytes of the complete frame currently held, 0 when none.
    frame_len: usize,
    /// Last id received through the simple protocol.
    last_simple: DataId,
}

impl Default for Message {
    fn default() -> Self {
        Self::new()
    }
}

impl Message {
    /// Message with the default 15-byte buffer.
    pub const fn new() -> Self {
        Self {
            buf: [0; MAX_CAPACITY],
            capacity: DEFAULT_CAPACITY,
            frame_len: 0,
            last_simple: DataId::NoMsg,
        }
    }

    /// Message with a `capacity`-byte buffer, header included.
    pub fn with_capacity(capacity: usize) -> Result<Self, CapacityError> {
        if !(HEADER_LEN..=MAX_CAPACITY).contains(&capacity) {
            return Err(CapacityError(capacity));
        }
        Ok(Self {
            capacity,
            ..Self::new()
        })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Largest payload this buffer accepts.
    #[inline]
    pub fn max_payload(&self) -> usize {
        self.capacity - HEADER_LEN
    }

    // ================================================================
    // Framed protocol
    // ================================================================

    /// Serialise a frame into the buffer.
    ///
    /// `length` is clamped to both the buffer and `payload.len()`. Returns the number of bytes
    /// now held (`length + 3`).
    pub fn build(
        &mut self,
        payload: &[u8],
        data_type: DataType,
        data_id: DataId,
        length: usize,
    ) -> usize {
        let n = length.min(self.max_payload()).min(payload.len());

        self.clear_buffer();
        self.buf[0] = data_type.into();
        self.buf[1] = n as u8;
        self.buf[2] = data_id.into();
        self.buf[HEADER_LEN..HEADER_LEN + n].copy_from_slice(&payload[..n]);

        self.frame_len = HEADER_LEN + n;
        self.frame_len
    }

    /// Parse the buffer into a [`Frame`].
    pub fn decode(&self) -> Result<Frame, FrameError> {
        let data_type = DataType::try_from(self.buf[0]).map_err(|UnknownId(b)| FrameError::DataType(b))?;
        let length = self.buf[1];
        let data_id = DataId::try_from(self.buf[2]).map_err(|UnknownId(b)| FrameError::DataId(b))?;

        let n = length as usize;
        if n > self.max_payload() {
            return Err(FrameError::Length(length));
        }

        let mut payload = Vec::new();
        // n <= MAX_PAYLOAD, checked above
        let _ = payload.extend_from_slice(&self.buf[HEADER_LEN..HEADER_LEN + n]);

        Ok(Frame {
            data_type,
            data_id,
            payload,
        })
    }

    /// Transmit the frame currently held. Returns the transport's byte count.
    pub fn send<L: Link>(&self, link: &mut L) -> usize {
        let n = link.write(&self.buf[..self.frame_len]);
        if n != self.frame_len {
            crate::log_warn!("short frame write: {} of {}", n, self.frame_len);
        }
        n
    }

    /// Receive one frame without blocking: a 3-byte header, then the declared payload.
    ///
    /// Returns the number of bytes read. The buffer only counts as holding a frame when all of
    /// it arrived; a partial frame is dropped.
    pub fn receive<L: Link>(&mut self, link: &mut L) -> usize {
        self.clear_buffer();

        let got = link.read(&mut self.buf[..HEADER_LEN]);
        if got < HEADER_LEN {
            if got > 0 {
                crate::log_warn!("partial frame header: {} bytes", got);
            }
            return got;
        }

        let want = (self.buf[1] as usize).min(self.max_payload());
        let body = link.read(&mut self.buf[HEADER_LEN..HEADER_LEN + want]);
        if body == want {
            self.frame_len = HEADER_LEN + want;
        } else {
            crate::log_warn!("partial frame payload: {} of {}", body, want);
        }
        got + body
    }

    /// Read up to `n` raw bytes into the buffer without interpreting them.
    pub fn receive_raw<L: Link>(&mut self, link: &mut L, n: usize) -> usize {
        self.clear_buffer();
        let n = n.min(self.capacity);
        link.read(&mut self.buf[..n])
    }

    /// True when no complete frame has been built or received since the last clear.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frame_len == 0
    }

    /// Raw view of the frame held, header included.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.frame_len]
    }

    /// Zero the buffer and forget the frame.
    pub fn clear(&mut self) {
        self.clear_buffer();
    }

    fn clear_buffer(&mut self) {
        self.buf[..self.capacity].fill(0);
        self.frame_len = 0;
    }

    // ================================================================
    // Simple protocol
    // ================================================================

    /// Transmit `id` as a single byte. Returns the transport's byte count.
    pub fn send_simple<L: Link>(&mut self, link: &mut L, id: DataId) -> usize {
        let n = link.write(&[id.as_byte()]);
        crate::log_debug!("simple tx {:?} ({} byte)", id, n);
        n
    }

    /// Poll for one inbound byte. Returns the id when one arrived this call.
    ///
    /// A received id replaces the remembered one. Bytes that are not a known id are dropped.
    pub fn try_get_simple<L: Link>(&mut self, link: &mut L) -> Option<DataId> {
        let mut b = [0u8; 1];
        if link.read(&mut b) == 0 {
            return None;
        }
        match DataId::try_from(b[0]) {
            Ok(DataId::NoMsg) => None,
            Ok(id) => {
                self.last_simple = id;
                Some(id)
            }
            Err(e) => {
                crate::log_warn!("dropping byte: {}", e.0);
                None
            }
        }
    }

    /// Poll for one inbound byte and return the remembered id, new or not.
    ///
    /// With nothing new on the link, repeated calls keep returning the same previously received
    /// id ([`DataId::NoMsg`] if nothing ever arrived).
    pub fn get_simple<L: Link>(&mut self, link: &mut L) -> DataId {
        let _ = self.try_get_simple(link);
        self.last_simple
    }

    /// True while no id is remembered.
    #[inline]
    pub fn is_empty_simple(&self) -> bool {
        self.last_simple == DataId::NoMsg
    }

    /// Remembered id.
    #[inline]
    pub fn last_simple(&self) -> DataId {
        self.last_simple
    }

    /// Forget the remembered id.
    #[inline]
    pub fn clear_simple(&mut self) {
        self.last_simple = DataId::NoMsg;
    }
}
