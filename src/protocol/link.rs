// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Byte transport between the two nodes.
//!
//! Implementations follow the `nb` convention of the serial peripherals: `WouldBlock` means
//! "nothing to read" or "transmitter busy", never an error.

use core::fmt;

/// Receive or transmit fault reported by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    Overrun,
    Framing,
    Noise,
    Parity,
    Other,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LinkError::Overrun => "receive overrun",
            LinkError::Framing => "framing error",
            LinkError::Noise => "line noise",
            LinkError::Parity => "parity error",
            LinkError::Other => "link fault",
        };
        f.write_str(s)
    }
}

/// Point-to-point byte channel.
pub trait Link {
    /// Try to read one byte.
    fn read_byte(&mut self) -> nb::Result<u8, LinkError>;

    /// Try to queue one byte for transmission.
    fn write_byte(&mut self, byte: u8) -> nb::Result<(), LinkError>;

    /// Write as many bytes of `buf` as the transport accepts, blocking on a busy transmitter.
    ///
    /// Returns the number of bytes written; a transport fault ends the write early. There is
    /// no retry.
    fn write(&mut self, buf: &[u8]) -> usize {
        let mut n = 0;
        for &b in buf {
            if nb::block!(self.write_byte(b)).is_err() {
                break;
            }
            n += 1;
        }
        n
    }

    /// Read whatever is already available, up to `buf.len()` bytes. Never blocks.
    ///
    /// Returns the number of bytes read. Receive faults are logged and end the read.
    fn read(&mut self, buf: &mut [u8]) -> usize {
        let mut n = 0;
        while n < buf.len() {
            match self.read_byte() {
                Ok(b) => {
                    buf[n] = b;
                    n += 1;
                }
                Err(nb::Error::WouldBlock) => break,
                Err(nb::Error::Other(e)) => {
                    crate::log_warn!("link read: {:?}", e);
                    break;
                }
            }
        }
        n
    }
}

impl<L: Link + ?Sized> Link for &mut L {
    fn read_byte(&mut self) -> nb::Result<u8, LinkError> {
        (**self).read_byte()
    }

    fn write_byte(&mut self, byte: u8) -> nb::Result<(), LinkError> {
        (**self).write_byte(byte)
    }
}
