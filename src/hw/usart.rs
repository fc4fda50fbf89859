// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! USART wrappers.
//!
//! - [`Usart`] is the debug terminal. It stands in for the status display: each
//!   [`Diagnostics`] line is printed as `[n] text`.
//! - [`SerialLink`] is the byte link between the two controllers.
//!
//! To access the terminal on the host machine, connect to the debug USB port and use
//! ```text
//! $ screen /dev/tty.usbmodem* <baud_rate>
//! ```
//!
//! To close the debug terminal, press `Ctrl+A` then `Ctrl+\` then `y`.

use nb::block;

use stm32f7xx_hal::{
    prelude::*,
    serial::{self, Instance, Pins, Rx, Serial, Tx},
};

use crate::hw::Diagnostics;
use crate::protocol::{Link, LinkError};

pub struct Usart<U: Instance> {
    tx: Tx<U>,
}

impl<U: Instance> Usart<U> {
    pub fn new<PINS: Pins<U>>(serial: Serial<U, PINS>) -> Self {
        let (tx, _rx) = serial.split();
        Self { tx }
    }

    #[inline]
    pub fn write_byte(&mut self, b: u8) {
        let _ = block!(self.tx.write(b));
    }

    pub fn write_str(&mut self, s: &str) {
        for &b in s.as_bytes() {
            self.write_byte(b);
        }
    }

    /// Write string and CRLF terminator.
    #[inline]
    pub fn println(&mut self, s: &str) {
        self.write_str(s);
        self.write_str("\r\n");
    }
}

impl<U: Instance> Diagnostics for Usart<U> {
    fn write_line(&mut self, line: u8, text: &str) {
        let mut num = itoa::Buffer::new();
        self.write_byte(b'[');
        self.write_str(num.format(line));
        self.write_str("] ");
        self.println(text);
    }
}

/// Inter-node link on a full-duplex USART.
pub struct SerialLink<U: Instance> {
    tx: Tx<U>,
    rx: Rx<U>,
}

impl<U: Instance> SerialLink<U> {
    pub fn new<PINS: Pins<U>>(serial: Serial<U, PINS>) -> Self {
        let (tx, rx) = serial.split();
        Self { tx, rx }
    }
}

impl From<serial::Error> for LinkError {
    fn from(e: serial::Error) -> Self {
        #[allow(unreachable_patterns)]
        match e {
            serial::Error::Overrun => LinkError::Overrun,
            serial::Error::Framing => LinkError::Framing,
            serial::Error::Noise => LinkError::Noise,
            serial::Error::Parity => LinkError::Parity,
            _ => LinkError::Other,
        }
    }
}

impl<U: Instance> Link for SerialLink<U> {
    fn read_byte(&mut self) -> nb::Result<u8, LinkError> {
        self.rx.read().map_err(|e| e.map(LinkError::from))
    }

    fn write_byte(&mut self, byte: u8) -> nb::Result<(), LinkError> {
        self.tx.write(byte).map_err(|e| e.map(|_| LinkError::Other))
    }
}
