// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Piezo buzzer on a GPIO output, bit-banged.
//!
//! Tones block the calling task for their whole duration.

use embedded_hal::digital::v2::OutputPin;

use crate::hw::Speaker;

pub struct Buzzer<P> {
    pin: P,
    sysclk_hz: u32,
}

impl<P: OutputPin> Buzzer<P> {
    pub fn new(mut pin: P, sysclk_hz: u32) -> Self {
        let _ = pin.set_low();
        Self { pin, sysclk_hz }
    }
}

impl<P: OutputPin> Speaker for Buzzer<P> {
    fn play_tone(&mut self, freq_hz: u16, duration_ms: u16) {
        if freq_hz == 0 {
            return;
        }
        let half_period = self.sysclk_hz / (2 * freq_hz as u32);
        let edges = 2 * freq_hz as u32 * duration_ms as u32 / 1000;
        for i in 0..edges {
            let _ = if i % 2 == 0 {
                self.pin.set_high()
            } else {
                self.pin.set_low()
            };
            cortex_m::asm::delay(half_period);
        }
        let _ = self.pin.set_low();
    }
}
