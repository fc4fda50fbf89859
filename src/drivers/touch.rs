// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Limit and bump switches on a GPIO input.

use embedded_hal::digital::v2::InputPin;

use crate::hw::TouchSensor;

pub struct TouchSwitch<P> {
    pin: P,
    active_low: bool,
}

impl<P: InputPin> TouchSwitch<P> {
    /// Switch to ground with a pull-up: pressed reads low.
    pub fn active_low(pin: P) -> Self {
        Self {
            pin,
            active_low: true,
        }
    }

    pub fn active_high(pin: P) -> Self {
        Self {
            pin,
            active_low: false,
        }
    }

    pub fn free(self) -> P {
        self.pin
    }
}

impl<P: InputPin> TouchSensor for TouchSwitch<P> {
    fn is_pressed(&mut self) -> bool {
        // A pin that cannot be read counts as released.
        let level = if self.active_low {
            self.pin.is_low()
        } else {
            self.pin.is_high()
        };
        level.unwrap_or(false)
    }
}
