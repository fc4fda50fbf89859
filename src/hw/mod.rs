// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Hardware Seams
//!
//! Traits for everything the control logic touches on the robot, plus the STM32F7 wrappers
//! behind them (feature `stm32`).
//!
//! ## Modules
//!
//! - `systick` - Millisecond [`Clock`] from the Cortex-M SysTick.
//! - `usart` - Debug terminal ([`Diagnostics`]) and the inter-node serial [`Link`](crate::protocol::Link).
//! - `encoder` - Timer quadrature encoders.
//! - `adc` - Blocking ADC reads and analog sensors.

#[cfg(feature = "stm32")]
pub mod adc;
#[cfg(feature = "stm32")]
pub mod encoder;
#[cfg(feature = "stm32")]
pub mod systick;
#[cfg(feature = "stm32")]
pub mod usart;

/// Brushed motor with an integrated encoder.
///
/// Power is a signed percentage in `-100..=100`.
pub trait Motor {
    /// Stop the motor and zero the encoder.
    fn reset(&mut self);

    fn set_pwm(&mut self, power: i8);

    /// Select what zero power does: `true` shorts the windings, `false` coasts.
    fn set_brake(&mut self, brake: bool);

    /// Encoder position in ticks since the last reset.
    fn count(&self) -> i32;

    #[inline]
    fn stop(&mut self) {
        self.set_pwm(0);
    }
}

pub trait TouchSensor {
    fn is_pressed(&mut self) -> bool;
}

/// Range finder, distance in centimetres.
pub trait DistanceSensor {
    fn distance_cm(&mut self) -> i16;
}

/// Reflected-light sensor, brightness in raw sensor units.
pub trait LightSensor {
    fn brightness(&mut self) -> i16;
}

/// Millisecond time base. Wraps after ~49 days; compare with wrapping arithmetic.
pub trait Clock {
    fn now_ms(&self) -> u32;

    fn sleep_ms(&mut self, ms: u32);
}

pub trait Speaker {
    fn play_tone(&mut self, freq_hz: u16, duration_ms: u16);
}

/// Numbered-line status display. Observability only; nothing reads it back.
pub trait Diagnostics {
    fn write_line(&mut self, line: u8, text: &str);
}

/// Sink that drops every line.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDiagnostics;

impl Diagnostics for NullDiagnostics {
    fn write_line(&mut self, _line: u8, _text: &str) {}
}

impl<M: Motor + ?Sized> Motor for &mut M {
    fn reset(&mut self) {
        (**self).reset()
    }

    fn set_pwm(&mut self, power: i8) {
        (**self).set_pwm(power)
    }

    fn set_brake(&mut self, brake: bool) {
        (**self).set_brake(brake)
    }

    fn count(&self) -> i32 {
        (**self).count()
    }
}

/// Saturate a control output to the motor's power range.
#[inline]
pub fn clamp_power(power: i32) -> i8 {
    power.clamp(-100, 100) as i8
}

/// Elapsed-time check on a wrapping millisecond counter.
#[inline]
pub fn reached(now_ms: u32, deadline_ms: u32) -> bool {
    now_ms.wrapping_sub(deadline_ms) as i32 >= 0
}
