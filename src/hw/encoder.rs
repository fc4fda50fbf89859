// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Quadrature encoder support via STM32F7 timers in encoder mode.
//!
//! TIM2 and TIM5 count over the full 32-bit range. TIM3 and TIM4 are 16-bit; their count is
//! sign-extended, which covers about ±32k ticks from the last reset.

use stm32f7xx_hal::pac;

/// Position source for a [`Motor`](crate::hw::Motor).
pub trait QuadratureCounter {
    /// Signed position in ticks since the last reset.
    fn position(&self) -> i32;

    fn reset(&mut self);
}

pub struct Encoder<TIM> {
    tim: TIM,
}

impl<TIM> Encoder<TIM> {
    /// Consume the wrapper and return the underlying timer peripheral.
    #[inline]
    pub fn free(self) -> TIM {
        self.tim
    }
}

// Encoder mode 3 (count on both TI1 and TI2 edges), CH1/CH2 mapped to TI1/TI2, non-inverted.
macro_rules! encoder_mode {
    ($tim:expr, $arr:expr) => {{
        let tim = $tim;
        tim.cr1.modify(|_, w| w.cen().clear_bit());
        tim.arr.write(|w| unsafe { w.bits($arr) });
        tim.smcr.modify(|_, w| unsafe { w.sms().bits(0b011) });
        tim.ccmr1_input().modify(|_, w| w.cc1s().ti1().cc2s().ti2());
        tim.ccer.modify(|_, w| {
            w.cc1p()
                .clear_bit()
                .cc2p()
                .clear_bit()
                .cc1e()
                .set_bit()
                .cc2e()
                .set_bit()
        });
        tim.cnt.write(|w| unsafe { w.bits(0) });
        tim.cr1.modify(|_, w| w.cen().set_bit());
    }};
}

impl Encoder<pac::TIM2> {
    pub fn tim2(tim2: pac::TIM2) -> Self {
        encoder_mode!(&tim2, 0xFFFF_FFFF);
        Self { tim: tim2 }
    }
}

impl Encoder<pac::TIM5> {
    pub fn tim5(tim5: pac::TIM5) -> Self {
        encoder_mode!(&tim5, 0xFFFF_FFFF);
        Self { tim: tim5 }
    }
}

impl Encoder<pac::TIM3> {
    pub fn tim3(tim3: pac::TIM3) -> Self {
        encoder_mode!(&tim3, 0xFFFF);
        Self { tim: tim3 }
    }
}

impl Encoder<pac::TIM4> {
    pub fn tim4(tim4: pac::TIM4) -> Self {
        encoder_mode!(&tim4, 0xFFFF);
        Self { tim: tim4 }
    }
}

impl QuadratureCounter for Encoder<pac::TIM2> {
    #[inline]
    fn position(&self) -> i32 {
        self.tim.cnt.read().bits() as i32
    }

    #[inline]
    fn reset(&mut self) {
        self.tim.cnt.write(|w| unsafe { w.bits(0) });
    }
}

impl QuadratureCounter for Encoder<pac::TIM5> {
    #[inline]
    fn position(&self) -> i32 {
        self.tim.cnt.read().bits() as i32
    }

    #[inline]
    fn reset(&mut self) {
        self.tim.cnt.write(|w| unsafe { w.bits(0) });
    }
}

impl QuadratureCounter for Encoder<pac::TIM3> {
    #[inline]
    fn position(&self) -> i32 {
        self.tim.cnt.read().bits() as u16 as i16 as i32
    }

    #[inline]
    fn reset(&mut self) {
        self.tim.cnt.write(|w| unsafe { w.bits(0) });
    }
}

impl QuadratureCounter for Encoder<pac::TIM4> {
    #[inline]
    fn position(&self) -> i32 {
        self.tim.cnt.read().bits() as u16 as i16 as i32
    }

    #[inline]
    fn reset(&mut self) {
        self.tim.cnt.write(|w| unsafe { w.bits(0) });
    }
}
