// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Blocking ADC1 reads and the analog sensors built on them.
//!
//! Several sensors share one converter, so the [`Adc`] lives in a `RefCell` and each
//! [`AnalogSensor`] borrows it only for the duration of a conversion.
//!
//! ```ignore
//! let adc = RefCell::new(Adc::adc1(dp.ADC1));
//! let mut floor = AnalogSensor::new(&adc, 3, light_level);
//! let b = floor.brightness();
//! ```

use core::cell::RefCell;

use stm32f7xx_hal::pac;

use crate::hw::{DistanceSensor, LightSensor};

pub struct Adc<ADC> {
    adc: ADC,
}

impl<ADC> Adc<ADC> {
    #[inline]
    pub fn free(self) -> ADC {
        self.adc
    }
}

impl Adc<pac::ADC1> {
    /// Power up ADC1: 12-bit, right-aligned, software trigger, PCLK2 / 4.
    pub fn adc1(adc1: pac::ADC1) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb2enr.modify(|_, w| w.adc1en().set_bit());

        let common = unsafe { &*pac::ADC_COMMON::ptr() };
        common.ccr.modify(|_, w| w.adcpre().div4());

        adc1.cr2.modify(|_, w| w.adon().clear_bit());
        adc1.cr1.modify(|_, w| w.res().bits(0b00));
        adc1.cr2.modify(|_, w| {
            w.cont().clear_bit();
            w.align().right();
            w.exten().disabled();
            w
        });
        // Longest sample time on every channel; the sensors are high impedance.
        adc1.smpr2.write(|w| unsafe { w.bits(0x3FFF_FFFF) });
        adc1.smpr1.write(|w| unsafe { w.bits(0x07FF_FFFF) });
        adc1.cr2.modify(|_, w| w.adon().set_bit());

        Self { adc: adc1 }
    }

    /// One conversion on `channel`, 0..=4095.
    pub fn read(&mut self, channel: u8) -> u16 {
        let adc = &self.adc;
        adc.sqr1.modify(|_, w| w.l().bits(0));
        adc.sqr3.modify(|_, w| unsafe { w.sq1().bits(channel & 0x1F) });
        adc.cr2.modify(|_, w| w.swstart().set_bit());
        while adc.sr.read().eoc().bit_is_clear() {}
        adc.dr.read().data().bits()
    }
}

/// Reflected light as 0..=255.
pub fn light_level(raw: u16) -> i16 {
    (raw >> 4) as i16
}

/// MaxBotix analog output at 3.3 V: one inch per 8 counts.
pub fn maxbotix_cm(raw: u16) -> i16 {
    (raw as u32 * 254 / 800) as i16
}

/// One ADC channel with its conversion to sensor units.
pub struct AnalogSensor<'a> {
    adc: &'a RefCell<Adc<pac::ADC1>>,
    channel: u8,
    convert: fn(u16) -> i16,
}

impl<'a> AnalogSensor<'a> {
    pub fn new(adc: &'a RefCell<Adc<pac::ADC1>>, channel: u8, convert: fn(u16) -> i16) -> Self {
        Self {
            adc,
            channel,
            convert,
        }
    }

    pub fn sample(&mut self) -> i16 {
        let raw = self.adc.borrow_mut().read(self.channel);
        (self.convert)(raw)
    }
}

impl LightSensor for AnalogSensor<'_> {
    fn brightness(&mut self) -> i16 {
        self.sample()
    }
}

impl DistanceSensor for AnalogSensor<'_> {
    fn distance_cm(&mut self) -> i16 {
        self.sample()
    }
}
