// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Millisecond time base from the Cortex-M SysTick.

use core::sync::atomic::{AtomicU32, Ordering};

use cortex_m::peripheral::{syst::SystClkSource, SYST};
use cortex_m_rt::exception;

use crate::hw::{reached, Clock};

static MILLIS: AtomicU32 = AtomicU32::new(0);

pub struct SysTickClock {
    _syst: SYST,
}

impl SysTickClock {
    /// Start a 1 kHz tick from the core clock.
    pub fn start(mut syst: SYST, sysclk_hz: u32) -> Self {
        syst.set_clock_source(SystClkSource::Core);
        syst.set_reload(sysclk_hz / 1000 - 1);
        syst.clear_current();
        syst.enable_counter();
        syst.enable_interrupt();
        Self { _syst: syst }
    }
}

impl Clock for SysTickClock {
    #[inline]
    fn now_ms(&self) -> u32 {
        MILLIS.load(Ordering::Relaxed)
    }

    fn sleep_ms(&mut self, ms: u32) {
        let until = self.now_ms().wrapping_add(ms);
        while !reached(self.now_ms(), until) {
            cortex_m::asm::wfi();
        }
    }
}

#[exception]
fn SysTick() {
    MILLIS.fetch_add(1, Ordering::Relaxed);
}
