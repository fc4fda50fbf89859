// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Master controller: link initiator, mission orchestrator and navigation.

#![no_main]
#![no_std]

use core::cell::RefCell;

use cortex_m_rt::entry;
use panic_halt as _;

#[cfg(feature = "defmt")]
use defmt_rtt as _;

use hal::{
    pac,
    prelude::*,
    serial::{Config, Serial},
    timer::{Channel1, Channel2, Channel3, Channel4},
};
use stm32f7xx_hal as hal;

use ringbot::config::{CommConfig, LineFollowConfig, MasterConfig, NavConfig};
use ringbot::drivers::{Buzzer, DcMotor};
use ringbot::hw::adc::{light_level, maxbotix_cm, Adc, AnalogSensor};
use ringbot::hw::encoder::Encoder;
use ringbot::hw::systick::SysTickClock;
use ringbot::hw::usart::{SerialLink, Usart};
use ringbot::hw::Diagnostics;
use ringbot::node::{
    lines, BootRole, Comm, LineFollower, MasterMind, MasterShares, Navigation, Wheels, SUPPLY_RUN,
};
use ringbot::sched::Scheduler;

static SHARES: MasterShares = MasterShares::new();

#[entry]
fn main() -> ! {
    // Peripherals
    let dp = pac::Peripherals::take().unwrap();
    let cp = cortex_m::Peripherals::take().unwrap();

    // Clocks
    let rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.sysclk(216.MHz()).freeze();
    let sysclk_hz = clocks.sysclk().raw();
    let mut clock = SysTickClock::start(cp.SYST, sysclk_hz);

    // GPIO
    let gpioa = dp.GPIOA.split();
    let gpiob = dp.GPIOB.split();
    let gpioc = dp.GPIOC.split();
    let gpiod = dp.GPIOD.split();
    let gpiog = dp.GPIOG.split();

    let usart_cfg = Config {
        baud_rate: 115_200.bps(),
        ..Default::default()
    };

    // USART3 (DBG)
    let tx = gpiod.pd8.into_alternate::<7>();
    let rx = gpiod.pd9.into_alternate::<7>();
    let mut screen = Usart::new(Serial::new(dp.USART3, (tx, rx), &clocks, usart_cfg));
    screen.write_line(lines::INIT, "Master Init");

    // USART2 (link to slave)
    let tx = gpiod.pd5.into_alternate::<7>();
    let rx = gpiod.pd6.into_alternate::<7>();
    let link = SerialLink::new(Serial::new(dp.USART2, (tx, rx), &clocks, usart_cfg));

    // Encoders: TIM2 right wheel, TIM3 left wheel
    let _ = gpioa.pa15.into_alternate::<1>();
    let _ = gpiob.pb3.into_alternate::<1>();
    let _ = gpioa.pa6.into_alternate::<2>();
    let _ = gpioa.pa7.into_alternate::<2>();
    let right_enc = Encoder::tim2(dp.TIM2);
    let left_enc = Encoder::tim3(dp.TIM3);

    // H-bridge PWM on TIM4
    let (r_in1, r_in2, l_in1, l_in2) = dp
        .TIM4
        .pwm_hz(
            (
                Channel1::new(gpiod.pd12),
                Channel2::new(gpiod.pd13),
                Channel3::new(gpiod.pd14),
                Channel4::new(gpiod.pd15),
            ),
            20.kHz(),
            &clocks,
        )
        .split();

    // The left wheel is mounted mirrored.
    let wheels = Wheels::new(
        DcMotor::new(r_in1, r_in2, right_enc),
        DcMotor::new(l_in1, l_in2, left_enc).reversed(),
    );

    // ADC1: floor light PA3 (IN3), aux light PC0 (IN10), range finder PC3 (IN13)
    let _ = gpioa.pa3.into_analog();
    let _ = gpioc.pc0.into_analog();
    let _ = gpioc.pc3.into_analog();
    let adc = RefCell::new(Adc::adc1(dp.ADC1));
    let floor = AnalogSensor::new(&adc, 3, light_level);
    let aux = AnalogSensor::new(&adc, 10, light_level);
    let sonar = AnalogSensor::new(&adc, 13, maxbotix_cm);

    // Piezos: PG0 for the mind's fault tone, PG1 for navigation.
    let mind_buzzer = Buzzer::new(gpiog.pg0.into_push_pull_output(), sysclk_hz);
    let nav_buzzer = Buzzer::new(gpiog.pg1.into_push_pull_output(), sysclk_hz);

    critical_section::with(|cs| SHARES.reset_from_interrupt(cs));

    // Tasks
    let mut comm = Comm::new(
        link,
        BootRole::Initiator,
        &SHARES.comm,
        CommConfig::default(),
    );
    let mut mind = MasterMind::new(
        &SHARES,
        SUPPLY_RUN,
        mind_buzzer,
        MasterConfig::default(),
    );
    let mut nav = Navigation::new(
        wheels,
        LineFollower::new(floor, LineFollowConfig::default()),
        aux,
        sonar,
        nav_buzzer,
        &SHARES.nav,
        NavConfig::default(),
    );

    let mut sched: Scheduler<'_, 3> = Scheduler::new(&mut screen);
    sched.spawn(&mut comm).unwrap();
    sched.spawn(&mut mind).unwrap();
    sched.spawn(&mut nav).unwrap();

    sched.run(&mut clock)
}
