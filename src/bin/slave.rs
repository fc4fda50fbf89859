// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Slave controller: link responder, arm orchestrator, tower, lifter and claw.

#![no_main]
#![no_std]

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

use ringbot::actuators::{Claw, Lifter, Tower};
use ringbot::config::{ClawConfig, CommConfig, LifterConfig, SlaveConfig, TowerConfig};
use ringbot::drivers::{Buzzer, DcMotor, TouchSwitch};
use ringbot::hw::encoder::Encoder;
use ringbot::hw::systick::SysTickClock;
use ringbot::hw::usart::{SerialLink, Usart};
use ringbot::hw::Diagnostics;
use ringbot::node::{lines, BootRole, Comm, SlaveMind, SlaveShares};
use ringbot::sched::Scheduler;

static SHARES: SlaveShares = SlaveShares::new();

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
    let gpiod = dp.GPIOD.split();
    let gpioe = dp.GPIOE.split();
    let gpiof = dp.GPIOF.split();
    let gpiog = dp.GPIOG.split();

    let usart_cfg = Config {
        baud_rate: 115_200.bps(),
        ..Default::default()
    };

    // USART3 (DBG)
    let tx = gpiod.pd8.into_alternate::<7>();
    let rx = gpiod.pd9.into_alternate::<7>();
    let mut screen = Usart::new(Serial::new(dp.USART3, (tx, rx), &clocks, usart_cfg));
    screen.write_line(lines::INIT, "Slave Init");

    // USART2 (link to master)
    let tx = gpiod.pd5.into_alternate::<7>();
    let rx = gpiod.pd6.into_alternate::<7>();
    let link = SerialLink::new(Serial::new(dp.USART2, (tx, rx), &clocks, usart_cfg));

    // Encoders: TIM2 tower, TIM3 lifter, TIM5 claw
    let _ = gpioa.pa15.into_alternate::<1>();
    let _ = gpiob.pb3.into_alternate::<1>();
    let _ = gpioa.pa6.into_alternate::<2>();
    let _ = gpioa.pa7.into_alternate::<2>();
    let _ = gpioa.pa0.into_alternate::<2>();
    let _ = gpioa.pa1.into_alternate::<2>();
    let tower_enc = Encoder::tim2(dp.TIM2);
    let lifter_enc = Encoder::tim3(dp.TIM3);
    let claw_enc = Encoder::tim5(dp.TIM5);

    // H-bridge PWM: TIM4 tower + lifter, TIM1 claw
    let (tower_in1, tower_in2, lifter_in1, lifter_in2) = dp
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
    let (claw_in1, claw_in2) = dp
        .TIM1
        .pwm_hz(
            (Channel1::new(gpioe.pe9), Channel2::new(gpioe.pe11)),
            20.kHz(),
            &clocks,
        )
        .split();

    let tower_motor = DcMotor::new(tower_in1, tower_in2, tower_enc);
    let lifter_motor = DcMotor::new(lifter_in1, lifter_in2, lifter_enc);
    let claw_motor = DcMotor::new(claw_in1, claw_in2, claw_enc);

    let claw_touch = TouchSwitch::active_low(gpiof.pf13.into_pull_up_input());
    let base_touch = TouchSwitch::active_low(gpiof.pf14.into_pull_up_input());
    let buzzer = Buzzer::new(gpiog.pg0.into_push_pull_output(), sysclk_hz);

    critical_section::with(|cs| SHARES.reset_from_interrupt(cs));

    // Tasks
    let mut comm = Comm::new(
        link,
        BootRole::Responder,
        &SHARES.comm,
        CommConfig::default(),
    );
    let mut mind = SlaveMind::new(&SHARES, SlaveConfig::default());
    let mut tower = Tower::new(tower_motor, &SHARES.tower, TowerConfig::default());
    let mut lifter = Lifter::new(
        lifter_motor,
        base_touch,
        buzzer,
        &SHARES.lifter,
        LifterConfig::default(),
    );
    let mut claw = Claw::new(claw_motor, claw_touch, &SHARES.claw, ClawConfig::default());

    let mut sched: Scheduler<'_, 5> = Scheduler::new(&mut screen);
    sched.spawn(&mut comm).unwrap();
    sched.spawn(&mut mind).unwrap();
    sched.spawn(&mut tower).unwrap();
    sched.spawn(&mut lifter).unwrap();
    sched.spawn(&mut claw).unwrap();

    sched.run(&mut clock)
}
