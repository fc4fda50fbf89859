// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Brushed DC motor on a two-input H-bridge, with a timer quadrature encoder.
//!
//! | IN1 | IN2 | Motor state |
//! | --- | --- | ----------- |
//! | PWM | 0   | Forward     |
//! | 0   | PWM | Reverse     |
//! | 1   | 1   | Brake       |
//! | 0   | 0   | Coast       |

use embedded_hal::PwmPin;

use crate::hw::encoder::QuadratureCounter;
use crate::hw::Motor;

pub struct DcMotor<IN1, IN2, E> {
    in1: IN1,
    in2: IN2,
    enc: E,
    brake: bool,
    reversed: bool,
}

impl<IN1, IN2, E> DcMotor<IN1, IN2, E>
where
    IN1: PwmPin<Duty = u16>,
    IN2: PwmPin<Duty = u16>,
    E: QuadratureCounter,
{
    /// Wrap an H-bridge and its encoder. The motor starts coasting.
    pub fn new(mut in1: IN1, mut in2: IN2, enc: E) -> Self {
        in1.set_duty(0);
        in2.set_duty(0);
        in1.enable();
        in2.enable();
        Self {
            in1,
            in2,
            enc,
            brake: false,
            reversed: false,
        }
    }

    /// Swap the positive direction of both power and count, for mirrored mounts.
    pub fn reversed(mut self) -> Self {
        self.reversed = !self.reversed;
        self
    }

    pub fn free(self) -> (IN1, IN2, E) {
        (self.in1, self.in2, self.enc)
    }
}

impl<IN1, IN2, E> Motor for DcMotor<IN1, IN2, E>
where
    IN1: PwmPin<Duty = u16>,
    IN2: PwmPin<Duty = u16>,
    E: QuadratureCounter,
{
    fn reset(&mut self) {
        self.stop();
        self.enc.reset();
    }

    fn set_pwm(&mut self, power: i8) {
        let mut power = power.clamp(-100, 100);
        if self.reversed {
            power = -power;
        }

        let max = self.in1.get_max_duty();
        let duty = (power.unsigned_abs() as u32 * max as u32 / 100) as u16;

        match power {
            p if p > 0 => {
                self.in1.set_duty(duty);
                self.in2.set_duty(0);
            }
            p if p < 0 => {
                self.in1.set_duty(0);
                self.in2.set_duty(duty);
            }
            _ if self.brake => {
                self.in1.set_duty(max);
                self.in2.set_duty(self.in2.get_max_duty());
            }
            _ => {
                self.in1.set_duty(0);
                self.in2.set_duty(0);
            }
        }
    }

    fn set_brake(&mut self, brake: bool) {
        self.brake = brake;
    }

    fn count(&self) -> i32 {
        let c = self.enc.position();
        if self.reversed {
            c.wrapping_neg()
        } else {
            c
        }
    }
}
