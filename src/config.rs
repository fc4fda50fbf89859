// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Tuning constants.
//!
//! One plain struct per component. `Default` carries the values the robot was tuned with;
//! constructors take a config by value so tests and alternative builds can override single
//! fields with struct-update syntax.
//!
//! Units: motor power is percent (`-100..=100`), positions are encoder ticks, distances are
//! centimetres unless a field name says otherwise.

/// Link task timing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommConfig {
    pub period_ms: u32,
    /// Initiator resend interval for the wake byte.
    pub wake_interval_ms: u32,
}

impl Default for CommConfig {
    fn default() -> Self {
        Self {
            period_ms: 10,
            wake_interval_ms: 200,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClawConfig {
    pub period_ms: u32,
    pub open_power: i8,
    pub close_power: i8,
    /// Power kept on the jaws once closed so the rings do not slip.
    pub hold_power: i8,
}

impl Default for ClawConfig {
    fn default() -> Self {
        Self {
            period_ms: 10,
            open_power: 35,
            close_power: -35,
            hold_power: -30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LifterConfig {
    pub period_ms: u32,
    /// Power used to find the bottom stop.
    pub home_power: i8,
    /// Position tolerance in ticks.
    pub tolerance: i32,
    /// Consecutive in-tolerance samples required before arrival.
    pub settle_cycles: u8,
    pub kp: f32,
    pub ki: f32,
    pub up_max: i8,
    pub down_max: i8,
    /// Smallest upward power that still lifts the carriage. Downward moves have no floor.
    pub min_power: i8,
}

impl Default for LifterConfig {
    fn default() -> Self {
        Self {
            period_ms: 20,
            home_power: 70,
            tolerance: 10,
            settle_cycles: 6,
            kp: 1.0,
            ki: 0.001,
            up_max: 70,
            down_max: -70,
            min_power: 20,
        }
    }
}

/// Two-speed deployment profile of the tower arm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TowerConfig {
    pub period_ms: u32,
    pub fast_power: i8,
    pub fast_until: i32,
    pub slow_power: i8,
    pub slow_until: i32,
}

impl Default for TowerConfig {
    fn default() -> Self {
        Self {
            period_ms: 50,
            fast_power: 75,
            fast_until: 45,
            slow_power: 25,
            slow_until: 105,
        }
    }
}

/// Lifter heights in inches for each mission step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Heights {
    pub pre_grab: f32,
    pub grab: f32,
    pub post_grab: f32,
    pub pre_release: f32,
    pub release: f32,
    pub post_release: f32,
}

impl Default for Heights {
    fn default() -> Self {
        Self {
            pre_grab: 2.5,
            grab: 3.25,
            post_grab: 3.75,
            pre_release: 11.5,
            release: 11.0,
            post_release: 10.25,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlaveConfig {
    pub period_ms: u32,
    /// Pause between bringing up consecutive actuators.
    pub init_pause_ms: u32,
    /// Polls skipped before an arrived flag is trusted.
    pub settle_polls: u8,
    pub heights: Heights,
    pub ticks_per_inch: f32,
    pub tick_offset: f32,
}

impl Default for SlaveConfig {
    fn default() -> Self {
        Self {
            period_ms: 50,
            init_pause_ms: 250,
            settle_polls: 3,
            heights: Heights::default(),
            ticks_per_inch: 571.51,
            tick_offset: -1516.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MasterConfig {
    pub period_ms: u32,
    pub fault_tone_hz: u16,
    pub fault_tone_ms: u16,
    /// How long the init fault stays on screen before the mission continues.
    pub fault_pause_ms: u32,
}

impl Default for MasterConfig {
    fn default() -> Self {
        Self {
            period_ms: 50,
            fault_tone_hz: 500,
            fault_tone_ms: 1000,
            fault_pause_ms: 10_000,
        }
    }
}

/// Heading corrector that keeps both drive wheels at the same count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StraightConfig {
    pub kp: f32,
    pub ki: f32,
    pub max_delta: i32,
}

impl Default for StraightConfig {
    fn default() -> Self {
        Self {
            kp: 0.1,
            ki: 1.0,
            max_delta: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavConfig {
    pub period_ms: u32,
    /// Aux light reading above this marks a crossing line.
    pub crossing_brightness: i16,
    pub cross_power: i8,
    /// Open-loop cycles spent driving over the centre line.
    pub cross_cycles: u8,
    /// Stop distance from the wall.
    pub wall_distance_cm: f32,
    /// Back-up distance from the wall.
    pub backup_distance_cm: f32,
    pub kp: f32,
    pub ki: f32,
    pub forward_power: i8,
    pub backup_power: i8,
    pub min_power: i8,
    pub done_tone_hz: u16,
    pub done_tone_ms: u16,
    pub straight: StraightConfig,
}

pub const CM_PER_INCH: f32 = 2.54;

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            period_ms: 20,
            crossing_brightness: 100,
            cross_power: 50,
            cross_cycles: 15,
            wall_distance_cm: 3.0 * CM_PER_INCH,
            backup_distance_cm: 9.0 * CM_PER_INCH,
            kp: 5.0,
            ki: 1.0,
            forward_power: 25,
            backup_power: 20,
            min_power: 15,
            done_tone_hz: 500,
            done_tone_ms: 50,
            straight: StraightConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFollowConfig {
    pub base_power: i8,
    /// Divisor on the brightness error.
    pub scale: i16,
    pub rotate_power: i8,
    /// Half sweep in right-wheel ticks used to sample both sides of the edge.
    pub sweep_ticks: i32,
    pub sample_pause_ms: u32,
}

impl Default for LineFollowConfig {
    fn default() -> Self {
        Self {
            base_power: 50,
            scale: 1,
            rotate_power: 30,
            sweep_ticks: 45,
            sample_pause_ms: 100,
        }
    }
}
