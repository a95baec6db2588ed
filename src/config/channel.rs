//! Channel configuration from TOML.

use serde::Deserialize;

use crate::hardware::PwmMode;
use crate::regulator::{Channel, Mirror};

use super::gains::{GainOverrides, GainSchedule, MotorClass};

/// Default acceleration in degrees per second squared.
pub const DEFAULT_ACCELERATION: i32 = 1000;

/// Default tracking error, in degrees, above which a tick counts toward a stall.
pub const DEFAULT_STALL_THRESHOLD: f32 = 50.0;

/// Default number of consecutive over-threshold ticks that make a stall.
///
/// The stall fires on the tick that takes the counter past this bound, i.e.
/// on the `DEFAULT_STALL_TICKS + 1`-th consecutive over-threshold tick.
pub const DEFAULT_STALL_TICKS: u32 = 1000;

/// Complete regulator channel configuration from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    /// Motor port index in the regulator bank.
    pub port: u8,

    /// Motor family selecting the default gains.
    #[serde(default)]
    pub motor_class: MotorClass,

    /// Flip forward and backward for this motor.
    #[serde(default)]
    pub mirror: bool,

    /// Initial cruise speed in degrees per second.
    #[serde(default)]
    pub speed: i32,

    /// Initial acceleration in degrees per second squared.
    #[serde(default = "default_acceleration")]
    pub acceleration: i32,

    /// Output behavior at zero power.
    #[serde(default)]
    pub pwm_mode: PwmMode,

    /// Tracking error in degrees counted toward a stall.
    #[serde(default = "default_stall_threshold")]
    pub stall_threshold: f32,

    /// Consecutive over-threshold ticks tolerated; the next one is a stall.
    #[serde(default = "default_stall_ticks")]
    pub stall_ticks: u32,

    /// Optional gain overrides.
    #[serde(default)]
    pub gains: GainOverrides,
}

fn default_acceleration() -> i32 {
    DEFAULT_ACCELERATION
}

fn default_stall_threshold() -> f32 {
    DEFAULT_STALL_THRESHOLD
}

fn default_stall_ticks() -> u32 {
    DEFAULT_STALL_TICKS
}

impl ChannelConfig {
    /// Configuration with default speed, acceleration and stall settings.
    pub fn new(port: u8, motor_class: MotorClass) -> Self {
        Self {
            port,
            motor_class,
            mirror: false,
            speed: 0,
            acceleration: DEFAULT_ACCELERATION,
            pwm_mode: PwmMode::Brake,
            stall_threshold: DEFAULT_STALL_THRESHOLD,
            stall_ticks: DEFAULT_STALL_TICKS,
            gains: GainOverrides::default(),
        }
    }

    /// Channel this configuration applies to.
    #[inline]
    pub fn channel(&self) -> Channel {
        Channel::new(self.port)
    }

    /// Mirror setting as a direction sign.
    #[inline]
    pub fn mirror(&self) -> Mirror {
        Mirror::from(self.mirror)
    }

    /// Effective gain schedule (class table plus overrides).
    pub fn gains(&self) -> GainSchedule {
        self.gains.apply(self.motor_class)
    }
}
