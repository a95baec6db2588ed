//! Configuration module for motor-regulator.
//!
//! Provides types for loading and validating regulator channel configurations
//! from TOML files (with `std` feature) or pre-parsed data.

mod channel;
mod gains;
#[cfg(feature = "std")]
mod loader;
mod system;
mod validation;

pub use channel::{
    ChannelConfig, DEFAULT_ACCELERATION, DEFAULT_STALL_THRESHOLD, DEFAULT_STALL_TICKS,
};
pub use gains::{GainOverrides, GainSchedule, MotorClass, PidGains};
pub use system::{RegulatorConfig, MAX_CONFIGURED_CHANNELS};
pub use validation::validate_config;
pub(crate) use validation::validate_channel;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};
