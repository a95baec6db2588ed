//! # motor-regulator
//!
//! Closed-loop position regulation for encoder-equipped DC motors, with
//! embedded-hal 1.0 support.
//!
//! ## Features
//!
//! - **Trapezoidal profiles**: Constant-acceleration ramps, open-ended cruise,
//!   and just-in-time deceleration onto a target angle
//! - **Dual-smoothed PID**: Separate gain schedules while moving and holding,
//!   per motor class
//! - **Stall detection**: The profile freezes while the motor lags, and a
//!   sustained lag ends the move and re-zeroes the angle
//! - **Command blending**: New moves in the same direction take over at once;
//!   reversals decelerate first and run when the motor has stopped
//! - **no_std compatible**: Core library works without standard library
//! - **Configuration-driven**: Define channels in TOML files
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use motor_regulator::{Channel, Mirror, MotorClass, RegulatorBank};
//!
//! let mut bank: RegulatorBank<_, _> = RegulatorBank::new(motors, clock);
//! bank.init(Channel::A, MotorClass::Ev3Large, Mirror::Normal)?;
//!
//! let arm = bank.regulator_mut(Channel::A)?;
//! arm.set_speed(720);
//! arm.set_acceleration(2000);
//! arm.rotate_to(1000);
//!
//! // Call once per millisecond.
//! bank.tick();
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O and TOML parsing
//! - `defmt`: Enables defmt logging for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

// Must come first so the logging macros are visible in every module.
#[macro_use]
mod fmt;

// Core modules
pub mod config;
pub mod error;
pub mod hardware;
pub mod motion;
pub mod regulator;

// Re-exports for ergonomic API
pub use config::{validate_config, ChannelConfig, MotorClass, PidGains, RegulatorConfig};
pub use error::{Error, Result};
pub use hardware::{Clock, HBridge, MotorHardware, PwmMode, MAX_POWER};
pub use motion::MotionPhase;
pub use regulator::{
    enqueue, Channel, ChannelCommand, ChannelStatus, Command, Mirror, MoveRequest, Regulator,
    RegulatorBank,
};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};
