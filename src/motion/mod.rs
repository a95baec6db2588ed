//! Motion module for motor-regulator.
//!
//! Provides the trapezoidal sub-move profile and the dual-smoothed PID power
//! calculator that tracks it.

mod power;
mod profile;

pub use power::PowerFilter;
pub use profile::{required_deceleration, MotionPhase, ProfileSample, SubMove};
