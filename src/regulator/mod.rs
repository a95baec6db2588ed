//! Closed-loop position regulation of DC motor channels.
//!
//! Each [`Regulator`] tracks a trapezoidal profile with a dual-smoothed PID,
//! detects stalls, and blends or defers new commands against the motion in
//! progress. A [`RegulatorBank`] owns the regulators together with the
//! hardware and clock, and runs the periodic tick.

mod bank;
mod channel;
mod command;
mod planner;
mod state;
mod tick;

pub use bank::{enqueue, RegulatorBank, DEFAULT_CHANNELS};
pub use channel::{Channel, Mirror};
pub use command::{ChannelCommand, Command};
pub use state::{ChannelStatus, MoveRequest, Regulator};
