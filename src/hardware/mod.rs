//! Hardware seams consumed by the regulator.
//!
//! The regulator never touches registers itself. A board crate implements
//! [`MotorHardware`] for its motor ports and [`Clock`] for its millisecond
//! tick; [`HBridge`] covers the common case of an embedded-hal PWM channel
//! plus two direction pins.

mod hbridge;

use serde::Deserialize;

use crate::regulator::Channel;

pub use hbridge::HBridge;

/// Maximum magnitude of a power command, in percent.
pub const MAX_POWER: i8 = 100;

/// Output stage behavior when the commanded power is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PwmMode {
    /// Short the motor windings (active braking).
    #[default]
    Brake,
    /// Leave the windings open (free-wheel).
    Float,
}

/// Motor ports shared by all regulated channels.
///
/// The methods cannot fail. A board built on a fallible adapter such as
/// [`HBridge`] absorbs adapter errors itself (log, count, retry next tick):
/// the regulator re-commands power every tick, so a dropped write is
/// corrected one period later.
///
/// ```rust,ignore
/// impl MotorHardware for Board {
///     fn set_power(&mut self, channel: Channel, power: i8, mode: PwmMode) {
///         if self.bridges[channel.index()].drive(power, mode).is_err() {
///             self.write_errors += 1;
///         }
///     }
///     // ...
/// }
/// ```
pub trait MotorHardware {
    /// Command a signed power in `-100..=100` with the given rest behavior.
    fn set_power(&mut self, channel: Channel, power: i8, mode: PwmMode);

    /// Read the raw quadrature count of a channel.
    fn encoder_count(&mut self, channel: Channel) -> i32;

    /// Zero the raw quadrature count of a channel.
    fn reset_encoder(&mut self, channel: Channel);
}

/// Monotonic millisecond clock.
pub trait Clock {
    /// Milliseconds since an arbitrary epoch; wraps at `u32::MAX`.
    fn now_ms(&mut self) -> u32;
}

impl<T: MotorHardware + ?Sized> MotorHardware for &mut T {
    fn set_power(&mut self, channel: Channel, power: i8, mode: PwmMode) {
        (**self).set_power(channel, power, mode)
    }

    fn encoder_count(&mut self, channel: Channel) -> i32 {
        (**self).encoder_count(channel)
    }

    fn reset_encoder(&mut self, channel: Channel) {
        (**self).reset_encoder(channel)
    }
}

impl<T: Clock + ?Sized> Clock for &mut T {
    fn now_ms(&mut self) -> u32 {
        (**self).now_ms()
    }
}
