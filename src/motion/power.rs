//! Dual-smoothed PID power calculation.

use libm::roundf;

use crate::config::PidGains;
use crate::hardware::MAX_POWER;

/// Filter and integrator state of one channel.
///
/// The state is kept across sub-moves; only the regulator reset at channel
/// init clears it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PowerFilter {
    /// Fast smoothed error (low latency).
    fast_error: f32,
    /// Slow smoothed error (low noise).
    slow_error: f32,
    /// Integrator base power, kept within ±MAX_POWER.
    base_power: f32,
}

impl PowerFilter {
    /// Create a filter with zeroed state.
    pub const fn new() -> Self {
        Self {
            fast_error: 0.0,
            slow_error: 0.0,
            base_power: 0.0,
        }
    }

    /// Feed one tracking error sample and return the clamped power
    /// (before the channel mirror is applied).
    pub fn update(&mut self, error: f32, gains: &PidGains) -> i8 {
        let max = MAX_POWER as f32;

        self.fast_error = 0.5 * self.fast_error + 0.5 * error;
        self.slow_error = 0.8 * self.slow_error + 0.2 * error;

        let power = self.base_power
            + gains.p * self.fast_error
            + gains.d * (self.fast_error - self.slow_error);

        self.base_power += gains.i * (power - self.base_power);
        self.base_power = self.base_power.clamp(-max, max);

        roundf(power.clamp(-max, max)) as i8
    }

    /// Fast smoothed error.
    #[inline]
    pub fn fast_error(&self) -> f32 {
        self.fast_error
    }

    /// Slow smoothed error.
    #[inline]
    pub fn slow_error(&self) -> f32 {
        self.slow_error
    }

    /// Integrator base power.
    #[inline]
    pub fn base_power(&self) -> f32 {
        self.base_power
    }
}
