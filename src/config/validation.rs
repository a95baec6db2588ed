//! Configuration validation.

use crate::error::{ConfigError, Error, Result};

use super::{ChannelConfig, PidGains, RegulatorConfig};

/// Validate a regulator configuration.
///
/// Checks:
/// - No two channels share a port
/// - Speed and acceleration are non-negative
/// - Stall threshold is positive and stall ticks non-zero
/// - Gain overrides are finite and non-negative
pub fn validate_config(config: &RegulatorConfig) -> Result<()> {
    for (i, (_, channel)) in config.channels.iter().enumerate() {
        if config
            .channels
            .values()
            .skip(i + 1)
            .any(|other| other.port == channel.port)
        {
            return Err(Error::Config(ConfigError::DuplicatePort(channel.port)));
        }

        validate_channel(channel)?;
    }

    Ok(())
}

pub(crate) fn validate_channel(config: &ChannelConfig) -> Result<()> {
    if config.speed < 0 {
        return Err(Error::Config(ConfigError::InvalidSpeed(config.speed)));
    }

    if config.acceleration < 0 {
        return Err(Error::Config(ConfigError::InvalidAcceleration(
            config.acceleration,
        )));
    }

    if !(config.stall_threshold.is_finite() && config.stall_threshold > 0.0) {
        return Err(Error::Config(ConfigError::InvalidStallThreshold(
            config.stall_threshold,
        )));
    }

    if config.stall_ticks == 0 {
        return Err(Error::Config(ConfigError::InvalidStallTicks(0)));
    }

    let overrides = [config.gains.moving, config.gains.holding];
    for gains in overrides.iter().flatten() {
        validate_gains(gains)?;
    }

    Ok(())
}

fn validate_gains(gains: &PidGains) -> Result<()> {
    for (term, value) in [("p", gains.p), ("i", gains.i), ("d", gains.d)] {
        if !(value.is_finite() && value >= 0.0) {
            return Err(Error::Config(ConfigError::InvalidGain { term, value }));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MotorClass;

    #[test]
    fn test_invalid_stall_threshold() {
        let mut config = ChannelConfig::new(0, MotorClass::Ev3Large);
        config.stall_threshold = 0.0;

        let result = validate_channel(&config);
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidStallThreshold(_)))
        ));
    }

    #[test]
    fn test_negative_gain_override() {
        let mut config = ChannelConfig::new(0, MotorClass::Ev3Large);
        config.gains.holding = Some(PidGains::new(1.0, -0.5, 0.0));

        let result = validate_channel(&config);
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidGain { term: "i", .. }))
        ));
    }

    #[test]
    fn test_default_channel_is_valid() {
        assert!(validate_channel(&ChannelConfig::new(1, MotorClass::Ev3Medium)).is_ok());
    }
}
