//! Motor classes and their PID gain tables.

use serde::Deserialize;

/// Motor family, selecting the default gain set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorClass {
    /// NXT large servo motor.
    NxtLarge,
    /// EV3 large servo motor.
    #[default]
    Ev3Large,
    /// EV3 medium servo motor.
    Ev3Medium,
}

/// Proportional, integral and derivative gains.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PidGains {
    /// Proportional gain (power per degree of smoothed error).
    pub p: f32,
    /// Integrator tracking rate per tick.
    pub i: f32,
    /// Derivative gain on the fast/slow smoothed error difference.
    pub d: f32,
}

impl PidGains {
    /// Create a gain set.
    pub const fn new(p: f32, i: f32, d: f32) -> Self {
        Self { p, i, d }
    }

    /// Check that every term is finite and non-negative.
    pub fn is_valid(&self) -> bool {
        [self.p, self.i, self.d]
            .iter()
            .all(|g| g.is_finite() && *g >= 0.0)
    }
}

/// Gains used while moving and while holding at rest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainSchedule {
    /// Gains applied while a sub-move is active.
    pub moving: PidGains,
    /// Softer gains applied while holding position.
    pub holding: PidGains,
}

impl MotorClass {
    /// Default gain schedule for this motor class.
    pub const fn gains(self) -> GainSchedule {
        match self {
            MotorClass::NxtLarge | MotorClass::Ev3Large => GainSchedule {
                moving: PidGains::new(4.0, 0.04, 32.0),
                holding: PidGains::new(2.0, 0.04, 8.0),
            },
            MotorClass::Ev3Medium => GainSchedule {
                moving: PidGains::new(6.0, 0.02, 15.0),
                holding: PidGains::new(1.0, 0.04, 12.0),
            },
        }
    }
}

/// Optional per-channel overrides of the class gains (from TOML).
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct GainOverrides {
    /// Replaces the class move gains.
    #[serde(default)]
    pub moving: Option<PidGains>,
    /// Replaces the class hold gains.
    #[serde(default)]
    pub holding: Option<PidGains>,
}

impl GainOverrides {
    /// Resolve the overrides against a class table.
    pub fn apply(&self, class: MotorClass) -> GainSchedule {
        let defaults = class.gains();
        GainSchedule {
            moving: self.moving.unwrap_or(defaults.moving),
            holding: self.holding.unwrap_or(defaults.holding),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hold_gains_are_softer() {
        for class in [MotorClass::NxtLarge, MotorClass::Ev3Large, MotorClass::Ev3Medium] {
            let gains = class.gains();
            assert!(gains.holding.p < gains.moving.p);
        }
    }

    #[test]
    fn test_overrides() {
        let overrides = GainOverrides {
            moving: Some(PidGains::new(1.0, 0.0, 2.0)),
            holding: None,
        };
        let gains = overrides.apply(MotorClass::Ev3Medium);

        assert_eq!(gains.moving, PidGains::new(1.0, 0.0, 2.0));
        assert_eq!(gains.holding, MotorClass::Ev3Medium.gains().holding);
    }

    #[test]
    fn test_gain_validation() {
        assert!(PidGains::new(4.0, 0.04, 32.0).is_valid());
        assert!(!PidGains::new(-1.0, 0.0, 0.0).is_valid());
        assert!(!PidGains::new(1.0, f32::NAN, 0.0).is_valid());
    }
}
