//! Two-input H-bridge driver over embedded-hal 1.0.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;

use crate::error::{HardwareError, Result};

use super::{PwmMode, MAX_POWER};

/// One DC motor behind a PWM enable line and two direction inputs
/// (L298, TB6612 and similar bridges).
///
/// Generic over:
/// - `PWM`: enable/speed channel (must implement `SetDutyCycle`)
/// - `IN1`, `IN2`: bridge inputs (must implement `OutputPin`)
pub struct HBridge<PWM, IN1, IN2>
where
    PWM: SetDutyCycle,
    IN1: OutputPin,
    IN2: OutputPin,
{
    pwm: PWM,
    in1: IN1,
    in2: IN2,
    /// Last power written, cached to skip redundant pin writes.
    last: Option<(i8, PwmMode)>,
}

impl<PWM, IN1, IN2> HBridge<PWM, IN1, IN2>
where
    PWM: SetDutyCycle,
    IN1: OutputPin,
    IN2: OutputPin,
{
    /// Create a bridge driver. Nothing is written until the first `drive`.
    pub fn new(pwm: PWM, in1: IN1, in2: IN2) -> Self {
        Self {
            pwm,
            in1,
            in2,
            last: None,
        }
    }

    /// Apply a signed power command.
    ///
    /// Positive power drives IN1 high, negative drives IN2 high. At zero power
    /// `Brake` sets both inputs high and `Float` sets both low.
    pub fn drive(&mut self, power: i8, mode: PwmMode) -> Result<()> {
        let power = power.clamp(-MAX_POWER, MAX_POWER);
        // The rest mode only matters at zero power.
        let key = if power == 0 { (0, mode) } else { (power, PwmMode::Brake) };
        if self.last == Some(key) {
            return Ok(());
        }

        match power {
            p if p > 0 => {
                self.in1.set_high().map_err(|_| HardwareError::PinError)?;
                self.in2.set_low().map_err(|_| HardwareError::PinError)?;
            }
            p if p < 0 => {
                self.in1.set_low().map_err(|_| HardwareError::PinError)?;
                self.in2.set_high().map_err(|_| HardwareError::PinError)?;
            }
            _ => match mode {
                PwmMode::Brake => {
                    self.in1.set_high().map_err(|_| HardwareError::PinError)?;
                    self.in2.set_high().map_err(|_| HardwareError::PinError)?;
                }
                PwmMode::Float => {
                    self.in1.set_low().map_err(|_| HardwareError::PinError)?;
                    self.in2.set_low().map_err(|_| HardwareError::PinError)?;
                }
            },
        }

        self.pwm
            .set_duty_cycle_percent(power.unsigned_abs())
            .map_err(|_| HardwareError::PwmError)?;

        self.last = Some(key);
        Ok(())
    }

    /// Release the pins and PWM channel.
    pub fn release(self) -> (PWM, IN1, IN2) {
        (self.pwm, self.in1, self.in2)
    }
}
