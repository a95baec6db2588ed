//! Configuration loading from files (std only).

use std::fs;
use std::path::Path;

use crate::error::{ConfigError, Error, Result};

use super::RegulatorConfig;

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or validated.
///
/// # Example
///
/// ```rust,ignore
/// use motor_regulator::load_config;
///
/// let config = load_config("regulator.toml")?;
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RegulatorConfig> {
    let content = fs::read_to_string(path.as_ref()).map_err(|e| {
        let msg = heapless::String::try_from(truncate(&e.to_string())).unwrap_or_default();
        Error::Config(ConfigError::IoError(msg))
    })?;

    parse_config(&content)
}

/// Parse configuration from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is invalid or fails validation.
pub fn parse_config(content: &str) -> Result<RegulatorConfig> {
    let config: RegulatorConfig = toml::from_str(content).map_err(|e| {
        let msg = heapless::String::try_from(truncate(e.message())).unwrap_or_default();
        Error::Config(ConfigError::ParseError(msg))
    })?;

    super::validation::validate_config(&config)?;

    Ok(config)
}

/// Cut a message to fit a 128-byte heapless string on a char boundary.
fn truncate(msg: &str) -> &str {
    if msg.len() <= 128 {
        return msg;
    }
    let mut end = 128;
    while !msg.is_char_boundary(end) {
        end -= 1;
    }
    &msg[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MotorClass;
    use crate::hardware::PwmMode;

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
[channels.gripper]
port = 0
"#;

        let config = parse_config(toml).unwrap();
        let gripper = config.channel("gripper").unwrap();
        assert_eq!(gripper.motor_class, MotorClass::Ev3Large);
        assert_eq!(gripper.acceleration, 1000);
        assert_eq!(gripper.pwm_mode, PwmMode::Brake);
    }

    #[test]
    fn test_parse_with_gain_override() {
        let toml = r#"
[channels.wrist]
port = 2
motor_class = "ev3_medium"
mirror = true
speed = 500
pwm_mode = "float"

[channels.wrist.gains.holding]
p = 1.5
i = 0.02
d = 10.0
"#;

        let config = parse_config(toml).unwrap();
        let wrist = config.channel("wrist").unwrap();
        assert!(wrist.mirror);
        assert_eq!(wrist.pwm_mode, PwmMode::Float);
        assert_eq!(wrist.gains().holding.p, 1.5);
        assert_eq!(wrist.gains().moving, MotorClass::Ev3Medium.gains().moving);
    }

    #[test]
    fn test_parse_rejects_duplicate_port() {
        let toml = r#"
[channels.a]
port = 1

[channels.b]
port = 1
"#;

        let result = parse_config(toml);
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::DuplicatePort(1)))
        ));
    }

    #[test]
    fn test_truncate_long_message() {
        let long = "x".repeat(300);
        assert_eq!(truncate(&long).len(), 128);
    }
}
