//! Error types for motor-regulator library.
//!
//! Provides unified error handling across configuration, channel access, and
//! hardware adapters. Stalls and deferred commands are not errors: they are
//! reported through the regulator status flags.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all motor-regulator operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Channel access or command error
    Regulator(RegulatorError),
    /// Hardware adapter error
    Hardware(HardwareError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Channel name not found in configuration
    ChannelNotFound(heapless::String<32>),
    /// Two channels share the same port
    DuplicatePort(u8),
    /// Stall threshold must be positive and finite
    InvalidStallThreshold(f32),
    /// Stall tick bound must be non-zero
    InvalidStallTicks(u32),
    /// Speed must be non-negative
    InvalidSpeed(i32),
    /// Acceleration must be non-negative
    InvalidAcceleration(i32),
    /// PID gain must be finite and non-negative
    InvalidGain {
        /// Name of the offending term ("p", "i" or "d")
        term: &'static str,
        /// Rejected value
        value: f32,
    },
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Channel access and command errors.
#[derive(Debug, Clone, PartialEq)]
pub enum RegulatorError {
    /// Channel index is outside the regulator bank
    InvalidChannel(u8),
    /// Command queue has no free slot
    QueueFull,
}

/// Hardware adapter errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HardwareError {
    /// Direction pin operation failed
    PinError,
    /// PWM duty update failed
    PwmError,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Regulator(e) => write!(f, "Regulator error: {}", e),
            Error::Hardware(e) => write!(f, "Hardware error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::ChannelNotFound(name) => write!(f, "Channel '{}' not found", name),
            ConfigError::DuplicatePort(port) => write!(f, "Port {} is used by more than one channel", port),
            ConfigError::InvalidStallThreshold(v) => {
                write!(f, "Invalid stall threshold: {}. Must be > 0", v)
            }
            ConfigError::InvalidStallTicks(v) => write!(f, "Invalid stall ticks: {}. Must be > 0", v),
            ConfigError::InvalidSpeed(v) => write!(f, "Invalid speed: {}. Must be >= 0", v),
            ConfigError::InvalidAcceleration(v) => {
                write!(f, "Invalid acceleration: {}. Must be >= 0", v)
            }
            ConfigError::InvalidGain { term, value } => {
                write!(f, "Invalid {} gain: {}. Must be finite and >= 0", term, value)
            }
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for RegulatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegulatorError::InvalidChannel(ch) => write!(f, "Channel {} does not exist", ch),
            RegulatorError::QueueFull => write!(f, "Command queue is full"),
        }
    }
}

impl fmt::Display for HardwareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HardwareError::PinError => write!(f, "GPIO pin operation failed"),
            HardwareError::PwmError => write!(f, "PWM duty update failed"),
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<RegulatorError> for Error {
    fn from(e: RegulatorError) -> Self {
        Error::Regulator(e)
    }
}

impl From<HardwareError> for Error {
    fn from(e: HardwareError) -> Self {
        Error::Hardware(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for RegulatorError {}

#[cfg(feature = "std")]
impl std::error::Error for HardwareError {}
