//! Regulator configuration - root configuration structure.

use heapless::{FnvIndexMap, String};
use serde::Deserialize;

use crate::error::{ConfigError, Error, Result};

use super::channel::ChannelConfig;

/// Maximum number of named channels in one configuration.
pub const MAX_CONFIGURED_CHANNELS: usize = 8;

/// Root configuration structure from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct RegulatorConfig {
    /// Named channel configurations.
    pub channels: FnvIndexMap<String<32>, ChannelConfig, MAX_CONFIGURED_CHANNELS>,
}

impl RegulatorConfig {
    /// Get a channel configuration by name.
    pub fn channel(&self, name: &str) -> Option<&ChannelConfig> {
        self.channels
            .iter()
            .find(|(k, _)| k.as_str() == name)
            .map(|(_, v)| v)
    }

    /// Get a channel configuration by name, failing if it is missing.
    pub fn require_channel(&self, name: &str) -> Result<&ChannelConfig> {
        self.channel(name).ok_or_else(|| {
            let name = String::try_from(name).unwrap_or_default();
            Error::Config(ConfigError::ChannelNotFound(name))
        })
    }

    /// List all channel names.
    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(|s| s.as_str())
    }

    /// Find the name of the channel bound to a port.
    pub fn name_of_port(&self, port: u8) -> Option<&str> {
        self.channels
            .iter()
            .find(|(_, v)| v.port == port)
            .map(|(k, _)| k.as_str())
    }
}

impl Default for RegulatorConfig {
    fn default() -> Self {
        Self {
            channels: FnvIndexMap::new(),
        }
    }
}
