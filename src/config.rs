//! Configuration for cmdsplice
//!
//! Centralized configuration with sensible defaults. The on-disk form is the
//! plugin's JSON config file; keys that are missing fall back to defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpliceError};
use crate::protocol::PROTOCOL_1_19_2;

/// Main configuration for a cmdsplice bridge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Interception Switches
    // -------------------------------------------------------------------------
    /// Intercept plain chat messages that start with the escape prefix
    pub proxy_mcdr_chat_command: bool,

    /// Intercept chat commands, tab completion, and splice the command tree
    pub register_vanilla_command: bool,

    /// Drive the 1.19 chat preview flow with suggestions
    pub chat_preview_suggestion: bool,

    // -------------------------------------------------------------------------
    // Protocol Configuration
    // -------------------------------------------------------------------------
    /// Text that marks input as destined for the external command system
    pub escape_prefix: String,

    /// Connections below this protocol version are left untouched
    pub min_protocol_version: i32,

    /// Malformed packets tolerated on one connection before teardown
    pub max_format_errors: u32,

    // -------------------------------------------------------------------------
    // Tree Cache Configuration
    // -------------------------------------------------------------------------
    /// Bound of the rebuild request queue
    pub rebuild_queue_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            proxy_mcdr_chat_command: true,
            register_vanilla_command: true,
            chat_preview_suggestion: false,
            escape_prefix: "!!".to_string(),
            min_protocol_version: PROTOCOL_1_19_2,
            max_format_errors: 3,
            rebuild_queue_capacity: 64,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Parse a config from its JSON form and validate it
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Write the config as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Check invariants the router relies on
    pub fn validate(&self) -> Result<()> {
        if self.escape_prefix.is_empty() {
            return Err(SpliceError::Config("escape_prefix must not be empty".to_string()));
        }
        if self.escape_prefix.starts_with('/') {
            return Err(SpliceError::Config(format!(
                "escape_prefix {:?} must not start with '/'",
                self.escape_prefix
            )));
        }
        if self.max_format_errors == 0 {
            return Err(SpliceError::Config(
                "max_format_errors must be at least 1".to_string(),
            ));
        }
        if self.rebuild_queue_capacity == 0 {
            return Err(SpliceError::Config(
                "rebuild_queue_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Enable or disable chat message interception
    pub fn proxy_chat_command(mut self, enabled: bool) -> Self {
        self.config.proxy_mcdr_chat_command = enabled;
        self
    }

    /// Enable or disable chat command / suggestion / tree interception
    pub fn proxy_vanilla_commands(mut self, enabled: bool) -> Self {
        self.config.register_vanilla_command = enabled;
        self
    }

    /// Enable or disable chat preview suggestions
    pub fn chat_preview(mut self, enabled: bool) -> Self {
        self.config.chat_preview_suggestion = enabled;
        self
    }

    /// Set the escape prefix
    pub fn escape_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.escape_prefix = prefix.into();
        self
    }

    /// Set the minimum supported protocol version
    pub fn min_protocol_version(mut self, version: i32) -> Self {
        self.config.min_protocol_version = version;
        self
    }

    /// Set the FormatError budget per connection
    pub fn max_format_errors(mut self, count: u32) -> Self {
        self.config.max_format_errors = count;
        self
    }

    /// Set the rebuild queue bound
    pub fn rebuild_queue_capacity(mut self, capacity: usize) -> Self {
        self.config.rebuild_queue_capacity = capacity;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
