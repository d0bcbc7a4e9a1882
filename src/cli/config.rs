//! TOML configuration file support.
//!
//! Listener settings can be kept in a file instead of passed as flags:
//!
//! ```toml
//! # structfeed.toml
//! [listener]
//! bind_address = "127.0.0.1"
//! port = 4321
//! max_datagram_size = 65507
//! read_timeout_ms = 100
//! channel_capacity = 32
//! ```
//!
//! Command-line flags override values from the file, which override the
//! library defaults.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

use structfeed::listener::ListenerConfig;

/// Root configuration structure for structfeed.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Listener-specific settings.
    #[serde(default)]
    pub listener: ListenerSection,
}

/// Configuration for the listen command.
#[derive(Debug, Default, Deserialize)]
pub struct ListenerSection {
    /// Local address to bind.
    pub bind_address: Option<IpAddr>,

    /// Local UDP port.
    pub port: Option<u16>,

    /// Receive buffer size in bytes.
    pub max_datagram_size: Option<usize>,

    /// Receive timeout in milliseconds.
    pub read_timeout_ms: Option<u64>,

    /// Frames queued for the consumer before new ones are dropped.
    pub channel_capacity: Option<usize>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }
}

impl ListenerSection {
    /// Overlay the values present in the file onto `config`.
    pub fn apply(&self, mut config: ListenerConfig) -> ListenerConfig {
        if let Some(address) = self.bind_address {
            config = config.with_bind_address(address);
        }
        if let Some(port) = self.port {
            config = config.with_port(port);
        }
        if let Some(size) = self.max_datagram_size {
            config = config.with_max_datagram_size(size);
        }
        if let Some(ms) = self.read_timeout_ms {
            config = config.with_read_timeout(Duration::from_millis(ms));
        }
        if let Some(capacity) = self.channel_capacity {
            config = config.with_channel_capacity(capacity);
        }
        config
    }
}
