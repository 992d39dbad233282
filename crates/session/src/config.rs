//! Manipulator configuration via `manipulate.toml`
//!
//! ```toml
//! servers = ["10.0.0.1:9042", "10.0.0.2:9042"]
//! keyspace = "inventory"
//! protocol_version = 4
//! # timeout_ms = 600
//! # retries = 10
//! ```

use crate::cluster::{ClusterConfig, DEFAULT_PROTOCOL_VERSION};
use crate::retry::RetryPolicy;
use manipulate_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "manipulate.toml";

/// Connection settings for a manipulator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManipulatorConfig {
    /// Node addresses (`host:port`)
    pub servers: Vec<String>,
    /// Keyspace
    pub keyspace: String,
    /// Native protocol version (1 to 5)
    #[serde(default = "default_protocol_version")]
    pub protocol_version: u8,
    /// Per-query timeout; the process-wide default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    /// Retries per query; 10 when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<usize>,
}

fn default_protocol_version() -> u8 {
    DEFAULT_PROTOCOL_VERSION
}

impl ManipulatorConfig {
    /// Settings for the given cluster with every optional value defaulted
    pub fn new(servers: Vec<String>, keyspace: impl Into<String>) -> Self {
        ManipulatorConfig {
            servers,
            keyspace: keyspace.into(),
            protocol_version: DEFAULT_PROTOCOL_VERSION,
            timeout_ms: None,
            retries: None,
        }
    }

    /// Reject settings no session could be opened with
    pub fn validate(&self) -> Result<()> {
        if self.servers.is_empty() || self.servers.iter().any(|s| s.trim().is_empty()) {
            return Err(Error::InvalidConfig("at least one server address is required".into()));
        }
        if self.keyspace.trim().is_empty() {
            return Err(Error::InvalidConfig("keyspace must not be empty".into()));
        }
        if !(1..=5).contains(&self.protocol_version) {
            return Err(Error::InvalidConfig(format!(
                "unsupported protocol version {}, expected 1 to 5",
                self.protocol_version
            )));
        }
        if self.timeout_ms == Some(0) {
            return Err(Error::InvalidConfig("timeout_ms must be positive".into()));
        }
        if self.retries == Some(0) {
            return Err(Error::InvalidConfig(
                "retries must be positive; omit it for the default".into(),
            ));
        }
        Ok(())
    }

    /// The cluster configuration these settings describe
    pub fn cluster_config(&self) -> ClusterConfig {
        let mut config = ClusterConfig::new(self.servers.clone(), &self.keyspace, self.protocol_version);
        if let Some(ms) = self.timeout_ms {
            config = config.with_timeout(Duration::from_millis(ms));
        }
        if let Some(retries) = self.retries {
            config = config.with_retry(RetryPolicy::new().with_max_retries(retries));
        }
        config
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ManipulatorConfig = toml::from_str(content)
            .map_err(|e| Error::InvalidConfig(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::InvalidConfig(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            Error::InvalidConfig(msg) => {
                Error::InvalidConfig(format!("{} ({})", msg, path.display()))
            }
            other => other,
        })
    }

    /// Returns the default config file content with comments
    pub fn default_toml() -> &'static str {
        r#"# manipulate configuration
#
# Store nodes to contact (host:port)
servers = ["127.0.0.1:9042"]

# Keyspace every statement runs in
keyspace = "manipulate"

# Native protocol version (1 to 5)
protocol_version = 4

# Per-query timeout in milliseconds (default: 600)
# timeout_ms = 600

# Retries per query on timeouts and unavailable replicas (default: 10)
# retries = 10
"#
    }

    /// Write the default config file if it does not already exist
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::InvalidConfig(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize to TOML and write to `path`
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::InvalidConfig(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::InvalidConfig(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
