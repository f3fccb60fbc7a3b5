//! Bridge configuration.
//!
//! Read from `mobiledevice.toml`; every section is optional and environment
//! variables override file values.
//!
//! ```toml
//! [client]
//! label = "my-tool"
//!
//! [operations]
//! timeout_secs = 300
//!
//! [logging]
//! filter = "mobiledevice=debug"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Default configuration file name.
pub const CONFIG_FILE: &str = "mobiledevice.toml";

/// Label reported to the device when none is configured.
pub const DEFAULT_LABEL: &str = "mobiledevice";

/// Overrides `[client] label`.
pub const LABEL_ENV: &str = "MOBILEDEVICE_LABEL";

/// Overrides `[operations] timeout_secs`; `0` disables the timeout.
pub const TIMEOUT_ENV: &str = "MOBILEDEVICE_TIMEOUT_SECS";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientSection {
    /// Client label sent during the lockdown handshake.
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationsSection {
    /// Upper bound on how long a long-running request is awaited.
    ///
    /// Unset means wait for the native terminal status indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSection {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` wins when set.
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_filter() -> String {
    "info".to_string()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub client: ClientSection,
    #[serde(default)]
    pub operations: OperationsSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

impl BridgeConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse mobiledevice.toml")
    }

    /// Load `mobiledevice.toml` from `dir`, or defaults if it does not exist.
    pub fn load_or_default(dir: &Path) -> Result<Self> {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize mobiledevice.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Client label, with fallback to environment variable and then the default.
    pub fn label(&self) -> String {
        std::env::var(LABEL_ENV)
            .ok()
            .filter(|label| !label.is_empty())
            .or_else(|| self.client.label.clone())
            .unwrap_or_else(|| DEFAULT_LABEL.to_string())
    }

    /// Operation timeout, with the environment variable taking precedence.
    pub fn operation_timeout(&self) -> Option<Duration> {
        resolve_timeout(std::env::var(TIMEOUT_ENV).ok(), self.operations.timeout_secs)
    }
}

/// An unparsable override is ignored in favour of the file value.
fn resolve_timeout(env_value: Option<String>, file_secs: Option<u64>) -> Option<Duration> {
    let secs = match env_value {
        Some(value) => match value.trim().parse::<u64>() {
            Ok(secs) => Some(secs),
            Err(_) => {
                warn!(
                    value = %value,
                    "ignoring invalid {TIMEOUT_ENV}; expected whole seconds"
                );
                file_secs
            }
        },
        None => file_secs,
    };
    secs.filter(|&s| s > 0).map(Duration::from_secs)
}
