//! Tracing subscriber setup for binaries and tests embedding the bridge.
//!
//! The library itself only emits `tracing` events; installing a subscriber is
//! left to the host application, which may call [`init`] or bring its own.

use crate::config::BridgeConfig;
use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Build the filter: `RUST_LOG` when set, otherwise `directive`.
pub fn filter(directive: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(directive)
            .with_context(|| format!("Invalid log filter directive: {directive}")),
    }
}

/// Install a global fmt subscriber.
///
/// Returns `Ok(false)` when a global subscriber was already installed.
pub fn init(directive: &str) -> Result<bool> {
    let filter = filter(directive)?;
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok();
    Ok(installed)
}

/// Install a global fmt subscriber using the `[logging]` section.
pub fn init_from_config(config: &BridgeConfig) -> Result<bool> {
    init(&config.logging.filter)
}
