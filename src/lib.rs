//! Async Rust bindings over a callback-driven native device-communication layer.
//!
//! The native transport reports progress for long-running requests by calling
//! a C callback repeatedly with untyped status reports, and publishes device
//! hot-plug notifications through a single process-wide subscription. This
//! crate turns the former into single-completion futures with typed errors
//! ([`bridge`]) and the latter into a multi-listener registry ([`device`]).
//!
//! Service clients built on top:
//! - [`instproxy`]: install, upgrade, uninstall, archive, restore, browse, lookup
//! - [`lockdown`]: handshake, sessions, values, pairing, service start

pub mod bridge;
pub mod codec;
pub mod config;
pub mod device;
pub mod errors;
pub mod instproxy;
pub mod lockdown;
pub mod logging;

pub use config::BridgeConfig;
pub use errors::{Error, NativeError, Result};
