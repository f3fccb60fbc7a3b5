//! Installation proxy client.
//!
//! Application management verbs built on the [`crate::bridge`]: long-running
//! requests (install, uninstall, archive, restore, browse) are awaited through
//! the callback bridge, lookups are plain synchronous calls.

pub mod client;
pub mod errors;
pub mod native;
pub mod options;

pub use client::{InstallationProxyClient, SERVICE_NAME};
pub use errors::InstallProxyErrorKind;
pub use native::NativeInstallationProxy;
pub use options::InstallOptions;
