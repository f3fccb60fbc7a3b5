//! Lockdown client.
//!
//! Lockdown is the device's control service: it identifies the device, holds
//! its key/value domains, manages pairing and sessions, and starts the other
//! services (such as the installation proxy) on request.

pub mod client;
pub mod errors;
pub mod native;

pub use client::{DEFAULT_PAIR_OPTIONS, LockdownClient};
pub use errors::LockdownErrorKind;
pub use native::{LockdownConnector, NativeLockdown, PairRecord, ServiceDescriptor, SessionId};
