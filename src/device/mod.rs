//! Device discovery and hot-plug notifications.
//!
//! The native layer supports exactly one event subscription per process.
//! [`SubscriptionRegistry`] shares it between any number of listeners,
//! installing it for the first listener and removing it after the last.

pub mod event;
pub mod native;
pub mod registry;

pub use event::{ConnectionType, DeviceEvent, DeviceEventKind, RawDeviceEvent};
pub use native::{DeviceErrorKind, EventDispatcher, NativeDeviceEvents};
pub use registry::{SubscriptionRegistry, SubscriptionToken};
