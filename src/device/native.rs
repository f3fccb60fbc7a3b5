use super::event::RawDeviceEvent;
use crate::errors::{NativeError, native_error_catalog};
use std::sync::Arc;

native_error_catalog! {
    /// Device layer return codes.
    pub enum DeviceErrorKind => NativeError::Device {
        InvalidArg = -1,
        UnknownError = -2,
        NoDevice = -3,
        NotEnoughData = -4,
        SslError = -6,
        Timeout = -7,
    }
}

/// Receives every raw event while the native subscription is installed.
///
/// Called on a thread owned by the native layer.
pub type EventDispatcher = Arc<dyn Fn(&RawDeviceEvent) + Send + Sync>;

/// Process-wide native device event source.
pub trait NativeDeviceEvents: Send + Sync {
    /// Install the single native subscription.
    fn subscribe(&self, dispatcher: EventDispatcher) -> i32;

    /// Remove the native subscription.
    ///
    /// May wait for an in-flight dispatch to return, but that dispatch must
    /// not be blocked on subscribing or unsubscribing a listener.
    fn unsubscribe(&self) -> i32;

    /// UDIDs of currently attached devices.
    fn device_list(&self) -> Result<Vec<String>, i32>;
}
