//! Fan-out of the single native device event subscription.
//!
//! Listeners are kept in subscription order under a state mutex. Dispatch
//! never takes that mutex: it reads a published snapshot of the listener
//! list, so a native unsubscribe that waits for its event thread to drain
//! cannot deadlock against an in-flight dispatch.

use super::event::{DeviceEvent, RawDeviceEvent};
use super::native::{DeviceErrorKind, EventDispatcher, NativeDeviceEvents};
use crate::errors::Result;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, RwLock, Weak};
use tracing::{debug, trace, warn};

type Listener = Arc<dyn Fn(&DeviceEvent) + Send + Sync>;

/// Identifies one listener; pass it back to [`SubscriptionRegistry::unsubscribe`].
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionToken(u64);

impl SubscriptionToken {
    pub fn id(&self) -> u64 {
        self.0
    }
}

#[derive(Default)]
struct RegistryState {
    listeners: BTreeMap<u64, Listener>,
    native_active: bool,
    next_token: u64,
}

#[derive(Default)]
struct Shared {
    state: Mutex<RegistryState>,
    published: RwLock<Arc<Vec<Listener>>>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &RegistryState) {
        let snapshot: Vec<Listener> = state.listeners.values().cloned().collect();
        *self.published.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(snapshot);
    }

    fn snapshot(&self) -> Arc<Vec<Listener>> {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn dispatch(&self, raw: &RawDeviceEvent) {
        let Some(event) = DeviceEvent::from_raw(raw) else {
            trace!(
                event = raw.event,
                conn_type = raw.conn_type,
                "dropping unrecognised device event"
            );
            return;
        };

        let listeners = self.snapshot();
        trace!(udid = %event.udid, kind = ?event.kind, listeners = listeners.len(), "device event");
        for listener in listeners.iter() {
            if panic::catch_unwind(AssertUnwindSafe(|| listener(&event))).is_err() {
                warn!(udid = %event.udid, "device event listener panicked");
            }
        }
    }
}

/// Shares the process-wide native device subscription between listeners.
///
/// The native subscription is installed while at least one listener is
/// registered and removed when the last one unsubscribes. Listeners run on
/// the native event thread, in subscription order.
pub struct SubscriptionRegistry {
    source: Arc<dyn NativeDeviceEvents>,
    shared: Arc<Shared>,
}

static GLOBAL: OnceLock<SubscriptionRegistry> = OnceLock::new();

impl SubscriptionRegistry {
    pub fn new(source: Arc<dyn NativeDeviceEvents>) -> Self {
        Self {
            source,
            shared: Arc::new(Shared::default()),
        }
    }

    /// Install the process-wide registry. Later calls return the first one.
    pub fn install_global(source: Arc<dyn NativeDeviceEvents>) -> &'static Self {
        GLOBAL.get_or_init(|| Self::new(source))
    }

    /// The process-wide registry, if installed.
    pub fn global() -> Option<&'static Self> {
        GLOBAL.get()
    }

    /// Register `listener` for every device event from now on.
    ///
    /// The first listener installs the native subscription; if the native
    /// layer refuses, the listener is not registered.
    pub fn subscribe(
        &self,
        listener: impl Fn(&DeviceEvent) + Send + Sync + 'static,
    ) -> Result<SubscriptionToken> {
        let mut state = self.shared.lock();
        let id = state.next_token;
        state.next_token += 1;
        state.listeners.insert(id, Arc::new(listener));
        // Published before the native subscribe so events it delivers
        // synchronously already reach the new listener.
        self.shared.publish(&state);

        if !state.native_active {
            let shared: Weak<Shared> = Arc::downgrade(&self.shared);
            let dispatcher: EventDispatcher = Arc::new(move |raw: &RawDeviceEvent| {
                if let Some(shared) = shared.upgrade() {
                    shared.dispatch(raw);
                }
            });

            if let Err(err) = DeviceErrorKind::check(self.source.subscribe(dispatcher)) {
                state.listeners.remove(&id);
                self.shared.publish(&state);
                warn!(error = %err, "native device subscription refused");
                return Err(err);
            }
            state.native_active = true;
            debug!("native device subscription installed");
        }

        debug!(token = id, listeners = state.listeners.len(), "device listener added");
        Ok(SubscriptionToken(id))
    }

    /// Remove a listener. Unknown or already-removed tokens are ignored.
    pub fn unsubscribe(&self, token: &SubscriptionToken) {
        let mut state = self.shared.lock();
        if state.listeners.remove(&token.0).is_none() {
            trace!(token = token.0, "unsubscribe of unknown token");
            return;
        }
        self.shared.publish(&state);
        debug!(token = token.0, listeners = state.listeners.len(), "device listener removed");

        if state.listeners.is_empty() && state.native_active {
            state.native_active = false;
            match DeviceErrorKind::check(self.source.unsubscribe()) {
                Ok(()) => debug!("native device subscription removed"),
                Err(err) => warn!(error = %err, "native device unsubscribe failed"),
            }
        }
    }

    /// Whether the native subscription is currently installed.
    pub fn is_active(&self) -> bool {
        self.shared.lock().native_active
    }

    pub fn listener_count(&self) -> usize {
        self.shared.lock().listeners.len()
    }

    /// UDIDs of currently attached devices.
    pub fn udids(&self) -> Result<Vec<String>> {
        self.source.device_list().map_err(DeviceErrorKind::rejected)
    }
}

impl Drop for SubscriptionRegistry {
    fn drop(&mut self) {
        let state = self.shared.lock();
        if state.native_active {
            debug!("registry dropped with listeners; removing native subscription");
            if let Err(err) = DeviceErrorKind::check(self.source.unsubscribe()) {
                warn!(error = %err, "native device unsubscribe failed");
            }
        }
    }
}
