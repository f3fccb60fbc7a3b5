//! Write-once completion signal.
//!
//! A [`CompletionSignal`] is resolved from whichever thread observes the end
//! of an operation (usually a native callback thread) and the matching
//! [`CompletionWaiter`] is awaited by the task that started it. The first
//! resolution wins; later ones are ignored so a late error notification can
//! never redefine an outcome that was already delivered.

use crate::errors::{Error, Result};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::debug;

/// Create a connected signal/waiter pair in the pending state.
pub fn completion<T>() -> (CompletionSignal<T>, CompletionWaiter<T>) {
    let (tx, rx) = oneshot::channel();
    (
        CompletionSignal {
            tx: Mutex::new(Some(tx)),
        },
        CompletionWaiter { rx },
    )
}

/// Resolving half. Shared by reference with the callback side.
#[derive(Debug)]
pub struct CompletionSignal<T> {
    tx: Mutex<Option<oneshot::Sender<T>>>,
}

impl<T> CompletionSignal<T> {
    /// Resolve the signal with `value`.
    ///
    /// Returns `false` and drops `value` if the signal was already resolved.
    /// A waiter that has gone away does not count as a failure: the signal
    /// is still resolved.
    pub fn resolve(&self, value: T) -> bool {
        let sender = self
            .tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match sender {
            Some(tx) => {
                if tx.send(value).is_err() {
                    debug!("completion resolved after its waiter was dropped");
                }
                true
            }
            None => {
                debug!("completion already resolved; ignoring duplicate resolution");
                false
            }
        }
    }

    /// Whether [`resolve`](Self::resolve) has already been called.
    pub fn is_resolved(&self) -> bool {
        self.tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

/// Awaiting half. Consumed by the single waiter.
#[derive(Debug)]
pub struct CompletionWaiter<T> {
    rx: oneshot::Receiver<T>,
}

impl<T> CompletionWaiter<T> {
    /// Suspend until the signal is resolved.
    ///
    /// Fails with [`Error::Internal`] if the signal is dropped without ever
    /// being resolved.
    pub async fn wait(self) -> Result<T> {
        self.rx
            .await
            .map_err(|_| Error::internal("completion signal dropped before it was resolved"))
    }

    /// Like [`wait`](Self::wait), bounded by an optional deadline.
    pub async fn wait_timeout(self, timeout: Option<Duration>) -> Result<T> {
        match timeout {
            None => self.wait().await,
            Some(limit) => tokio::time::timeout(limit, self.wait())
                .await
                .map_err(|_| Error::TimedOut(limit))?,
        }
    }
}
