//! Request lifecycle: turning a callback-driven native call into a future.
//!
//! [`perform`] registers an [`OperationContext`] in a process-wide handle
//! table, hands the native call the shared [`request_callback`] entry point
//! together with the context's [`OpaqueContext`], and awaits the context's
//! completion signal. Each native callback invocation is classified, its
//! progress forwarded to the caller's [`ProgressSink`], and the first terminal
//! report resolves the signal.
//!
//! ## Native contract
//!
//! For every accepted request the native layer invokes the callback zero or
//! more times with non-terminal reports and then exactly once with a terminal
//! report (an error, or the `Complete` phase), serially, for that request's
//! context only. The bridge relies on this but does not enforce it; stray
//! callbacks after termination find a released handle and are dropped.
//!
//! ## Cancellation
//!
//! The native layer cannot cancel an in-flight request. Dropping the future
//! returned by a verb abandons the wait but the context stays registered until
//! the native side delivers its terminal callback, so that callback always
//! finds a live context.

use super::handles::{HandleTable, OpaqueContext};
use super::signal::{CompletionSignal, completion};
use super::status::{self, Classification, SinkShape, StatusReport};
use crate::codec::Node;
use crate::errors::{Error, Result};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Signature of the callback handed to native request functions.
pub type RequestCallback = fn(&dyn StatusReport, OpaqueContext);

/// Progress of a single-result request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestProgress {
    /// Native phase name, e.g. `"InstallingApplication"`.
    pub details: String,
    /// 0..=100, `None` when the phase did not report one.
    pub percent: Option<u8>,
}

impl RequestProgress {
    /// Progress as a fraction in `0.0..=1.0`.
    pub fn fraction(&self) -> Option<f64> {
        self.percent.map(|p| f64::from(p) / 100.0)
    }
}

/// One page of a paginated request.
#[derive(Debug, Clone, PartialEq)]
pub struct PageUpdate<T> {
    pub current_index: usize,
    pub total: usize,
    pub items: T,
}

type ProgressFn = Box<dyn Fn(RequestProgress) + Send + Sync>;
type BrowseFn = Box<dyn Fn(PageUpdate<Option<Node>>) + Send + Sync>;

/// Where callback progress goes, by request shape.
pub enum ProgressSink {
    Progress(ProgressFn),
    Browse(BrowseFn),
}

impl ProgressSink {
    pub fn progress(f: impl Fn(RequestProgress) + Send + Sync + 'static) -> Self {
        ProgressSink::Progress(Box::new(f))
    }

    pub fn browse(f: impl Fn(PageUpdate<Option<Node>>) + Send + Sync + 'static) -> Self {
        ProgressSink::Browse(Box::new(f))
    }

    fn shape(&self) -> SinkShape {
        match self {
            ProgressSink::Progress(_) => SinkShape::Progress,
            ProgressSink::Browse(_) => SinkShape::Browse,
        }
    }
}

impl std::fmt::Debug for ProgressSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ProgressSink").field(&self.shape()).finish()
    }
}

/// Per-request state reachable from the native callback.
#[derive(Debug)]
pub(crate) struct OperationContext {
    sink: ProgressSink,
    signal: CompletionSignal<Result<()>>,
}

impl OperationContext {
    /// Deliver one report. Returns the outcome if the report was terminal.
    fn deliver(&self, report: &dyn StatusReport) -> Option<Result<()>> {
        let classification = match status::interpret(report, self.sink.shape()) {
            Ok(classification) => classification,
            Err(err) => return Some(Err(err)),
        };

        match (&self.sink, classification) {
            (_, Classification::Error(err)) => Some(Err(err.into())),
            (ProgressSink::Progress(emit), Classification::Phase(phase)) => {
                debug!(phase = %phase.name, percent = ?phase.percent, "request progress");
                emit(RequestProgress {
                    details: phase.name,
                    percent: phase.percent,
                });
                phase.complete.then_some(Ok(()))
            }
            (ProgressSink::Browse(emit), Classification::Page(page)) => {
                debug!(
                    index = page.current_index,
                    total = page.total,
                    amount = page.current_amount,
                    "request page"
                );
                emit(PageUpdate {
                    current_index: page.current_index as usize,
                    total: page.total as usize,
                    items: page.items,
                });
                page.complete.then_some(Ok(()))
            }
            (sink, other) => Some(Err(Error::internal(format!(
                "{:?} classification does not fit {:?}",
                other, sink
            )))),
        }
    }
}

static CONTEXTS: HandleTable<OperationContext> = HandleTable::new();

/// Shared entry point for every native request callback.
///
/// Runs on a native-owned thread. Never unwinds: a panicking progress
/// handler fails the request instead.
pub fn request_callback(report: &dyn StatusReport, context: OpaqueContext) {
    let Some(operation) = CONTEXTS.get(context) else {
        warn!(
            context = context.as_raw(),
            "status callback for an unknown or released request context"
        );
        return;
    };

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| operation.deliver(report)))
        .unwrap_or_else(|_| Some(Err(Error::internal("progress handler panicked"))));

    if let Some(outcome) = outcome {
        debug!(context = context.as_raw(), ok = outcome.is_ok(), "request finished");
        operation.signal.resolve(outcome);
        CONTEXTS.remove(context);
    }
}

/// Drive one native request to completion.
///
/// `start` performs the native call with the callback and context it is
/// given and maps the native return code; an `Err` means the request never
/// started, so no callback will fire and nothing is awaited.
pub async fn perform<F>(sink: ProgressSink, timeout: Option<Duration>, start: F) -> Result<()>
where
    F: FnOnce(RequestCallback, OpaqueContext) -> Result<()>,
{
    let (signal, waiter) = completion();
    let context = CONTEXTS
        .insert(Arc::new(OperationContext { sink, signal }))
        .ok_or_else(|| Error::internal("request context table exhausted"))?;

    if let Err(err) = start(request_callback, context) {
        debug!(context = context.as_raw(), error = %err, "native call rejected request");
        CONTEXTS.remove(context);
        return Err(err);
    }

    waiter.wait_timeout(timeout).await?
}
