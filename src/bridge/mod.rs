//! Callback-to-async bridge.
//!
//! ## Components
//!
//! - [`status`]: classifies native status reports
//! - [`signal`]: write-once completion signal
//! - [`handles`]: generation-checked table mapping native user data to contexts
//! - [`request`]: request lifecycle and the shared native callback entry point

pub mod handles;
pub mod request;
pub mod signal;
pub mod status;

pub use handles::{HandleTable, OpaqueContext};
pub use request::{PageUpdate, ProgressSink, RequestCallback, RequestProgress, perform, request_callback};
pub use signal::{CompletionSignal, CompletionWaiter, completion};
pub use status::{
    COMPLETE_PHASE, Classification, CurrentList, Page, Phase, SinkShape, StatusError,
    StatusErrorFields, StatusReport, interpret,
};
