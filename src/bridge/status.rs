//! Status report interpretation.
//!
//! Every invocation of a request callback carries one native status report.
//! [`interpret`] classifies it as a terminal error, a named phase with an
//! optional percentage, or a page of browse results.

use crate::codec::Node;
use crate::errors::{Error, Result};
use crate::instproxy::InstallProxyErrorKind;
use thiserror::Error;

/// Phase name the native layer uses to mark successful completion.
pub const COMPLETE_PHASE: &str = "Complete";

/// Error fields of a status report, as returned by the native accessor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusErrorFields {
    /// Catalog code; 0 when the report carries no error.
    pub code: i32,
    pub name: Option<String>,
    pub description: Option<String>,
    pub detail_code: u64,
}

/// Paging fields of a status report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurrentList {
    pub total: u64,
    pub current_index: u64,
    pub current_amount: u64,
    /// Items on this page; `None` when the report has no list.
    pub list: Option<Node>,
}

/// Accessors over a native status report.
///
/// Reports are owned by the native layer and only valid for the duration of
/// the callback that delivered them, which is why the bridge only ever sees
/// them by reference.
pub trait StatusReport {
    fn error(&self) -> StatusErrorFields;
    fn name(&self) -> Option<String>;
    /// Percent complete, or a negative value when the report carries none.
    fn percent_complete(&self) -> i32;
    fn current_list(&self) -> CurrentList;
}

/// Terminal failure reported through a status callback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{name} (0x{code:x}){}", detail_suffix(.details))]
pub struct StatusError {
    pub kind: InstallProxyErrorKind,
    pub name: String,
    pub details: Option<String>,
    pub code: u64,
}

/// Which progress shape the caller is listening with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkShape {
    Progress,
    Browse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phase {
    pub name: String,
    /// 0..=100, `None` when the native layer did not report one.
    pub percent: Option<u8>,
    pub complete: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub current_index: u64,
    pub total: u64,
    pub current_amount: u64,
    pub items: Option<Node>,
    pub complete: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Error(StatusError),
    Phase(Phase),
    Page(Page),
}

impl Classification {
    /// Whether this report ends the operation.
    pub fn is_terminal(&self) -> bool {
        match self {
            Classification::Error(_) => true,
            Classification::Phase(phase) => phase.complete,
            Classification::Page(page) => page.complete,
        }
    }
}

/// Classify a single status report.
///
/// Fails with [`Error::Internal`] when the report breaks the native contract:
/// an error without a name, or a progress report without a phase name.
pub fn interpret(report: &dyn StatusReport, shape: SinkShape) -> Result<Classification> {
    let fields = report.error();
    if let Some(kind) = InstallProxyErrorKind::from_code(fields.code) {
        let name = fields.name.ok_or_else(|| {
            Error::internal(format!(
                "status report carries error code {} without a name",
                fields.code
            ))
        })?;
        return Ok(Classification::Error(StatusError {
            kind,
            name,
            details: fields.description,
            code: fields.detail_code,
        }));
    }

    let name = report.name();
    let complete = name.as_deref() == Some(COMPLETE_PHASE);

    match shape {
        SinkShape::Progress => {
            let name =
                name.ok_or_else(|| Error::internal("progress status report has no phase name"))?;
            let percent = if complete {
                Some(100)
            } else {
                percent_from_raw(report.percent_complete())
            };
            Ok(Classification::Phase(Phase {
                name,
                percent,
                complete,
            }))
        }
        SinkShape::Browse => {
            let list = report.current_list();
            Ok(Classification::Page(Page {
                current_index: list.current_index,
                total: list.total,
                current_amount: list.current_amount,
                items: list.list,
                complete,
            }))
        }
    }
}

fn detail_suffix(details: &Option<String>) -> String {
    details
        .as_deref()
        .map(|d| format!(": {d}"))
        .unwrap_or_default()
}

fn percent_from_raw(raw: i32) -> Option<u8> {
    if raw < 0 {
        None
    } else {
        Some(raw.min(100) as u8)
    }
}
