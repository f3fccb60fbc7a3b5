//! Typed error hierarchy for the device bridge.
//!
//! A single [`Error`] enum covers every failure a public operation can report:
//! - `Encoding` / `Decoding`: payload conversion through [`crate::codec`]
//! - `NativeRejected`: the native call refused the request synchronously
//! - `OperationFailed`: a status callback reported a terminal failure
//! - `Internal`: the native layer broke its side of the callback contract
//! - `TimedOut`: the configured operation deadline elapsed
//!
//! Native return codes are mapped through per-service catalogs generated by
//! [`native_error_catalog!`]. Codes missing from a catalog map to an explicit
//! `Unknown(code)` variant instead of failing.

use crate::bridge::StatusError;
use crate::device::DeviceErrorKind;
use crate::instproxy::InstallProxyErrorKind;
use crate::lockdown::LockdownErrorKind;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors from bridged device operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to encode request payload: {0}")]
    Encoding(#[source] serde_json::Error),

    #[error("Failed to decode native payload: {0}")]
    Decoding(#[source] serde_json::Error),

    #[error("Native call rejected: {0}")]
    NativeRejected(NativeError),

    #[error("Operation failed: {0}")]
    OperationFailed(#[from] StatusError),

    #[error("Bridge invariant violated: {0}")]
    Internal(String),

    #[error("Operation did not complete within {0:?}")]
    TimedOut(Duration),
}

impl Error {
    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Error::Internal(message.into())
    }
}

/// A non-success return code from one of the native services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeError {
    InstallationProxy(InstallProxyErrorKind),
    Lockdown(LockdownErrorKind),
    Device(DeviceErrorKind),
}

impl NativeError {
    /// The raw native code this error was mapped from.
    pub fn code(&self) -> i32 {
        match self {
            NativeError::InstallationProxy(kind) => kind.code(),
            NativeError::Lockdown(kind) => kind.code(),
            NativeError::Device(kind) => kind.code(),
        }
    }
}

impl fmt::Display for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeError::InstallationProxy(kind) => {
                write!(f, "installation proxy {:?} ({})", kind, kind.code())
            }
            NativeError::Lockdown(kind) => write!(f, "lockdown {:?} ({})", kind, kind.code()),
            NativeError::Device(kind) => write!(f, "device {:?} ({})", kind, kind.code()),
        }
    }
}

impl From<NativeError> for Error {
    fn from(err: NativeError) -> Self {
        Error::NativeRejected(err)
    }
}

/// Generate a native return-code catalog.
///
/// The generated enum gets an extra `Unknown(i32)` variant, a total
/// `from_code` lookup (`None` only for the success code 0), the reverse
/// `code`, and `check`/`rejected` helpers that turn return codes into errors.
macro_rules! native_error_catalog {
    (
        $(#[$meta:meta])*
        pub enum $name:ident => $wrap:path {
            $($variant:ident = $code:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
            /// A code with no entry in the catalog.
            Unknown(i32),
        }

        impl $name {
            /// Map a native return code; `None` means success.
            pub fn from_code(code: i32) -> Option<Self> {
                match code {
                    0 => None,
                    $($code => Some(Self::$variant),)+
                    other => Some(Self::Unknown(other)),
                }
            }

            /// The native return code for this kind.
            pub fn code(self) -> i32 {
                match self {
                    $(Self::$variant => $code,)+
                    Self::Unknown(code) => code,
                }
            }

            /// Turn a native return code into a `Result`.
            pub fn check(code: i32) -> $crate::errors::Result<()> {
                match Self::from_code(code) {
                    None => Ok(()),
                    Some(kind) => Err($crate::errors::Error::NativeRejected($wrap(kind))),
                }
            }

            /// The error for a native call that reported failure with `code`.
            pub fn rejected(code: i32) -> $crate::errors::Error {
                match Self::from_code(code) {
                    Some(kind) => $crate::errors::Error::NativeRejected($wrap(kind)),
                    None => $crate::errors::Error::internal("native call failed with a success code"),
                }
            }
        }
    };
}

pub(crate) use native_error_catalog;
