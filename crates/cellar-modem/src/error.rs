//! Error types for the modem supervisor

use thiserror::Error;

use cellar_script::DecodeError;

/// Errors returned by collaborator operations
///
/// These never escape the supervisor: enter-action failures are logged and
/// absorbed, and protocol-level failures travel as events instead.
#[derive(Debug, Clone, Error)]
pub enum CollabError {
    /// The collaborator has no attachment to operate on
    #[error("not attached")]
    NotAttached,

    /// The collaborator is not ready for the requested operation yet
    #[error("not ready")]
    NotReady,

    /// Collaborator-specific failure
    #[error("{0}")]
    Other(String),
}

/// Errors returned by the upward query surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The queried value is not available in the current lifecycle state
    #[error("no data in the current lifecycle state")]
    NoData,

    /// The hardware reports the value as unknown
    #[error("hardware reports the value as unknown")]
    OutOfRange,
}

impl From<DecodeError> for QueryError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::OutOfRange => QueryError::OutOfRange,
        }
    }
}

/// Errors returned from a suspend request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SuspendError {
    /// The modem did not reach idle within the suspend deadline
    #[error("modem did not reach idle within the suspend deadline")]
    Timeout,

    /// The supervisor task is no longer running
    #[error("supervisor task stopped")]
    Stopped,
}
