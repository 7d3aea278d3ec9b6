//! Error types for beaconwire-core.
//!
//! This module defines all error types that can occur while encoding,
//! recording and dispatching commands to a peripheral.
//!
//! # Error Classes
//!
//! | Error Type | Origin | Reaches the transport? |
//! |------------|--------|------------------------|
//! | [`Error::InvalidArgument`] | Local validation | No |
//! | [`Error::AlreadyRecording`] | Recorder misuse | No |
//! | [`Error::NotRecording`] | Recorder misuse | No |
//! | [`Error::Protocol`] | Reply contract violated | Already sent |
//! | [`Error::Transport`] | Transport collaborator | Failed while sending |
//! | [`Error::Timeout`] | Write or reply took too long | Maybe |
//! | [`Error::Cancelled`] | Pending signal abandoned | Already sent |
//!
//! ## Protocol errors are terminal
//!
//! A [`ProtocolError`] means the local view of the peripheral's processors
//! no longer matches the peripheral. The board's signal registry stops
//! accepting new creations and every outstanding
//! [`PendingSignal`](crate::registry::PendingSignal) completes with the same
//! error. Start a new board session to recover.
//!
//! ## No retries
//!
//! The engine never retries. Transport failures are passed through
//! unmodified; whether a partially sent recording can be replayed is the
//! transport's decision.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when driving a peripheral.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A value cannot be encoded for the target register.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// `begin_recording` called while a recording is active.
    #[error("A recording is already active on this board")]
    AlreadyRecording,

    /// `end_recording` (or a signal-fed operation) called with no active recording.
    #[error("No recording is active on this board")]
    NotRecording,

    /// The asynchronous reply contract was violated.
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Failure reported by the transport collaborator.
    #[error("Transport failure: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Operation timed out.
    #[error("Operation '{operation}' timed out after {duration:?}")]
    Timeout {
        /// The operation that timed out.
        operation: String,
        /// The timeout duration.
        duration: Duration,
    },

    /// A pending signal was dropped before the peripheral replied.
    #[error("Operation cancelled")]
    Cancelled,
}

/// Violations of the asynchronous reply contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// A pending signal was resolved a second time.
    #[error("pending signal {0} already resolved")]
    DuplicateResolution(u32),

    /// A resolution named a pending id this board never issued.
    #[error("unknown pending signal {0}")]
    UnknownPending(u32),

    /// The peripheral sent a reply nothing was waiting for.
    #[error("unexpected reply: {0}")]
    UnexpectedReply(String),

    /// An earlier violation left the session out of sync with the peripheral.
    #[error("board session diverged from peripheral state")]
    Diverged,
}

impl Error {
    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Wrap a transport collaborator's error.
    pub fn transport(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Transport(err.into())
    }

    /// Create a timeout error with operation context.
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Whether this error stems from local validation or state misuse and
    /// therefore never touched the transport.
    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Error::InvalidArgument(_) | Error::AlreadyRecording | Error::NotRecording
        )
    }
}

impl From<beaconwire_types::ParseError> for Error {
    fn from(err: beaconwire_types::ParseError) -> Self {
        match err {
            beaconwire_types::ParseError::InvalidValue(msg) => Error::InvalidArgument(msg),
            beaconwire_types::ParseError::InsufficientBytes { expected, actual } => {
                Error::Protocol(ProtocolError::UnexpectedReply(format!(
                    "expected {} bytes, got {}",
                    expected, actual
                )))
            }
            // Handle future ParseError variants (non_exhaustive)
            _ => Error::Protocol(ProtocolError::UnexpectedReply(err.to_string())),
        }
    }
}

/// Result type alias using beaconwire-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;
