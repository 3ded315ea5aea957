//! Store error types.
//!
//! Every store failure reaches the cache core through [`StoreError`]. The core
//! never retries or reinterprets these; callers decide whether a store outage
//! means "treat this call as a cache miss".

use std::fmt;

/// Errors that can occur while talking to the backing store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached (pool exhausted, connection refused, timeout).
    #[error("Store unavailable: {message}")]
    Unavailable {
        /// Description of the connectivity failure.
        message: String,
    },

    /// The store was reachable but rejected a command.
    #[error("Store command {command} failed: {message}")]
    Command {
        /// The command that failed, e.g. `SMEMBERS`.
        command: &'static str,
        /// Description of the failure reported by the backend.
        message: String,
    },

    /// An internal backend error occurred.
    #[error("Internal store error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl StoreError {
    /// Creates a new `Unavailable` error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a new `Command` error.
    #[must_use]
    pub fn command(command: &'static str, message: impl Into<String>) -> Self {
        Self::Command {
            command,
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if the store could not be reached at all.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Unavailable { .. } => ErrorCategory::Infrastructure,
            Self::Command { .. } => ErrorCategory::Command,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Categories of store errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Connectivity or pool failure.
    Infrastructure,
    /// Command rejected by the backend.
    Command,
    /// Internal error.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Command => write!(f, "command"),
            Self::Internal => write!(f, "internal"),
        }
    }
}
