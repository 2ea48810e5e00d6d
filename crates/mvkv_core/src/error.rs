//! Error types for mvkv core.

use crate::types::{IsolationLevel, TransactionId};
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in mvkv core operations.
///
/// Errors fall into two classes. Protocol violations (see
/// [`CoreError::is_fatal`]) mean the caller misused the API; they are
/// returned before any state is touched and the session should not carry
/// on as if nothing happened. Everything else is an expected runtime
/// failure that leaves state unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The caller broke the command protocol.
    #[error("protocol violation: {message}")]
    ProtocolViolation {
        /// Description of the violation.
        message: String,
    },

    /// A transaction id that was never allocated.
    #[error("unknown transaction {id}")]
    UnknownTransaction {
        /// The id that was looked up.
        id: TransactionId,
    },

    /// Every transaction id has been handed out.
    #[error("transaction ids exhausted")]
    TransactionIdsExhausted,

    /// The transaction runs at an isolation level without a visibility rule.
    #[error("isolation level {level} is not supported")]
    UnsupportedIsolation {
        /// The offending level.
        level: IsolationLevel,
    },

    /// No visible version exists for the key.
    #[error("{message}")]
    NotFound {
        /// Description of the failed lookup.
        message: String,
    },

    /// Command name not recognized.
    #[error("unimplemented")]
    Unimplemented {
        /// The command that was requested.
        command: String,
    },

    /// Wrong number of arguments for a command.
    #[error("{command} expects {expected} argument(s), got {actual}")]
    InvalidArguments {
        /// The command.
        command: &'static str,
        /// Expected argument count.
        expected: usize,
        /// Supplied argument count.
        actual: usize,
    },

    /// Isolation level name could not be parsed.
    #[error("invalid isolation level: {name}")]
    InvalidIsolation {
        /// The name that failed to parse.
        name: String,
    },
}

impl CoreError {
    /// Creates a protocol violation error.
    pub fn protocol_violation(message: impl Into<String>) -> Self {
        Self::ProtocolViolation {
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates an unimplemented command error.
    pub fn unimplemented(command: impl Into<String>) -> Self {
        Self::Unimplemented {
            command: command.into(),
        }
    }

    /// Creates an unsupported isolation error.
    pub fn unsupported_isolation(level: IsolationLevel) -> Self {
        Self::UnsupportedIsolation { level }
    }

    /// Returns true for protocol and precondition violations.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ProtocolViolation { .. }
                | Self::UnknownTransaction { .. }
                | Self::TransactionIdsExhausted
                | Self::UnsupportedIsolation { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_displays_message_verbatim() {
        let err = CoreError::not_found("cannot get key that does not exist");
        assert_eq!(err.to_string(), "cannot get key that does not exist");
        assert!(!err.is_fatal());
    }

    #[test]
    fn unimplemented_message() {
        let err = CoreError::unimplemented("frobnicate");
        assert_eq!(err.to_string(), "unimplemented");
        assert!(!err.is_fatal());
    }

    #[test]
    fn fatal_classification() {
        assert!(CoreError::protocol_violation("no running transaction").is_fatal());
        assert!(CoreError::UnknownTransaction {
            id: TransactionId::new(9)
        }
        .is_fatal());
        assert!(CoreError::unsupported_isolation(IsolationLevel::Snapshot).is_fatal());
        assert!(CoreError::TransactionIdsExhausted.is_fatal());
        assert!(!CoreError::InvalidIsolation {
            name: "bogus".into()
        }
        .is_fatal());
    }
}
