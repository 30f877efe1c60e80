//! Error taxonomy for dispatched calls.

use std::fmt;

/// Broad category of a call failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Required argument missing, empty or of the wrong type
    Construction,
    /// Options argument malformed, or an option key has the wrong type
    Validation,
    /// Completion handler missing or not invocable, or no such operation
    Invocation,
    /// The operation's business rule rejected the input
    Domain,
    /// Pool or event-loop failure outside the operation's control
    Runtime,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Construction => write!(f, "construction"),
            ErrorKind::Validation => write!(f, "validation"),
            ErrorKind::Invocation => write!(f, "invocation"),
            ErrorKind::Domain => write!(f, "domain"),
            ErrorKind::Runtime => write!(f, "runtime"),
        }
    }
}

/// Errors produced by a dispatched call.
///
/// Construction, validation and invocation errors are raised before any task
/// exists. Domain and runtime errors are delivered through the completion
/// path for asynchronous calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallError {
    #[error("{0}")]
    Construction(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Invocation(String),

    #[error("{0}")]
    Domain(String),

    #[error("{0}")]
    Runtime(String),
}

impl CallError {
    pub fn construction(message: impl Into<String>) -> Self {
        CallError::Construction(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        CallError::Validation(message.into())
    }

    pub fn invocation(message: impl Into<String>) -> Self {
        CallError::Invocation(message.into())
    }

    pub fn domain(message: impl Into<String>) -> Self {
        CallError::Domain(message.into())
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        CallError::Runtime(message.into())
    }

    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            CallError::Construction(_) => ErrorKind::Construction,
            CallError::Validation(_) => ErrorKind::Validation,
            CallError::Invocation(_) => ErrorKind::Invocation,
            CallError::Domain(_) => ErrorKind::Domain,
            CallError::Runtime(_) => ErrorKind::Runtime,
        }
    }

    /// Human-readable description
    pub fn message(&self) -> &str {
        match self {
            CallError::Construction(m)
            | CallError::Validation(m)
            | CallError::Invocation(m)
            | CallError::Domain(m)
            | CallError::Runtime(m) => m,
        }
    }

    /// True for failures that are rejected before any task is created
    pub fn is_preflight(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Construction | ErrorKind::Validation | ErrorKind::Invocation
        )
    }
}
