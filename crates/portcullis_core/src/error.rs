//! Core error types for PORTCULLIS.

use std::fmt;

/// Core result type
pub type CoreResult<T> = Result<T, CoreError>;

/// Core error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Invalid entity reference
    InvalidEntity {
        /// Why the reference did not parse
        reason: String,
    },

    /// Invalid attribute path
    InvalidAttribute {
        /// Why the path did not parse
        reason: String,
    },

    /// Parse error
    ParseError {
        /// Error message
        message: String,
    },
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEntity { reason } => write!(f, "Invalid entity reference: {}", reason),
            Self::InvalidAttribute { reason } => write!(f, "Invalid attribute path: {}", reason),
            Self::ParseError { message } => write!(f, "Parse error: {}", message),
        }
    }
}

impl std::error::Error for CoreError {}
