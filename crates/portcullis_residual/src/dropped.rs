//! Records of residual fragments the pipeline could not honor.
//!
//! The compiler is fail-open: nothing here ever propagates as a hard error
//! by default. Drop records exist so callers can see exactly how much of a
//! residual the final filter enforces, and optionally refuse to proceed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a residual fragment was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropReason {
    /// Text or JSON that matched no supported shape
    Unparsed,
    /// Recognized shape with an operator the compiler does not support
    UnsupportedOperator,
    /// Requires request-time principal context unavailable at compile time
    ContextDependent,
    /// Loosely-keyed object key the heuristic extractor did not understand
    UnknownKey,
}

/// A residual fragment that was dropped, with its reason and source detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedCondition {
    /// Why the fragment was dropped
    pub reason: DropReason,
    /// The fragment, or a short description of it
    pub detail: String,
}

impl DroppedCondition {
    /// Unparseable text or JSON
    #[must_use]
    pub fn unparsed(detail: impl Into<String>) -> Self {
        Self {
            reason: DropReason::Unparsed,
            detail: detail.into(),
        }
    }

    /// Unsupported operator or node shape
    #[must_use]
    pub fn unsupported(detail: impl Into<String>) -> Self {
        Self {
            reason: DropReason::UnsupportedOperator,
            detail: detail.into(),
        }
    }

    /// Needs the requesting principal's attributes
    #[must_use]
    pub fn context_dependent(detail: impl Into<String>) -> Self {
        Self {
            reason: DropReason::ContextDependent,
            detail: detail.into(),
        }
    }

    /// Heuristic extractor key that was not understood
    #[must_use]
    pub fn unknown_key(key: impl Into<String>) -> Self {
        Self {
            reason: DropReason::UnknownKey,
            detail: key.into(),
        }
    }
}

impl fmt::Display for DroppedCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            DropReason::Unparsed => write!(f, "unparseable residual: {}", self.detail),
            DropReason::UnsupportedOperator => {
                write!(f, "unsupported condition: {}", self.detail)
            }
            DropReason::ContextDependent => {
                write!(f, "requires request-time principal context: {}", self.detail)
            }
            DropReason::UnknownKey => write!(f, "unrecognized key: {}", self.detail),
        }
    }
}
