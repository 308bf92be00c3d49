//! Compilation errors for the fail-closed enforcement mode.

use portcullis_residual::{DropReason, DroppedCondition};

/// Why a fail-closed compilation was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// Text or JSON that matched no supported residual shape
    #[error("unparseable residual: {detail}")]
    Parse {
        /// The offending fragment
        detail: String,
    },

    /// Recognized shape with an unsupported operator or pattern
    #[error("unresolved condition: {detail}")]
    Unresolved {
        /// The offending fragment
        detail: String,
    },

    /// Condition needs the requesting principal's attributes
    #[error("condition requires request-time principal context: {detail}")]
    ContextDependent {
        /// The offending fragment
        detail: String,
    },
}

impl From<&DroppedCondition> for CompileError {
    fn from(dropped: &DroppedCondition) -> Self {
        let detail = dropped.detail.clone();
        match dropped.reason {
            DropReason::Unparsed => Self::Parse { detail },
            DropReason::UnsupportedOperator | DropReason::UnknownKey => {
                Self::Unresolved { detail }
            }
            DropReason::ContextDependent => Self::ContextDependent { detail },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = CompileError::ContextDependent {
            detail: "principal.teams".to_string(),
        };
        assert!(err.to_string().contains("request-time"));
    }

    #[test]
    fn test_from_dropped() {
        let err: CompileError = (&DroppedCondition::unparsed("garbage")).into();
        assert_eq!(
            err,
            CompileError::Parse {
                detail: "garbage".to_string()
            }
        );

        let err: CompileError = (&DroppedCondition::unknown_key("color")).into();
        assert!(matches!(err, CompileError::Unresolved { .. }));
    }
}
