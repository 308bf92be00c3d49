//! Canonical condition AST.
//!
//! Every supported residual shape is normalized into this one type before
//! compilation. Trees are immutable once built and acyclic by construction;
//! the compiler consumes each tree exactly once.

use portcullis_core::{AttributePath, ScalarValue};
use serde::{Deserialize, Serialize};

/// A node in a residual boolean condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    /// A fully-resolved boolean, e.g. an already-evaluated-away `false`
    Literal(bool),

    /// Reference to a principal or resource attribute
    Attribute(AttributePath),

    /// A concrete scalar or entity value
    Value(ScalarValue),

    /// A set literal, e.g. `[Platform::Team::"custco-readers"]`
    Set(Vec<ScalarValue>),

    /// Equality or (when `negated`) inequality between two operands
    Equality {
        /// Left operand
        left: Box<Condition>,
        /// Right operand
        right: Box<Condition>,
        /// True for `!=`
        negated: bool,
    },

    /// Set membership: `container.contains(member)`
    Containment {
        /// The set side
        container: Box<Condition>,
        /// The element side
        member: Box<Condition>,
    },

    /// Conjunction of child conditions
    And(Vec<Condition>),

    /// Disjunction of child conditions
    Or(Vec<Condition>),
}

impl Condition {
    /// Equality between two operands
    #[must_use]
    pub fn equality(left: Condition, right: Condition, negated: bool) -> Self {
        Self::Equality {
            left: Box::new(left),
            right: Box::new(right),
            negated,
        }
    }

    /// Set membership of `member` in `container`
    #[must_use]
    pub fn containment(container: Condition, member: Condition) -> Self {
        Self::Containment {
            container: Box::new(container),
            member: Box::new(member),
        }
    }

    /// A resource attribute reference
    #[must_use]
    pub fn resource_attr(name: impl Into<String>) -> Self {
        Self::Attribute(AttributePath::resource(name))
    }

    /// A scalar value operand
    #[must_use]
    pub fn value(value: impl Into<ScalarValue>) -> Self {
        Self::Value(value.into())
    }
}
