//! Clause primitives for boolean search-engine queries.

use serde::{Serialize, Serializer};
use serde_json::Value;

/// An atomic filter clause
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// Exact match on one field value: `{"term": {<field>: <value>}}`
    Term {
        /// Physical field name
        field: String,
        /// Value to match
        value: Value,
    },

    /// Match any of several values: `{"terms": {<field>: [<values>]}}`
    Terms {
        /// Physical field name
        field: String,
        /// Values, any of which matches
        values: Vec<Value>,
    },

    /// Field presence check: `{"exists": {"field": <field>}}`
    Exists {
        /// Physical field name
        field: String,
    },
}

impl Clause {
    /// Exact-match clause
    #[must_use]
    pub fn term(field: impl Into<String>, value: Value) -> Self {
        Self::Term {
            field: field.into(),
            value,
        }
    }

    /// Any-of clause
    #[must_use]
    pub fn terms(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self::Terms {
            field: field.into(),
            values,
        }
    }

    /// Field-presence clause
    #[must_use]
    pub fn exists(field: impl Into<String>) -> Self {
        Self::Exists {
            field: field.into(),
        }
    }

    /// Render as the search engine's JSON clause grammar
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Term { field, value } => wrap("term", entry(field, value.clone())),
            Self::Terms { field, values } => {
                wrap("terms", entry(field, Value::Array(values.clone())))
            }
            Self::Exists { field } => wrap("exists", entry("field", Value::String(field.clone()))),
        }
    }
}

fn entry(key: &str, value: Value) -> Value {
    let mut map = serde_json::Map::new();
    map.insert(key.to_string(), value);
    Value::Object(map)
}

fn wrap(kind: &str, inner: Value) -> Value {
    entry(kind, inner)
}

impl Serialize for Clause {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_value().serialize(serializer)
    }
}

/// The `must` / `must_not` / `should` triple a condition compiles into.
///
/// A clause lands in exactly one sequence, in production order. `should` is
/// "at least one must match" and only becomes meaningful when the assembler
/// attaches `minimum_should_match = 1`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClauseSet {
    /// Conjunctive clauses
    pub must: Vec<Clause>,
    /// Negated conjunctive clauses
    pub must_not: Vec<Clause>,
    /// Disjunctive clauses
    pub should: Vec<Clause>,
}

impl ClauseSet {
    /// Whether no clause was produced
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.must.is_empty() && self.must_not.is_empty() && self.should.is_empty()
    }

    /// Total number of clauses across the three sequences
    #[must_use]
    pub fn len(&self) -> usize {
        self.must.len() + self.must_not.len() + self.should.len()
    }

    /// Append another set's sequences onto this one, preserving order
    pub fn extend(&mut self, other: ClauseSet) {
        self.must.extend(other.must);
        self.must_not.extend(other.must_not);
        self.should.extend(other.should);
    }
}
