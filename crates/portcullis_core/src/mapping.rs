//! Logical-attribute-to-physical-field mapping.
//!
//! The policy schema names attributes logically (`tenant`, `doc`) while the
//! search index stores them under physical field names (`tenant_id`,
//! `doc_id`). The map is total by default: unmapped names pass through
//! unchanged, which makes mapping idempotent beyond the first application.

use indexmap::IndexMap;
use once_cell::sync::Lazy;

/// Process-wide default mapping table
static DEFAULT_FIELDS: Lazy<FieldMap> = Lazy::new(FieldMap::default);

/// Get the process-wide default field map
#[must_use]
pub fn default_fields() -> &'static FieldMap {
    &DEFAULT_FIELDS
}

/// Mapping from logical attribute names to physical index field names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMap {
    fields: IndexMap<String, String>,
}

impl FieldMap {
    /// Create an empty map (every lookup falls back to identity)
    #[must_use]
    pub fn empty() -> Self {
        Self {
            fields: IndexMap::new(),
        }
    }

    /// Add or replace a mapping
    #[must_use]
    pub fn with_field(mut self, logical: impl Into<String>, physical: impl Into<String>) -> Self {
        self.fields.insert(logical.into(), physical.into());
        self
    }

    /// Resolve a logical attribute path to its physical field name.
    ///
    /// A single leading `resource.` prefix is stripped before lookup.
    /// Unmapped names pass through unchanged.
    #[must_use]
    pub fn field(&self, logical: &str) -> String {
        let name = logical.strip_prefix("resource.").unwrap_or(logical);
        self.fields
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }

    /// Number of explicit mappings
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the map has no explicit mappings
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Default for FieldMap {
    fn default() -> Self {
        Self::empty()
            .with_field("tenant", "tenant_id")
            .with_field("customer_readers_team", "customer_readers_team_id")
            .with_field("employee_readers_team", "employee_readers_team_id")
            .with_field("doc", "doc_id")
            .with_field("classification", "classification")
    }
}
