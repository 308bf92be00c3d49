//! Scalar values and entity references appearing in residual conditions.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A reference to a concrete entity, e.g. `Platform::Tenant::"custco"`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    /// Fully qualified entity type, e.g. `Platform::Tenant`
    pub entity_type: String,
    /// Entity id, unquoted
    pub id: String,
}

impl EntityRef {
    /// Create an entity reference
    #[must_use]
    pub fn new(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    /// Parse the textual form `Namespace::Type::"id"`
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidEntity` if the id is not quoted or the
    /// type path is empty.
    pub fn parse(s: &str) -> CoreResult<Self> {
        let s = s.trim();
        let (entity_type, id_part) = s.rsplit_once("::").ok_or_else(|| CoreError::InvalidEntity {
            reason: format!("missing :: separator: {}", s),
        })?;

        if entity_type.is_empty() {
            return Err(CoreError::InvalidEntity {
                reason: "empty entity type".to_string(),
            });
        }

        let id = id_part
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
            .ok_or_else(|| CoreError::InvalidEntity {
                reason: format!("entity id must be quoted: {}", id_part),
            })?;

        Ok(Self::new(entity_type, id))
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::\"{}\"", self.entity_type, self.id)
    }
}

/// A fully-resolved value in a residual condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScalarValue {
    /// String literal
    String(String),
    /// Numeric literal
    Number(serde_json::Number),
    /// Boolean literal
    Bool(bool),
    /// Null literal
    Null,
    /// Entity reference; filters on its id
    Entity(EntityRef),
}

impl ScalarValue {
    /// Whether this value is null
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Build from a JSON scalar. Objects and arrays are not scalar values.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) => Some(Self::String(s.clone())),
            serde_json::Value::Number(n) => Some(Self::Number(n.clone())),
            serde_json::Value::Bool(b) => Some(Self::Bool(*b)),
            serde_json::Value::Null => Some(Self::Null),
            _ => None,
        }
    }

    /// The value as it appears in a query clause. Entity references filter
    /// on their id; everything else passes through.
    #[must_use]
    pub fn to_query_value(&self) -> serde_json::Value {
        match self {
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Number(n) => serde_json::Value::Number(n.clone()),
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Null => serde_json::Value::Null,
            Self::Entity(entity) => serde_json::Value::String(entity.id.clone()),
        }
    }
}

impl From<EntityRef> for ScalarValue {
    fn from(entity: EntityRef) -> Self {
        Self::Entity(entity)
    }
}

impl From<&str> for ScalarValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<bool> for ScalarValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_parse() {
        let entity = EntityRef::parse("Platform::Tenant::\"custco\"").unwrap();
        assert_eq!(entity.entity_type, "Platform::Tenant");
        assert_eq!(entity.id, "custco");
    }

    #[test]
    fn test_entity_parse_single_segment_type() {
        let entity = EntityRef::parse("Team::\"readers\"").unwrap();
        assert_eq!(entity.entity_type, "Team");
        assert_eq!(entity.id, "readers");
    }

    #[test]
    fn test_entity_parse_rejects_unquoted_id() {
        assert!(EntityRef::parse("Platform::Tenant::custco").is_err());
        assert!(EntityRef::parse("custco").is_err());
    }

    #[test]
    fn test_entity_display_round_trip() {
        let entity = EntityRef::new("Platform::Team", "custco-readers");
        assert_eq!(entity.to_string(), "Platform::Team::\"custco-readers\"");
        assert_eq!(EntityRef::parse(&entity.to_string()).unwrap(), entity);
    }

    #[test]
    fn test_entity_query_value_is_id() {
        let value = ScalarValue::Entity(EntityRef::new("Platform::Tenant", "custco"));
        assert_eq!(value.to_query_value(), serde_json::json!("custco"));
    }

    #[test]
    fn test_from_json_scalars() {
        assert_eq!(
            ScalarValue::from_json(&serde_json::json!("x")),
            Some(ScalarValue::String("x".to_string()))
        );
        assert_eq!(
            ScalarValue::from_json(&serde_json::json!(null)),
            Some(ScalarValue::Null)
        );
        assert_eq!(ScalarValue::from_json(&serde_json::json!([1, 2])), None);
        assert_eq!(ScalarValue::from_json(&serde_json::json!({"a": 1})), None);
    }

    #[test]
    fn test_is_null() {
        assert!(ScalarValue::Null.is_null());
        assert!(!ScalarValue::Bool(false).is_null());
    }
}
