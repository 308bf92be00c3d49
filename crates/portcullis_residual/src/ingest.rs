//! Residual shape dispatch.
//!
//! The top-level entry point of ingestion. A residual may arrive as raw
//! text, a structured expression, an array of either, or a loosely-keyed
//! object; the dispatcher tries those interpretations in that order and
//! never fails. Whatever cannot be understood contributes nothing beyond a
//! drop record.

use crate::condition::Condition;
use crate::dropped::DroppedCondition;
use crate::{expr, text};
use portcullis_core::{AttributePath, ScalarValue};
use serde_json::{Map, Value};

/// A raw residual as handed over by the policy evaluation engine
#[derive(Debug, Clone, PartialEq)]
pub enum Residual {
    /// Plain text emitted by a partial-evaluation tool
    Text(String),
    /// A structured JSON value
    Value(Value),
}

impl From<&str> for Residual {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Residual {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Value> for Residual {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

/// The outcome of ingesting one residual
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ingested {
    /// Conditions recovered from the residual, in input order
    pub conditions: Vec<Condition>,
    /// Fragments that could not be honored
    pub dropped: Vec<DroppedCondition>,
}

/// Normalize a raw residual into canonical conditions. Never fails;
/// malformed input degrades to drop records.
pub fn ingest(residual: &Residual) -> Ingested {
    let mut out = Ingested::default();
    match residual {
        Residual::Text(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(value) => ingest_value(&value, &mut out),
            Err(_) => match text::parse_text(raw) {
                Ok(cond) => out.conditions.push(cond),
                Err(dropped) => out.dropped.push(dropped),
            },
        },
        Residual::Value(value) => ingest_value(value, &mut out),
    }
    out
}

fn ingest_value(value: &Value, out: &mut Ingested) {
    match value {
        // top-level AND: each element compiles independently
        Value::Array(items) => {
            for item in items {
                ingest_value(item, out);
            }
        }
        Value::Bool(b) => out.conditions.push(Condition::Literal(*b)),
        // a JSON string is still a textual residual
        Value::String(raw) => match text::parse_text(raw) {
            Ok(cond) => out.conditions.push(cond),
            Err(dropped) => out.dropped.push(dropped),
        },
        Value::Object(map) => {
            if is_expression(map) {
                if let Some(cond) = expr::parse_expr(value, &mut out.dropped) {
                    out.conditions.push(cond);
                }
            } else {
                extract_keys(map, out);
            }
        }
        other => {
            tracing::debug!(value = %other, "residual value has no usable shape");
            out.dropped.push(DroppedCondition::unparsed(other.to_string()));
        }
    }
}

fn is_expression(map: &Map<String, Value>) -> bool {
    map.contains_key("expr")
        || map.contains_key("op")
        || map.contains_key("operator")
        || map.get("kind").and_then(Value::as_str).is_some()
}

/// Best-effort extractor for loosely-keyed objects. Lossy by design: only
/// keys naming known attributes are honored, everything else is logged.
fn extract_keys(map: &Map<String, Value>, out: &mut Ingested) {
    for (key, value) in map {
        if !(key.contains("tenant") || key.contains("classification")) {
            tracing::debug!(key = %key, "heuristic extractor ignored key");
            out.dropped.push(DroppedCondition::unknown_key(key));
            continue;
        }

        let attr = Condition::Attribute(AttributePath::resource(key.clone()));
        match value {
            Value::Object(inner) if inner.len() == 1 && inner.contains_key("not") => {
                match ScalarValue::from_json(&inner["not"]) {
                    Some(scalar) => out.conditions.push(Condition::equality(
                        attr,
                        Condition::Value(scalar),
                        true,
                    )),
                    None => {
                        out.dropped
                            .push(DroppedCondition::unparsed(format!("{}: {}", key, value)));
                    }
                }
            }
            Value::Array(items) => {
                let values = items.iter().map(expr::scalar_from_json).collect();
                out.conditions
                    .push(Condition::containment(Condition::Set(values), attr));
            }
            other => match ScalarValue::from_json(other) {
                Some(scalar) => {
                    out.conditions
                        .push(Condition::equality(attr, Condition::Value(scalar), false));
                }
                None => {
                    out.dropped
                        .push(DroppedCondition::unparsed(format!("{}: {}", key, other)));
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dropped::DropReason;
    use portcullis_core::EntityRef;
    use serde_json::json;

    #[test]
    fn test_text_false_is_literal() {
        // "false" parses as JSON, so it arrives as a structured boolean
        let out = ingest(&Residual::from("false"));
        assert_eq!(out.conditions, vec![Condition::Literal(false)]);
        assert!(out.dropped.is_empty());
    }

    #[test]
    fn test_text_falls_back_to_pattern_rules() {
        let out = ingest(&Residual::from(r#"resource.classification == "confidential""#));
        assert_eq!(out.conditions.len(), 1);
        assert!(out.dropped.is_empty());
    }

    #[test]
    fn test_structured_expression_marker() {
        let out = ingest(&Residual::from(json!({
            "op": "==",
            "left": "resource.tenant",
            "right": "custco"
        })));
        assert_eq!(out.conditions.len(), 1);
    }

    #[test]
    fn test_expr_wrapper_marker() {
        let out = ingest(&Residual::from(json!({
            "kind": "expr",
            "expr": {"op": "==", "left": "resource.doc", "right": "d1"}
        })));
        assert_eq!(out.conditions.len(), 1);
    }

    #[test]
    fn test_array_elements_compile_independently() {
        let out = ingest(&Residual::from(json!([
            {"op": "!=", "left": "resource.classification", "right": "confidential"},
            {"op": "==", "left": "resource.tenant", "right": "custco"}
        ])));
        assert_eq!(out.conditions.len(), 2);
        assert!(out.dropped.is_empty());
    }

    #[test]
    fn test_array_of_text_conditions() {
        let out = ingest(&Residual::from(json!([
            "resource.tenant == \"custco\"",
            "resource.customer_readers_team != null"
        ])));
        assert_eq!(out.conditions.len(), 2);
    }

    #[test]
    fn test_heuristic_extractor() {
        let out = ingest(&Residual::from(json!({
            "tenant": "custco",
            "classification": {"not": "secret"},
            "color": "red"
        })));
        assert_eq!(out.conditions.len(), 2);
        assert_eq!(out.dropped.len(), 1);
        assert_eq!(out.dropped[0].reason, DropReason::UnknownKey);
        assert_eq!(out.dropped[0].detail, "color");
    }

    #[test]
    fn test_heuristic_array_value_is_containment() {
        let out = ingest(&Residual::from(json!({
            "tenant": ["Platform::Tenant::\"a\"", "Platform::Tenant::\"b\""]
        })));
        assert_eq!(out.conditions.len(), 1);
        match &out.conditions[0] {
            Condition::Containment { container, .. } => {
                assert_eq!(
                    **container,
                    Condition::Set(vec![
                        ScalarValue::Entity(EntityRef::new("Platform::Tenant", "a")),
                        ScalarValue::Entity(EntityRef::new("Platform::Tenant", "b")),
                    ])
                );
            }
            other => panic!("unexpected condition: {:?}", other),
        }
    }

    #[test]
    fn test_scalar_residual_is_dropped() {
        let out = ingest(&Residual::from(json!(42)));
        assert!(out.conditions.is_empty());
        assert_eq!(out.dropped[0].reason, DropReason::Unparsed);
    }

    #[test]
    fn test_unrecognized_text_never_fails() {
        let out = ingest(&Residual::from("resource.size > 42"));
        assert!(out.conditions.is_empty());
        assert_eq!(out.dropped.len(), 1);
    }

    proptest::proptest! {
        #[test]
        fn test_ingest_never_panics(raw in ".{0,256}") {
            let _ = ingest(&Residual::from(raw.as_str()));
        }
    }
}
