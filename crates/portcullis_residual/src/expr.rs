//! Structured residual expressions.
//!
//! Structured residuals follow a loose `{op|operator|kind, left|lhs,
//! right|rhs, children|args}` skeleton. Parsing is fail-open per node: an
//! unsupported operator or operand drops that node (recorded on the
//! accumulator) without discarding its siblings.

use crate::condition::Condition;
use crate::dropped::DroppedCondition;
use portcullis_core::{AttributeBase, AttributePath, EntityRef, ScalarValue};
use serde_json::{Map, Value};

const LEFT_KEYS: [&str; 2] = ["left", "lhs"];
const RIGHT_KEYS: [&str; 2] = ["right", "rhs"];

/// Parse a structured expression value into the canonical AST.
///
/// Returns `None` when the node itself cannot be understood; the reason is
/// pushed onto `dropped`. Child failures inside `and`/`or` drop only the
/// failing child.
pub fn parse_expr(value: &Value, dropped: &mut Vec<DroppedCondition>) -> Option<Condition> {
    match value {
        Value::Bool(b) => Some(Condition::Literal(*b)),
        Value::String(s) => Some(operand_from_text(s)),
        Value::Object(map) => parse_object(map, dropped),
        other => {
            tracing::debug!(value = %other, "expression node is not an object");
            dropped.push(DroppedCondition::unparsed(other.to_string()));
            None
        }
    }
}

fn parse_object(map: &Map<String, Value>, dropped: &mut Vec<DroppedCondition>) -> Option<Condition> {
    // `{"expr": ...}` and `{"kind": "expr", "expr": ...}` wrap the real node
    if let Some(inner) = map.get("expr") {
        return parse_expr(inner, dropped);
    }

    let Some(op) = ["op", "operator", "kind"]
        .iter()
        .find_map(|key| map.get(*key).and_then(Value::as_str))
    else {
        dropped.push(DroppedCondition::unsupported(summary(map)));
        return None;
    };

    match op.to_ascii_lowercase().as_str() {
        "==" | "eq" | "equals" => equality(map, false, dropped),
        "!=" | "ne" | "neq" => equality(map, true, dropped),
        "&&" | "and" => Some(Condition::And(children(map, dropped))),
        "||" | "or" => Some(Condition::Or(children(map, dropped))),
        "contains" | "in" => containment(map, dropped),
        other => {
            tracing::debug!(op = other, "unsupported expression operator");
            dropped.push(DroppedCondition::unsupported(other));
            None
        }
    }
}

fn equality(
    map: &Map<String, Value>,
    negated: bool,
    dropped: &mut Vec<DroppedCondition>,
) -> Option<Condition> {
    let left = operand(map, &LEFT_KEYS, dropped)?;
    let right = operand(map, &RIGHT_KEYS, dropped)?;
    Some(Condition::equality(left, right, negated))
}

fn containment(map: &Map<String, Value>, dropped: &mut Vec<DroppedCondition>) -> Option<Condition> {
    let container = operand(map, &LEFT_KEYS, dropped)?;
    let member = operand(map, &RIGHT_KEYS, dropped)?;
    Some(Condition::containment(container, member))
}

fn children(map: &Map<String, Value>, dropped: &mut Vec<DroppedCondition>) -> Vec<Condition> {
    let items = ["children", "args"]
        .iter()
        .find_map(|key| map.get(*key).and_then(Value::as_array));

    if let Some(items) = items {
        return items
            .iter()
            .filter_map(|item| parse_expr(item, dropped))
            .collect();
    }

    // binary form: left/right instead of a child array
    let mut out = Vec::new();
    for keys in [&LEFT_KEYS, &RIGHT_KEYS] {
        if let Some(value) = keys.iter().find_map(|key| map.get(*key)) {
            if let Some(cond) = parse_expr(value, dropped) {
                out.push(cond);
            }
        }
    }
    out
}

fn operand(
    map: &Map<String, Value>,
    keys: &[&str; 2],
    dropped: &mut Vec<DroppedCondition>,
) -> Option<Condition> {
    let Some(value) = keys.iter().find_map(|key| map.get(*key)) else {
        dropped.push(DroppedCondition::unsupported(format!(
            "missing {} operand: {}",
            keys[0],
            summary(map)
        )));
        return None;
    };
    parse_operand(value, dropped)
}

fn parse_operand(value: &Value, dropped: &mut Vec<DroppedCondition>) -> Option<Condition> {
    match value {
        Value::String(s) => Some(operand_from_text(s)),
        Value::Bool(b) => Some(Condition::Value(ScalarValue::Bool(*b))),
        Value::Null => Some(Condition::Value(ScalarValue::Null)),
        Value::Number(n) => Some(Condition::Value(ScalarValue::Number(n.clone()))),
        Value::Array(items) => Some(Condition::Set(
            items.iter().map(scalar_from_json).collect(),
        )),
        Value::Object(map) => {
            if let Some(var) = map.get("var").and_then(Value::as_str) {
                return Some(var_operand(var, map));
            }
            if let Some(entity) = map.get("entity") {
                return entity_operand(entity, dropped);
            }
            // anything else is a nested expression
            parse_object(map, dropped)
        }
    }
}

fn var_operand(var: &str, map: &Map<String, Value>) -> Condition {
    // `{"var": "resource", "attr": "tenant"}` or `{"var": "resource.tenant"}`
    let attr = ["attr", "name"]
        .iter()
        .find_map(|key| map.get(*key).and_then(Value::as_str));
    match attr {
        Some(name) if var == "principal" => {
            Condition::Attribute(AttributePath::principal(name))
        }
        Some(name) => Condition::Attribute(AttributePath {
            base: AttributeBase::Resource,
            name: name.to_string(),
        }),
        None => operand_from_text(var),
    }
}

fn entity_operand(value: &Value, dropped: &mut Vec<DroppedCondition>) -> Option<Condition> {
    let entity_type = value.get("type").and_then(Value::as_str);
    let id = value.get("id").and_then(Value::as_str);
    match (entity_type, id) {
        (Some(entity_type), Some(id)) => Some(Condition::Value(ScalarValue::Entity(
            EntityRef::new(entity_type, id),
        ))),
        _ => {
            dropped.push(DroppedCondition::unparsed(value.to_string()));
            None
        }
    }
}

fn operand_from_text(s: &str) -> Condition {
    if let Ok(path) = AttributePath::parse(s) {
        Condition::Attribute(path)
    } else if let Ok(entity) = EntityRef::parse(s) {
        Condition::Value(ScalarValue::Entity(entity))
    } else {
        Condition::Value(ScalarValue::String(s.to_string()))
    }
}

pub(crate) fn scalar_from_json(value: &Value) -> ScalarValue {
    if let Value::String(s) = value {
        if let Ok(entity) = EntityRef::parse(s) {
            return ScalarValue::Entity(entity);
        }
    }
    ScalarValue::from_json(value).unwrap_or_else(|| ScalarValue::String(value.to_string()))
}

fn summary(map: &Map<String, Value>) -> String {
    let keys: Vec<&str> = map.keys().map(String::as_str).collect();
    format!("object with keys [{}]", keys.join(", "))
}
