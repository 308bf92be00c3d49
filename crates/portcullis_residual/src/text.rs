//! Textual residual forms.
//!
//! Partial-evaluation tools sometimes emit the residual as plain text rather
//! than structured data. This module recognizes a fixed, ordered set of
//! textual forms; the first matching rule wins and later rules are never
//! consulted. Order is load-bearing: the entity-equality rules overlap the
//! generic string-equality rule and must be tried first.

use crate::condition::Condition;
use crate::dropped::DroppedCondition;
use once_cell::sync::Lazy;
use portcullis_core::{AttributePath, EntityRef, ScalarValue};
use regex::{Captures, Regex};

/// Entity reference literal, e.g. `Platform::Tenant::"custco"`
const ENTITY: &str = r#"((?:[A-Za-z_]\w*::)+"[^"]*")"#;
/// Resource attribute reference, optionally parenthesized by the caller
const ATTR: &str = r"resource\.([A-Za-z_][\w.]*)";

struct TextRule {
    name: &'static str,
    pattern: Regex,
    build: fn(&Captures<'_>) -> Result<Condition, DroppedCondition>,
}

static RULES: Lazy<Vec<TextRule>> = Lazy::new(build_rules);

fn build_rules() -> Vec<TextRule> {
    let rule = |name: &'static str,
                pattern: String,
                build: fn(&Captures<'_>) -> Result<Condition, DroppedCondition>| {
        TextRule {
            name,
            pattern: Regex::new(&pattern).expect("static text rule pattern"),
            build,
        }
    };

    vec![
        rule("literal-false", r"^\s*false\s*$".to_string(), literal_false),
        rule(
            "entity-eq-attr-left",
            format!(r"^\s*\(?\s*{ATTR}\s*\)?\s*==\s*{ENTITY}\s*$"),
            entity_eq_attr_left,
        ),
        rule(
            "entity-eq-attr-right",
            format!(r"^\s*{ENTITY}\s*==\s*\(?\s*{ATTR}\s*\)?\s*$"),
            entity_eq_attr_right,
        ),
        rule(
            "string-eq",
            format!(r#"^\s*\(?\s*{ATTR}\s*\)?\s*==\s*"([^"]*)"\s*$"#),
            string_eq,
        ),
        rule(
            "set-literal-contains",
            format!(r"^\s*\[\s*{ENTITY}\s*\]\s*\.contains\(\s*{ATTR}\s*\)\s*$"),
            set_literal_contains,
        ),
        rule(
            "ne-null",
            format!(r"^\s*\(?\s*{ATTR}\s*\)?\s*!=\s*null\s*$"),
            ne_null,
        ),
        rule(
            "eq-null",
            format!(r"^\s*\(?\s*{ATTR}\s*\)?\s*==\s*null\s*$"),
            eq_null,
        ),
        rule(
            "principal-contains",
            format!(r"^\s*principal\.([A-Za-z_]\w*)\s*\.contains\(\s*{ATTR}\s*\)\s*$"),
            principal_contains,
        ),
    ]
}

/// Parse one textual residual condition into the canonical AST.
///
/// # Errors
///
/// Returns a [`DroppedCondition`] when the text matches no rule or matches
/// the principal-containment form, which cannot be resolved without
/// request-time context.
pub fn parse_text(text: &str) -> Result<Condition, DroppedCondition> {
    for rule in RULES.iter() {
        if let Some(caps) = rule.pattern.captures(text) {
            tracing::debug!(rule = rule.name, "text residual matched");
            return (rule.build)(&caps);
        }
    }
    tracing::debug!(residual = text, "unrecognized text residual");
    Err(DroppedCondition::unparsed(text))
}

fn capture(caps: &Captures<'_>, index: usize) -> Result<String, DroppedCondition> {
    caps.get(index)
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| DroppedCondition::unparsed(caps.get(0).map_or("", |m| m.as_str())))
}

fn entity(caps: &Captures<'_>, index: usize) -> Result<EntityRef, DroppedCondition> {
    let text = capture(caps, index)?;
    EntityRef::parse(&text).map_err(|err| DroppedCondition::unparsed(err.to_string()))
}

fn literal_false(_: &Captures<'_>) -> Result<Condition, DroppedCondition> {
    Ok(Condition::Literal(false))
}

fn entity_eq_attr_left(caps: &Captures<'_>) -> Result<Condition, DroppedCondition> {
    let attr = capture(caps, 1)?;
    let entity = entity(caps, 2)?;
    Ok(Condition::equality(
        Condition::Attribute(AttributePath::resource(attr)),
        Condition::Value(ScalarValue::Entity(entity)),
        false,
    ))
}

fn entity_eq_attr_right(caps: &Captures<'_>) -> Result<Condition, DroppedCondition> {
    let entity = entity(caps, 1)?;
    let attr = capture(caps, 2)?;
    Ok(Condition::equality(
        Condition::Attribute(AttributePath::resource(attr)),
        Condition::Value(ScalarValue::Entity(entity)),
        false,
    ))
}

fn string_eq(caps: &Captures<'_>) -> Result<Condition, DroppedCondition> {
    let attr = capture(caps, 1)?;
    let literal = capture(caps, 2)?;
    Ok(Condition::equality(
        Condition::Attribute(AttributePath::resource(attr)),
        Condition::Value(ScalarValue::String(literal)),
        false,
    ))
}

fn set_literal_contains(caps: &Captures<'_>) -> Result<Condition, DroppedCondition> {
    let entity = entity(caps, 1)?;
    let attr = capture(caps, 2)?;
    Ok(Condition::containment(
        Condition::Set(vec![ScalarValue::Entity(entity)]),
        Condition::Attribute(AttributePath::resource(attr)),
    ))
}

// The null rules swap `negated` relative to the surface operator: the
// compiler's null lowering sends negated=false to `must` and negated=true to
// `must_not`, and `!= null` must land as an exists check in `must`.
fn ne_null(caps: &Captures<'_>) -> Result<Condition, DroppedCondition> {
    let attr = capture(caps, 1)?;
    Ok(Condition::equality(
        Condition::Attribute(AttributePath::resource(attr)),
        Condition::Value(ScalarValue::Null),
        false,
    ))
}

fn eq_null(caps: &Captures<'_>) -> Result<Condition, DroppedCondition> {
    let attr = capture(caps, 1)?;
    Ok(Condition::equality(
        Condition::Attribute(AttributePath::resource(attr)),
        Condition::Value(ScalarValue::Null),
        true,
    ))
}

fn principal_contains(caps: &Captures<'_>) -> Result<Condition, DroppedCondition> {
    let detail = caps.get(0).map_or("", |m| m.as_str()).trim();
    Err(DroppedCondition::context_dependent(detail))
}
