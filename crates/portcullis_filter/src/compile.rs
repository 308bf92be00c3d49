//! The expression compiler: canonical conditions to clause sets.
//!
//! Translation is fail-open per node: an unsupported shape contributes
//! nothing and leaves the accumulator exactly as it was, with a drop record
//! for the caller. Two behaviors are preserved verbatim from the system this
//! replaces and are pinned by tests rather than corrected:
//!
//! - `Or` flattening: each child's `must` entries are appended individually
//!   to the parent's `should`, so a multi-clause child loses its intra-group
//!   conjunction.
//! - Null polarity: `Equality{right: null, negated: false}` emits an
//!   `exists` check in `must`, and the negated form in `must_not`.

use crate::clause::{Clause, ClauseSet};
use portcullis_core::{AttributePath, FieldMap, ScalarValue};
use portcullis_residual::{Condition, DroppedCondition};

/// One operand of a comparison, classified for lowering
enum Operand<'a> {
    Attr(&'a AttributePath),
    Scalar(&'a ScalarValue),
    Set(&'a [ScalarValue]),
    Other,
}

fn operand(cond: &Condition) -> Operand<'_> {
    match cond {
        Condition::Attribute(path) => Operand::Attr(path),
        Condition::Value(value) => Operand::Scalar(value),
        Condition::Set(values) => Operand::Set(values),
        _ => Operand::Other,
    }
}

/// Compile one condition into the accumulator.
///
/// Never fails; nodes that cannot be lowered leave `out` untouched and push
/// a record onto `dropped`.
pub fn compile_condition(
    cond: &Condition,
    fields: &FieldMap,
    out: &mut ClauseSet,
    dropped: &mut Vec<DroppedCondition>,
) {
    match cond {
        // already evaluated away by the policy engine
        Condition::Literal(_) => {}

        Condition::And(children) => {
            for child in children {
                let mut child_set = ClauseSet::default();
                compile_condition(child, fields, &mut child_set, dropped);
                out.extend(child_set);
            }
        }

        Condition::Or(children) => {
            for child in children {
                let mut child_set = ClauseSet::default();
                compile_condition(child, fields, &mut child_set, dropped);
                // only the child's must entries survive, each as an
                // independent alternative
                out.should.extend(child_set.must);
            }
        }

        Condition::Equality {
            left,
            right,
            negated,
        } => compile_equality(left, right, *negated, fields, out, dropped),

        Condition::Containment { container, member } => {
            compile_containment(container, member, fields, out, dropped);
        }

        // a bare operand is not a boolean condition
        Condition::Attribute(_) | Condition::Value(_) | Condition::Set(_) => {
            tracing::debug!(condition = ?cond, "bare operand at condition position");
            dropped.push(DroppedCondition::unsupported(format!("{:?}", cond)));
        }
    }
}

fn compile_equality(
    left: &Condition,
    right: &Condition,
    negated: bool,
    fields: &FieldMap,
    out: &mut ClauseSet,
    dropped: &mut Vec<DroppedCondition>,
) {
    // the attribute may sit on either side
    let (attr, value) = match (operand(left), operand(right)) {
        (Operand::Attr(attr), Operand::Scalar(value)) => (attr, value),
        (Operand::Scalar(value), Operand::Attr(attr)) => (attr, value),
        _ => {
            tracing::debug!("equality has no attribute/value operand pair");
            dropped.push(DroppedCondition::unsupported(format!(
                "equality over {:?} and {:?}",
                left, right
            )));
            return;
        }
    };

    if !attr.is_resource() {
        tracing::debug!(attr = %attr, "equality on principal attribute dropped");
        dropped.push(DroppedCondition::context_dependent(attr.to_string()));
        return;
    }

    let field = fields.field(&attr.name);
    let target = if negated { &mut out.must_not } else { &mut out.must };
    if value.is_null() {
        target.push(Clause::exists(field));
    } else {
        target.push(Clause::term(field, value.to_query_value()));
    }
}

fn compile_containment(
    container: &Condition,
    member: &Condition,
    fields: &FieldMap,
    out: &mut ClauseSet,
    dropped: &mut Vec<DroppedCondition>,
) {
    // membership only resolves when the element side is a resource attribute
    let attr = match operand(member) {
        Operand::Attr(attr) if attr.is_resource() => attr,
        Operand::Attr(attr) => {
            tracing::debug!(attr = %attr, "containment member is not a resource attribute");
            dropped.push(DroppedCondition::context_dependent(attr.to_string()));
            return;
        }
        _ => {
            dropped.push(DroppedCondition::unsupported(format!(
                "containment member {:?}",
                member
            )));
            return;
        }
    };

    let field = fields.field(&attr.name);
    match operand(container) {
        Operand::Set(values) if values.len() == 1 => {
            out.must.push(Clause::term(field, values[0].to_query_value()));
        }
        Operand::Set(values) => {
            out.must.push(Clause::terms(
                field,
                values.iter().map(ScalarValue::to_query_value).collect(),
            ));
        }
        Operand::Scalar(value) => {
            out.must.push(Clause::term(field, value.to_query_value()));
        }
        Operand::Attr(container_attr) => {
            // e.g. principal.teams.contains(...): the set is only known at
            // request time
            tracing::debug!(attr = %container_attr, "containment over attribute reference dropped");
            dropped.push(DroppedCondition::context_dependent(
                container_attr.to_string(),
            ));
        }
        Operand::Other => {
            dropped.push(DroppedCondition::unsupported(format!(
                "containment container {:?}",
                container
            )));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portcullis_core::EntityRef;
    use portcullis_residual::DropReason;
    use serde_json::json;

    fn compile(cond: &Condition) -> (ClauseSet, Vec<DroppedCondition>) {
        let mut out = ClauseSet::default();
        let mut dropped = Vec::new();
        compile_condition(cond, portcullis_core::default_fields(), &mut out, &mut dropped);
        (out, dropped)
    }

    fn eq(attr: &str, value: ScalarValue, negated: bool) -> Condition {
        Condition::equality(
            Condition::resource_attr(attr),
            Condition::Value(value),
            negated,
        )
    }

    #[test]
    fn test_equality_to_must_term() {
        let (out, dropped) = compile(&eq("classification", "confidential".into(), false));
        assert!(dropped.is_empty());
        assert_eq!(
            out.must,
            vec![Clause::term("classification", json!("confidential"))]
        );
        assert!(out.must_not.is_empty());
    }

    #[test]
    fn test_negated_equality_to_must_not() {
        let (out, _) = compile(&eq("classification", "confidential".into(), true));
        assert!(out.must.is_empty());
        assert_eq!(
            out.must_not,
            vec![Clause::term("classification", json!("confidential"))]
        );
    }

    #[test]
    fn test_entity_equality_maps_field_and_id() {
        let entity = ScalarValue::Entity(EntityRef::new("Platform::Tenant", "custco"));
        let (out, _) = compile(&eq("tenant", entity, false));
        assert_eq!(out.must, vec![Clause::term("tenant_id", json!("custco"))]);
    }

    #[test]
    fn test_value_on_left_attribute_on_right() {
        let cond = Condition::equality(
            Condition::value("custco"),
            Condition::resource_attr("tenant"),
            false,
        );
        let (out, dropped) = compile(&cond);
        assert!(dropped.is_empty());
        assert_eq!(out.must, vec![Clause::term("tenant_id", json!("custco"))]);
    }

    // Null polarity, preserved verbatim: negated=false lands exists in must,
    // negated=true in must_not.
    #[test]
    fn test_null_equality_polarity() {
        let (out, _) = compile(&eq("customer_readers_team", ScalarValue::Null, false));
        assert_eq!(out.must, vec![Clause::exists("customer_readers_team_id")]);

        let (out, _) = compile(&eq("customer_readers_team", ScalarValue::Null, true));
        assert_eq!(out.must_not, vec![Clause::exists("customer_readers_team_id")]);
    }

    #[test]
    fn test_principal_equality_is_context_dependent() {
        let cond = Condition::equality(
            Condition::Attribute(portcullis_core::AttributePath::principal("tenant")),
            Condition::value("custco"),
            false,
        );
        let (out, dropped) = compile(&cond);
        assert!(out.is_empty());
        assert_eq!(dropped[0].reason, DropReason::ContextDependent);
    }

    #[test]
    fn test_containment_single_entity_is_term() {
        let cond = Condition::containment(
            Condition::Set(vec![ScalarValue::Entity(EntityRef::new(
                "Platform::Team",
                "custco-readers",
            ))]),
            Condition::resource_attr("customer_readers_team"),
        );
        let (out, dropped) = compile(&cond);
        assert!(dropped.is_empty());
        assert_eq!(
            out.must,
            vec![Clause::term("customer_readers_team_id", json!("custco-readers"))]
        );
    }

    #[test]
    fn test_containment_multiple_values_is_terms() {
        let cond = Condition::containment(
            Condition::Set(vec!["a".into(), "b".into()]),
            Condition::resource_attr("tenant"),
        );
        let (out, _) = compile(&cond);
        assert_eq!(
            out.must,
            vec![Clause::terms("tenant_id", vec![json!("a"), json!("b")])]
        );
    }

    #[test]
    fn test_containment_principal_member_dropped() {
        let cond = Condition::containment(
            Condition::Set(vec!["a".into()]),
            Condition::Attribute(portcullis_core::AttributePath::principal("teams")),
        );
        let (out, dropped) = compile(&cond);
        assert!(out.is_empty());
        assert_eq!(dropped[0].reason, DropReason::ContextDependent);
    }

    #[test]
    fn test_containment_attribute_container_dropped() {
        let cond = Condition::containment(
            Condition::Attribute(portcullis_core::AttributePath::principal("teams")),
            Condition::resource_attr("customer_readers_team"),
        );
        let (out, dropped) = compile(&cond);
        assert!(out.is_empty());
        assert_eq!(dropped[0].reason, DropReason::ContextDependent);
    }

    #[test]
    fn test_and_appends_in_child_order() {
        let cond = Condition::And(vec![
            eq("tenant", "custco".into(), false),
            eq("classification", "secret".into(), true),
            eq("doc", "d1".into(), false),
        ]);
        let (out, _) = compile(&cond);
        assert_eq!(
            out.must,
            vec![
                Clause::term("tenant_id", json!("custco")),
                Clause::term("doc_id", json!("d1")),
            ]
        );
        assert_eq!(
            out.must_not,
            vec![Clause::term("classification", json!("secret"))]
        );
    }

    #[test]
    fn test_or_children_become_should() {
        let cond = Condition::Or(vec![
            eq("tenant", "a".into(), false),
            eq("tenant", "b".into(), false),
        ]);
        let (out, _) = compile(&cond);
        assert!(out.must.is_empty());
        assert_eq!(
            out.should,
            vec![
                Clause::term("tenant_id", json!("a")),
                Clause::term("tenant_id", json!("b")),
            ]
        );
    }

    // Documented structural loss: an Or over multi-clause And children
    // flattens into independent alternatives, losing each child's internal
    // conjunction. Four entries, not two grouped pairs.
    #[test]
    fn test_or_flattening_loses_child_grouping() {
        let cond = Condition::Or(vec![
            Condition::And(vec![
                eq("tenant", "a".into(), false),
                eq("classification", "public".into(), false),
            ]),
            Condition::And(vec![
                eq("tenant", "b".into(), false),
                eq("classification", "internal".into(), false),
            ]),
        ]);
        let (out, _) = compile(&cond);
        assert_eq!(out.should.len(), 4);
        assert!(out.must.is_empty());
    }

    #[test]
    fn test_unsupported_shape_leaves_accumulator_unchanged() {
        let mut out = ClauseSet::default();
        out.must.push(Clause::term("tenant_id", json!("seed")));
        let before = out.clone();

        let mut dropped = Vec::new();
        let cond = Condition::equality(Condition::value("a"), Condition::value("b"), false);
        compile_condition(&cond, portcullis_core::default_fields(), &mut out, &mut dropped);

        assert_eq!(out, before);
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].reason, DropReason::UnsupportedOperator);
    }

    #[test]
    fn test_bare_operand_contributes_nothing() {
        let (out, dropped) = compile(&Condition::resource_attr("tenant"));
        assert!(out.is_empty());
        assert_eq!(dropped[0].reason, DropReason::UnsupportedOperator);
    }

    #[test]
    fn test_literal_contributes_nothing() {
        let (out, dropped) = compile(&Condition::Literal(false));
        assert!(out.is_empty());
        assert!(dropped.is_empty());
    }
}
