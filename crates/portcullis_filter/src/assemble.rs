//! Filter assembly: clause sets into one boolean query object.

use crate::clause::{Clause, ClauseSet};
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Merge clause sets from independently compiled residuals into one filter.
///
/// Concatenation across sets is top-level AND semantics: every residual's
/// `must`/`must_not` constraints apply simultaneously.
#[must_use]
pub fn assemble<I>(sets: I) -> BoolFilter
where
    I: IntoIterator<Item = ClauseSet>,
{
    let mut merged = ClauseSet::default();
    for set in sets {
        merged.extend(set);
    }
    BoolFilter::from_clause_set(merged)
}

/// The assembled boolean query, ready for the search engine.
///
/// Serializes as `{"bool": {must?, must_not?, should?,
/// minimum_should_match?}}`; each key appears only when non-empty, and
/// `minimum_should_match = 1` appears exactly when `should` does.
#[derive(Debug, Clone, PartialEq)]
pub struct BoolFilter {
    /// Conjunctive clauses
    pub must: Vec<Clause>,
    /// Negated conjunctive clauses
    pub must_not: Vec<Clause>,
    /// Disjunctive clauses
    pub should: Vec<Clause>,
    /// Present (as 1) exactly when `should` is non-empty
    pub minimum_should_match: Option<u32>,
}

impl BoolFilter {
    /// Build from a merged clause set, attaching the should-match marker
    #[must_use]
    pub fn from_clause_set(set: ClauseSet) -> Self {
        let minimum_should_match = if set.should.is_empty() { None } else { Some(1) };
        Self {
            must: set.must,
            must_not: set.must_not,
            should: set.should,
            minimum_should_match,
        }
    }

    /// Whether the filter constrains anything at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.must.is_empty() && self.must_not.is_empty() && self.should.is_empty()
    }

    /// Render as the search engine's boolean-query JSON
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut body = serde_json::Map::new();
        if !self.must.is_empty() {
            body.insert("must".to_string(), clause_array(&self.must));
        }
        if !self.must_not.is_empty() {
            body.insert("must_not".to_string(), clause_array(&self.must_not));
        }
        if !self.should.is_empty() {
            body.insert("should".to_string(), clause_array(&self.should));
        }
        if let Some(n) = self.minimum_should_match {
            body.insert("minimum_should_match".to_string(), Value::from(n));
        }

        let mut outer = serde_json::Map::new();
        outer.insert("bool".to_string(), Value::Object(body));
        Value::Object(outer)
    }
}

fn clause_array(clauses: &[Clause]) -> Value {
    Value::Array(clauses.iter().map(Clause::to_value).collect())
}

impl Serialize for BoolFilter {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_value().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_filter_shape() {
        let filter = assemble(Vec::new());
        assert!(filter.is_empty());
        assert_eq!(filter.to_value(), json!({"bool": {}}));
    }

    #[test]
    fn test_concatenates_sets_in_order() {
        let mut first = ClauseSet::default();
        first.must.push(Clause::term("tenant_id", json!("custco")));
        let mut second = ClauseSet::default();
        second.must.push(Clause::term("doc_id", json!("d1")));
        second.must_not.push(Clause::exists("classification"));

        let filter = assemble(vec![first, second]);
        assert_eq!(
            filter.to_value(),
            json!({"bool": {
                "must": [
                    {"term": {"tenant_id": "custco"}},
                    {"term": {"doc_id": "d1"}}
                ],
                "must_not": [{"exists": {"field": "classification"}}]
            }})
        );
    }

    #[test]
    fn test_minimum_should_match_iff_should() {
        let mut with_should = ClauseSet::default();
        with_should.should.push(Clause::term("tenant_id", json!("a")));
        let filter = assemble(vec![with_should]);
        assert_eq!(filter.minimum_should_match, Some(1));
        assert_eq!(
            filter.to_value(),
            json!({"bool": {
                "should": [{"term": {"tenant_id": "a"}}],
                "minimum_should_match": 1
            }})
        );

        let mut without_should = ClauseSet::default();
        without_should.must.push(Clause::term("tenant_id", json!("a")));
        let filter = assemble(vec![without_should]);
        assert_eq!(filter.minimum_should_match, None);
        assert!(
            filter
                .to_value()
                .get("bool")
                .and_then(|b| b.get("minimum_should_match"))
                .is_none()
        );
    }

    #[test]
    fn test_serialize_matches_to_value() {
        let mut set = ClauseSet::default();
        set.must.push(Clause::term("tenant_id", json!("custco")));
        let filter = assemble(vec![set]);
        assert_eq!(serde_json::to_value(&filter).unwrap(), filter.to_value());
    }
}
