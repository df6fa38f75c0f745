//! Structured row filters.
//!
//! A [`Filter`] is an ordered list of [`Condition`]s. Order is preserved all
//! the way into the generated SQL, so the bind list always lines up with the
//! placeholders. Conditions whose value is `NULL` mean "no constraint" and are
//! skipped at compile time rather than turned into `IS NULL`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DbError, DbResult};
use crate::value::SqlValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    /// `column = ?`
    Eq,
    /// `column LIKE ?` with the value wrapped in `%...%`
    Like,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub column: String,
    pub op: Operator,
    pub value: SqlValue,
}

impl Condition {
    pub fn new(column: impl Into<String>, op: Operator, value: impl Into<SqlValue>) -> Self {
        Self {
            column: column.into(),
            op,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equality condition.
    #[must_use]
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.conditions
            .push(Condition::new(column, Operator::Eq, value));
        self
    }

    /// Adds a substring condition.
    #[must_use]
    pub fn like(mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.conditions
            .push(Condition::new(column, Operator::Like, value));
        self
    }

    pub fn push(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }

    /// Conditions that constrain the result, in insertion order.
    pub fn active(&self) -> impl Iterator<Item = &Condition> {
        self.conditions.iter().filter(|c| !c.value.is_null())
    }

    /// True when no condition constrains the result.
    pub fn is_empty(&self) -> bool {
        self.active().next().is_none()
    }

    /// Builds a filter from a flat JSON object.
    ///
    /// Keys listed in `like_fields` use substring matching, every other key
    /// uses equality. Object iteration order decides clause order.
    pub fn from_json(value: &Value, like_fields: &[&str]) -> DbResult<Self> {
        let Value::Object(map) = value else {
            return Err(DbError::validation(
                "filter must be a flat key-value object",
            ));
        };

        let mut filter = Filter::new();
        for (column, raw) in map {
            let value = SqlValue::from_json(column, raw)?;
            let op = if like_fields.contains(&column.as_str()) {
                Operator::Like
            } else {
                Operator::Eq
            };
            filter.push(Condition {
                column: column.clone(),
                op,
                value,
            });
        }

        Ok(filter)
    }

    /// Order-independent form used for cache keys: null conditions dropped,
    /// remaining conditions sorted by column then operator.
    pub fn canonical(&self) -> Filter {
        let mut conditions: Vec<Condition> = self.active().cloned().collect();
        conditions.sort_by(|a, b| {
            a.column
                .cmp(&b.column)
                .then_with(|| (a.op as u8).cmp(&(b.op as u8)))
        });
        Filter { conditions }
    }
}

impl FromIterator<Condition> for Filter {
    fn from_iter<I: IntoIterator<Item = Condition>>(iter: I) -> Self {
        Filter {
            conditions: iter.into_iter().collect(),
        }
    }
}

/// Row selector for update and delete statements.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Structured conditions, ANDed.
    Filter(Filter),
    /// Caller-trusted predicate text inserted verbatim after `WHERE`.
    Raw(String),
}

impl Predicate {
    pub fn raw(text: impl Into<String>) -> Self {
        Predicate::Raw(text.into())
    }

    /// Fails when the predicate would select every row.
    pub(crate) fn ensure_usable(&self) -> DbResult<()> {
        let usable = match self {
            Predicate::Filter(filter) => !filter.is_empty(),
            Predicate::Raw(text) => !text.trim().is_empty(),
        };

        if usable {
            Ok(())
        } else {
            Err(DbError::validation("a non-empty filter is required"))
        }
    }
}

impl From<Filter> for Predicate {
    fn from(filter: Filter) -> Self {
        Predicate::Filter(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_keeps_insertion_order() {
        let filter = Filter::new().eq("b", 1).like("a", "x");
        let columns: Vec<&str> = filter.active().map(|c| c.column.as_str()).collect();
        assert_eq!(columns, vec!["b", "a"]);
    }

    #[test]
    fn test_null_values_are_inactive() {
        let filter = Filter::new().eq("title", None::<String>).eq("id", 3);
        assert_eq!(filter.active().count(), 1);
        assert!(!filter.is_empty());

        let only_null = Filter::new().eq("title", None::<String>);
        assert!(only_null.is_empty());
    }

    #[test]
    fn test_from_json_applies_like_fields() {
        let filter =
            Filter::from_json(&json!({"title": "rain", "id": 7}), &["title"]).unwrap();
        let ops: Vec<(String, Operator)> = filter
            .active()
            .map(|c| (c.column.clone(), c.op))
            .collect();
        assert!(ops.contains(&("title".to_string(), Operator::Like)));
        assert!(ops.contains(&("id".to_string(), Operator::Eq)));
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        assert!(Filter::from_json(&json!([1, 2]), &[]).unwrap_err().is_validation());
        assert!(Filter::from_json(&json!("id = 1"), &[]).is_err());
    }

    #[test]
    fn test_from_json_rejects_nested_values() {
        let err = Filter::from_json(&json!({"id": {"$gt": 1}}), &[]).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_canonical_ignores_order_and_nulls() {
        let a = Filter::new().eq("b", 2).eq("a", 1).eq("c", None::<i64>);
        let b = Filter::new().eq("a", 1).eq("b", 2);
        assert_eq!(a.canonical(), b.canonical());
    }

    #[test]
    fn test_predicate_usable() {
        assert!(Predicate::from(Filter::new().eq("id", 1)).ensure_usable().is_ok());
        assert!(Predicate::from(Filter::new()).ensure_usable().is_err());
        assert!(Predicate::raw("   ").ensure_usable().is_err());
        assert!(Predicate::raw("created_at < NOW()").ensure_usable().is_ok());
    }
}
