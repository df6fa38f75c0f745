//! Column assignments for insert, update and upsert statements.

use serde_json::Value;

use crate::error::{DbError, DbResult};
use crate::value::SqlValue;

/// Ordered `column = value` pairs. Setting a column twice replaces the
/// earlier value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, SqlValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn set(mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.insert(column.into(), value.into());
        self
    }

    pub fn insert(&mut self, column: String, value: SqlValue) {
        match self.fields.iter_mut().find(|(c, _)| *c == column) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((column, value)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.fields.iter().map(|(c, v)| (c.as_str(), v))
    }

    /// Builds a record from a flat JSON object.
    pub fn from_json(value: &Value) -> DbResult<Self> {
        let Value::Object(map) = value else {
            return Err(DbError::validation("data must be a flat key-value object"));
        };

        let mut record = Record::new();
        for (column, raw) in map {
            record.insert(column.clone(), SqlValue::from_json(column, raw)?);
        }
        Ok(record)
    }

    pub(crate) fn ensure_not_empty(&self) -> DbResult<()> {
        if self.is_empty() {
            Err(DbError::validation("data must contain at least one column"))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_replaces_in_place() {
        let record = Record::new().set("a", 1).set("b", 2).set("a", 3);
        let fields: Vec<(&str, &SqlValue)> = record.fields().collect();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0], ("a", &SqlValue::Int(3)));
        assert_eq!(fields[1], ("b", &SqlValue::Int(2)));
    }

    #[test]
    fn test_from_json() {
        let record = Record::from_json(&json!({"title": "t", "content": "c"})).unwrap();
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_from_json_rejects_non_object_and_nested() {
        assert!(Record::from_json(&json!("title")).unwrap_err().is_validation());
        assert!(Record::from_json(&json!({"tags": ["a"]})).is_err());
    }

    #[test]
    fn test_empty_record_is_rejected() {
        assert!(Record::new().ensure_not_empty().is_err());
        assert!(Record::from_json(&json!({})).unwrap().ensure_not_empty().is_err());
    }
}
