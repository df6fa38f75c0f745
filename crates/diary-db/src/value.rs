//! Scalar values bound as positional statement parameters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::mysql::MySqlArguments;
use sqlx::Arguments;

use crate::error::{DbError, DbResult};

/// A single bind parameter.
///
/// Values never reach the SQL text; they are pushed into [`MySqlArguments`]
/// in the order the compiled statement references them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    DateTime(DateTime<Utc>),
    Text(String),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Converts a JSON scalar. Arrays and objects are rejected.
    pub fn from_json(column: &str, value: &Value) -> DbResult<Self> {
        match value {
            Value::Null => Ok(SqlValue::Null),
            Value::Bool(b) => Ok(SqlValue::Bool(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(SqlValue::Int(i))
                } else if let Some(u) = n.as_u64() {
                    Ok(SqlValue::UInt(u))
                } else {
                    n.as_f64().map(SqlValue::Float).ok_or_else(|| {
                        DbError::validation(format!("column `{column}` has an unsupported number"))
                    })
                }
            }
            Value::String(s) => Ok(SqlValue::Text(s.clone())),
            Value::Array(_) | Value::Object(_) => Err(DbError::validation(format!(
                "column `{column}` must be a scalar value"
            ))),
        }
    }

    /// Text used inside a `%...%` pattern.
    pub(crate) fn like_pattern(&self) -> String {
        let inner = match self {
            SqlValue::Null => String::new(),
            SqlValue::Bool(b) => b.to_string(),
            SqlValue::Int(i) => i.to_string(),
            SqlValue::UInt(u) => u.to_string(),
            SqlValue::Float(f) => f.to_string(),
            SqlValue::DateTime(dt) => dt.to_rfc3339(),
            SqlValue::Text(s) => s.clone(),
        };
        format!("%{inner}%")
    }

    pub(crate) fn bind(&self, args: &mut MySqlArguments) -> DbResult<()> {
        let result = match self {
            SqlValue::Null => args.add(None::<String>),
            SqlValue::Bool(v) => args.add(*v),
            SqlValue::Int(v) => args.add(*v),
            SqlValue::UInt(v) => args.add(*v),
            SqlValue::Float(v) => args.add(*v),
            SqlValue::DateTime(v) => args.add(*v),
            SqlValue::Text(v) => args.add(v.clone()),
        };
        result.map_err(|e| DbError::Execution(sqlx::Error::Encode(e)))
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<&String> for SqlValue {
    fn from(value: &String) -> Self {
        SqlValue::Text(value.clone())
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Int(i64::from(value))
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<u32> for SqlValue {
    fn from(value: u32) -> Self {
        SqlValue::UInt(u64::from(value))
    }
}

impl From<u64> for SqlValue {
    fn from(value: u64) -> Self {
        SqlValue::UInt(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Float(value)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(value: DateTime<Utc>) -> Self {
        SqlValue::DateTime(value)
    }
}

impl<T> From<Option<T>> for SqlValue
where
    T: Into<SqlValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(SqlValue::Null, Into::into)
    }
}

/// Builds the argument list for a compiled statement.
pub(crate) fn arguments(values: &[SqlValue]) -> DbResult<MySqlArguments> {
    let mut args = MySqlArguments::default();
    for value in values {
        value.bind(&mut args)?;
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_scalars() {
        assert_eq!(SqlValue::from_json("a", &json!(null)).unwrap(), SqlValue::Null);
        assert_eq!(SqlValue::from_json("a", &json!(true)).unwrap(), SqlValue::Bool(true));
        assert_eq!(SqlValue::from_json("a", &json!(-5)).unwrap(), SqlValue::Int(-5));
        assert_eq!(
            SqlValue::from_json("a", &json!(u64::MAX)).unwrap(),
            SqlValue::UInt(u64::MAX)
        );
        assert_eq!(SqlValue::from_json("a", &json!(1.5)).unwrap(), SqlValue::Float(1.5));
        assert_eq!(
            SqlValue::from_json("a", &json!("x")).unwrap(),
            SqlValue::Text("x".into())
        );
    }

    #[test]
    fn test_from_json_rejects_nested() {
        let err = SqlValue::from_json("tags", &json!(["a"])).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("tags"));

        assert!(SqlValue::from_json("meta", &json!({"k": 1})).is_err());
    }

    #[test]
    fn test_like_pattern_wraps_value() {
        assert_eq!(SqlValue::from("rain").like_pattern(), "%rain%");
        assert_eq!(SqlValue::from(42i64).like_pattern(), "%42%");
    }

    #[test]
    fn test_option_none_is_null() {
        let value: SqlValue = None::<String>.into();
        assert!(value.is_null());
        let value: SqlValue = Some("x").into();
        assert_eq!(value, SqlValue::Text("x".into()));
    }

    #[test]
    fn test_arguments_accepts_every_variant() {
        let values = vec![
            SqlValue::Null,
            SqlValue::Bool(false),
            SqlValue::Int(1),
            SqlValue::UInt(2),
            SqlValue::Float(3.0),
            SqlValue::DateTime(Utc::now()),
            SqlValue::Text("t".into()),
        ];
        assert!(arguments(&values).is_ok());
    }
}
