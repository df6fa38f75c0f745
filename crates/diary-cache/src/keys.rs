//! Cache key generation.
//!
//! Keys look like `<env>:<namespace>|#|<table>|#|<operation>|#|<params>`.
//! `<params>` is the JSON of the query parameters with every object's keys
//! sorted, so two logically identical queries share one key no matter how
//! their parameters were assembled.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::CacheConfig;
use crate::error::CacheError;

/// Separator between key segments. Unlikely to appear in table names or in
/// serialized parameters.
pub const KEY_DELIMITER: &str = "|#|";

/// Builds keys under one deployment prefix and namespace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheKeys {
    prefix: String,
    namespace: String,
}

impl CacheKeys {
    pub fn new(prefix: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            namespace: namespace.into(),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.key_prefix.clone(), config.namespace.clone())
    }

    fn root(&self) -> String {
        format!("{}:{}", self.prefix, self.namespace)
    }

    /// Key for one read operation against `table`.
    pub fn table_query<P>(&self, table: &str, operation: &str, params: &P) -> Result<String, CacheError>
    where
        P: Serialize + ?Sized,
    {
        let params = canonical_json(params)?;
        Ok([self.root().as_str(), table, operation, params.as_str()].join(KEY_DELIMITER))
    }

    /// Key for an arbitrary name under this prefix and namespace.
    pub fn custom(&self, name: &str) -> String {
        [self.root().as_str(), name].join(KEY_DELIMITER)
    }
}

/// Serializes `value` to JSON with object keys sorted at every depth.
pub fn canonical_json<P>(value: &P) -> Result<String, CacheError>
where
    P: Serialize + ?Sized,
{
    let value = sort_keys(serde_json::to_value(value)?);
    Ok(serde_json::to_string(&value)?)
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));

            let mut sorted = Map::new();
            for (key, value) in entries {
                sorted.insert(key, sort_keys(value));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys() -> CacheKeys {
        CacheKeys::new("test", "diary")
    }

    #[test]
    fn test_key_layout() {
        let key = keys()
            .table_query("diaries", "find_one", &json!({"id": 1}))
            .unwrap();
        assert_eq!(key, "test:diary|#|diaries|#|find_one|#|{\"id\":1}");
    }

    #[test]
    fn test_key_is_independent_of_field_order() {
        let mut a = Map::new();
        a.insert("title".into(), json!("rain"));
        a.insert("page".into(), json!({"size": 10, "number": 2}));

        let mut b = Map::new();
        b.insert("page".into(), json!({"number": 2, "size": 10}));
        b.insert("title".into(), json!("rain"));

        let ka = keys().table_query("diaries", "find_page", &a).unwrap();
        let kb = keys().table_query("diaries", "find_page", &b).unwrap();
        assert_eq!(ka, kb);
    }

    #[test]
    fn test_different_params_give_different_keys() {
        let ka = keys().table_query("diaries", "count", &json!({"title": "a"})).unwrap();
        let kb = keys().table_query("diaries", "count", &json!({"title": "b"})).unwrap();
        assert_ne!(ka, kb);
    }

    #[test]
    fn test_array_order_is_kept() {
        assert_eq!(canonical_json(&json!([3, 1, 2])).unwrap(), "[3,1,2]");
    }

    #[test]
    fn test_from_config() {
        let keys = CacheKeys::from_config(&CacheConfig::default());
        assert_eq!(keys.custom("health"), "development:diary|#|health");
    }
}
