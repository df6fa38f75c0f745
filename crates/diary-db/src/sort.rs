//! Result ordering.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DbError, DbResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    /// `-1` and `desc` (any case) are descending; anything else ascends.
    pub fn parse(token: &str) -> Self {
        let token = token.trim();
        if token == "-1" || token.eq_ignore_ascii_case("desc") {
            Direction::Desc
        } else {
            Direction::Asc
        }
    }

    fn from_json(value: &Value) -> Self {
        match value {
            Value::Number(n) if n.as_i64() == Some(-1) => Direction::Desc,
            Value::String(s) => Direction::parse(s),
            _ => Direction::Asc,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub column: String,
    pub direction: Direction,
}

impl SortKey {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: Direction::Desc,
        }
    }
}

/// Either structured keys or a caller-trusted clause (the part after
/// `ORDER BY`). An empty sort falls back to the table's default ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Sort {
    Raw(String),
    Keys(Vec<SortKey>),
}

impl Sort {
    pub fn keys(keys: impl IntoIterator<Item = SortKey>) -> Self {
        Sort::Keys(keys.into_iter().collect())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Sort::Raw(clause) => clause.trim().is_empty(),
            Sort::Keys(keys) => keys.is_empty(),
        }
    }

    /// Parses `column[:direction]` pairs separated by commas, e.g.
    /// `created_at:desc,title`.
    pub fn parse_pairs(input: &str) -> Self {
        let keys = input
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| match part.split_once(':') {
                Some((column, direction)) => SortKey {
                    column: column.trim().to_string(),
                    direction: Direction::parse(direction),
                },
                None => SortKey::asc(part),
            })
            .collect();
        Sort::Keys(keys)
    }

    /// Accepts a JSON string (raw clause) or a flat object mapping column to
    /// direction.
    pub fn from_json(value: &Value) -> DbResult<Self> {
        match value {
            Value::Null => Ok(Sort::Keys(Vec::new())),
            Value::String(clause) => Ok(Sort::Raw(clause.clone())),
            Value::Object(map) => Ok(Sort::Keys(
                map.iter()
                    .map(|(column, direction)| SortKey {
                        column: column.clone(),
                        direction: Direction::from_json(direction),
                    })
                    .collect(),
            )),
            _ => Err(DbError::validation(
                "sort must be a clause string or a column-to-direction object",
            )),
        }
    }
}
