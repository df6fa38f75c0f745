//! Statement compilation.
//!
//! Every function here is pure: it turns structured input into SQL text plus
//! the positional values for its `?` placeholders. Identifiers go through
//! [`escape_identifier`]; values only ever travel in [`Statement::values`].

use sqlx::mysql::MySqlArguments;

use crate::error::DbResult;
use crate::filter::{Filter, Operator, Predicate};
use crate::ident::{escape_identifier, compile_select};
use crate::record::Record;
use crate::sort::Sort;
use crate::value::{self, SqlValue};

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

impl Statement {
    pub(crate) fn arguments(&self) -> DbResult<MySqlArguments> {
        value::arguments(&self.values)
    }
}

/// `LIMIT ? OFFSET ?`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    pub count: u64,
    pub offset: u64,
}

impl Limit {
    pub fn first() -> Self {
        Self {
            count: 1,
            offset: 0,
        }
    }
}

/// Compiles a filter into a `WHERE` clause. An empty filter yields an empty
/// string so the statement targets every row.
pub fn compile_where(filter: &Filter) -> (String, Vec<SqlValue>) {
    let mut clauses = Vec::new();
    let mut values = Vec::new();

    for condition in filter.active() {
        let column = escape_identifier(&condition.column);
        match condition.op {
            Operator::Eq => {
                clauses.push(format!("{column} = ?"));
                values.push(condition.value.clone());
            }
            Operator::Like => {
                clauses.push(format!("{column} LIKE ?"));
                values.push(SqlValue::Text(condition.value.like_pattern()));
            }
        }
    }

    if clauses.is_empty() {
        (String::new(), values)
    } else {
        (format!("WHERE {}", clauses.join(" AND ")), values)
    }
}

fn compile_predicate(predicate: &Predicate) -> (String, Vec<SqlValue>) {
    match predicate {
        Predicate::Filter(filter) => compile_where(filter),
        Predicate::Raw(text) => (format!("WHERE {}", text.trim()), Vec::new()),
    }
}

/// Compiles the `ORDER BY` clause, falling back to `default_column DESC`.
pub fn compile_order_by(sort: Option<&Sort>, default_column: &str) -> String {
    match sort {
        Some(Sort::Raw(clause)) if !clause.trim().is_empty() => {
            format!("ORDER BY {}", clause.trim())
        }
        Some(Sort::Keys(keys)) if !keys.is_empty() => {
            let parts: Vec<String> = keys
                .iter()
                .map(|k| {
                    format!(
                        "{} {}",
                        escape_identifier(&k.column),
                        k.direction.as_sql()
                    )
                })
                .collect();
            format!("ORDER BY {}", parts.join(", "))
        }
        _ => format!("ORDER BY {} DESC", escape_identifier(default_column)),
    }
}

fn join_clauses(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn select(
    table: &str,
    columns: &[&str],
    filter: &Filter,
    order_by: &str,
    limit: Option<Limit>,
) -> Statement {
    let (where_clause, mut values) = compile_where(filter);
    let head = format!(
        "SELECT {} FROM {}",
        compile_select(columns),
        escape_identifier(table)
    );

    let limit_clause = match limit {
        Some(limit) => {
            values.push(SqlValue::UInt(limit.count));
            values.push(SqlValue::UInt(limit.offset));
            "LIMIT ? OFFSET ?"
        }
        None => "",
    };

    Statement {
        sql: join_clauses(&[head.as_str(), where_clause.as_str(), order_by, limit_clause]),
        values,
    }
}

pub fn count(table: &str, filter: &Filter) -> Statement {
    let (where_clause, values) = compile_where(filter);
    let head = format!("SELECT COUNT(*) FROM {}", escape_identifier(table));

    Statement {
        sql: join_clauses(&[head.as_str(), where_clause.as_str()]),
        values,
    }
}

pub fn insert(table: &str, record: &Record) -> Statement {
    let mut columns = Vec::with_capacity(record.len());
    let mut values = Vec::with_capacity(record.len());
    for (column, value) in record.fields() {
        columns.push(escape_identifier(column));
        values.push(value.clone());
    }

    Statement {
        sql: format!(
            "INSERT INTO {} ({}) VALUES ({})",
            escape_identifier(table),
            columns.join(", "),
            vec!["?"; values.len()].join(", ")
        ),
        values,
    }
}

fn assignments(record: &Record) -> (String, Vec<SqlValue>) {
    let mut parts = Vec::with_capacity(record.len());
    let mut values = Vec::with_capacity(record.len());
    for (column, value) in record.fields() {
        parts.push(format!("{} = ?", escape_identifier(column)));
        values.push(value.clone());
    }
    (parts.join(", "), values)
}

pub fn update(table: &str, predicate: &Predicate, record: &Record) -> Statement {
    let (set_clause, mut values) = assignments(record);
    let (where_clause, where_values) = compile_predicate(predicate);
    values.extend(where_values);

    Statement {
        sql: join_clauses(&[
            format!("UPDATE {} SET {}", escape_identifier(table), set_clause).as_str(),
            where_clause.as_str(),
        ]),
        values,
    }
}

pub fn delete(table: &str, predicate: &Predicate) -> Statement {
    let (where_clause, values) = compile_predicate(predicate);

    Statement {
        sql: join_clauses(&[
            format!("DELETE FROM {}", escape_identifier(table)).as_str(),
            where_clause.as_str(),
        ]),
        values,
    }
}

/// `INSERT ... ON DUPLICATE KEY UPDATE`.
///
/// The inserted row is the filter's equality conditions overlaid with the
/// record; the update half assigns the record's values only.
pub fn upsert(table: &str, filter: &Filter, record: &Record) -> Statement {
    let mut row = Record::new();
    for condition in filter.active().filter(|c| c.op == Operator::Eq) {
        row.insert(condition.column.clone(), condition.value.clone());
    }
    for (column, value) in record.fields() {
        row.insert(column.to_string(), value.clone());
    }

    let Statement { sql, mut values } = insert(table, &row);
    let (set_clause, update_values) = assignments(record);
    values.extend(update_values);

    Statement {
        sql: format!("{sql} ON DUPLICATE KEY UPDATE {set_clause}"),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::SortKey;

    #[test]
    fn test_where_ands_conditions_in_order() {
        let filter = Filter::new().eq("id", 5).like("title", "rain").eq("mood", "calm");
        let (sql, values) = compile_where(&filter);
        assert_eq!(sql, "WHERE `id` = ? AND `title` LIKE ? AND `mood` = ?");
        assert_eq!(
            values,
            vec![
                SqlValue::Int(5),
                SqlValue::Text("%rain%".into()),
                SqlValue::Text("calm".into()),
            ]
        );
    }

    #[test]
    fn test_where_skips_nulls() {
        let filter = Filter::new().eq("title", None::<String>).eq("id", 1);
        let (sql, values) = compile_where(&filter);
        assert_eq!(sql, "WHERE `id` = ?");
        assert_eq!(values, vec![SqlValue::Int(1)]);
    }

    #[test]
    fn test_empty_filter_has_no_where() {
        let (sql, values) = compile_where(&Filter::new());
        assert!(sql.is_empty());
        assert!(values.is_empty());

        let stmt = select("diaries", &[], &Filter::new(), "", None);
        assert_eq!(stmt.sql, "SELECT * FROM `diaries`");
    }

    #[test]
    fn test_order_by_default() {
        assert_eq!(compile_order_by(None, "id"), "ORDER BY `id` DESC");
        assert_eq!(
            compile_order_by(Some(&Sort::Keys(vec![])), "id"),
            "ORDER BY `id` DESC"
        );
        assert_eq!(
            compile_order_by(Some(&Sort::Raw(" ".into())), "id"),
            "ORDER BY `id` DESC"
        );
    }

    #[test]
    fn test_order_by_keys_and_raw() {
        let sort = Sort::keys([SortKey::desc("created_at"), SortKey::asc("title")]);
        assert_eq!(
            compile_order_by(Some(&sort), "id"),
            "ORDER BY `created_at` DESC, `title` ASC"
        );
        assert_eq!(
            compile_order_by(Some(&Sort::Raw("FIELD(id, 3, 1)".into())), "id"),
            "ORDER BY FIELD(id, 3, 1)"
        );
    }

    #[test]
    fn test_select_with_limit_binds_after_filter() {
        let filter = Filter::new().eq("mood", "calm");
        let stmt = select(
            "diaries",
            &["id", "title"],
            &filter,
            "ORDER BY `id` DESC",
            Some(Limit {
                count: 10,
                offset: 20,
            }),
        );
        assert_eq!(
            stmt.sql,
            "SELECT `id`, `title` FROM `diaries` WHERE `mood` = ? ORDER BY `id` DESC LIMIT ? OFFSET ?"
        );
        assert_eq!(
            stmt.values,
            vec![
                SqlValue::Text("calm".into()),
                SqlValue::UInt(10),
                SqlValue::UInt(20),
            ]
        );
    }

    #[test]
    fn test_count() {
        let stmt = count("diaries", &Filter::new().like("content", "sea"));
        assert_eq!(
            stmt.sql,
            "SELECT COUNT(*) FROM `diaries` WHERE `content` LIKE ?"
        );
        assert_eq!(stmt.values, vec![SqlValue::Text("%sea%".into())]);
    }

    #[test]
    fn test_insert() {
        let record = Record::new().set("title", "t").set("content", "c");
        let stmt = insert("diaries", &record);
        assert_eq!(
            stmt.sql,
            "INSERT INTO `diaries` (`title`, `content`) VALUES (?, ?)"
        );
        assert_eq!(stmt.values.len(), 2);
    }

    #[test]
    fn test_update_binds_set_then_where() {
        let record = Record::new().set("title", "y");
        let stmt = update("diaries", &Filter::new().eq("id", 5).into(), &record);
        assert_eq!(stmt.sql, "UPDATE `diaries` SET `title` = ? WHERE `id` = ?");
        assert_eq!(
            stmt.values,
            vec![SqlValue::Text("y".into()), SqlValue::Int(5)]
        );
    }

    #[test]
    fn test_update_with_raw_predicate() {
        let record = Record::new().set("title", "archived");
        let stmt = update("diaries", &Predicate::raw("id < 10"), &record);
        assert_eq!(stmt.sql, "UPDATE `diaries` SET `title` = ? WHERE id < 10");
        assert_eq!(stmt.values.len(), 1);
    }

    #[test]
    fn test_delete() {
        let stmt = delete("diaries", &Filter::new().eq("id", 5).into());
        assert_eq!(stmt.sql, "DELETE FROM `diaries` WHERE `id` = ?");
        assert_eq!(stmt.values, vec![SqlValue::Int(5)]);
    }

    #[test]
    fn test_upsert_merges_filter_and_record() {
        let filter = Filter::new().eq("id", 9).like("title", "ignored");
        let record = Record::new().set("title", "t").set("content", "c");
        let stmt = upsert("diaries", &filter, &record);
        assert_eq!(
            stmt.sql,
            "INSERT INTO `diaries` (`id`, `title`, `content`) VALUES (?, ?, ?) \
             ON DUPLICATE KEY UPDATE `title` = ?, `content` = ?"
        );
        assert_eq!(
            stmt.values,
            vec![
                SqlValue::Int(9),
                SqlValue::Text("t".into()),
                SqlValue::Text("c".into()),
                SqlValue::Text("t".into()),
                SqlValue::Text("c".into()),
            ]
        );
    }

    #[test]
    fn test_identifiers_are_escaped_everywhere() {
        let filter = Filter::new().eq("na`me", "x");
        let stmt = select("ta`ble", &["co`l"], &filter, "", None);
        assert_eq!(
            stmt.sql,
            "SELECT `co``l` FROM `ta``ble` WHERE `na``me` = ?"
        );
    }
}
