//! Counting, purging and restoring diaries.

use diary_db::{DbError, DbResult, Filter, MySqlPool, Predicate, Record, transaction};
use diary_models::diaries_table;
use serde::Deserialize;

pub async fn count(pool: &MySqlPool, title: Option<&str>) -> DbResult<i64> {
    let filter = Filter::new().like("title", title);
    let mut conn = pool.acquire().await?;
    diaries_table().count(&mut conn, &filter).await
}

/// Deletes diaries created more than `days` days ago. Returns whether any
/// row was removed.
pub async fn purge_older_than(pool: &MySqlPool, days: u32) -> DbResult<bool> {
    let mut conn = pool.acquire().await?;
    diaries_table()
        .delete_by_filter(&mut conn, &purge_predicate(days))
        .await
}

fn purge_predicate(days: u32) -> Predicate {
    Predicate::raw(format!("`created_at` < NOW() - INTERVAL {days} DAY"))
}

/// One entry of a restore file: a JSON array of these.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RestoreEntry {
    pub id: u64,
    pub title: String,
    pub content: String,
}

pub fn parse_restore_file(contents: &str) -> Result<Vec<RestoreEntry>, serde_json::Error> {
    serde_json::from_str(contents)
}

/// The statement failure wins over a failed rollback; the latter is only
/// reported.
fn keep_cause(cause: DbError, rollback: DbResult<()>) -> DbError {
    if let Err(e) = rollback {
        eprintln!("⚠️  Rollback failed after restore error: {}", e);
    }
    cause
}

/// Upserts every entry keyed by `id` in one transaction. Returns how many
/// rows were inserted or changed.
pub async fn restore(pool: &MySqlPool, entries: &[RestoreEntry]) -> DbResult<usize> {
    if entries.is_empty() {
        return Err(DbError::validation("restore file contains no diaries"));
    }

    let table = diaries_table();
    let mut conn = pool.acquire().await?;
    let mut tx = transaction::begin(&mut conn).await?;
    let mut changed = 0;

    for entry in entries {
        let filter = Filter::new().eq("id", entry.id);
        let record = Record::new()
            .set("title", &entry.title)
            .set("content", &entry.content);

        match table.upsert(&mut *tx, &filter, &record).await {
            Ok(true) => changed += 1,
            Ok(false) => {}
            Err(e) => return Err(keep_cause(e, transaction::rollback(tx).await)),
        }
    }

    transaction::commit(tx).await?;
    Ok(changed)
}
