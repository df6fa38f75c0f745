//! Diary seeding.
//!
//! Generates fake diaries and inserts them in one transaction.

use chrono::{DateTime, Duration, Utc};
use diary_db::{DbResult, MySqlPool, Record, transaction};
use diary_models::diaries_table;
use fake::Fake;
use fake::faker::chrono::en::DateTimeBetween;
use fake::faker::lorem::en::{Paragraph, Sentence};
use std::time::Instant;

/// How far back seeded `created_at` values reach.
pub const SEED_HISTORY_DAYS: i64 = 90;

#[derive(Debug, Clone)]
pub struct DiarySeed {
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl DiarySeed {
    fn to_record(&self) -> Record {
        Record::new()
            .set("title", &self.title)
            .set("content", &self.content)
            .set("created_at", self.created_at)
            .set("updated_at", self.created_at)
    }
}

pub fn generate_diaries(count: usize) -> Vec<DiarySeed> {
    let now = Utc::now();
    let start = now - Duration::days(SEED_HISTORY_DAYS);

    (0..count)
        .map(|_| {
            let mut title: String = Sentence(2..8).fake();
            title.truncate(255);

            DiarySeed {
                title,
                content: Paragraph(2..6).fake(),
                created_at: DateTimeBetween(start, now).fake(),
            }
        })
        .collect()
}

/// Inserts `count` fake diaries and returns their ids. Nothing is kept if
/// any insert fails.
pub async fn seed_diaries(pool: &MySqlPool, count: usize) -> DbResult<Vec<u64>> {
    let start_time = Instant::now();
    println!("📔 Seeding {} diaries...", count);

    let table = diaries_table();
    let seeds = generate_diaries(count);

    let mut conn = pool.acquire().await?;
    let mut tx = transaction::begin(&mut conn).await?;
    let mut ids = Vec::with_capacity(seeds.len());

    for seed in &seeds {
        match table.insert(&mut *tx, &seed.to_record()).await {
            Ok(Some(id)) => ids.push(id),
            Ok(None) => {}
            Err(e) => {
                transaction::rollback(tx).await?;
                return Err(e);
            }
        }
    }

    transaction::commit(tx).await?;

    println!(
        "   ✓ Inserted {} diaries in {:?}",
        ids.len(),
        start_time.elapsed()
    );

    Ok(ids)
}
