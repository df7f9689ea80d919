//! Statistics repository

use std::sync::Arc;

use crate::{
    error::AppResult,
    models::stats::BookPopularity,
    store::{
        views::{BOOK_POPULARITY, GLOBAL_STATS, GLOBAL_STAT_NAME},
        Store, Value,
    },
};

#[derive(Clone)]
pub struct StatsRepository {
    store: Arc<dyn Store>,
}

impl StatsRepository {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Total loans ever created. Absent counter reads as zero.
    pub async fn total_borrows(&self) -> AppResult<i64> {
        let row = self
            .store
            .get(&GLOBAL_STATS, &[Value::text(GLOBAL_STAT_NAME)])
            .await?;
        Ok(row.map(|r| r.bigint_or_zero("total_borrows")).unwrap_or(0))
    }

    /// Top `limit` books by borrow count. This scans the whole popularity
    /// view and sorts in memory; ties break on ascending ISBN so the
    /// ranking is deterministic.
    pub async fn top_books(&self, limit: usize) -> AppResult<Vec<BookPopularity>> {
        let rows = self.store.scan(&BOOK_POPULARITY, &[]).await?;
        let mut entries: Vec<BookPopularity> = rows
            .iter()
            .map(BookPopularity::from_row)
            .collect::<Result<_, _>>()?;
        entries.sort_by(|a, b| {
            b.borrow_count
                .cmp(&a.borrow_count)
                .then_with(|| a.isbn.cmp(&b.isbn))
        });
        entries.truncate(limit);
        Ok(entries)
    }
}
