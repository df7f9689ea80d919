//! Statistics service

use crate::{error::AppResult, models::stats::BookPopularity, repository::Repository};

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn total_borrows(&self) -> AppResult<i64> {
        self.repository.stats.total_borrows().await
    }

    pub async fn top_books(&self, limit: usize) -> AppResult<Vec<BookPopularity>> {
        self.repository.stats.top_books(limit).await
    }
}
