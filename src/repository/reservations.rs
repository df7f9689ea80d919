//! Reservation queue repository

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::reservation::Reservation,
    store::{views::RESERVATIONS_BY_BOOK, Store, Value},
};

#[derive(Clone)]
pub struct ReservationsRepository {
    store: Arc<dyn Store>,
}

impl ReservationsRepository {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Append one PENDING entry to the book's wait-list. No dedup: a patron
    /// may queue several times for the same book.
    pub async fn add(&self, isbn: &str, user_id: Uuid, user_name: &str) -> AppResult<()> {
        let now = Utc::now();
        self.store
            .upsert(
                &RESERVATIONS_BY_BOOK,
                &[
                    Value::text(isbn),
                    Value::Timestamp(now),
                    Value::Uuid(user_id),
                ],
                &[
                    ("user_name", Value::text(user_name)),
                    ("status", Value::text(Reservation::PENDING)),
                ],
            )
            .await?;

        tracing::info!(%user_id, isbn, "reservation queued");
        Ok(())
    }

    /// All entries for a book. FIFO comes from the clustering on the
    /// reservation timestamp; no sort happens here.
    pub async fn list_by_isbn(&self, isbn: &str) -> AppResult<Vec<Reservation>> {
        let rows = self
            .store
            .scan(&RESERVATIONS_BY_BOOK, &[Value::text(isbn)])
            .await?;
        Ok(rows
            .iter()
            .map(Reservation::from_row)
            .collect::<Result<_, _>>()?)
    }
}
