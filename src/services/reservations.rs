//! Reservation service

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::reservation::Reservation,
    repository::Repository,
};

#[derive(Clone)]
pub struct ReservationsService {
    repository: Repository,
}

impl ReservationsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Queue a reservation. Both entities must exist; the queue itself
    /// accepts anything, including duplicates.
    pub async fn reserve(&self, user_id: Uuid, isbn: &str) -> AppResult<()> {
        let user = self
            .repository
            .users
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {user_id} not found")))?;
        self.repository
            .books
            .get_by_isbn(isbn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("book {isbn} not found")))?;

        let user_name = user.full_name();
        self.repository
            .reservations
            .add(isbn, user_id, &user_name)
            .await
    }

    pub async fn list_by_isbn(&self, isbn: &str) -> AppResult<Vec<Reservation>> {
        self.repository.reservations.list_by_isbn(isbn).await
    }
}
