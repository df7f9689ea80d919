//! Loan management service

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::loan::LoanRecord,
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Borrow a book. The patron and book are resolved first (missing ones
    /// are 404s, not denials); the engine re-reads the book for stock.
    pub async fn borrow(&self, user_id: Uuid, isbn: &str) -> AppResult<()> {
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
        self.repository.loans.borrow(user_id, isbn, &user_name).await
    }

    /// Return a book. No entity lookups here: the active marker is the
    /// only precondition, and its absence is a denial.
    pub async fn return_book(&self, user_id: Uuid, isbn: &str) -> AppResult<()> {
        self.repository.loans.return_book(user_id, isbn).await
    }

    pub async fn user_borrows(&self, user_id: Uuid) -> AppResult<Vec<LoanRecord>> {
        self.repository.loans.list_by_user(user_id).await
    }

    pub async fn book_borrows(&self, isbn: &str) -> AppResult<Vec<LoanRecord>> {
        self.repository.loans.list_by_book(isbn).await
    }
}
