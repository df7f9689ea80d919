//! Catalog service

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookSummary},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn add_book(&self, book: &Book) -> AppResult<()> {
        self.repository.books.add_book(book).await
    }

    pub async fn get_book(&self, isbn: &str) -> AppResult<Option<Book>> {
        self.repository.books.get_by_isbn(isbn).await
    }

    /// Book lookup where absence is an error for the caller's flow.
    pub async fn require_book(&self, isbn: &str) -> AppResult<Book> {
        self.get_book(isbn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("book {isbn} not found")))
    }

    pub async fn list_by_category(&self, category: &str) -> AppResult<Vec<BookSummary>> {
        self.repository.books.list_by_category(category).await
    }

    pub async fn list_by_author(&self, author: &str) -> AppResult<Vec<BookSummary>> {
        self.repository.books.list_by_author(author).await
    }
}
