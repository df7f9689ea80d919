//! Catalog repository: books materialized under three access keys

use std::sync::Arc;

use crate::{
    error::AppResult,
    models::book::{Book, BookSummary},
    store::{
        views::{BOOKS_BY_AUTHOR, BOOKS_BY_CATEGORY, BOOKS_BY_ISBN},
        Store, Value,
    },
};

#[derive(Clone)]
pub struct BooksRepository {
    store: Arc<dyn Store>,
}

impl BooksRepository {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Write one book into all three views. Upsert semantics: re-adding an
    /// ISBN silently overwrites every view, there is no existence check.
    pub async fn add_book(&self, book: &Book) -> AppResult<()> {
        self.store
            .upsert(
                &BOOKS_BY_ISBN,
                &[Value::text(book.isbn.as_str())],
                &[
                    ("title", Value::text(book.title.as_str())),
                    ("author", Value::text(book.author.as_str())),
                    ("category", Value::text(book.category.as_str())),
                    ("publisher", Value::text(book.publisher.as_str())),
                    ("publication_year", Value::Int(book.publication_year)),
                    ("total_copies", Value::Int(book.total_copies)),
                    ("available_copies", Value::Int(book.available_copies)),
                    ("description", Value::text(book.description.as_str())),
                ],
            )
            .await?;

        self.store
            .upsert(
                &BOOKS_BY_CATEGORY,
                &[
                    Value::text(book.category.as_str()),
                    Value::text(book.title.as_str()),
                    Value::text(book.isbn.as_str()),
                ],
                &[
                    ("author", Value::text(book.author.as_str())),
                    ("publisher", Value::text(book.publisher.as_str())),
                    ("publication_year", Value::Int(book.publication_year)),
                    ("available_copies", Value::Int(book.available_copies)),
                    ("total_copies", Value::Int(book.total_copies)),
                ],
            )
            .await?;

        self.store
            .upsert(
                &BOOKS_BY_AUTHOR,
                &[
                    Value::text(book.author.as_str()),
                    Value::text(book.title.as_str()),
                    Value::text(book.isbn.as_str()),
                ],
                &[
                    ("category", Value::text(book.category.as_str())),
                    ("publisher", Value::text(book.publisher.as_str())),
                    ("publication_year", Value::Int(book.publication_year)),
                    ("available_copies", Value::Int(book.available_copies)),
                    ("total_copies", Value::Int(book.total_copies)),
                    ("description", Value::text(book.description.as_str())),
                ],
            )
            .await?;

        tracing::info!(isbn = %book.isbn, title = %book.title, "book added");
        Ok(())
    }

    pub async fn get_by_isbn(&self, isbn: &str) -> AppResult<Option<Book>> {
        let row = self
            .store
            .get(&BOOKS_BY_ISBN, &[Value::text(isbn)])
            .await?;
        Ok(row.as_ref().map(Book::from_row).transpose()?)
    }

    pub async fn list_by_category(&self, category: &str) -> AppResult<Vec<BookSummary>> {
        let rows = self
            .store
            .scan(&BOOKS_BY_CATEGORY, &[Value::text(category)])
            .await?;
        Ok(rows
            .iter()
            .map(BookSummary::from_category_row)
            .collect::<Result<_, _>>()?)
    }

    pub async fn list_by_author(&self, author: &str) -> AppResult<Vec<BookSummary>> {
        let rows = self
            .store
            .scan(&BOOKS_BY_AUTHOR, &[Value::text(author)])
            .await?;
        Ok(rows
            .iter()
            .map(BookSummary::from_author_row)
            .collect::<Result<_, _>>()?)
    }
}
