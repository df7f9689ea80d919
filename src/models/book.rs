//! Book model and the projections carried by the listing views

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::store::{Row, StoreResult};

/// Canonical book record as stored in `books_by_isbn`.
///
/// Invariant: `0 <= available_copies <= total_copies`, and the same
/// `available_copies` value is carried by all three book views.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Book {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub category: String,
    pub publisher: String,
    pub publication_year: i32,
    pub total_copies: i32,
    pub available_copies: i32,
    #[serde(default)]
    pub description: String,
}

impl Book {
    pub fn from_row(row: &Row) -> StoreResult<Self> {
        Ok(Book {
            isbn: row.text("isbn")?,
            title: row.text("title")?,
            author: row.text("author")?,
            category: row.text("category")?,
            publisher: row.text_or_default("publisher"),
            publication_year: row.int_or_zero("publication_year"),
            total_copies: row.int_or_zero("total_copies"),
            available_copies: row.int_or_zero("available_copies"),
            description: row.text_or_default("description"),
        })
    }
}

/// Projection returned by the category and author listings. The two views
/// carry different columns (the category view knows the author, the author
/// view knows the category), so both of those are optional here.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookSummary {
    pub isbn: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub available_copies: i32,
    pub total_copies: i32,
}

impl BookSummary {
    /// Row from `books_by_category`.
    pub fn from_category_row(row: &Row) -> StoreResult<Self> {
        Ok(BookSummary {
            isbn: row.text("isbn")?,
            title: row.text("title")?,
            author: row.value("author").as_text().map(str::to_owned),
            category: None,
            available_copies: row.int_or_zero("available_copies"),
            total_copies: row.int_or_zero("total_copies"),
        })
    }

    /// Row from `books_by_author`.
    pub fn from_author_row(row: &Row) -> StoreResult<Self> {
        Ok(BookSummary {
            isbn: row.text("isbn")?,
            title: row.text("title")?,
            author: None,
            category: row.value("category").as_text().map(str::to_owned),
            available_copies: row.int_or_zero("available_copies"),
            total_copies: row.int_or_zero("total_copies"),
        })
    }
}
