//! Catalog read endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::AppResult,
    models::book::{Book, BookSummary},
};

#[derive(Deserialize, IntoParams)]
pub struct BookListQuery {
    /// Category to list
    pub category: String,
}

/// Get one book by ISBN
#[utoipa::path(
    get,
    path = "/books/{isbn}",
    tag = "books",
    params(
        ("isbn" = String, Path, description = "Book ISBN")
    ),
    responses(
        (status = 200, description = "Book record", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(isbn): Path<String>,
) -> AppResult<Json<Book>> {
    let book = state.services.catalog.require_book(&isbn).await?;
    Ok(Json(book))
}

/// List books in a category
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(BookListQuery),
    responses(
        (status = 200, description = "Books in the category", body = Vec<BookSummary>)
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    Query(query): Query<BookListQuery>,
) -> AppResult<Json<Vec<BookSummary>>> {
    let books = state.services.catalog.list_by_category(&query.category).await?;
    Ok(Json(books))
}

/// List books by an author
#[utoipa::path(
    get,
    path = "/authors/{author}/books",
    tag = "books",
    params(
        ("author" = String, Path, description = "Author name")
    ),
    responses(
        (status = 200, description = "Books by the author", body = Vec<BookSummary>)
    )
)]
pub async fn list_books_by_author(
    State(state): State<crate::AppState>,
    Path(author): Path<String>,
) -> AppResult<Json<Vec<BookSummary>>> {
    let books = state.services.catalog.list_by_author(&author).await?;
    Ok(Json(books))
}
