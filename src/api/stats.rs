//! Statistics endpoint

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{error::AppResult, models::stats::BookPopularity};

const DEFAULT_TOP: usize = 5;

#[derive(Deserialize, IntoParams)]
pub struct StatsQuery {
    /// How many popular books to include (default 5)
    pub top: Option<usize>,
}

#[derive(Serialize, ToSchema)]
pub struct StatsResponse {
    /// Total loans ever created (never decremented)
    pub total_borrows: i64,
    /// Most borrowed books, most popular first
    pub top_books: Vec<BookPopularity>,
}

/// Borrowing statistics
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    params(StatsQuery),
    responses(
        (status = 200, description = "Borrowing statistics", body = StatsResponse)
    )
)]
pub async fn get_stats(
    State(state): State<crate::AppState>,
    Query(query): Query<StatsQuery>,
) -> AppResult<Json<StatsResponse>> {
    let limit = query.top.unwrap_or(DEFAULT_TOP);
    let total_borrows = state.services.stats.total_borrows().await?;
    let top_books = state.services.stats.top_books(limit).await?;

    Ok(Json(StatsResponse {
        total_borrows,
        top_books,
    }))
}
