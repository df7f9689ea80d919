//! Circulation endpoints

use axum::{
    extract::{Path, State},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{error::AppResult, models::loan::LoanRecord};

use super::parse_uuid;

/// Borrow / return form
#[derive(Deserialize, ToSchema)]
pub struct BorrowRequest {
    /// Patron identifier
    pub user_id: String,
    /// Book ISBN
    pub isbn: String,
}

#[derive(Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Borrow a book
#[utoipa::path(
    post,
    path = "/borrows",
    tag = "borrows",
    request_body(content = BorrowRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Book borrowed", body = SuccessResponse),
        (status = 400, description = "No copies available or already borrowed"),
        (status = 404, description = "Patron or book not found")
    )
)]
pub async fn create_borrow(
    State(state): State<crate::AppState>,
    Form(request): Form<BorrowRequest>,
) -> AppResult<Json<SuccessResponse>> {
    let user_id = parse_uuid(&request.user_id)?;
    state.services.loans.borrow(user_id, &request.isbn).await?;
    Ok(Json(SuccessResponse { success: true }))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/borrows/return",
    tag = "borrows",
    request_body(content = BorrowRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Book returned", body = SuccessResponse),
        (status = 400, description = "No active loan for this patron and book")
    )
)]
pub async fn return_borrow(
    State(state): State<crate::AppState>,
    Form(request): Form<BorrowRequest>,
) -> AppResult<Json<SuccessResponse>> {
    let user_id = parse_uuid(&request.user_id)?;
    state
        .services
        .loans
        .return_book(user_id, &request.isbn)
        .await?;
    Ok(Json(SuccessResponse { success: true }))
}

/// Loan history of a patron
#[utoipa::path(
    get,
    path = "/users/{user_id}/borrows",
    tag = "borrows",
    params(
        ("user_id" = String, Path, description = "Patron identifier")
    ),
    responses(
        (status = 200, description = "Patron loan history", body = Vec<LoanRecord>),
        (status = 400, description = "Malformed patron identifier")
    )
)]
pub async fn get_user_borrows(
    State(state): State<crate::AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Vec<LoanRecord>>> {
    // No existence check on the patron; an unknown id yields an empty list.
    let user_id = parse_uuid(&user_id)?;
    let loans = state.services.loans.user_borrows(user_id).await?;
    Ok(Json(loans))
}

/// Loan history of a book
#[utoipa::path(
    get,
    path = "/books/{isbn}/borrows",
    tag = "borrows",
    params(
        ("isbn" = String, Path, description = "Book ISBN")
    ),
    responses(
        (status = 200, description = "Book loan history", body = Vec<LoanRecord>)
    )
)]
pub async fn get_book_borrows(
    State(state): State<crate::AppState>,
    Path(isbn): Path<String>,
) -> AppResult<Json<Vec<LoanRecord>>> {
    let loans = state.services.loans.book_borrows(&isbn).await?;
    Ok(Json(loans))
}
