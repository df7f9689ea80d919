//! Reservation endpoints

use axum::{
    extract::{Path, State},
    Form, Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{error::AppResult, models::reservation::Reservation};

use super::{borrows::SuccessResponse, parse_uuid};

/// Reservation form
#[derive(Deserialize, ToSchema)]
pub struct CreateReservationRequest {
    /// Patron identifier
    pub user_id: String,
    /// Book ISBN
    pub isbn: String,
}

/// Queue a reservation for a book
#[utoipa::path(
    post,
    path = "/reservations",
    tag = "reservations",
    request_body(content = CreateReservationRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Reservation queued", body = SuccessResponse),
        (status = 400, description = "Malformed patron identifier"),
        (status = 404, description = "Patron or book not found")
    )
)]
pub async fn create_reservation(
    State(state): State<crate::AppState>,
    Form(request): Form<CreateReservationRequest>,
) -> AppResult<Json<SuccessResponse>> {
    let user_id = parse_uuid(&request.user_id)?;
    state
        .services
        .reservations
        .reserve(user_id, &request.isbn)
        .await?;
    Ok(Json(SuccessResponse { success: true }))
}

/// List reservations for a book, oldest first
#[utoipa::path(
    get,
    path = "/reservations/{isbn}",
    tag = "reservations",
    params(
        ("isbn" = String, Path, description = "Book ISBN")
    ),
    responses(
        (status = 200, description = "Reservations in FIFO order", body = Vec<Reservation>)
    )
)]
pub async fn list_reservations(
    State(state): State<crate::AppState>,
    Path(isbn): Path<String>,
) -> AppResult<Json<Vec<Reservation>>> {
    let reservations = state.services.reservations.list_by_isbn(&isbn).await?;
    Ok(Json(reservations))
}
