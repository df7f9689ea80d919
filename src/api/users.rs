//! Patron registration endpoint

use axum::{extract::State, http::StatusCode, Form, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppResult;

/// Patron registration form
#[derive(Deserialize, ToSchema)]
pub struct CreateUserRequest {
    /// Email address (not required to be unique)
    pub email: String,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Phone number
    #[serde(default)]
    pub phone: String,
    /// Postal address
    #[serde(default)]
    pub address: String,
}

#[derive(Serialize, ToSchema)]
pub struct CreateUserResponse {
    /// Generated patron identifier
    pub user_id: Uuid,
}

/// Register a new patron
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body(content = CreateUserRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 201, description = "Patron registered", body = CreateUserResponse)
    )
)]
pub async fn create_user(
    State(state): State<crate::AppState>,
    Form(request): Form<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<CreateUserResponse>)> {
    let user = state
        .services
        .users
        .register(
            &request.email,
            &request.first_name,
            &request.last_name,
            &request.phone,
            &request.address,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse {
            user_id: user.user_id,
        }),
    ))
}
