//! HTTP handlers for the REST endpoints

pub mod books;
pub mod borrows;
pub mod health;
pub mod openapi;
pub mod reservations;
pub mod stats;
pub mod users;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use crate::{error::AppError, AppState};

/// Parse a patron identifier supplied by a client. A malformed identifier
/// is the client's mistake, not a missing entity.
pub(crate) fn parse_uuid(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(format!("invalid user id: {raw}")))
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Patrons
        .route("/users", post(users::create_user))
        .route("/users/:user_id/borrows", get(borrows::get_user_borrows))
        // Catalog
        .route("/books", get(books::list_books))
        .route("/books/:isbn", get(books::get_book))
        .route("/books/:isbn/borrows", get(borrows::get_book_borrows))
        .route("/authors/:author/books", get(books::list_books_by_author))
        // Circulation
        .route("/borrows", post(borrows::create_borrow))
        .route("/borrows/return", post(borrows::return_borrow))
        // Reservations
        .route("/reservations", post(reservations::create_reservation))
        .route("/reservations/:isbn", get(reservations::list_reservations))
        // Statistics
        .route("/stats", get(stats::get_stats))
        .with_state(state);

    Router::new()
        .merge(api)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
