//! OpenAPI documentation

use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

use crate::api::{books, borrows, health, reservations, stats, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Athenaeum API",
        version = "0.3.0",
        description = "Library Management System REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    paths(
        // Health
        health::health_check,
        // Users
        users::create_user,
        // Books
        books::get_book,
        books::list_books,
        books::list_books_by_author,
        // Borrows
        borrows::create_borrow,
        borrows::return_borrow,
        borrows::get_user_borrows,
        borrows::get_book_borrows,
        // Reservations
        reservations::create_reservation,
        reservations::list_reservations,
        // Stats
        stats::get_stats,
    ),
    components(
        schemas(
            // Users
            users::CreateUserRequest,
            users::CreateUserResponse,
            crate::models::user::User,
            // Books
            crate::models::book::Book,
            crate::models::book::BookSummary,
            // Borrows
            borrows::BorrowRequest,
            borrows::SuccessResponse,
            crate::models::loan::LoanStatus,
            crate::models::loan::LoanRecord,
            // Reservations
            reservations::CreateReservationRequest,
            crate::models::reservation::Reservation,
            // Stats
            stats::StatsResponse,
            crate::models::stats::BookPopularity,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "Patron management"),
        (name = "books", description = "Catalog reads"),
        (name = "borrows", description = "Circulation"),
        (name = "reservations", description = "Reservation queues"),
        (name = "stats", description = "Borrowing statistics")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new().route(
        "/api-docs/openapi.json",
        get(|| async { Json(ApiDoc::openapi()) }),
    )
}
