//! Error types for the Athenaeum server

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

/// Why the circulation engine or the reservation queue said no. These are
/// expected outcomes of well-formed requests, not faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// `available_copies` is already zero.
    NoCopiesAvailable,
    /// The patron already holds an active loan of this book.
    AlreadyBorrowed,
    /// No active loan exists for this (patron, book) pair.
    NoActiveLoan,
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            DenialReason::NoCopiesAvailable => "no copies available",
            DenialReason::AlreadyBorrowed => "book already borrowed by this user",
            DenialReason::NoActiveLoan => "no active loan for this user and book",
        };
        f.write_str(msg)
    }
}

/// Main application error type.
///
/// Domain denials, missing entities and store faults are distinct variants
/// so callers can tell "the rule said no" (400), "nothing there" (404) and
/// "the infrastructure broke" (500) apart.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("operation denied: {0}")]
    Denied(DenialReason),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            AppError::Denied(reason) => (StatusCode::BAD_REQUEST, "denied", reason.to_string()),
            AppError::Store(e) => {
                tracing::error!("store error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "store_error",
                    "storage backend error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
