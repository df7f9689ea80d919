//! Athenaeum Library Management System
//!
//! A Rust backend for managing a library catalog, patrons, loans and
//! reservations over a denormalized keyed-row store, exposing a REST JSON
//! API and a companion CLI.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod store;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<services::Services>,
}
