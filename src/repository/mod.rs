//! Repository layer over the keyed-row store.
//!
//! Each repository owns the views for one entity and is handed the shared
//! store at construction. Nothing here assumes more than single-row
//! atomicity from the store.

pub mod books;
pub mod loans;
pub mod reservations;
pub mod stats;
pub mod users;

use std::sync::Arc;

use crate::store::Store;

/// Main repository struct holding the shared store handle
#[derive(Clone)]
pub struct Repository {
    pub store: Arc<dyn Store>,
    pub books: books::BooksRepository,
    pub users: users::UsersRepository,
    pub loans: loans::LoansRepository,
    pub reservations: reservations::ReservationsRepository,
    pub stats: stats::StatsRepository,
}

impl Repository {
    /// Create a new repository with the given store
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            books: books::BooksRepository::new(store.clone()),
            users: users::UsersRepository::new(store.clone()),
            loans: loans::LoansRepository::new(store.clone()),
            reservations: reservations::ReservationsRepository::new(store.clone()),
            stats: stats::StatsRepository::new(store.clone()),
            store,
        }
    }
}
