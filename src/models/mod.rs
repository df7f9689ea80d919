//! Domain models

pub mod book;
pub mod loan;
pub mod reservation;
pub mod stats;
pub mod user;
