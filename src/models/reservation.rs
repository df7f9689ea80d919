//! Reservation model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::store::{Row, StoreResult};

/// One wait-list entry from `reservations_by_book`. Reservations are
/// append-only in this system; the status never leaves PENDING.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Reservation {
    pub isbn: String,
    pub reservation_date: DateTime<Utc>,
    pub user_id: Uuid,
    pub user_name: String,
    pub status: String,
}

impl Reservation {
    pub const PENDING: &'static str = "PENDING";

    pub fn from_row(row: &Row) -> StoreResult<Self> {
        Ok(Reservation {
            isbn: row.text("isbn")?,
            reservation_date: row.timestamp("reservation_date")?,
            user_id: row.uuid("user_id")?,
            user_name: row.text_or_default("user_name"),
            status: row.text_or_default("status"),
        })
    }
}
