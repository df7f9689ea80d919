//! Patron (user) model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::store::{Row, StoreResult};

/// Patron record from `users_by_id`.
///
/// `total_borrows` and `active_borrows` are derived summaries of the loan
/// history, adjusted in place by the circulation engine.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub user_id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    pub registration_date: DateTime<Utc>,
    pub total_borrows: i32,
    pub active_borrows: i32,
}

impl User {
    pub fn from_row(row: &Row) -> StoreResult<Self> {
        Ok(User {
            user_id: row.uuid("user_id")?,
            email: row.text("email")?,
            first_name: row.text("first_name")?,
            last_name: row.text("last_name")?,
            phone: row.text_or_default("phone"),
            address: row.text_or_default("address"),
            registration_date: row.timestamp("registration_date")?,
            total_borrows: row.int_or_zero("total_borrows"),
            active_borrows: row.int_or_zero("active_borrows"),
        })
    }

    /// Display name denormalized into loan and reservation rows.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
