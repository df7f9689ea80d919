//! Loan models: the active marker and the history rows

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::store::{Row, StoreError, StoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanStatus {
    Borrowed,
    Returned,
}

impl LoanStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LoanStatus::Borrowed => "BORROWED",
            LoanStatus::Returned => "RETURNED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "BORROWED" => Some(LoanStatus::Borrowed),
            "RETURNED" => Some(LoanStatus::Returned),
            _ => None,
        }
    }
}

/// Presence marker from `active_borrows_by_user_book`: exists exactly while
/// the loan is outstanding.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActiveLoan {
    pub user_id: Uuid,
    pub isbn: String,
    pub borrow_date: DateTime<Utc>,
    pub book_title: String,
    pub user_name: String,
}

impl ActiveLoan {
    pub fn from_row(row: &Row) -> StoreResult<Self> {
        Ok(ActiveLoan {
            user_id: row.uuid("user_id")?,
            isbn: row.text("isbn")?,
            borrow_date: row.timestamp("borrow_date")?,
            book_title: row.text_or_default("book_title"),
            user_name: row.text_or_default("user_name"),
        })
    }
}

/// One history row, from either `borrows_by_user` or `borrows_by_book`
/// (the two views carry the same columns under different keys).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoanRecord {
    pub user_id: Uuid,
    pub isbn: String,
    pub book_title: String,
    pub user_name: String,
    pub borrow_date: DateTime<Utc>,
    pub status: LoanStatus,
    pub return_date: Option<DateTime<Utc>>,
}

impl LoanRecord {
    pub fn from_row(row: &Row) -> StoreResult<Self> {
        let status = LoanStatus::parse(&row.text("status")?).ok_or(StoreError::Decode {
            view: row.view().name,
            column: "status",
        })?;
        Ok(LoanRecord {
            user_id: row.uuid("user_id")?,
            isbn: row.text("isbn")?,
            book_title: row.text_or_default("book_title"),
            user_name: row.text_or_default("user_name"),
            borrow_date: row.timestamp("borrow_date")?,
            status,
            return_date: row.timestamp_opt("return_date"),
        })
    }
}
