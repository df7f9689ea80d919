//! Statistics models

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::store::{Row, StoreResult};

/// Per-book popularity entry from the `book_popularity` counter view.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookPopularity {
    pub isbn: String,
    pub borrow_count: i64,
}

impl BookPopularity {
    pub fn from_row(row: &Row) -> StoreResult<Self> {
        Ok(BookPopularity {
            isbn: row.text("isbn")?,
            borrow_count: row.bigint_or_zero("borrow_count"),
        })
    }
}
