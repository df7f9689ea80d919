//! Circulation engine: borrow and return as multi-view write sequences.
//!
//! The store gives us single-row atomicity and nothing more, so each
//! operation here is a fixed-order sequence of independent writes across
//! the book views, the active-loan marker, both history views and the
//! counters. A failure aborts the remaining steps but never rolls back the
//! ones already applied; the order therefore puts the reader-visible state
//! (stock, active marker) ahead of the secondary bookkeeping (counters,
//! popularity).
//!
//! Borrow and return are serialized per ISBN with an in-process keyed lock,
//! which closes the check-then-act races between tasks of this process
//! (double-decrement past zero stock, duplicate active markers). Races
//! across processes remain possible; there is no cross-process lease.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult, DenialReason},
    models::loan::{ActiveLoan, LoanRecord, LoanStatus},
    store::{
        views::{
            ACTIVE_BORROWS_BY_USER_BOOK, BOOKS_BY_AUTHOR, BOOKS_BY_CATEGORY, BOOKS_BY_ISBN,
            BOOK_POPULARITY, BORROWS_BY_BOOK, BORROWS_BY_USER, GLOBAL_STATS, GLOBAL_STAT_NAME,
            USERS_BY_ID,
        },
        Store, Value,
    },
};

/// Per-ISBN async locks. Entries are never reclaimed; the map is bounded by
/// the number of distinct ISBNs ever circulated by this process.
#[derive(Default)]
struct IsbnLocks {
    inner: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl IsbnLocks {
    async fn acquire(&self, isbn: &str) -> OwnedMutexGuard<()> {
        let cell = {
            let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            map.entry(isbn.to_owned()).or_default().clone()
        };
        cell.lock_owned().await
    }
}

#[derive(Clone)]
pub struct LoansRepository {
    store: Arc<dyn Store>,
    locks: Arc<IsbnLocks>,
}

impl LoansRepository {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            locks: Arc::new(IsbnLocks::default()),
        }
    }

    /// Borrow one copy of `isbn` for `user_id`.
    ///
    /// Preconditions, each a denial rather than a fault: the book exists,
    /// at least one copy is available, and the patron does not already hold
    /// an active loan of this book.
    pub async fn borrow(&self, user_id: Uuid, isbn: &str, user_name: &str) -> AppResult<()> {
        let _guard = self.locks.acquire(isbn).await;

        let book = self
            .store
            .get(&BOOKS_BY_ISBN, &[Value::text(isbn)])
            .await?
            .ok_or_else(|| AppError::NotFound(format!("book {isbn} not found")))?;

        let available = book.int_or_zero("available_copies");
        if available <= 0 {
            tracing::warn!(%user_id, isbn, "borrow denied: no copies available");
            return Err(AppError::Denied(DenialReason::NoCopiesAvailable));
        }

        let active_key = [Value::Uuid(user_id), Value::text(isbn)];
        if self
            .store
            .get(&ACTIVE_BORROWS_BY_USER_BOOK, &active_key)
            .await?
            .is_some()
        {
            tracing::warn!(%user_id, isbn, "borrow denied: already borrowed");
            return Err(AppError::Denied(DenialReason::AlreadyBorrowed));
        }

        // Denormalization keys come from this read, not from any cache; a
        // stale category or author would update the wrong listing row.
        let title = book.text("title")?;
        let category = book.text("category")?;
        let author = book.text("author")?;

        // One instant shared by every row written for this loan.
        let borrow_date = Utc::now();

        self.write_stock(isbn, &title, &category, &author, available - 1)
            .await?;

        self.store
            .upsert(
                &ACTIVE_BORROWS_BY_USER_BOOK,
                &active_key,
                &[
                    ("borrow_date", Value::Timestamp(borrow_date)),
                    ("book_title", Value::text(title.as_str())),
                    ("user_name", Value::text(user_name)),
                ],
            )
            .await?;

        self.store
            .upsert(
                &BORROWS_BY_USER,
                &[
                    Value::Uuid(user_id),
                    Value::Timestamp(borrow_date),
                    Value::text(isbn),
                ],
                &[
                    ("book_title", Value::text(title.as_str())),
                    ("user_name", Value::text(user_name)),
                    ("status", Value::text(LoanStatus::Borrowed.as_str())),
                    ("return_date", Value::Null),
                ],
            )
            .await?;

        self.store
            .upsert(
                &BORROWS_BY_BOOK,
                &[
                    Value::text(isbn),
                    Value::Timestamp(borrow_date),
                    Value::Uuid(user_id),
                ],
                &[
                    ("user_name", Value::text(user_name)),
                    ("book_title", Value::text(title.as_str())),
                    ("status", Value::text(LoanStatus::Borrowed.as_str())),
                    ("return_date", Value::Null),
                ],
            )
            .await?;

        let (total, active) = self.read_counters(user_id).await?;
        self.write_counters(user_id, total + 1, active + 1).await?;

        self.store
            .increment(
                &GLOBAL_STATS,
                &[Value::text(GLOBAL_STAT_NAME)],
                "total_borrows",
                1,
            )
            .await?;
        self.store
            .increment(&BOOK_POPULARITY, &[Value::text(isbn)], "borrow_count", 1)
            .await?;

        tracing::info!(%user_id, isbn, "borrow recorded");
        Ok(())
    }

    /// Return the active loan of `isbn` held by `user_id`.
    ///
    /// The absence of an active marker is a denial, not a fault: there is
    /// nothing to return. The marker's borrow timestamp addresses the
    /// per-book history row that gets rewritten in place.
    pub async fn return_book(&self, user_id: Uuid, isbn: &str) -> AppResult<()> {
        let _guard = self.locks.acquire(isbn).await;

        let active_key = [Value::Uuid(user_id), Value::text(isbn)];
        let active = match self
            .store
            .get(&ACTIVE_BORROWS_BY_USER_BOOK, &active_key)
            .await?
        {
            Some(row) => row,
            None => {
                tracing::warn!(%user_id, isbn, "return denied: no active loan");
                return Err(AppError::Denied(DenialReason::NoActiveLoan));
            }
        };
        let borrow_date = active.timestamp("borrow_date")?;
        let book_title = active.text_or_default("book_title");
        let user_name = active.text_or_default("user_name");

        let book = self
            .store
            .get(&BOOKS_BY_ISBN, &[Value::text(isbn)])
            .await?
            .ok_or_else(|| AppError::NotFound(format!("book {isbn} not found")))?;

        let title = book.text("title")?;
        let category = book.text("category")?;
        let author = book.text("author")?;
        let total_copies = book.int_or_zero("total_copies");
        // Clamp against drift: stock never exceeds the owned copies.
        let available = (book.int_or_zero("available_copies") + 1).min(total_copies);

        self.write_stock(isbn, &title, &category, &author, available)
            .await?;

        self.store
            .delete(&ACTIVE_BORROWS_BY_USER_BOOK, &active_key)
            .await?;

        let return_date = Utc::now();

        // Per-patron history is append-only: the return is a new event row
        // keyed by its own timestamp, the BORROWED row stays untouched.
        self.store
            .upsert(
                &BORROWS_BY_USER,
                &[
                    Value::Uuid(user_id),
                    Value::Timestamp(return_date),
                    Value::text(isbn),
                ],
                &[
                    ("book_title", Value::text(book_title.as_str())),
                    ("user_name", Value::text(user_name.as_str())),
                    ("status", Value::text(LoanStatus::Returned.as_str())),
                    ("return_date", Value::Timestamp(return_date)),
                ],
            )
            .await?;

        // Per-book history rewrites the original loan row in place, keyed
        // by the borrow timestamp read back from the marker.
        self.store
            .upsert(
                &BORROWS_BY_BOOK,
                &[
                    Value::text(isbn),
                    Value::Timestamp(borrow_date),
                    Value::Uuid(user_id),
                ],
                &[
                    ("user_name", Value::text(user_name.as_str())),
                    ("book_title", Value::text(book_title.as_str())),
                    ("status", Value::text(LoanStatus::Returned.as_str())),
                    ("return_date", Value::Timestamp(return_date)),
                ],
            )
            .await?;

        // Total is untouched by a return; active floors at zero.
        let (total, active_count) = self.read_counters(user_id).await?;
        self.write_counters(user_id, total, (active_count - 1).max(0))
            .await?;

        tracing::info!(%user_id, isbn, "return recorded");
        Ok(())
    }

    pub async fn get_active(&self, user_id: Uuid, isbn: &str) -> AppResult<Option<ActiveLoan>> {
        let row = self
            .store
            .get(
                &ACTIVE_BORROWS_BY_USER_BOOK,
                &[Value::Uuid(user_id), Value::text(isbn)],
            )
            .await?;
        Ok(row.as_ref().map(ActiveLoan::from_row).transpose()?)
    }

    /// Loan history of one patron, in borrow-timestamp order.
    pub async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<LoanRecord>> {
        let rows = self
            .store
            .scan(&BORROWS_BY_USER, &[Value::Uuid(user_id)])
            .await?;
        Ok(rows
            .iter()
            .map(LoanRecord::from_row)
            .collect::<Result<_, _>>()?)
    }

    /// Loan history of one book, in borrow-timestamp order.
    pub async fn list_by_book(&self, isbn: &str) -> AppResult<Vec<LoanRecord>> {
        let rows = self
            .store
            .scan(&BORROWS_BY_BOOK, &[Value::text(isbn)])
            .await?;
        Ok(rows
            .iter()
            .map(LoanRecord::from_row)
            .collect::<Result<_, _>>()?)
    }

    /// Fan the new stock value out to all three book views, using the
    /// category and author just read so the right listing rows are hit.
    async fn write_stock(
        &self,
        isbn: &str,
        title: &str,
        category: &str,
        author: &str,
        available: i32,
    ) -> AppResult<()> {
        let stock = [("available_copies", Value::Int(available))];

        self.store
            .upsert(&BOOKS_BY_ISBN, &[Value::text(isbn)], &stock)
            .await?;
        self.store
            .upsert(
                &BOOKS_BY_CATEGORY,
                &[
                    Value::text(category),
                    Value::text(title),
                    Value::text(isbn),
                ],
                &stock,
            )
            .await?;
        self.store
            .upsert(
                &BOOKS_BY_AUTHOR,
                &[Value::text(author), Value::text(title), Value::text(isbn)],
                &stock,
            )
            .await?;
        Ok(())
    }

    /// Current patron counters; a missing patron row reads as (0, 0).
    async fn read_counters(&self, user_id: Uuid) -> AppResult<(i32, i32)> {
        let row = self.store.get(&USERS_BY_ID, &[Value::Uuid(user_id)]).await?;
        Ok(row
            .map(|r| (r.int_or_zero("total_borrows"), r.int_or_zero("active_borrows")))
            .unwrap_or((0, 0)))
    }

    async fn write_counters(&self, user_id: Uuid, total: i32, active: i32) -> AppResult<()> {
        self.store
            .upsert(
                &USERS_BY_ID,
                &[Value::Uuid(user_id)],
                &[
                    ("total_borrows", Value::Int(total)),
                    ("active_borrows", Value::Int(active)),
                ],
            )
            .await?;
        Ok(())
    }
}
