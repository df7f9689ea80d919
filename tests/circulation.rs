//! Circulation tests over the in-memory store: denormalized view agreement,
//! borrow/return preconditions, reservation ordering and statistics.

use std::sync::Arc;

use async_trait::async_trait;

use athenaeum_server::{
    error::{AppError, DenialReason},
    models::{book::Book, loan::LoanStatus, user::User},
    repository::Repository,
    store::{MemoryStore, Row, Store, StoreError, StoreResult, Value, ViewDef},
};

fn repository() -> Repository {
    Repository::new(Arc::new(MemoryStore::new()))
}

fn book(isbn: &str, copies: i32, available: i32) -> Book {
    Book {
        isbn: isbn.to_string(),
        title: format!("Title of {isbn}"),
        author: "Ursula K. Le Guin".to_string(),
        category: "Fiction".to_string(),
        publisher: "Harcourt".to_string(),
        publication_year: 1969,
        total_copies: copies,
        available_copies: available,
        description: String::new(),
    }
}

async fn register(repo: &Repository, first: &str, last: &str) -> User {
    repo.users
        .create(
            &format!("{}@example.org", first.to_lowercase()),
            first,
            last,
            "",
            "",
        )
        .await
        .unwrap()
}

/// Read `available_copies` as each of the three book views sees it.
async fn available_in_all_views(repo: &Repository, b: &Book) -> (i32, i32, i32) {
    let by_isbn = repo
        .books
        .get_by_isbn(&b.isbn)
        .await
        .unwrap()
        .unwrap()
        .available_copies;
    let by_category = repo
        .books
        .list_by_category(&b.category)
        .await
        .unwrap()
        .into_iter()
        .find(|s| s.isbn == b.isbn)
        .unwrap()
        .available_copies;
    let by_author = repo
        .books
        .list_by_author(&b.author)
        .await
        .unwrap()
        .into_iter()
        .find(|s| s.isbn == b.isbn)
        .unwrap()
        .available_copies;
    (by_isbn, by_category, by_author)
}

#[tokio::test]
async fn borrow_updates_all_three_book_views() {
    let repo = repository();
    let b = book("978-0441478125", 3, 3);
    repo.books.add_book(&b).await.unwrap();
    let user = register(&repo, "Alice", "Martin").await;

    repo.loans
        .borrow(user.user_id, &b.isbn, &user.full_name())
        .await
        .unwrap();

    assert_eq!(available_in_all_views(&repo, &b).await, (2, 2, 2));
}

#[tokio::test]
async fn borrow_then_return_restores_stock_and_clears_marker() {
    let repo = repository();
    let b = book("978-0441478125", 2, 2);
    repo.books.add_book(&b).await.unwrap();
    let user = register(&repo, "Alice", "Martin").await;

    repo.loans
        .borrow(user.user_id, &b.isbn, &user.full_name())
        .await
        .unwrap();
    assert!(repo
        .loans
        .get_active(user.user_id, &b.isbn)
        .await
        .unwrap()
        .is_some());

    repo.loans.return_book(user.user_id, &b.isbn).await.unwrap();

    assert_eq!(available_in_all_views(&repo, &b).await, (2, 2, 2));
    assert!(repo
        .loans
        .get_active(user.user_id, &b.isbn)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn second_borrow_of_same_book_is_denied() {
    let repo = repository();
    let b = book("978-0441478125", 3, 3);
    repo.books.add_book(&b).await.unwrap();
    let user = register(&repo, "Alice", "Martin").await;

    repo.loans
        .borrow(user.user_id, &b.isbn, &user.full_name())
        .await
        .unwrap();
    let second = repo
        .loans
        .borrow(user.user_id, &b.isbn, &user.full_name())
        .await;

    assert!(matches!(
        second,
        Err(AppError::Denied(DenialReason::AlreadyBorrowed))
    ));
    // The denied attempt must not have touched stock.
    assert_eq!(available_in_all_views(&repo, &b).await, (2, 2, 2));
}

#[tokio::test]
async fn borrow_at_zero_stock_is_denied_without_state_change() {
    let repo = repository();
    let b = book("978-0441478125", 1, 0);
    repo.books.add_book(&b).await.unwrap();
    let user = register(&repo, "Alice", "Martin").await;

    let result = repo
        .loans
        .borrow(user.user_id, &b.isbn, &user.full_name())
        .await;

    assert!(matches!(
        result,
        Err(AppError::Denied(DenialReason::NoCopiesAvailable))
    ));
    assert_eq!(available_in_all_views(&repo, &b).await, (0, 0, 0));
    assert!(repo
        .loans
        .get_active(user.user_id, &b.isbn)
        .await
        .unwrap()
        .is_none());
    // A denied borrow never counts toward the statistics.
    assert_eq!(repo.stats.total_borrows().await.unwrap(), 0);
}

#[tokio::test]
async fn borrow_of_unknown_book_is_not_found() {
    let repo = repository();
    let user = register(&repo, "Alice", "Martin").await;

    let result = repo
        .loans
        .borrow(user.user_id, "no-such-isbn", &user.full_name())
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn return_without_active_loan_is_denied() {
    let repo = repository();
    let b = book("978-0441478125", 1, 1);
    repo.books.add_book(&b).await.unwrap();
    let user = register(&repo, "Alice", "Martin").await;

    let result = repo.loans.return_book(user.user_id, &b.isbn).await;

    assert!(matches!(
        result,
        Err(AppError::Denied(DenialReason::NoActiveLoan))
    ));
    assert_eq!(available_in_all_views(&repo, &b).await, (1, 1, 1));
}

#[tokio::test]
async fn return_clamps_stock_at_total_copies() {
    let repo = repository();
    // Stock already at the maximum despite an outstanding loan marker;
    // simulates drift from a partially applied earlier sequence.
    let b = book("978-0441478125", 1, 1);
    repo.books.add_book(&b).await.unwrap();
    let user = register(&repo, "Alice", "Martin").await;

    repo.loans
        .borrow(user.user_id, &b.isbn, &user.full_name())
        .await
        .unwrap();
    // Put the stock back to total by hand, then return.
    repo.books.add_book(&b).await.unwrap();
    repo.loans.return_book(user.user_id, &b.isbn).await.unwrap();

    assert_eq!(available_in_all_views(&repo, &b).await, (1, 1, 1));
}

#[tokio::test]
async fn patron_history_appends_while_book_history_rewrites() {
    let repo = repository();
    let b = book("978-0441478125", 1, 1);
    repo.books.add_book(&b).await.unwrap();
    let user = register(&repo, "Alice", "Martin").await;

    repo.loans
        .borrow(user.user_id, &b.isbn, &user.full_name())
        .await
        .unwrap();
    repo.loans.return_book(user.user_id, &b.isbn).await.unwrap();

    // The patron view keeps both events as separate rows.
    let by_user = repo.loans.list_by_user(user.user_id).await.unwrap();
    assert_eq!(by_user.len(), 2);
    assert_eq!(by_user[0].status, LoanStatus::Borrowed);
    assert_eq!(by_user[1].status, LoanStatus::Returned);
    assert!(by_user[1].return_date.is_some());

    // The book view rewrote the single loan row in place.
    let by_book = repo.loans.list_by_book(&b.isbn).await.unwrap();
    assert_eq!(by_book.len(), 1);
    assert_eq!(by_book[0].status, LoanStatus::Returned);
    assert!(by_book[0].return_date.is_some());
}

#[tokio::test]
async fn patron_counters_track_loans() {
    let repo = repository();
    let b = book("978-0441478125", 2, 2);
    repo.books.add_book(&b).await.unwrap();
    let user = register(&repo, "Alice", "Martin").await;

    repo.loans
        .borrow(user.user_id, &b.isbn, &user.full_name())
        .await
        .unwrap();
    let after_borrow = repo.users.get_by_id(user.user_id).await.unwrap().unwrap();
    assert_eq!(after_borrow.total_borrows, 1);
    assert_eq!(after_borrow.active_borrows, 1);

    repo.loans.return_book(user.user_id, &b.isbn).await.unwrap();
    let after_return = repo.users.get_by_id(user.user_id).await.unwrap().unwrap();
    // Total is a lifetime count; only the active counter comes back down.
    assert_eq!(after_return.total_borrows, 1);
    assert_eq!(after_return.active_borrows, 0);
}

#[tokio::test]
async fn reservations_come_back_in_fifo_order() {
    let repo = repository();
    let b = book("978-0441478125", 1, 1);
    repo.books.add_book(&b).await.unwrap();
    let p1 = register(&repo, "Alice", "Martin").await;
    let p2 = register(&repo, "Bob", "Durand").await;

    repo.reservations
        .add(&b.isbn, p1.user_id, &p1.full_name())
        .await
        .unwrap();
    repo.reservations
        .add(&b.isbn, p2.user_id, &p2.full_name())
        .await
        .unwrap();

    let queue = repo.reservations.list_by_isbn(&b.isbn).await.unwrap();
    assert_eq!(queue.len(), 2);
    assert_eq!(queue[0].user_id, p1.user_id);
    assert_eq!(queue[1].user_id, p2.user_id);
    assert!(queue.iter().all(|r| r.status == "PENDING"));
}

#[tokio::test]
async fn top_books_sorts_by_count_with_isbn_tiebreak() {
    let repo = repository();
    for isbn in ["isbn-a", "isbn-b", "isbn-c"] {
        repo.books.add_book(&book(isbn, 5, 5)).await.unwrap();
    }
    let user = register(&repo, "Alice", "Martin").await;
    let name = user.full_name();

    // isbn-b borrowed twice, isbn-a and isbn-c once each.
    repo.loans.borrow(user.user_id, "isbn-b", &name).await.unwrap();
    repo.loans.return_book(user.user_id, "isbn-b").await.unwrap();
    repo.loans.borrow(user.user_id, "isbn-b", &name).await.unwrap();
    repo.loans.borrow(user.user_id, "isbn-a", &name).await.unwrap();
    repo.loans.borrow(user.user_id, "isbn-c", &name).await.unwrap();

    let top = repo.stats.top_books(2).await.unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].isbn, "isbn-b");
    assert_eq!(top[0].borrow_count, 2);
    // Equal counts fall back to ascending ISBN.
    assert_eq!(top[1].isbn, "isbn-a");
    assert_eq!(top[1].borrow_count, 1);

    assert_eq!(repo.stats.total_borrows().await.unwrap(), 4);
}

#[tokio::test]
async fn end_to_end_borrow_cycle() {
    let repo = repository();
    let b = book("978-2070368228", 2, 2);
    repo.books.add_book(&b).await.unwrap();
    let alice = register(&repo, "Alice", "Martin").await;
    let name = alice.full_name();

    repo.loans.borrow(alice.user_id, &b.isbn, &name).await.unwrap();
    assert_eq!(available_in_all_views(&repo, &b).await, (1, 1, 1));

    let again = repo.loans.borrow(alice.user_id, &b.isbn, &name).await;
    assert!(matches!(
        again,
        Err(AppError::Denied(DenialReason::AlreadyBorrowed))
    ));
    assert_eq!(available_in_all_views(&repo, &b).await, (1, 1, 1));

    repo.loans.return_book(alice.user_id, &b.isbn).await.unwrap();
    assert_eq!(available_in_all_views(&repo, &b).await, (2, 2, 2));
    let alice_after = repo.users.get_by_id(alice.user_id).await.unwrap().unwrap();
    assert_eq!(alice_after.active_borrows, alice.active_borrows);
}

/// Store wrapper that fails every write against one named view. Used to
/// observe what a sequence leaves behind when it dies partway through.
struct FailingStore {
    inner: MemoryStore,
    fail_view: &'static str,
}

#[async_trait]
impl Store for FailingStore {
    async fn get(&self, view: &'static ViewDef, key: &[Value]) -> StoreResult<Option<Row>> {
        self.inner.get(view, key).await
    }

    async fn scan(&self, view: &'static ViewDef, prefix: &[Value]) -> StoreResult<Vec<Row>> {
        self.inner.scan(view, prefix).await
    }

    async fn upsert(
        &self,
        view: &'static ViewDef,
        key: &[Value],
        columns: &[(&'static str, Value)],
    ) -> StoreResult<()> {
        if view.name == self.fail_view {
            return Err(StoreError::Unavailable(format!(
                "injected failure on {}",
                view.name
            )));
        }
        self.inner.upsert(view, key, columns).await
    }

    async fn delete(&self, view: &'static ViewDef, key: &[Value]) -> StoreResult<()> {
        self.inner.delete(view, key).await
    }

    async fn increment(
        &self,
        view: &'static ViewDef,
        key: &[Value],
        column: &'static str,
        delta: i64,
    ) -> StoreResult<()> {
        self.inner.increment(view, key, column, delta).await
    }
}

#[tokio::test]
async fn failed_borrow_step_aborts_but_does_not_roll_back() {
    // Writes to the per-patron history view fail; everything before that
    // step (stock decrement, active marker) has already been applied and
    // stays applied.
    let store = Arc::new(FailingStore {
        inner: MemoryStore::new(),
        fail_view: "borrows_by_user",
    });
    let repo = Repository::new(store);

    let b = book("978-0441478125", 1, 1);
    repo.books.add_book(&b).await.unwrap();
    let user = register(&repo, "Alice", "Martin").await;

    let result = repo
        .loans
        .borrow(user.user_id, &b.isbn, &user.full_name())
        .await;
    assert!(matches!(result, Err(AppError::Store(_))));

    // Reader-visible state was written before the failing step.
    assert_eq!(available_in_all_views(&repo, &b).await, (0, 0, 0));
    assert!(repo
        .loans
        .get_active(user.user_id, &b.isbn)
        .await
        .unwrap()
        .is_some());

    // Bookkeeping after the failing step never ran.
    let after = repo.users.get_by_id(user.user_id).await.unwrap().unwrap();
    assert_eq!(after.total_borrows, 0);
    assert_eq!(after.active_borrows, 0);
    assert_eq!(repo.stats.total_borrows().await.unwrap(), 0);
}
