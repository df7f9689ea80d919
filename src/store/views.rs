//! View definitions for the library keyspace.
//!
//! The same fact is materialized under several access keys; every view a
//! repository touches is declared here so that the write fan-out in the
//! circulation engine and the schemas in `migrations/` have a single source
//! of column names and types.

use super::{Column, ViewDef};

/// Canonical book record, keyed by ISBN.
pub static BOOKS_BY_ISBN: ViewDef = ViewDef {
    name: "books_by_isbn",
    partition_key: &[Column::text("isbn")],
    clustering_key: &[],
    value_columns: &[
        Column::text("title"),
        Column::text("author"),
        Column::text("category"),
        Column::text("publisher"),
        Column::int("publication_year"),
        Column::int("total_copies"),
        Column::int("available_copies"),
        Column::text("description"),
    ],
};

/// Book listing per category. Narrower projection than the canonical record.
pub static BOOKS_BY_CATEGORY: ViewDef = ViewDef {
    name: "books_by_category",
    partition_key: &[Column::text("category")],
    clustering_key: &[Column::text("title"), Column::text("isbn")],
    value_columns: &[
        Column::text("author"),
        Column::text("publisher"),
        Column::int("publication_year"),
        Column::int("available_copies"),
        Column::int("total_copies"),
    ],
};

/// Book listing per author. Carries the description, unlike the category view.
pub static BOOKS_BY_AUTHOR: ViewDef = ViewDef {
    name: "books_by_author",
    partition_key: &[Column::text("author")],
    clustering_key: &[Column::text("title"), Column::text("isbn")],
    value_columns: &[
        Column::text("category"),
        Column::text("publisher"),
        Column::int("publication_year"),
        Column::int("available_copies"),
        Column::int("total_copies"),
        Column::text("description"),
    ],
};

/// Patron record with its two derived borrow counters.
pub static USERS_BY_ID: ViewDef = ViewDef {
    name: "users_by_id",
    partition_key: &[Column::uuid("user_id")],
    clustering_key: &[],
    value_columns: &[
        Column::text("email"),
        Column::text("first_name"),
        Column::text("last_name"),
        Column::text("phone"),
        Column::text("address"),
        Column::timestamp("registration_date"),
        Column::int("total_borrows"),
        Column::int("active_borrows"),
    ],
};

/// Presence marker: this patron currently holds this book. Its existence is
/// the only signal distinguishing an outstanding loan from a completed one.
pub static ACTIVE_BORROWS_BY_USER_BOOK: ViewDef = ViewDef {
    name: "active_borrows_by_user_book",
    partition_key: &[Column::uuid("user_id")],
    clustering_key: &[Column::text("isbn")],
    value_columns: &[
        Column::timestamp("borrow_date"),
        Column::text("book_title"),
        Column::text("user_name"),
    ],
};

/// Loan history per patron. Append-only: a return adds a new RETURNED row
/// with its own key instead of rewriting the BORROWED row.
pub static BORROWS_BY_USER: ViewDef = ViewDef {
    name: "borrows_by_user",
    partition_key: &[Column::uuid("user_id")],
    clustering_key: &[Column::timestamp("borrow_date"), Column::text("isbn")],
    value_columns: &[
        Column::text("book_title"),
        Column::text("user_name"),
        Column::text("status"),
        Column::timestamp("return_date"),
    ],
};

/// Loan history per book. One row per loan; a return rewrites the row in
/// place (status flips to RETURNED), unlike the per-patron history above.
pub static BORROWS_BY_BOOK: ViewDef = ViewDef {
    name: "borrows_by_book",
    partition_key: &[Column::text("isbn")],
    clustering_key: &[Column::timestamp("borrow_date"), Column::uuid("user_id")],
    value_columns: &[
        Column::text("user_name"),
        Column::text("book_title"),
        Column::text("status"),
        Column::timestamp("return_date"),
    ],
};

/// Wait-list per book, FIFO through the clustering on the reservation date.
pub static RESERVATIONS_BY_BOOK: ViewDef = ViewDef {
    name: "reservations_by_book",
    partition_key: &[Column::text("isbn")],
    clustering_key: &[Column::timestamp("reservation_date"), Column::uuid("user_id")],
    value_columns: &[Column::text("user_name"), Column::text("status")],
};

/// Single-row counter table for global statistics.
pub static GLOBAL_STATS: ViewDef = ViewDef {
    name: "global_stats",
    partition_key: &[Column::text("stat_name")],
    clustering_key: &[],
    value_columns: &[Column::bigint("total_borrows")],
};

/// Per-book popularity counter, increment-only.
pub static BOOK_POPULARITY: ViewDef = ViewDef {
    name: "book_popularity",
    partition_key: &[Column::text("isbn")],
    clustering_key: &[],
    value_columns: &[Column::bigint("borrow_count")],
};

/// Partition key of the single `global_stats` row.
pub const GLOBAL_STAT_NAME: &str = "GLOBAL";
