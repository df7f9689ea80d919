//! Keyed-row store abstraction.
//!
//! The backing store is modelled as a set of named views: table-like
//! projections with a partition key, optional clustering columns and a fixed
//! set of value columns. The store offers point reads, partition scans in
//! clustering order, partial-column upserts, deletes and counter increments.
//! Each call is atomic for exactly one row; there is no multi-row
//! transaction, which is why the repositories above maintain the
//! denormalized views by hand.

pub mod memory;
pub mod postgres;
pub mod views;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Failure of the underlying store. Kept separate from domain denials so
/// that callers can tell "the rule said no" from "the infrastructure broke".
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("view {view}: unexpected shape for column {column}")]
    Decode {
        view: &'static str,
        column: &'static str,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Column value. One variant per type the views use; `Null` doubles as
/// "column absent from this row".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Value {
    Null,
    Text(String),
    Int(i32),
    BigInt(i64),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bigint(&self) -> Option<i64> {
        match self {
            Value::BigInt(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Value::Uuid(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Int,
    BigInt,
    Uuid,
    Timestamp,
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
}

impl Column {
    pub const fn text(name: &'static str) -> Self {
        Column { name, ty: ColumnType::Text }
    }

    pub const fn int(name: &'static str) -> Self {
        Column { name, ty: ColumnType::Int }
    }

    pub const fn bigint(name: &'static str) -> Self {
        Column { name, ty: ColumnType::BigInt }
    }

    pub const fn uuid(name: &'static str) -> Self {
        Column { name, ty: ColumnType::Uuid }
    }

    pub const fn timestamp(name: &'static str) -> Self {
        Column { name, ty: ColumnType::Timestamp }
    }
}

/// Static description of one view: its name, its key shape and its value
/// columns. The primary key is the partition key followed by the clustering
/// columns; rows within a partition are ordered by the clustering columns.
#[derive(Debug)]
pub struct ViewDef {
    pub name: &'static str,
    pub partition_key: &'static [Column],
    pub clustering_key: &'static [Column],
    pub value_columns: &'static [Column],
}

impl ViewDef {
    /// Primary key columns, partition first then clustering.
    pub fn primary_key(&self) -> impl Iterator<Item = &Column> {
        self.partition_key.iter().chain(self.clustering_key.iter())
    }

    /// All columns in declaration order (primary key, then values).
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.primary_key().chain(self.value_columns.iter())
    }

    pub fn key_len(&self) -> usize {
        self.partition_key.len() + self.clustering_key.len()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns().find(|c| c.name == name)
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns().position(|c| c.name == name)
    }
}

const NULL: Value = Value::Null;

/// One row read back from a view. Values are aligned with
/// [`ViewDef::columns`]; columns never written come back as `Value::Null`.
#[derive(Debug, Clone)]
pub struct Row {
    view: &'static ViewDef,
    values: Vec<Value>,
}

impl Row {
    pub fn new(view: &'static ViewDef, values: Vec<Value>) -> Self {
        debug_assert_eq!(values.len(), view.columns().count());
        Row { view, values }
    }

    pub fn view(&self) -> &'static ViewDef {
        self.view
    }

    pub fn value(&self, column: &str) -> &Value {
        self.view
            .column_index(column)
            .map(|i| &self.values[i])
            .unwrap_or(&NULL)
    }

    fn decode_err(&self, column: &'static str) -> StoreError {
        StoreError::Decode { view: self.view.name, column }
    }

    pub fn text(&self, column: &'static str) -> StoreResult<String> {
        self.value(column)
            .as_text()
            .map(str::to_owned)
            .ok_or_else(|| self.decode_err(column))
    }

    pub fn text_or_default(&self, column: &'static str) -> String {
        self.value(column).as_text().unwrap_or_default().to_owned()
    }

    pub fn int(&self, column: &'static str) -> StoreResult<i32> {
        self.value(column)
            .as_int()
            .ok_or_else(|| self.decode_err(column))
    }

    pub fn int_or_zero(&self, column: &'static str) -> i32 {
        self.value(column).as_int().unwrap_or(0)
    }

    pub fn bigint_or_zero(&self, column: &'static str) -> i64 {
        self.value(column).as_bigint().unwrap_or(0)
    }

    pub fn uuid(&self, column: &'static str) -> StoreResult<Uuid> {
        self.value(column)
            .as_uuid()
            .ok_or_else(|| self.decode_err(column))
    }

    pub fn timestamp(&self, column: &'static str) -> StoreResult<DateTime<Utc>> {
        self.value(column)
            .as_timestamp()
            .ok_or_else(|| self.decode_err(column))
    }

    pub fn timestamp_opt(&self, column: &'static str) -> Option<DateTime<Utc>> {
        self.value(column).as_timestamp()
    }
}

/// The primitives the repositories are allowed to rely on. Every method
/// touches exactly one row (or, for [`Store::scan`], reads one partition);
/// nothing here spans rows atomically.
#[async_trait]
pub trait Store: Send + Sync {
    /// Point read by full primary key. At most one row.
    async fn get(&self, view: &'static ViewDef, key: &[Value]) -> StoreResult<Option<Row>>;

    /// Read all rows whose primary key starts with `prefix`, in clustering
    /// order. An empty prefix scans the whole view.
    async fn scan(&self, view: &'static ViewDef, prefix: &[Value]) -> StoreResult<Vec<Row>>;

    /// Write the given value columns of one row, creating it if absent.
    /// Columns not named are left untouched (wide-column upsert semantics).
    async fn upsert(
        &self,
        view: &'static ViewDef,
        key: &[Value],
        columns: &[(&'static str, Value)],
    ) -> StoreResult<()>;

    /// Delete one row by full primary key. Deleting an absent row is a no-op.
    async fn delete(&self, view: &'static ViewDef, key: &[Value]) -> StoreResult<()>;

    /// Atomically add `delta` to a counter column, treating an absent row or
    /// column as zero.
    async fn increment(
        &self,
        view: &'static ViewDef,
        key: &[Value],
        column: &'static str,
        delta: i64,
    ) -> StoreResult<()>;
}
