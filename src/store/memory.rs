//! In-memory store backend.
//!
//! Rows live in a `BTreeMap` keyed by the full primary key, so partition
//! scans come back in clustering order for free, the same way the production
//! backend orders them. Used by the test suite and handy for local
//! experiments; it is not meant to persist anything.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{Row, Store, StoreResult, Value, ViewDef};

type StoredRow = HashMap<&'static str, Value>;
type Partitioned = BTreeMap<Vec<Value>, StoredRow>;

#[derive(Default)]
pub struct MemoryStore {
    views: Mutex<HashMap<&'static str, Partitioned>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_views<T>(&self, f: impl FnOnce(&mut HashMap<&'static str, Partitioned>) -> T) -> T {
        let mut guard = self.views.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }

    fn materialize(view: &'static ViewDef, key: &[Value], stored: &StoredRow) -> Row {
        let mut values = Vec::with_capacity(view.columns().count());
        values.extend_from_slice(key);
        for column in view.value_columns {
            values.push(stored.get(column.name).cloned().unwrap_or(Value::Null));
        }
        Row::new(view, values)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, view: &'static ViewDef, key: &[Value]) -> StoreResult<Option<Row>> {
        debug_assert_eq!(key.len(), view.key_len());
        Ok(self.with_views(|views| {
            views
                .get(view.name)
                .and_then(|rows| rows.get(key))
                .map(|stored| Self::materialize(view, key, stored))
        }))
    }

    async fn scan(&self, view: &'static ViewDef, prefix: &[Value]) -> StoreResult<Vec<Row>> {
        debug_assert!(prefix.len() <= view.key_len());
        Ok(self.with_views(|views| {
            views
                .get(view.name)
                .map(|rows| {
                    rows.iter()
                        .filter(|(key, _)| key.starts_with(prefix))
                        .map(|(key, stored)| Self::materialize(view, key, stored))
                        .collect()
                })
                .unwrap_or_default()
        }))
    }

    async fn upsert(
        &self,
        view: &'static ViewDef,
        key: &[Value],
        columns: &[(&'static str, Value)],
    ) -> StoreResult<()> {
        debug_assert_eq!(key.len(), view.key_len());
        self.with_views(|views| {
            let row = views
                .entry(view.name)
                .or_default()
                .entry(key.to_vec())
                .or_default();
            for (name, value) in columns {
                row.insert(name, value.clone());
            }
        });
        Ok(())
    }

    async fn delete(&self, view: &'static ViewDef, key: &[Value]) -> StoreResult<()> {
        self.with_views(|views| {
            if let Some(rows) = views.get_mut(view.name) {
                rows.remove(key);
            }
        });
        Ok(())
    }

    async fn increment(
        &self,
        view: &'static ViewDef,
        key: &[Value],
        column: &'static str,
        delta: i64,
    ) -> StoreResult<()> {
        self.with_views(|views| {
            let row = views
                .entry(view.name)
                .or_default()
                .entry(key.to_vec())
                .or_default();
            let current = row.get(column).and_then(Value::as_bigint).unwrap_or(0);
            row.insert(column, Value::BigInt(current + delta));
        });
        Ok(())
    }
}
