//! Postgres store backend.
//!
//! Each view is one table whose composite primary key mirrors the view's
//! partition and clustering columns. Every operation is a single-row
//! statement built from the [`ViewDef`]; no transactions and no joins are
//! ever issued, so the adapter exposes exactly the per-row atomicity the
//! repositories are designed around. Statement texts are stable per view,
//! which lets the driver reuse its prepared statements.

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::{Pool, Postgres, Row as _};
use uuid::Uuid;

use async_trait::async_trait;

use super::{Column, ColumnType, Row, Store, StoreError, StoreResult, Value, ViewDef};

type PgQuery<'q> = sqlx::query::Query<'q, Postgres, PgArguments>;

#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn bind_value<'q>(query: PgQuery<'q>, value: &Value, ty: ColumnType) -> PgQuery<'q> {
    match value {
        Value::Text(s) => query.bind(s.clone()),
        Value::Int(n) => query.bind(*n),
        Value::BigInt(n) => query.bind(*n),
        Value::Uuid(id) => query.bind(*id),
        Value::Timestamp(ts) => query.bind(*ts),
        Value::Null => match ty {
            ColumnType::Text => query.bind(Option::<String>::None),
            ColumnType::Int => query.bind(Option::<i32>::None),
            ColumnType::BigInt => query.bind(Option::<i64>::None),
            ColumnType::Uuid => query.bind(Option::<Uuid>::None),
            ColumnType::Timestamp => query.bind(Option::<DateTime<Utc>>::None),
        },
    }
}

fn bind_key<'q>(mut query: PgQuery<'q>, columns: &[&Column], key: &[Value]) -> PgQuery<'q> {
    for (column, value) in columns.iter().zip(key) {
        query = bind_value(query, value, column.ty);
    }
    query
}

fn decode_row(view: &'static ViewDef, pg: &PgRow) -> StoreResult<Row> {
    let mut values = Vec::with_capacity(view.columns().count());
    for column in view.columns() {
        let value = match column.ty {
            ColumnType::Text => pg
                .try_get::<Option<String>, _>(column.name)?
                .map(Value::Text),
            ColumnType::Int => pg.try_get::<Option<i32>, _>(column.name)?.map(Value::Int),
            ColumnType::BigInt => pg
                .try_get::<Option<i64>, _>(column.name)?
                .map(Value::BigInt),
            ColumnType::Uuid => pg.try_get::<Option<Uuid>, _>(column.name)?.map(Value::Uuid),
            ColumnType::Timestamp => pg
                .try_get::<Option<DateTime<Utc>>, _>(column.name)?
                .map(Value::Timestamp),
        };
        values.push(value.unwrap_or(Value::Null));
    }
    Ok(Row::new(view, values))
}

fn column_list(view: &ViewDef) -> String {
    view.columns()
        .map(|c| c.name)
        .collect::<Vec<_>>()
        .join(", ")
}

fn key_conditions(columns: &[&Column]) -> String {
    columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{} = ${}", c.name, i + 1))
        .collect::<Vec<_>>()
        .join(" AND ")
}

fn clustering_order(view: &ViewDef) -> String {
    view.primary_key()
        .map(|c| c.name)
        .collect::<Vec<_>>()
        .join(", ")
}

#[async_trait]
impl Store for PgStore {
    async fn get(&self, view: &'static ViewDef, key: &[Value]) -> StoreResult<Option<Row>> {
        let pk: Vec<&Column> = view.primary_key().collect();
        let sql = format!(
            "SELECT {} FROM {} WHERE {}",
            column_list(view),
            view.name,
            key_conditions(&pk),
        );
        let query = bind_key(sqlx::query(&sql), &pk, key);
        let row = query.fetch_optional(&self.pool).await?;
        row.map(|r| decode_row(view, &r)).transpose()
    }

    async fn scan(&self, view: &'static ViewDef, prefix: &[Value]) -> StoreResult<Vec<Row>> {
        let pk: Vec<&Column> = view.primary_key().take(prefix.len()).collect();
        let sql = if prefix.is_empty() {
            format!(
                "SELECT {} FROM {} ORDER BY {}",
                column_list(view),
                view.name,
                clustering_order(view),
            )
        } else {
            format!(
                "SELECT {} FROM {} WHERE {} ORDER BY {}",
                column_list(view),
                view.name,
                key_conditions(&pk),
                clustering_order(view),
            )
        };
        let query = bind_key(sqlx::query(&sql), &pk, prefix);
        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(|r| decode_row(view, r)).collect()
    }

    async fn upsert(
        &self,
        view: &'static ViewDef,
        key: &[Value],
        columns: &[(&'static str, Value)],
    ) -> StoreResult<()> {
        let pk: Vec<&Column> = view.primary_key().collect();
        let mut names: Vec<&str> = pk.iter().map(|c| c.name).collect();
        names.extend(columns.iter().map(|(name, _)| *name));
        let placeholders = (1..=names.len())
            .map(|i| format!("${i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let conflict_target = pk.iter().map(|c| c.name).collect::<Vec<_>>().join(", ");

        let sql = if columns.is_empty() {
            format!(
                "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT ({}) DO NOTHING",
                view.name,
                names.join(", "),
                placeholders,
                conflict_target,
            )
        } else {
            let updates = columns
                .iter()
                .map(|(name, _)| format!("{name} = EXCLUDED.{name}"))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT ({}) DO UPDATE SET {}",
                view.name,
                names.join(", "),
                placeholders,
                conflict_target,
                updates,
            )
        };

        let mut query = bind_key(sqlx::query(&sql), &pk, key);
        for (name, value) in columns {
            let column = view.column(name).ok_or(StoreError::Decode {
                view: view.name,
                column: name,
            })?;
            query = bind_value(query, value, column.ty);
        }
        query.execute(&self.pool).await?;
        Ok(())
    }

    async fn delete(&self, view: &'static ViewDef, key: &[Value]) -> StoreResult<()> {
        let pk: Vec<&Column> = view.primary_key().collect();
        let sql = format!("DELETE FROM {} WHERE {}", view.name, key_conditions(&pk));
        bind_key(sqlx::query(&sql), &pk, key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn increment(
        &self,
        view: &'static ViewDef,
        key: &[Value],
        column: &'static str,
        delta: i64,
    ) -> StoreResult<()> {
        let pk: Vec<&Column> = view.primary_key().collect();
        let names = pk.iter().map(|c| c.name).collect::<Vec<_>>().join(", ");
        let conflict_target = names.clone();
        let sql = format!(
            "INSERT INTO {view} ({names}, {column}) VALUES ({placeholders}, ${delta_pos}) \
             ON CONFLICT ({conflict_target}) \
             DO UPDATE SET {column} = COALESCE({view}.{column}, 0) + EXCLUDED.{column}",
            view = view.name,
            names = names,
            column = column,
            placeholders = (1..=pk.len())
                .map(|i| format!("${i}"))
                .collect::<Vec<_>>()
                .join(", "),
            delta_pos = pk.len() + 1,
            conflict_target = conflict_target,
        );
        bind_key(sqlx::query(&sql), &pk, key)
            .bind(delta)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
