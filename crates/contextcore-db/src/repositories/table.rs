//! Registry-driven statements shared by the repositories.
//!
//! Every write runs in its own transaction; a failure drops the
//! transaction and leaves the previous row untouched.

use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Sqlite, SqlitePool};

use contextcore_core::{ListOrder, RecordList, StoreError};

use super::row_mappers::{ColumnValue, map_sqlx_error, text};
use crate::schema::TableSchema;

fn bind_all<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    values: Vec<ColumnValue>,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for value in values {
        query = match value {
            ColumnValue::Text(text) => query.bind(text),
            ColumnValue::Bool(flag) => query.bind(flag),
        };
    }
    query
}

fn check_arity(table: &TableSchema, values: &[ColumnValue]) -> Result<(), StoreError> {
    if values.len() == table.columns.len() {
        Ok(())
    } else {
        Err(StoreError::Storage(format!(
            "{} expects {} columns, got {}",
            table.name,
            table.columns.len(),
            values.len()
        )))
    }
}

/// Insert a row, or replace every column of the row with the same id.
pub(crate) async fn upsert(
    pool: &SqlitePool,
    table: &TableSchema,
    values: Vec<ColumnValue>,
) -> Result<(), StoreError> {
    check_arity(table, &values)?;
    let sql = table.upsert_sql();

    let mut tx = pool.begin().await.map_err(map_sqlx_error)?;
    bind_all(sqlx::query(&sql), values)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;
    tx.commit().await.map_err(map_sqlx_error)
}

/// Replace every non-id column of an existing row.
///
/// `values` is in registry order, id first. Fails with `NotFound` when no
/// row has that id.
pub(crate) async fn update(
    pool: &SqlitePool,
    table: &TableSchema,
    id: &str,
    mut values: Vec<ColumnValue>,
) -> Result<(), StoreError> {
    check_arity(table, &values)?;
    // UPDATE binds the id last.
    values.rotate_left(1);
    let sql = table.update_sql();

    let mut tx = pool.begin().await.map_err(map_sqlx_error)?;
    let result = bind_all(sqlx::query(&sql), values)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound(id.to_string()));
    }

    tx.commit().await.map_err(map_sqlx_error)
}

/// Delete a row by id. Missing rows are not an error.
pub(crate) async fn delete(pool: &SqlitePool, table: &TableSchema, id: &str) -> Result<(), StoreError> {
    let sql = format!("DELETE FROM {} WHERE id = ?", table.name);

    let mut tx = pool.begin().await.map_err(map_sqlx_error)?;
    sqlx::query(&sql)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;
    tx.commit().await.map_err(map_sqlx_error)
}

/// Fetch the first row matching `column = value`, in insertion order.
pub(crate) async fn fetch_one_by(
    pool: &SqlitePool,
    table: &TableSchema,
    column: &str,
    value: &str,
) -> Result<Option<SqliteRow>, StoreError> {
    let sql = table.select_sql(&format!("WHERE {column} = ? ORDER BY rowid LIMIT 1"));

    sqlx::query(&sql)
        .bind(value)
        .fetch_optional(pool)
        .await
        .map_err(map_sqlx_error)
}

/// Read every row and map each one independently.
///
/// A row that fails to map is reported in `failures`; the rest still load.
pub(crate) async fn fetch_all<T, F>(
    pool: &SqlitePool,
    table: &TableSchema,
    order: ListOrder,
    map: F,
) -> Result<RecordList<T>, StoreError>
where
    F: Fn(&SqliteRow) -> Result<T, StoreError>,
{
    let order_by = match order {
        ListOrder::Insertion => "ORDER BY rowid".to_string(),
        ListOrder::Name => format!("ORDER BY {}, id", table.name_column),
    };
    let sql = table.select_sql(&order_by);

    let rows = sqlx::query(&sql)
        .fetch_all(pool)
        .await
        .map_err(map_sqlx_error)?;

    let mut list = RecordList::default();
    for row in &rows {
        let id = text(row, "id")?;
        let result = map(row);
        if let Err(ref error) = result {
            tracing::warn!(table = table.name, id = %id, %error, "skipping unreadable row");
        }
        list.push(id, result);
    }

    Ok(list)
}
