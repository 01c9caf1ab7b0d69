//! Row mapping helpers for `SQLite` queries.

use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use contextcore_core::{DecodeError, EncodedValue, StoreError, decode_optional, encode_optional};

/// A value bound to one column, in registry order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ColumnValue {
    Text(Option<String>),
    Bool(bool),
}

impl ColumnValue {
    pub(crate) fn text(value: impl Into<String>) -> Self {
        Self::Text(Some(value.into()))
    }

    pub(crate) fn optional(value: Option<&String>) -> Self {
        Self::Text(value.cloned())
    }

    /// Encode an optional structured value; `None` stays `NULL`.
    pub(crate) fn encoded<T: EncodedValue>(
        value: Option<&T>,
        column: &str,
    ) -> Result<Self, StoreError> {
        Ok(Self::Text(encode_optional(value, column)?))
    }
}

/// Map `SQLx` errors to `StoreError`.
pub(crate) fn map_sqlx_error(e: sqlx::Error) -> StoreError {
    StoreError::Storage(e.to_string())
}

pub(crate) fn text(row: &SqliteRow, column: &str) -> Result<String, StoreError> {
    row.try_get(column).map_err(map_sqlx_error)
}

pub(crate) fn optional_text(row: &SqliteRow, column: &str) -> Result<Option<String>, StoreError> {
    row.try_get(column).map_err(map_sqlx_error)
}

pub(crate) fn boolean(row: &SqliteRow, column: &str) -> Result<bool, StoreError> {
    row.try_get(column).map_err(map_sqlx_error)
}

/// Read and decode an encoded column. Malformed text is a `Decode` error.
pub(crate) fn encoded<T: EncodedValue>(
    row: &SqliteRow,
    column: &str,
) -> Result<Option<T>, StoreError> {
    let raw = optional_text(row, column)?;
    Ok(decode_optional(column, raw.as_deref())?)
}

/// Read a text column and parse it, reporting failures as `Decode` errors.
pub(crate) fn parsed<T>(row: &SqliteRow, column: &str) -> Result<T, StoreError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = text(row, column)?;
    raw.parse()
        .map_err(|e: T::Err| StoreError::Decode(DecodeError::new(column, e.to_string())))
}
