//! Store error types.

use thiserror::Error;

use crate::codec::{DecodeError, EncodeError};

/// Errors surfaced by the configuration store.
///
/// Storage details (SQL errors, file locks) are flattened into
/// [`StoreError::Storage`] so callers never see adapter types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A stored column could not be decoded. Recoverable per record.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// A value could not be encoded for storage; nothing was written.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The on-disk migration history does not match this build.
    ///
    /// Never resolved automatically; an operator has to intervene.
    #[error("Schema conflict: {0}")]
    SchemaConflict(String),

    /// Underlying read/write/transaction failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// No record with the given id exists.
    #[error("Record not found: {0}")]
    NotFound(String),
}

impl StoreError {
    /// Whether the failure leaves the store unusable until an operator acts.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::SchemaConflict(_))
    }
}
