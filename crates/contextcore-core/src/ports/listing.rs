//! List results that tolerate individually corrupt rows.

use super::StoreError;

/// Ordering requested for `list` calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListOrder {
    /// Order in which records were first written. Stable across calls.
    #[default]
    Insertion,
    /// Sorted by the record's display name (or key), then id.
    Name,
}

/// A row that was read but could not be turned into a record.
#[derive(Debug)]
pub struct RowFailure {
    /// Id of the failing row.
    pub id: String,
    pub error: StoreError,
}

/// Snapshot returned by `list`: decoded records plus rows that failed.
///
/// One corrupt row never hides the others.
#[derive(Debug)]
pub struct RecordList<T> {
    pub records: Vec<T>,
    pub failures: Vec<RowFailure>,
}

impl<T> Default for RecordList<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            failures: Vec::new(),
        }
    }
}

impl<T> RecordList<T> {
    /// Whether every row decoded.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Add the outcome of reading one row.
    pub fn push(&mut self, id: String, result: Result<T, StoreError>) {
        match result {
            Ok(record) => self.records.push(record),
            Err(error) => self.failures.push(RowFailure { id, error }),
        }
    }

    /// The decoded records, or the first failure.
    pub fn into_complete(self) -> Result<Vec<T>, StoreError> {
        match self.failures.into_iter().next() {
            Some(failure) => Err(failure.error),
            None => Ok(self.records),
        }
    }
}
