//! Identifier generation for new records.
//!
//! Repositories receive an [`IdGenerator`] and call it on `create` when the
//! caller did not supply an id.

use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

/// Source of unique record identifiers.
pub trait IdGenerator: Send + Sync {
    /// Produce a new identifier, unique across all records.
    fn generate(&self) -> String;
}

/// Random (v4) UUIDs, upper-cased hyphenated form.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().hyphenated().to_string().to_uppercase()
    }
}

/// Deterministic `prefix-N` identifiers, for tests and fixtures.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn generate(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{n}", self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_generator_produces_distinct_ids() {
        let ids = UuidGenerator;
        let a = ids.generate();
        let b = ids.generate();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a).is_ok());
    }

    #[test]
    fn test_sequential_generator_counts_up() {
        let ids = SequentialIdGenerator::new("srv");
        assert_eq!(ids.generate(), "srv-1");
        assert_eq!(ids.generate(), "srv-2");
    }
}
