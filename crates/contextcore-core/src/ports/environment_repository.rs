//! Global environment variable repository trait.

use async_trait::async_trait;

use super::{ListOrder, RecordList, StoreError};
use crate::domain::{
    GlobalEnvironmentVariable, NewGlobalEnvironmentVariable, StringMap, resolve_environment,
};

/// Repository trait for process-wide environment overrides.
///
/// Keys are not unique in storage. [`resolved`](Self::resolved) collapses
/// duplicates with "last write wins" in insertion order.
#[async_trait]
pub trait GlobalEnvironmentRepository: Send + Sync {
    async fn create(
        &self,
        variable: NewGlobalEnvironmentVariable,
    ) -> Result<GlobalEnvironmentVariable, StoreError>;

    async fn get(&self, id: &str) -> Result<GlobalEnvironmentVariable, StoreError>;

    async fn list(
        &self,
        order: ListOrder,
    ) -> Result<RecordList<GlobalEnvironmentVariable>, StoreError>;

    async fn update(&self, variable: &GlobalEnvironmentVariable) -> Result<(), StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// The effective environment: one value per key, later writes winning.
    ///
    /// # Errors
    ///
    /// - `Storage` for storage errors, or the first row that failed to read
    async fn resolved(&self) -> Result<StringMap, StoreError> {
        let variables = self.list(ListOrder::Insertion).await?.into_complete()?;
        Ok(resolve_environment(&variables))
    }
}
