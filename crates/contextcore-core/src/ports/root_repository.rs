//! Root repository trait.

use async_trait::async_trait;

use super::{ListOrder, RecordList, StoreError};
use crate::domain::{NewRoot, Root};

/// Repository trait for filesystem/URI roots.
///
/// Same write rules as [`ServerRepository`](super::ServerRepository).
#[async_trait]
pub trait RootRepository: Send + Sync {
    async fn create(&self, root: NewRoot) -> Result<Root, StoreError>;

    async fn get(&self, id: &str) -> Result<Root, StoreError>;

    async fn list(&self, order: ListOrder) -> Result<RecordList<Root>, StoreError>;

    async fn update(&self, root: &Root) -> Result<(), StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}
