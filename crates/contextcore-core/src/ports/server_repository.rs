//! MCP server definition repository trait.

use async_trait::async_trait;

use super::{ListOrder, RecordList, StoreError};
use crate::domain::{NewServerDefinition, ServerDefinition};

/// Repository trait for MCP server definitions.
///
/// # Design Rules
///
/// - Every write is a single transaction; a failed write leaves no partial row
/// - `create` with an existing id replaces that server (restore-from-export)
/// - `delete` of an unknown id succeeds
/// - Returned records are owned copies
///
/// # Example
///
/// ```ignore
/// let server = repo.create(NewServerDefinition::stdio("fs", "npx", vec![])).await?;
/// let found = repo.get(&server.id).await?;
/// let all = repo.list(ListOrder::Insertion).await?;
/// ```
#[async_trait]
pub trait ServerRepository: Send + Sync {
    /// Insert a server, generating an id when none is supplied.
    ///
    /// # Errors
    ///
    /// - `Encode` if a structured field cannot be encoded
    /// - `Storage` for storage errors
    async fn create(&self, server: NewServerDefinition) -> Result<ServerDefinition, StoreError>;

    /// Get a server by id.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no server has this id
    /// - `Decode` if a stored column is corrupt
    /// - `Storage` for storage errors
    async fn get(&self, id: &str) -> Result<ServerDefinition, StoreError>;

    /// Get the first server (in insertion order) with this name.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no server has this name
    /// - `Decode` / `Storage` as for [`get`](Self::get)
    async fn get_by_name(&self, name: &str) -> Result<ServerDefinition, StoreError>;

    /// Snapshot of all servers; corrupt rows are reported per row.
    ///
    /// # Errors
    ///
    /// - `Storage` for storage errors
    async fn list(&self, order: ListOrder) -> Result<RecordList<ServerDefinition>, StoreError>;

    /// Replace every column of an existing server.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no server has this id
    /// - `Encode` / `Storage` as for [`create`](Self::create)
    async fn update(&self, server: &ServerDefinition) -> Result<(), StoreError>;

    /// Delete a server. Unknown ids are a no-op.
    ///
    /// # Errors
    ///
    /// - `Storage` for storage errors
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}
