//! Port definitions (trait abstractions) for the configuration store.
//!
//! Ports define the interfaces that callers expect from storage. They
//! contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No `sqlx` types in any signature
//! - Traits are minimal and CRUD-focused
//! - Records cross the boundary by value

pub mod environment_repository;
pub mod error;
pub mod listing;
pub mod root_repository;
pub mod server_repository;

use std::sync::Arc;

pub use environment_repository::GlobalEnvironmentRepository;
pub use error::StoreError;
pub use listing::{ListOrder, RecordList, RowFailure};
pub use root_repository::RootRepository;
pub use server_repository::ServerRepository;

/// Container for all repository trait objects.
///
/// Lets hosts wire the store without depending on the storage adapter.
#[derive(Clone)]
pub struct Repos {
    /// MCP server definitions.
    pub servers: Arc<dyn ServerRepository>,
    /// Filesystem/URI roots.
    pub roots: Arc<dyn RootRepository>,
    /// Global environment overrides.
    pub environment: Arc<dyn GlobalEnvironmentRepository>,
}

impl Repos {
    /// Create a new Repos container.
    pub fn new(
        servers: Arc<dyn ServerRepository>,
        roots: Arc<dyn RootRepository>,
        environment: Arc<dyn GlobalEnvironmentRepository>,
    ) -> Self {
        Self {
            servers,
            roots,
            environment,
        }
    }
}
