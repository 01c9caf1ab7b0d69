//! Composition utilities for building the configuration store.
//!
//! This module wires the `SQLite` repositories together. It is focused
//! purely on construction and contains no domain logic.

use std::path::Path;
use std::sync::Arc;

use sqlx::SqlitePool;

use contextcore_core::{IdGenerator, Repos, StoreError, UuidGenerator};

use crate::migrations::{MigrationEngine, MigrationReport};
use crate::repositories::{
    SqliteGlobalEnvironmentRepository, SqliteRootRepository, SqliteServerRepository,
};
use crate::setup::StoreOptions;

/// The configuration store in its ready state.
///
/// Only constructed after every migration has been applied, so holders
/// never see a half-initialized store.
#[derive(Clone)]
pub struct ConfigStore {
    pool: SqlitePool,
    repos: Repos,
    report: MigrationReport,
}

impl ConfigStore {
    /// Open (creating if needed) the store file at `path`.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        Self::open_with(&StoreOptions::file(path), Arc::new(UuidGenerator)).await
    }

    /// Open a store with explicit options and id source.
    ///
    /// # Errors
    ///
    /// - `SchemaConflict` if the stored migration history does not match
    /// - `Storage` if the store cannot be opened or a migration fails
    pub async fn open_with(
        options: &StoreOptions,
        ids: Arc<dyn IdGenerator>,
    ) -> Result<Self, StoreError> {
        let mut engine = MigrationEngine::new();
        let (pool, report) = engine.open(options).await?;
        let repos = CoreFactory::build_repos(pool.clone(), ids);
        Ok(Self {
            pool,
            repos,
            report,
        })
    }

    /// Repository trait objects for callers.
    pub fn repos(&self) -> &Repos {
        &self.repos
    }

    /// What the migration engine did while opening this store.
    pub fn migration_report(&self) -> &MigrationReport {
        &self.report
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Factory for creating repository instances with `SQLite` backends.
pub struct CoreFactory;

impl CoreFactory {
    /// Build all `SQLite` repositories from a migrated pool.
    pub fn build_repos(pool: SqlitePool, ids: Arc<dyn IdGenerator>) -> Repos {
        Repos::new(
            Arc::new(SqliteServerRepository::with_id_generator(
                pool.clone(),
                Arc::clone(&ids),
            )),
            Arc::new(SqliteRootRepository::with_id_generator(
                pool.clone(),
                Arc::clone(&ids),
            )),
            Arc::new(SqliteGlobalEnvironmentRepository::with_id_generator(
                pool, ids,
            )),
        )
    }
}

/// Test database helper for integration tests.
///
/// Provides an in-memory store with every migration applied.
#[cfg(any(test, feature = "test-utils"))]
pub struct TestDb {
    store: ConfigStore,
}

#[cfg(any(test, feature = "test-utils"))]
impl TestDb {
    /// Create a new in-memory test store with UUID ids.
    pub async fn new() -> anyhow::Result<Self> {
        Self::with_id_generator(Arc::new(UuidGenerator)).await
    }

    /// Create a new in-memory test store with a custom id source.
    pub async fn with_id_generator(ids: Arc<dyn IdGenerator>) -> anyhow::Result<Self> {
        let store = ConfigStore::open_with(&StoreOptions::in_memory(), ids).await?;
        Ok(Self { store })
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn repos(&self) -> &Repos {
        self.store.repos()
    }

    /// Raw pool, for tests that need to reach behind the repositories.
    pub fn pool(&self) -> &SqlitePool {
        &self.store.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contextcore_core::{ListOrder, NewRoot, NewServerDefinition};

    #[tokio::test]
    async fn test_test_db_is_ready() {
        let db = TestDb::new().await.unwrap();
        assert_eq!(db.store().migration_report().applied.len(), 5);

        let server = db
            .repos()
            .servers
            .create(NewServerDefinition::stdio("s", "cmd", vec![]))
            .await
            .unwrap();
        db.repos()
            .roots
            .create(NewRoot::new("home", "file:///home"))
            .await
            .unwrap();

        let servers = db.repos().servers.list(ListOrder::Insertion).await.unwrap();
        assert_eq!(servers.records, vec![server]);
    }
}
