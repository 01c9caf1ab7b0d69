//! `SQLite` adapter for the contextcore configuration store.
//!
//! - [`schema`] - table/column registry at the current version
//! - [`migrations`] - ordered migration list and the engine that applies it
//! - [`setup`] - connection options and store initialization
//! - [`repositories`] - `SQLite` implementations of the core repository ports
//! - [`factory`] - composition into a ready [`ConfigStore`]

#![deny(unsafe_code)]

pub mod factory;
pub mod migrations;
pub mod repositories;
pub mod schema;
pub mod setup;

// Re-export factory for convenient access
pub use factory::{ConfigStore, CoreFactory};

// Re-export TestDb for integration tests
#[cfg(any(test, feature = "test-utils"))]
pub use factory::TestDb;

pub use migrations::{
    EngineState, MIGRATIONS, Migration, MigrationEngine, MigrationError, MigrationRecord,
    MigrationReport,
};

// Re-export repository implementations
pub use repositories::{
    SqliteGlobalEnvironmentRepository, SqliteRootRepository, SqliteServerRepository,
};

// Re-export setup functions for convenient access
pub use setup::{StoreLocation, StoreOptions, setup_database};
#[cfg(any(test, feature = "test-utils"))]
pub use setup::setup_test_database;
