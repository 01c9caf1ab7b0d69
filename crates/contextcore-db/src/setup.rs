//! Database setup and initialization.
//!
//! This module provides [`setup_database()`] for opening the `SQLite`
//! configuration store at a path and bringing it to the current schema.
//! Entry points call this with the resolved database path.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};

use crate::migrations::{MigrationEngine, MigrationError};

/// Where the store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// A database file, created if missing.
    File(PathBuf),
    /// A private in-memory database (tests).
    InMemory,
}

impl fmt::Display for StoreLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::InMemory => f.write_str(":memory:"),
        }
    }
}

/// Connection settings for the configuration store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    pub location: StoreLocation,
    /// How long a connection waits on a locked database before failing.
    pub busy_timeout: Duration,
    /// Upper bound on pooled connections.
    pub max_connections: u32,
}

impl StoreOptions {
    /// Default busy timeout.
    pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

    /// Default pool size for file-backed stores.
    pub const DEFAULT_MAX_CONNECTIONS: u32 = 4;

    /// A file-backed store at `path`.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            location: StoreLocation::File(path.into()),
            busy_timeout: Self::DEFAULT_BUSY_TIMEOUT,
            max_connections: Self::DEFAULT_MAX_CONNECTIONS,
        }
    }

    /// An in-memory store.
    ///
    /// Uses a single connection so every query sees the same database.
    pub fn in_memory() -> Self {
        Self {
            location: StoreLocation::InMemory,
            busy_timeout: Self::DEFAULT_BUSY_TIMEOUT,
            max_connections: 1,
        }
    }

    #[must_use]
    pub const fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }
}

/// Create the connection pool described by `options`.
///
/// File-backed stores use WAL so readers never block the single writer.
pub(crate) async fn connect(options: &StoreOptions) -> Result<SqlitePool, MigrationError> {
    let storage = |e: &dyn fmt::Display| MigrationError::Storage(e.to_string());

    let (connect_options, pool_options) = match &options.location {
        StoreLocation::File(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| storage(&e))?;
            }

            let connect_options = SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
                .busy_timeout(options.busy_timeout);
            let pool_options = SqlitePoolOptions::new().max_connections(options.max_connections);
            (connect_options, pool_options)
        }
        StoreLocation::InMemory => {
            let connect_options = SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| storage(&e))?
                .busy_timeout(options.busy_timeout);
            // The database lives only as long as its connection.
            let pool_options = SqlitePoolOptions::new()
                .max_connections(options.max_connections)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
            (connect_options, pool_options)
        }
    };

    pool_options
        .connect_with(connect_options)
        .await
        .map_err(|e| storage(&e))
}

/// Opens the `SQLite` store and migrates it to the current schema.
///
/// This function:
/// 1. Creates the parent directory and database file if missing
/// 2. Applies any pending migrations, each in its own transaction
/// 3. Returns the pool only once the store is ready
///
/// # Errors
///
/// Returns an error if the file cannot be opened, a migration fails, or the
/// stored migration history conflicts with this build.
///
/// # Example
///
/// ```rust,no_run
/// use contextcore_db::setup_database;
/// use std::path::Path;
///
/// # async fn example() -> anyhow::Result<()> {
/// let db_path = Path::new("/path/to/contextcore.db");
/// let pool = setup_database(db_path).await?;
/// # Ok(())
/// # }
/// ```
pub async fn setup_database(db_path: &Path) -> Result<SqlitePool> {
    let mut engine = MigrationEngine::new();
    let (pool, _report) = engine.open(&StoreOptions::file(db_path)).await?;
    Ok(pool)
}

/// Sets up an in-memory `SQLite` database for testing.
///
/// Creates a fresh in-memory database with every migration applied.
#[cfg(any(test, feature = "test-utils"))]
pub async fn setup_test_database() -> Result<SqlitePool> {
    let mut engine = MigrationEngine::new();
    let (pool, _report) = engine.open(&StoreOptions::in_memory()).await?;
    Ok(pool)
}
