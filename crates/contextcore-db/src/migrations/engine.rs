//! Migration engine.
//!
//! Brings a store to the current schema before it is handed to callers.
//!
//! ```text
//! Unopened -> Opening -> Migrating -> Ready
//!                 \           \
//!                  +-----------+--> Failed
//! ```
//!
//! The applied history must be an exact prefix of the engine's list: same
//! names, same order, same checksums. Anything else is a
//! [`MigrationError::Conflict`] and nothing is applied.

use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{Row, SqlitePool};
use thiserror::Error;
use tracing::{debug, error, info};

use contextcore_core::StoreError;

use super::{MIGRATIONS, Migration};
use crate::setup::{StoreOptions, connect};

/// Table recording applied migrations.
pub const MIGRATIONS_TABLE: &str = "schema_migrations";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Lifecycle of one engine run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EngineState {
    #[default]
    Unopened,
    /// Connecting to the physical store.
    Opening,
    /// Walking the migration list.
    Migrating,
    /// Every migration is applied; the store may be used.
    Ready,
    /// Opening or a migration failed. Not retried automatically.
    Failed,
}

/// Errors raised while opening or migrating a store.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// The applied history does not match this build's migration list.
    #[error("Schema conflict: {0}")]
    Conflict(String),

    /// A migration's statements failed; its transaction was rolled back.
    #[error("Migration `{name}` failed: {reason}")]
    Apply { name: String, reason: String },

    /// The store could not be opened or the history could not be read.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<MigrationError> for StoreError {
    fn from(error: MigrationError) -> Self {
        match error {
            MigrationError::Conflict(message) => Self::SchemaConflict(message),
            other => Self::Storage(other.to_string()),
        }
    }
}

fn storage(e: impl std::fmt::Display) -> MigrationError {
    MigrationError::Storage(e.to_string())
}

/// A migration recorded as applied in a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationRecord {
    pub name: String,
    pub checksum: String,
    /// `None` if the stored timestamp is unreadable.
    pub applied_at: Option<DateTime<Utc>>,
}

/// Outcome of a successful engine run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Migrations already present before this run.
    pub previously_applied: usize,
    /// Migrations applied by this run, in order.
    pub applied: Vec<&'static str>,
}

impl MigrationReport {
    /// Whether this run changed the schema.
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Applies a fixed, ordered list of migrations to a store.
#[derive(Debug)]
pub struct MigrationEngine {
    migrations: &'static [Migration],
    state: EngineState,
}

impl Default for MigrationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MigrationEngine {
    /// Engine over the production migration list.
    pub const fn new() -> Self {
        Self::with_migrations(MIGRATIONS)
    }

    /// Engine over a custom list.
    pub const fn with_migrations(migrations: &'static [Migration]) -> Self {
        Self {
            migrations,
            state: EngineState::Unopened,
        }
    }

    pub const fn state(&self) -> EngineState {
        self.state
    }

    /// Open the store described by `options` and migrate it.
    ///
    /// The pool is only returned once the engine is [`EngineState::Ready`].
    pub async fn open(
        &mut self,
        options: &StoreOptions,
    ) -> Result<(SqlitePool, MigrationReport), MigrationError> {
        self.state = EngineState::Opening;
        debug!(location = %options.location, "opening configuration store");

        let pool = match connect(options).await {
            Ok(pool) => pool,
            Err(e) => return Err(self.fail(e)),
        };

        let report = self.migrate(&pool).await?;
        Ok((pool, report))
    }

    /// Migrate an already-open pool.
    pub async fn migrate(&mut self, pool: &SqlitePool) -> Result<MigrationReport, MigrationError> {
        self.state = EngineState::Migrating;

        match self.walk(pool).await {
            Ok(report) => {
                self.state = EngineState::Ready;
                info!(
                    applied = report.applied.len(),
                    previously_applied = report.previously_applied,
                    "configuration store ready"
                );
                Ok(report)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    fn fail(&mut self, e: MigrationError) -> MigrationError {
        self.state = EngineState::Failed;
        error!(error = %e, "configuration store failed to open");
        e
    }

    async fn walk(&self, pool: &SqlitePool) -> Result<MigrationReport, MigrationError> {
        ensure_migrations_table(pool).await?;

        let history = applied_migrations(pool).await?;
        self.verify_history(&history)?;

        let mut applied = Vec::new();
        for migration in &self.migrations[history.len()..] {
            apply(pool, migration).await?;
            applied.push(migration.name);
        }

        Ok(MigrationReport {
            previously_applied: history.len(),
            applied,
        })
    }

    /// Check that `history` is an exact prefix of the migration list.
    fn verify_history(&self, history: &[MigrationRecord]) -> Result<(), MigrationError> {
        for (position, record) in history.iter().enumerate() {
            let Some(expected) = self.migrations.get(position) else {
                return Err(MigrationError::Conflict(format!(
                    "store has migration `{}` which this build does not know",
                    record.name
                )));
            };

            if expected.name != record.name {
                let known = self.migrations.iter().any(|m| m.name == record.name);
                return Err(MigrationError::Conflict(if known {
                    format!(
                        "migration `{}` recorded at position {position}, expected `{}`",
                        record.name, expected.name
                    )
                } else {
                    format!(
                        "store has migration `{}` which this build does not know",
                        record.name
                    )
                }));
            }

            if expected.checksum() != record.checksum {
                return Err(MigrationError::Conflict(format!(
                    "migration `{}` was applied with different content",
                    record.name
                )));
            }
        }

        Ok(())
    }
}

async fn ensure_migrations_table(pool: &SqlitePool) -> Result<(), MigrationError> {
    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {MIGRATIONS_TABLE} (
            identifier TEXT PRIMARY KEY NOT NULL,
            checksum TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await
    .map_err(storage)?;

    Ok(())
}

/// Read the applied history, oldest first.
pub async fn applied_migrations(pool: &SqlitePool) -> Result<Vec<MigrationRecord>, MigrationError> {
    let rows = sqlx::query(&format!(
        "SELECT identifier, checksum, applied_at FROM {MIGRATIONS_TABLE} ORDER BY rowid"
    ))
    .fetch_all(pool)
    .await
    .map_err(storage)?;

    rows.iter()
        .map(|row| -> Result<MigrationRecord, MigrationError> {
            let applied_at: String = row.try_get("applied_at").map_err(storage)?;
            Ok(MigrationRecord {
                name: row.try_get("identifier").map_err(storage)?,
                checksum: row.try_get("checksum").map_err(storage)?,
                applied_at: NaiveDateTime::parse_from_str(&applied_at, TIMESTAMP_FORMAT)
                    .ok()
                    .map(|dt| DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc)),
            })
        })
        .collect()
}

/// Apply one migration and record it, atomically.
async fn apply(pool: &SqlitePool, migration: &Migration) -> Result<(), MigrationError> {
    debug!(migration = migration.name, "applying migration");

    let failed = |e: sqlx::Error| MigrationError::Apply {
        name: migration.name.to_string(),
        reason: e.to_string(),
    };

    // Dropping `tx` on any error rolls back both the schema change and the record.
    let mut tx = pool.begin().await.map_err(failed)?;

    for statement in migration.statements {
        sqlx::query(statement)
            .execute(&mut *tx)
            .await
            .map_err(failed)?;
    }

    let applied_at = Utc::now().format(TIMESTAMP_FORMAT).to_string();
    sqlx::query(&format!(
        "INSERT INTO {MIGRATIONS_TABLE} (identifier, checksum, applied_at) VALUES (?, ?, ?)"
    ))
    .bind(migration.name)
    .bind(migration.checksum())
    .bind(applied_at)
    .execute(&mut *tx)
    .await
    .map_err(failed)?;

    tx.commit().await.map_err(failed)?;

    info!(migration = migration.name, "applied migration");
    Ok(())
}
