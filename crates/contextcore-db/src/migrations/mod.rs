//! Schema migrations.
//!
//! A flat, append-only list of named migrations. Each one is applied exactly
//! once, inside a transaction that also records its name, so a store never
//! observes a half-applied migration.
//!
//! # Rules
//!
//! - Never edit or reorder a released migration; append a new one
//! - Update [`crate::schema`] in the same change
//! - Names are the on-disk identity of a migration
//!
//! The statements are frozen text rather than generated from
//! [`crate::schema::TABLES`]: the registry describes the shape after the
//! last migration, while an early migration must keep producing its original
//! shape (and checksum). `test_migrated_schema_matches_registry` in the engine
//! tests compares `PRAGMA table_info` of a fully migrated store against the
//! registry, column by column, so the two cannot drift apart.

mod engine;

pub use engine::{
    EngineState, MIGRATIONS_TABLE, MigrationEngine, MigrationError, MigrationRecord,
    MigrationReport, applied_migrations,
};

use sha2::{Digest, Sha256};

/// A named schema transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Migration {
    pub name: &'static str,
    /// Statements executed in order inside one transaction.
    pub statements: &'static [&'static str],
}

impl Migration {
    /// SHA-256 of the statements, recorded alongside the name.
    ///
    /// Detects a migration whose name was reused for different content.
    pub fn checksum(&self) -> String {
        let mut hasher = Sha256::new();
        for statement in self.statements {
            hasher.update(statement.trim().as_bytes());
            hasher.update(b"\n");
        }
        format!("{:x}", hasher.finalize())
    }
}

/// All migrations, in application order.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        name: "create_mcp_servers",
        statements: &[r#"
            CREATE TABLE mcp_servers (
                id TEXT PRIMARY KEY NOT NULL,
                name TEXT NOT NULL,
                transport TEXT NOT NULL,
                command TEXT,
                args TEXT,
                url TEXT,
                environment TEXT,
                headers TEXT,
                watched_paths TEXT,
                working_directory_path TEXT,
                auto_reload_enabled BOOLEAN NOT NULL DEFAULT 0
            )
            "#],
    },
    Migration {
        name: "add_dxt_user_config",
        statements: &["ALTER TABLE mcp_servers ADD COLUMN dxt_user_config TEXT"],
    },
    Migration {
        name: "create_mcp_roots",
        statements: &[r#"
            CREATE TABLE mcp_roots (
                id TEXT PRIMARY KEY NOT NULL,
                name TEXT NOT NULL,
                uri TEXT NOT NULL
            )
            "#],
    },
    Migration {
        name: "create_global_environment",
        statements: &[r#"
            CREATE TABLE global_environment (
                id TEXT PRIMARY KEY NOT NULL,
                key TEXT NOT NULL,
                value TEXT NOT NULL
            )
            "#],
    },
    Migration {
        name: "add_mcp_metadata_url",
        statements: &["ALTER TABLE mcp_servers ADD COLUMN mcp_metadata_url TEXT"],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_migration_order_is_fixed() {
        let names: Vec<_> = MIGRATIONS.iter().map(|m| m.name).collect();
        assert_eq!(
            names,
            [
                "create_mcp_servers",
                "add_dxt_user_config",
                "create_mcp_roots",
                "create_global_environment",
                "add_mcp_metadata_url",
            ]
        );
    }

    #[test]
    fn test_migration_names_are_unique() {
        let names: HashSet<_> = MIGRATIONS.iter().map(|m| m.name).collect();
        assert_eq!(names.len(), MIGRATIONS.len());
    }

    #[test]
    fn test_checksum_ignores_surrounding_whitespace_only() {
        let a = Migration {
            name: "m",
            statements: &["CREATE TABLE t (id TEXT)"],
        };
        let b = Migration {
            name: "m",
            statements: &["\n   CREATE TABLE t (id TEXT)\n"],
        };
        let c = Migration {
            name: "m",
            statements: &["CREATE TABLE t (id TEXT, x TEXT)"],
        };

        assert_eq!(a.checksum(), b.checksum());
        assert_ne!(a.checksum(), c.checksum());
        assert_eq!(a.checksum().len(), 64);
    }
}
