//! Repository implementations using `SQLite`.
//!
//! These implementations encapsulate all SQL queries and database access.
//! The `SqlitePool` is confined to this module and never exposed through
//! the port trait signatures.

mod row_mappers;
mod sqlite_global_environment_repository;
mod sqlite_root_repository;
mod sqlite_server_repository;
mod table;

pub use sqlite_global_environment_repository::SqliteGlobalEnvironmentRepository;
pub use sqlite_root_repository::SqliteRootRepository;
pub use sqlite_server_repository::SqliteServerRepository;
