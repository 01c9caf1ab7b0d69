//! Core domain types.
//!
//! These types represent the persisted configuration records, independent
//! of any storage concerns.
//!
//! # Structure
//!
//! - `server` - MCP server definitions (`ServerDefinition`, `TransportKind`)
//! - `root` - Filesystem/URI roots exposed to servers
//! - `environment` - Global environment variable overrides

pub mod environment;
pub mod root;
pub mod server;

pub use environment::{GlobalEnvironmentVariable, NewGlobalEnvironmentVariable, resolve_environment};
pub use root::{NewRoot, Root};
pub use server::{
    NewServerDefinition, ServerConfig, ServerDefinition, ServerValidationError, StringList,
    StringMap, TransportKind, UnknownTransport, UserConfigValues,
};
