//! Core domain types and ports for the contextcore configuration store.
//!
//! - [`domain`] - server definitions, roots, global environment variables
//! - [`codec`] - encoding of structured values into single text columns
//! - [`ports`] - repository traits and [`StoreError`]
//! - [`connection`] - connection-error classification for session layers
//! - [`ids`] - identifier generation for new records
//! - [`paths`] - location of the application data directory
//!
//! Storage adapters live in `contextcore-db`.

#![deny(unused_crate_dependencies)]

pub mod codec;
pub mod connection;
pub mod domain;
pub mod ids;
pub mod paths;
pub mod ports;

pub use codec::{DecodeError, EncodeError, EncodedValue, decode_optional, encode_optional};
pub use connection::{
    CONNECTION_ERROR_KEYWORDS, NOT_CONNECTED_MESSAGE, NotConnectedError,
    is_likely_connection_error,
};
pub use domain::{
    GlobalEnvironmentVariable, NewGlobalEnvironmentVariable, NewRoot, NewServerDefinition, Root,
    ServerConfig, ServerDefinition, ServerValidationError, StringList, StringMap, TransportKind,
    UnknownTransport, UserConfigValues, resolve_environment,
};
pub use ids::{IdGenerator, SequentialIdGenerator, UuidGenerator};
pub use paths::{PathError, data_root, database_path, database_path_in};
pub use ports::{
    GlobalEnvironmentRepository, ListOrder, RecordList, Repos, RootRepository, RowFailure,
    ServerRepository, StoreError,
};

// Integration tests use these; unit tests do not.
#[cfg(test)]
use anyhow as _;
