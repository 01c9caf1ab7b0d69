//! Encoded-value codec.
//!
//! Structured values (string lists, string maps, user configuration blobs)
//! are stored as JSON text in a single column. An unset value is stored as
//! `NULL`, never as an empty collection, so `None` and `Some(empty)` survive
//! a round trip as distinct values.
//!
//! Decoding never falls back to a default: malformed or mistyped text is a
//! [`DecodeError`] that the caller must handle.

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::domain::{StringList, StringMap, UserConfigValues};

/// Stored text could not be decoded into the expected value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to decode column `{column}`: {reason}")]
pub struct DecodeError {
    /// Column the text was read from.
    pub column: String,
    /// Parser diagnostic.
    pub reason: String,
}

impl DecodeError {
    pub fn new(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            reason: reason.into(),
        }
    }
}

/// A value could not be encoded for storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to encode column `{column}`: {reason}")]
pub struct EncodeError {
    pub column: String,
    pub reason: String,
}

/// A value that is stored as encoded text in a single column.
pub trait EncodedValue: Sized {
    /// Encode the value as column text.
    fn encode(&self, column: &str) -> Result<String, EncodeError>;

    /// Decode column text, failing on malformed or mistyped input.
    fn decode(column: &str, text: &str) -> Result<Self, DecodeError>;
}

fn encode_json<T: Serialize>(value: &T, column: &str) -> Result<String, EncodeError> {
    serde_json::to_string(value).map_err(|e| EncodeError {
        column: column.to_string(),
        reason: e.to_string(),
    })
}

fn decode_json<T: DeserializeOwned>(column: &str, text: &str) -> Result<T, DecodeError> {
    serde_json::from_str(text).map_err(|e| DecodeError::new(column, e.to_string()))
}

impl EncodedValue for StringList {
    fn encode(&self, column: &str) -> Result<String, EncodeError> {
        encode_json(self, column)
    }

    fn decode(column: &str, text: &str) -> Result<Self, DecodeError> {
        decode_json(column, text)
    }
}

impl EncodedValue for StringMap {
    fn encode(&self, column: &str) -> Result<String, EncodeError> {
        encode_json(self, column)
    }

    fn decode(column: &str, text: &str) -> Result<Self, DecodeError> {
        decode_json(column, text)
    }
}

impl EncodedValue for UserConfigValues {
    fn encode(&self, column: &str) -> Result<String, EncodeError> {
        encode_json(self, column)
    }

    fn decode(column: &str, text: &str) -> Result<Self, DecodeError> {
        decode_json(column, text)
    }
}

/// Encode an optional value; `None` maps to a `NULL` column.
pub fn encode_optional<T: EncodedValue>(
    value: Option<&T>,
    column: &str,
) -> Result<Option<String>, EncodeError> {
    value.map(|v| v.encode(column)).transpose()
}

/// Decode an optional column; `NULL` maps to `None`.
pub fn decode_optional<T: EncodedValue>(
    column: &str,
    text: Option<&str>,
) -> Result<Option<T>, DecodeError> {
    text.map(|t| T::decode(column, t)).transpose()
}
