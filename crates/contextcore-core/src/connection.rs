//! Connection-error classification.
//!
//! Two independent pieces used by session layers:
//!
//! - [`NotConnectedError`] normalizes any failure into a uniform
//!   "not connected" error. Two wrappers are equal when their rendered
//!   descriptions are equal.
//! - [`is_likely_connection_error`] decides whether a failure looks like a
//!   dropped connection, so the UI can offer a reconnect action.
//!
//! The predicate is a keyword heuristic over the lower-cased error text.
//! False positives ("invalid transport option") and false negatives
//! ("broken pipe") are accepted; structured error codes would need the
//! session layer to change with it.

use std::error::Error;
use std::fmt;

use thiserror::Error;

/// Description used whenever no underlying failure text is available.
pub const NOT_CONNECTED_MESSAGE: &str = "Server is not connected";

/// Keywords that mark an error as connection-related.
pub const CONNECTION_ERROR_KEYWORDS: [&str; 5] =
    ["connect", "disconnect", "transport", "closed", "authentication"];

/// Whether `error` looks like a lost or failed connection.
///
/// Matches the lower-cased display text against
/// [`CONNECTION_ERROR_KEYWORDS`]. This is a substring heuristic: "Request
/// disclosed nothing" matches, and a timeout worded without any keyword
/// does not.
pub fn is_likely_connection_error<E: fmt::Display + ?Sized>(error: &E) -> bool {
    let description = error.to_string().to_lowercase();
    CONNECTION_ERROR_KEYWORDS
        .iter()
        .any(|keyword| description.contains(keyword))
}

/// Whether `text` already ends with `tail`, either whole or as a `": tail"` suffix.
///
/// Errors that format their source into their own message would otherwise
/// repeat it.
fn already_rendered(text: &str, tail: &str) -> bool {
    text == tail
        || text
            .strip_suffix(tail)
            .is_some_and(|head| head.ends_with(": "))
}

/// Render an error and its source chain as one line.
fn describe_chain(error: &dyn Error) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(inner) = source {
        let inner_text = inner.to_string();
        if !inner_text.is_empty() && !already_rendered(&text, &inner_text) {
            if !text.is_empty() {
                text.push_str(": ");
            }
            text.push_str(&inner_text);
        }
        source = inner.source();
    }
    text
}

/// A session to an MCP server is not usable.
///
/// Carries the rendered description of the failure that caused it. When
/// there is none, every rendering (`Display`, `Debug`,
/// [`localized_description`](Self::localized_description)) falls back to
/// [`NOT_CONNECTED_MESSAGE`].
#[derive(Clone, Default, Error)]
#[error("{}", self.description())]
pub struct NotConnectedError {
    underlying: Option<String>,
}

impl NotConnectedError {
    /// A wrapper with no known cause.
    pub const fn new() -> Self {
        Self { underlying: None }
    }

    /// Wrap `error`, optionally attaching an already-known `cause`.
    pub fn wrap(error: &dyn Error, cause: Option<&dyn Error>) -> Self {
        let mut text = describe_chain(error);
        if let Some(cause) = cause {
            let cause_text = describe_chain(cause);
            if !cause_text.is_empty() && !already_rendered(&text, &cause_text) {
                if text.is_empty() {
                    text = cause_text;
                } else {
                    text = format!("{text} (caused by: {cause_text})");
                }
            }
        }
        Self::from_description(text)
    }

    /// Wrap a bare failure description.
    pub fn from_description(description: impl Into<String>) -> Self {
        let description = description.into();
        let underlying = (!description.trim().is_empty()).then_some(description);
        Self { underlying }
    }

    /// The underlying failure text, if one was captured.
    pub fn underlying(&self) -> Option<&str> {
        self.underlying.as_deref()
    }

    /// The user-facing description.
    pub fn description(&self) -> &str {
        self.underlying.as_deref().unwrap_or(NOT_CONNECTED_MESSAGE)
    }

    /// The description shown in localized UI surfaces.
    ///
    /// No translations exist yet, so this is the plain description.
    pub fn localized_description(&self) -> String {
        self.description().to_string()
    }

    /// Whether the wrapped failure looks like a dropped connection.
    pub fn is_likely_connection_error(&self) -> bool {
        is_likely_connection_error(self.description())
    }
}

impl PartialEq for NotConnectedError {
    fn eq(&self, other: &Self) -> bool {
        self.description() == other.description()
    }
}

impl Eq for NotConnectedError {}

impl fmt::Debug for NotConnectedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NotConnectedError")
            .field(&self.description())
            .finish()
    }
}
