//! Filesystem/URI roots exposed to MCP servers.
//!
//! Roots are global: the current schema does not scope them per server.

use serde::{Deserialize, Serialize};

/// A persisted root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Root {
    pub id: String,
    pub name: String,
    pub uri: String,
}

/// A root to be written to the store; `id: None` lets the store assign one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRoot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub uri: String,
}

impl NewRoot {
    #[must_use]
    pub fn new(name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            uri: uri.into(),
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn into_root(self, id: String) -> Root {
        Root {
            id,
            name: self.name,
            uri: self.uri,
        }
    }
}

impl From<Root> for NewRoot {
    fn from(root: Root) -> Self {
        Self {
            id: Some(root.id),
            name: root.name,
            uri: root.uri,
        }
    }
}
