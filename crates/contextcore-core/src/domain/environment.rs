//! Process-wide environment variable overrides.

use serde::{Deserialize, Serialize};

use super::server::StringMap;

/// A persisted global environment variable.
///
/// Keys are not unique in storage; see [`resolve_environment`] for how
/// duplicates are collapsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalEnvironmentVariable {
    pub id: String,
    pub key: String,
    pub value: String,
}

/// A global environment variable to be written to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGlobalEnvironmentVariable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub key: String,
    pub value: String,
}

impl NewGlobalEnvironmentVariable {
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: None,
            key: key.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn into_variable(self, id: String) -> GlobalEnvironmentVariable {
        GlobalEnvironmentVariable {
            id,
            key: self.key,
            value: self.value,
        }
    }
}

impl From<GlobalEnvironmentVariable> for NewGlobalEnvironmentVariable {
    fn from(variable: GlobalEnvironmentVariable) -> Self {
        Self {
            id: Some(variable.id),
            key: variable.key,
            value: variable.value,
        }
    }
}

/// Collapse entries into the effective environment.
///
/// Entries must be in write order; when a key repeats, the last entry wins.
pub fn resolve_environment<'a, I>(entries: I) -> StringMap
where
    I: IntoIterator<Item = &'a GlobalEnvironmentVariable>,
{
    entries
        .into_iter()
        .map(|entry| (entry.key.clone(), entry.value.clone()))
        .collect()
}
