//! MCP server definition types.
//!
//! A server definition is the local record of *how to reach* an MCP
//! endpoint. The store persists it verbatim; transport/field consistency is
//! checked by callers through [`ServerDefinition::validate`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ordered list of strings stored in a single encoded column.
pub type StringList = Vec<String>;

/// String-to-string map stored in a single encoded column.
///
/// Keys are unique and ordering carries no meaning.
pub type StringMap = BTreeMap<String, String>;

/// User-supplied configuration values for packaged (`dxt`) servers.
///
/// Opaque to the store: any JSON value is accepted under each key.
pub type UserConfigValues = BTreeMap<String, serde_json::Value>;

/// How the client talks to an MCP server.
///
/// The wire tokens are persisted as-is; renaming one breaks existing stores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// Local process speaking JSON-RPC over stdin/stdout.
    #[default]
    Stdio,
    /// Remote server using server-sent events.
    Sse,
    /// Remote server using the streamable HTTP transport.
    StreamableHttp,
    /// Packaged desktop extension, launched as a local process.
    Dxt,
}

impl TransportKind {
    /// All transport kinds, in declaration order.
    pub const ALL: [Self; 4] = [Self::Stdio, Self::Sse, Self::StreamableHttp, Self::Dxt];

    /// The persisted wire token.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdio => "stdio",
            Self::Sse => "sse",
            Self::StreamableHttp => "streamable_http",
            Self::Dxt => "dxt",
        }
    }

    /// Whether this transport launches a local process.
    pub const fn requires_command(self) -> bool {
        matches!(self, Self::Stdio | Self::Dxt)
    }

    /// Whether this transport connects over the network.
    pub const fn requires_url(self) -> bool {
        matches!(self, Self::Sse | Self::StreamableHttp)
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transport token that is not one of the known wire values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown transport kind: {0:?}")]
pub struct UnknownTransport(pub String);

impl FromStr for TransportKind {
    type Err = UnknownTransport;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownTransport(s.to_string()))
    }
}

/// Connection and launch settings for a server.
///
/// Every optional field distinguishes "not set" (`None`) from an explicit
/// empty value (`Some(vec![])`, `Some(BTreeMap::new())`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Executable to launch (stdio and dxt transports).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Arguments passed to `command`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<StringList>,

    /// Endpoint URL (sse and `streamable_http` transports).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Environment variable overrides for the launched process.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<StringMap>,

    /// Extra HTTP headers sent to remote servers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<StringMap>,

    /// Paths watched for changes that trigger an automatic reload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watched_paths: Option<StringList>,

    /// Working directory override for the launched process.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,

    /// Restart the server when a watched path changes.
    #[serde(default)]
    pub auto_reload_enabled: bool,

    /// User configuration values for packaged extensions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_config: Option<UserConfigValues>,

    /// URL of the server's published metadata document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_url: Option<String>,
}

/// A persisted MCP server definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerDefinition {
    /// Stable identifier; never changes once assigned.
    pub id: String,

    /// Human-readable name.
    pub name: String,

    /// Transport used to reach the server.
    pub transport: TransportKind,

    /// Launch and connection settings.
    pub config: ServerConfig,
}

/// Reasons a server definition is not usable with its transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServerValidationError {
    #[error("server name cannot be empty")]
    EmptyName,

    #[error("{0} server requires a command")]
    MissingCommand(TransportKind),

    #[error("{0} server requires a url")]
    MissingUrl(TransportKind),

    #[error("working directory must be absolute: {0}")]
    RelativeWorkingDirectory(String),
}

impl ServerDefinition {
    /// Check transport/field consistency.
    ///
    /// The store accepts any definition; connection-management layers call
    /// this before launching or connecting.
    pub fn validate(&self) -> Result<(), ServerValidationError> {
        validate_fields(&self.name, self.transport, &self.config)
    }
}

fn validate_fields(
    name: &str,
    transport: TransportKind,
    config: &ServerConfig,
) -> Result<(), ServerValidationError> {
    if name.trim().is_empty() {
        return Err(ServerValidationError::EmptyName);
    }

    if transport.requires_command() && config.command.as_deref().is_none_or(str::is_empty) {
        return Err(ServerValidationError::MissingCommand(transport));
    }

    if transport.requires_url() && config.url.as_deref().is_none_or(str::is_empty) {
        return Err(ServerValidationError::MissingUrl(transport));
    }

    if let Some(ref cwd) = config.working_directory {
        if !cwd.is_empty() && !std::path::Path::new(cwd).is_absolute() {
            return Err(ServerValidationError::RelativeWorkingDirectory(cwd.clone()));
        }
    }

    Ok(())
}

/// A server definition to be written to the store.
///
/// When `id` is `None` the store assigns one. Supplying the id of an
/// existing server replaces that server entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewServerDefinition {
    /// Identifier to use, or `None` to let the store generate one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Human-readable name.
    pub name: String,

    /// Transport used to reach the server.
    pub transport: TransportKind,

    /// Launch and connection settings.
    #[serde(default)]
    pub config: ServerConfig,
}

impl NewServerDefinition {
    /// A locally launched stdio server.
    #[must_use]
    pub fn stdio(name: impl Into<String>, command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            transport: TransportKind::Stdio,
            config: ServerConfig {
                command: Some(command.into()),
                args: Some(args),
                ..ServerConfig::default()
            },
        }
    }

    /// A remote server reached over `transport` at `url`.
    #[must_use]
    pub fn remote(
        name: impl Into<String>,
        transport: TransportKind,
        url: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            transport,
            config: ServerConfig {
                url: Some(url.into()),
                ..ServerConfig::default()
            },
        }
    }

    /// Use an explicit identifier.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add an environment variable override.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config
            .environment
            .get_or_insert_with(StringMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Add a custom header.
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config
            .headers
            .get_or_insert_with(StringMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Watch a path for automatic reloads.
    #[must_use]
    pub fn with_watched_path(mut self, path: impl Into<String>) -> Self {
        self.config
            .watched_paths
            .get_or_insert_with(Vec::new)
            .push(path.into());
        self
    }

    /// Set the working directory.
    #[must_use]
    pub fn with_working_directory(mut self, dir: impl Into<String>) -> Self {
        self.config.working_directory = Some(dir.into());
        self
    }

    /// Enable or disable automatic reloads.
    #[must_use]
    pub const fn with_auto_reload(mut self, enabled: bool) -> Self {
        self.config.auto_reload_enabled = enabled;
        self
    }

    /// Attach packaged-extension user configuration.
    #[must_use]
    pub fn with_user_config(mut self, values: UserConfigValues) -> Self {
        self.config.user_config = Some(values);
        self
    }

    /// Set the metadata URL.
    #[must_use]
    pub fn with_metadata_url(mut self, url: impl Into<String>) -> Self {
        self.config.metadata_url = Some(url.into());
        self
    }

    /// Check transport/field consistency before the definition is stored.
    pub fn validate(&self) -> Result<(), ServerValidationError> {
        validate_fields(&self.name, self.transport, &self.config)
    }

    /// Attach the identifier the store settled on.
    pub fn into_definition(self, id: String) -> ServerDefinition {
        ServerDefinition {
            id,
            name: self.name,
            transport: self.transport,
            config: self.config,
        }
    }
}

impl From<ServerDefinition> for NewServerDefinition {
    fn from(server: ServerDefinition) -> Self {
        Self {
            id: Some(server.id),
            name: server.name,
            transport: server.transport,
            config: server.config,
        }
    }
}
