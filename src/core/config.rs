//! Configuration management for the MCP server.
//!
//! This module provides a centralized configuration structure that can be
//! populated from environment variables, configuration files, or defaults.

use super::error::{Error, Result};
use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{info, warn};

/// Main configuration structure for the MCP server.
///
/// This struct contains all configurable aspects of the server, organized
/// by domain for clarity and maintainability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Tool catalog exposure: namespace, toolset mode, dynamic discovery.
    pub tools: ToolsConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// Identity used for stdio/TCP sessions.
    pub auth: AuthConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,

    /// Free-form instructions sent to clients on initialization.
    pub instructions: String,
}

/// Which tools are enabled when dynamic discovery is off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToolsetMode {
    /// Only tools annotated with `readOnlyHint: true`.
    #[default]
    ReadOnly,
    /// Every cataloged tool.
    ReadWrite,
}

impl ToolsetMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReadOnly => "readOnly",
            Self::ReadWrite => "readWrite",
        }
    }
}

impl FromStr for ToolsetMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "readonly" => Ok(Self::ReadOnly),
            "readwrite" => Ok(Self::ReadWrite),
            other => Err(Error::config(format!(
                "unknown toolset mode '{other}' (expected readOnly or readWrite)"
            ))),
        }
    }
}

/// Toolset configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolsetConfig {
    pub mode: ToolsetMode,
}

/// Dynamic tool discovery options.
///
/// When enabled, the catalog starts with only `default_enabled_toolsets`
/// turned on and the agent expands it through the discovery meta-tools.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicDiscoveryConfig {
    pub enabled: bool,

    /// Internal tool names enabled at startup.
    #[serde(default)]
    pub default_enabled_toolsets: Vec<String>,
}

/// Configuration for the tools domain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Prefix applied to externally visible tool names and descriptions.
    pub namespace: Option<String>,

    pub toolset: ToolsetConfig,

    pub dynamic_discovery: DynamicDiscoveryConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,

    /// Whether to include timestamps in log output.
    pub with_timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            with_timestamps: true,
        }
    }
}

impl LoggingConfig {
    /// Read `MCP_LOG_LEVEL` (after loading `.env`).
    ///
    /// Never logs, so it can run before the subscriber is installed.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut logging = Self::default();
        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            logging.level = level;
        }
        logging
    }
}

/// Identity presented by stdio and TCP callers.
///
/// These transports carry no per-request credentials, so every call made
/// over them is attributed to this identity.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    pub token: Option<String>,
    pub client_id: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
}

/// Custom Debug implementation to redact secrets from logs.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("client_id", &self.client_id)
            .field("scopes", &self.scopes)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "dynamic-tool-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                instructions: "This MCP server exposes a runtime-configurable set of tools."
                    .to_string(),
            },
            tools: ToolsConfig::default(),
            logging: LoggingConfig::default(),
            transport: TransportConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables are expected to be prefixed with `MCP_`.
    /// For example: `MCP_SERVER_NAME`, `MCP_LOG_LEVEL`, `MCP_NAMESPACE`.
    /// Unparseable values are logged and replaced by their defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(instructions) = std::env::var("MCP_SERVER_INSTRUCTIONS") {
            config.server.instructions = instructions;
        }

        config.logging = LoggingConfig::from_env();

        // Tool exposure
        if let Ok(namespace) = std::env::var("MCP_NAMESPACE") {
            let namespace = namespace.trim();
            if !namespace.is_empty() {
                config.tools.namespace = Some(namespace.to_string());
            }
        }

        if let Ok(mode) = std::env::var("MCP_TOOLSET_MODE") {
            match mode.parse() {
                Ok(mode) => config.tools.toolset.mode = mode,
                Err(e) => warn!("Ignoring MCP_TOOLSET_MODE: {}", e),
            }
        }

        if let Ok(enabled) = std::env::var("MCP_DYNAMIC_DISCOVERY") {
            config.tools.dynamic_discovery.enabled = parse_bool(&enabled);
        }

        if let Ok(defaults) = std::env::var("MCP_DEFAULT_ENABLED_TOOLSETS") {
            config.tools.dynamic_discovery.default_enabled_toolsets = parse_list(&defaults);
        }

        // Load transport configuration from environment
        config.transport = TransportConfig::from_env();

        // Caller identity for stdio/TCP
        if let Ok(token) = std::env::var("MCP_AUTH_TOKEN") {
            config.auth.token = Some(token);
            info!("Auth token loaded from environment");
        }

        if let Ok(client_id) = std::env::var("MCP_AUTH_CLIENT_ID") {
            config.auth.client_id = Some(client_id);
        }

        if let Ok(scopes) = std::env::var("MCP_AUTH_SCOPES") {
            config.auth.scopes = parse_list(&scopes);
        }

        config
    }

    /// Check invariants that cannot be expressed in the types.
    pub fn validate(&self) -> Result<()> {
        if self.server.name.trim().is_empty() {
            return Err(Error::config("server name must not be empty"));
        }

        if let Some(namespace) = &self.tools.namespace {
            if namespace.is_empty() {
                return Err(Error::config("namespace must not be empty"));
            }
            if namespace.contains("__") {
                return Err(Error::config(format!(
                    "namespace '{namespace}' must not contain the '__' separator"
                )));
            }
            if !namespace
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            {
                return Err(Error::config(format!(
                    "namespace '{namespace}' may only contain ASCII letters, digits, '_' and '-'"
                )));
            }
        }

        Ok(())
    }
}

pub(crate) fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// Mutex to ensure env var tests run serially
#[cfg(test)]
pub(crate) static ENV_TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
