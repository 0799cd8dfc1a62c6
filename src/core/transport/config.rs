//! Transport configuration types.
//!
//! `MCP_TRANSPORT` picks the transport (`stdio`, `tcp` or `http`); the other
//! `MCP_TCP_*` and `MCP_HTTP_*` variables fill in its settings. A transport
//! whose feature is compiled out falls back to the default one.

use serde::{Deserialize, Serialize};
#[cfg(any(feature = "tcp", feature = "http"))]
use std::str::FromStr;
use tracing::warn;

/// Transport configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransportConfig {
    /// Standard input/output transport (default for MCP).
    #[cfg(feature = "stdio")]
    Stdio,

    /// TCP socket transport with JSON-RPC messages.
    #[cfg(feature = "tcp")]
    Tcp(TcpConfig),

    /// HTTP transport with JSON-RPC over POST.
    #[cfg(feature = "http")]
    Http(HttpConfig),
}

/// TCP transport configuration.
#[cfg(feature = "tcp")]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TcpConfig {
    /// Port number to listen on.
    pub port: u16,

    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,
}

/// HTTP transport configuration.
#[cfg(feature = "http")]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Port number to listen on.
    pub port: u16,

    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Path for JSON-RPC endpoint.
    #[serde(default = "default_rpc_path")]
    pub rpc_path: String,

    /// Enable CORS for browser clients.
    #[serde(default = "default_cors")]
    pub enable_cors: bool,

    /// Most sessions kept open; the least recently used is evicted past it.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Seconds a session may sit idle before it expires.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,
}

#[cfg(any(feature = "tcp", feature = "http"))]
fn default_host() -> String {
    "127.0.0.1".to_string()
}

#[cfg(any(feature = "tcp", feature = "http"))]
fn env_number<T: FromStr>(var: &str, default: T) -> T {
    match std::env::var(var) {
        Ok(value) => value.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid {}: {:?}", var, value);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(feature = "http")]
fn default_rpc_path() -> String {
    "/mcp".to_string()
}

#[cfg(feature = "http")]
fn default_cors() -> bool {
    true
}

#[cfg(feature = "http")]
fn default_max_sessions() -> usize {
    1024
}

#[cfg(feature = "http")]
fn default_session_ttl() -> u64 {
    30 * 60
}

impl Default for TransportConfig {
    fn default() -> Self {
        #[cfg(feature = "stdio")]
        {
            return Self::Stdio;
        }

        #[cfg(all(not(feature = "stdio"), feature = "tcp"))]
        {
            return Self::Tcp(TcpConfig::default());
        }

        #[cfg(all(not(feature = "stdio"), not(feature = "tcp"), feature = "http"))]
        {
            return Self::Http(HttpConfig::default());
        }

        #[cfg(not(any(feature = "stdio", feature = "tcp", feature = "http")))]
        {
            compile_error!("At least one transport feature must be enabled: stdio, tcp, or http");
        }
    }
}

#[cfg(feature = "tcp")]
impl Default for TcpConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: default_host(),
        }
    }
}

#[cfg(feature = "http")]
impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: default_host(),
            rpc_path: default_rpc_path(),
            enable_cors: default_cors(),
            max_sessions: default_max_sessions(),
            session_ttl_secs: default_session_ttl(),
        }
    }
}

impl TransportConfig {
    /// Create a STDIO transport config.
    #[cfg(feature = "stdio")]
    pub fn stdio() -> Self {
        Self::Stdio
    }

    /// Create a TCP transport config.
    #[cfg(feature = "tcp")]
    pub fn tcp(port: u16, host: impl Into<String>) -> Self {
        Self::Tcp(TcpConfig {
            port,
            host: host.into(),
        })
    }

    /// Create an HTTP transport config.
    #[cfg(feature = "http")]
    pub fn http(port: u16, host: impl Into<String>) -> Self {
        Self::Http(HttpConfig {
            port,
            host: host.into(),
            ..Default::default()
        })
    }

    /// Load transport config from environment variables.
    pub fn from_env() -> Self {
        let transport = std::env::var("MCP_TRANSPORT")
            .unwrap_or_default()
            .trim()
            .to_lowercase();

        match transport.as_str() {
            #[cfg(feature = "stdio")]
            "stdio" => Self::Stdio,
            #[cfg(feature = "tcp")]
            "tcp" => Self::Tcp(TcpConfig {
                port: env_number("MCP_TCP_PORT", 3000),
                host: std::env::var("MCP_TCP_HOST").unwrap_or_else(|_| default_host()),
            }),
            #[cfg(feature = "http")]
            "http" => Self::Http(HttpConfig {
                port: env_number("MCP_HTTP_PORT", 8080),
                host: std::env::var("MCP_HTTP_HOST").unwrap_or_else(|_| default_host()),
                rpc_path: std::env::var("MCP_HTTP_PATH").unwrap_or_else(|_| default_rpc_path()),
                enable_cors: std::env::var("MCP_HTTP_CORS")
                    .map(|v| crate::core::config::parse_bool(&v))
                    .unwrap_or_else(|_| default_cors()),
                max_sessions: env_number("MCP_HTTP_MAX_SESSIONS", default_max_sessions()),
                session_ttl_secs: env_number("MCP_HTTP_SESSION_TTL", default_session_ttl()),
            }),
            "" => Self::default(),
            other => {
                warn!("Unsupported MCP_TRANSPORT {:?}, using the default", other);
                Self::default()
            }
        }
    }

    /// Get a description of this transport for logging.
    pub fn description(&self) -> String {
        match self {
            #[cfg(feature = "stdio")]
            Self::Stdio => "STDIO (standard MCP mode)".to_string(),
            #[cfg(feature = "tcp")]
            Self::Tcp(cfg) => format!("TCP on {}:{}", cfg.host, cfg.port),
            #[cfg(feature = "http")]
            Self::Http(cfg) => format!("HTTP on {}:{}{}", cfg.host, cfg.port, cfg.rpc_path),
        }
    }

    /// Check if this transport is the standard STDIO mode.
    pub fn is_stdio(&self) -> bool {
        #[cfg(feature = "stdio")]
        {
            matches!(self, Self::Stdio)
        }
        #[cfg(not(feature = "stdio"))]
        {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "stdio")]
    #[test]
    fn test_stdio_description() {
        let config = TransportConfig::stdio();
        assert!(config.is_stdio());
        assert_eq!(config.description(), "STDIO (standard MCP mode)");
    }

    #[test]
    fn test_from_env_selects_transport() {
        let _lock = crate::core::config::ENV_TEST_LOCK.lock().unwrap();

        #[cfg(feature = "stdio")]
        {
            unsafe {
                std::env::set_var("MCP_TRANSPORT", "stdio");
            }
            assert!(TransportConfig::from_env().is_stdio());
            unsafe {
                std::env::set_var("MCP_TRANSPORT", " STDIO ");
            }
            assert!(TransportConfig::from_env().is_stdio());
        }

        #[cfg(feature = "http")]
        {
            unsafe {
                std::env::set_var("MCP_TRANSPORT", "http");
                std::env::set_var("MCP_HTTP_PORT", "9100");
            }
            assert_eq!(
                TransportConfig::from_env().description(),
                "HTTP on 127.0.0.1:9100/mcp"
            );
            unsafe {
                std::env::remove_var("MCP_HTTP_PORT");
            }
        }

        unsafe {
            std::env::set_var("MCP_TRANSPORT", "carrier-pigeon");
        }
        assert_eq!(
            TransportConfig::from_env().description(),
            TransportConfig::default().description()
        );

        unsafe {
            std::env::remove_var("MCP_TRANSPORT");
        }
    }

    #[cfg(feature = "http")]
    #[test]
    fn test_http_defaults() {
        let config = TransportConfig::http(9000, "0.0.0.0");
        assert_eq!(config.description(), "HTTP on 0.0.0.0:9000/mcp");
        match config {
            TransportConfig::Http(cfg) => {
                assert!(cfg.enable_cors);
                assert_eq!(cfg.max_sessions, 1024);
                assert_eq!(cfg.session_ttl_secs, 1800);
            }
            _ => panic!("Expected HTTP config"),
        }
    }

    #[cfg(feature = "tcp")]
    #[test]
    fn test_tcp_deserialize() {
        let config: TransportConfig =
            serde_json::from_str(r#"{"type": "tcp", "port": 4000}"#).unwrap();
        assert_eq!(config.description(), "TCP on 127.0.0.1:4000");
    }
}
