//! Resource-specific error types.

use rmcp::{ErrorData as McpError, model::ErrorCode};
use thiserror::Error;

/// Errors that can occur during resource operations.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// No resource is registered under the URI.
    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    /// The resource exists but is currently disabled.
    #[error("Resource not enabled: {0}")]
    NotEnabled(String),

    /// A handler reported a protocol-level error that is passed through unchanged.
    #[error("{}", .0.message)]
    Protocol(McpError),

    /// The resource handler failed.
    #[error("Resource handler error: {0}")]
    Handler(String),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResourceError {
    /// Create a new "unknown resource" error.
    pub fn unknown(uri: impl Into<String>) -> Self {
        Self::UnknownResource(uri.into())
    }

    /// Create a new "not enabled" error.
    pub fn not_enabled(uri: impl Into<String>) -> Self {
        Self::NotEnabled(uri.into())
    }

    /// Create a new "internal" error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<ResourceError> for McpError {
    fn from(err: ResourceError) -> Self {
        match err {
            ResourceError::UnknownResource(_) | ResourceError::NotEnabled(_) => {
                McpError::new(ErrorCode::METHOD_NOT_FOUND, err.to_string(), None)
            }
            ResourceError::Protocol(inner) => inner,
            ResourceError::Handler(_) | ResourceError::Internal(_) => {
                McpError::internal_error(err.to_string(), None)
            }
        }
    }
}
