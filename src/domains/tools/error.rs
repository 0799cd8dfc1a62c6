//! Tool-specific error types.

use rmcp::{ErrorData as McpError, model::ErrorCode};
use thiserror::Error;

use super::schema::SchemaViolation;

/// Errors that can occur while listing or calling tools.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The requested tool is not in the catalog (or carries the wrong namespace).
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// The tool exists but is not currently enabled.
    #[error("Tool not enabled: {0}")]
    NotEnabled(String),

    /// `tools/call` arrived without an `arguments` object.
    #[error("Missing arguments for tool: {0}")]
    MissingArguments(String),

    /// The arguments did not match the tool's input schema.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// A tool definition was rejected at construction.
    #[error("Invalid tool definition: {0}")]
    InvalidDefinition(String),

    /// A handler reported a protocol-level error that is passed through unchanged.
    #[error("{}", .0.message)]
    Protocol(McpError),

    /// The handler failed with an application error.
    #[error("Tool handler error: {0}")]
    Handler(String),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ToolError {
    /// Create a new "unknown tool" error.
    pub fn unknown(name: impl Into<String>) -> Self {
        Self::UnknownTool(name.into())
    }

    /// Create a new "not enabled" error.
    pub fn not_enabled(name: impl Into<String>) -> Self {
        Self::NotEnabled(name.into())
    }

    /// Create a new "invalid parameters" error.
    pub fn invalid_parameters(msg: impl Into<String>) -> Self {
        Self::InvalidParameters(msg.into())
    }

    /// Create a new "invalid definition" error.
    pub fn invalid_definition(msg: impl Into<String>) -> Self {
        Self::InvalidDefinition(msg.into())
    }

    /// Create a new "internal" error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<SchemaViolation> for ToolError {
    fn from(violation: SchemaViolation) -> Self {
        Self::InvalidParameters(violation.to_string())
    }
}

impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::UnknownTool(_) | ToolError::NotEnabled(_) => {
                McpError::new(ErrorCode::METHOD_NOT_FOUND, err.to_string(), None)
            }
            ToolError::MissingArguments(_)
            | ToolError::InvalidParameters(_)
            | ToolError::InvalidDefinition(_) => McpError::invalid_params(err.to_string(), None),
            ToolError::Protocol(inner) => inner,
            ToolError::Handler(_) | ToolError::Internal(_) => {
                McpError::internal_error(err.to_string(), None)
            }
        }
    }
}
