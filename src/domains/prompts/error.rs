//! Prompt-specific error types.

use rmcp::{ErrorData as McpError, model::ErrorCode};
use thiserror::Error;

/// Errors that can occur during prompt operations.
#[derive(Debug, Error)]
pub enum PromptError {
    /// No prompt is registered under the name.
    #[error("Unknown prompt: {0}")]
    UnknownPrompt(String),

    /// The prompt exists but is currently disabled.
    #[error("Prompt not enabled: {0}")]
    NotEnabled(String),

    /// Required argument is missing.
    #[error("Missing required argument: {0}")]
    MissingArgument(String),

    /// A handler reported a protocol-level error that is passed through unchanged.
    #[error("{}", .0.message)]
    Protocol(McpError),

    /// The prompt handler failed.
    #[error("Prompt handler error: {0}")]
    Handler(String),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PromptError {
    /// Create a new "unknown prompt" error.
    pub fn unknown(name: impl Into<String>) -> Self {
        Self::UnknownPrompt(name.into())
    }

    /// Create a new "not enabled" error.
    pub fn not_enabled(name: impl Into<String>) -> Self {
        Self::NotEnabled(name.into())
    }

    /// Create a new "missing argument" error.
    pub fn missing_argument(arg: impl Into<String>) -> Self {
        Self::MissingArgument(arg.into())
    }

    /// Create a new "internal" error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<PromptError> for McpError {
    fn from(err: PromptError) -> Self {
        match err {
            PromptError::UnknownPrompt(_) | PromptError::NotEnabled(_) => {
                McpError::new(ErrorCode::METHOD_NOT_FOUND, err.to_string(), None)
            }
            PromptError::MissingArgument(_) => McpError::invalid_params(err.to_string(), None),
            PromptError::Protocol(inner) => inner,
            PromptError::Handler(_) | PromptError::Internal(_) => {
                McpError::internal_error(err.to_string(), None)
            }
        }
    }
}
