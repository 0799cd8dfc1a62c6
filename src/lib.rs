//! Dynamic Tool MCP Server Library
//!
//! This crate provides a Model Context Protocol (MCP) server whose tool
//! catalog can be discovered, enabled and disabled at runtime, organized by
//! domains.
//!
//! # Architecture
//!
//! The server is organized into the following modules:
//!
//! - **core**: Core infrastructure including configuration, caller identity,
//!   error handling, the main server and its transports
//! - **domains**: Business logic organized by bounded contexts
//!   - **tools**: The tool registry, namespacing, and the discovery meta-tools
//!   - **resources**: Data resources that can be read by clients
//!   - **prompts**: Prompt templates for consistent interactions
//!
//! # Example
//!
//! ```rust,no_run
//! use dynamic_tool_mcp::core::{Config, McpServer, TransportService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     config.validate()?;
//!     let server = McpServer::new(config.clone())?;
//!     TransportService::new(config.transport).run(server).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{AuthInfo, Config, Error, McpServer, Result};
pub use domains::tools::{ToolCapability, ToolDefinition, ToolManager};
