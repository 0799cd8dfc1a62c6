//! Tools domain module.
//!
//! This module handles all tool-related functionality for the MCP server.
//! Tools are executable functions that can be called by MCP clients; which
//! of them are visible and callable can change while the server runs.
//!
//! ## Architecture
//!
//! - `definitions/` - Built-in tool implementations (one file per tool)
//! - `manager.rs` - The registry: catalog, enabled set, namespace, list/call
//! - `meta.rs` - The `dynamic_tool_list` / `dynamic_tool_trigger` discovery tools
//! - `notifier.rs` - Change subscriptions with drop-to-unsubscribe guards
//! - `schema.rs` - Input schemas and argument validation
//! - `registry.rs` - The built-in tool catalog
//! - `error.rs` - Tool-specific error types
//!
//! ## Adding a New Tool
//!
//! 1. Create a new file in `definitions/` (e.g., `my_tool.rs`)
//! 2. Define params, `execute()` and `capability()`
//! 3. Export it in `definitions/mod.rs`
//! 4. Add it to `ToolRegistry::capabilities()` in `registry.rs`

mod capability;
mod definition;
pub mod definitions;
mod error;
mod handlers;
mod manager;
pub mod meta;
pub mod namespace;
mod notifier;
mod registry;
mod schema;

pub use capability::ToolCapability;
pub use definition::{ToolDefinition, annotations};
pub use error::ToolError;
pub use handlers::*;
pub use manager::{ToolListResponse, ToolManager};
pub use notifier::{ChangeNotifier, Subscription};
pub use registry::{ToolRegistry, builtin_capabilities};
pub use schema::{InputSchema, SchemaViolation};
