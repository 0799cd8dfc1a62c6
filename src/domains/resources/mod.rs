//! Resources domain module.
//!
//! This module handles all resource-related functionality for the MCP server.
//! Resources represent data that can be read by MCP clients.
//!
//! ## Architecture
//!
//! - `definitions/` - Individual resource definitions (one file per resource)
//! - `registry.rs` - Central resource registration
//! - `manager.rs` - Resource catalog, enabled set, listing and reading
//!
//! ## Adding a New Resource
//!
//! 1. Create a new file in `definitions/` (e.g., `my_resource.rs`)
//! 2. Implement the `ResourceDefinition` and `ResourceHandler` traits
//! 3. Export in `definitions/mod.rs`
//! 4. Register in `registry.rs`

pub mod definitions;
mod error;
mod handlers;
mod manager;
mod registry;

pub use definitions::ResourceDefinition;
pub use error::ResourceError;
pub use handlers::*;
pub use manager::ResourceManager;
pub use registry::{builtin_resources, resource_uris};
