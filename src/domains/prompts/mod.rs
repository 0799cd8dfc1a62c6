//! Prompts domain module.
//!
//! This module handles all prompt-related functionality for the MCP server.
//! Prompts are template messages that can be customized with arguments and
//! used to generate consistent interactions with language models.
//!
//! ## Architecture
//!
//! - `definitions/` - Individual prompt definitions (one file per prompt)
//! - `registry.rs` - Central prompt registration
//! - `manager.rs` - Prompt catalog, enabled set, listing and rendering
//!
//! ## Adding a New Prompt
//!
//! 1. Create a new file in `definitions/` (e.g., `my_prompt.rs`)
//! 2. Implement the `PromptDefinition` and `PromptHandler` traits
//! 3. Export in `definitions/mod.rs`
//! 4. Register in `registry.rs`

pub mod definitions;
mod error;
mod handlers;
mod manager;
mod registry;

pub use definitions::PromptDefinition;
pub use error::PromptError;
pub use handlers::*;
pub use manager::PromptManager;
pub use registry::{builtin_prompts, prompt_names};
