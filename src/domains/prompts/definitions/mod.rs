//! Prompt definitions module.
//!
//! Each prompt is defined in its own file with:
//! - Metadata (name, description, arguments)
//! - A `PromptHandler` rendering its messages
//!
//! ## Adding a New Prompt
//!
//! 1. Create a new file (e.g., `my_prompt.rs`)
//! 2. Implement the `PromptDefinition` and `PromptHandler` traits
//! 3. Export it here
//! 4. Register in `registry.rs`

pub mod discover_tools;

pub use discover_tools::DiscoverToolsPrompt;

use rmcp::model::PromptArgument;

use super::handlers::{PromptCapability, PromptHandler};

/// Trait for prompt definitions.
///
/// Each prompt must implement this trait to provide its metadata.
pub trait PromptDefinition: PromptHandler + Sized + 'static {
    /// The unique name of the prompt.
    const NAME: &'static str;

    /// A description of what the prompt does.
    const DESCRIPTION: &'static str;

    /// The arguments this prompt accepts.
    fn arguments() -> Vec<PromptArgument>;

    /// Bind this definition to its metadata for registration.
    fn into_capability(self) -> PromptCapability {
        PromptCapability::build(Self::NAME, Self::DESCRIPTION, Self::arguments(), self)
    }
}
