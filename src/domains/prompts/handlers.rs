//! Prompt handler contract.

use async_trait::async_trait;
use rmcp::model::{GetPromptResult, Prompt, PromptArgument};
use std::collections::HashMap;
use std::sync::Arc;

/// Renders a prompt from its arguments.
///
/// Required arguments are checked by the manager before the handler runs.
#[async_trait]
pub trait PromptHandler: Send + Sync {
    async fn get(&self, arguments: HashMap<String, String>) -> anyhow::Result<GetPromptResult>;
}

/// A prompt's metadata bound to its handler.
#[derive(Clone)]
pub struct PromptCapability {
    prompt: Prompt,
    handler: Arc<dyn PromptHandler>,
}

impl PromptCapability {
    pub fn new(prompt: Prompt, handler: impl PromptHandler + 'static) -> Self {
        Self {
            prompt,
            handler: Arc::new(handler),
        }
    }

    /// Build the prompt metadata from its parts.
    pub fn build(
        name: &str,
        description: &str,
        arguments: Vec<PromptArgument>,
        handler: impl PromptHandler + 'static,
    ) -> Self {
        let prompt = Prompt {
            name: name.to_string(),
            title: None,
            description: Some(description.to_string()),
            arguments: Some(arguments),
            icons: None,
            meta: None,
        };
        Self::new(prompt, handler)
    }

    pub fn name(&self) -> &str {
        &self.prompt.name
    }

    pub fn prompt(&self) -> &Prompt {
        &self.prompt
    }

    pub fn handler(&self) -> &Arc<dyn PromptHandler> {
        &self.handler
    }

    /// Names of the arguments marked required.
    pub fn required_arguments(&self) -> impl Iterator<Item = &str> {
        self.prompt
            .arguments
            .iter()
            .flatten()
            .filter(|arg| arg.required.unwrap_or(false))
            .map(|arg| arg.name.as_str())
    }
}

impl std::fmt::Debug for PromptCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptCapability")
            .field("name", &self.name())
            .finish()
    }
}
