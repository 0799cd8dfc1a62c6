//! Prompt manager implementation.
//!
//! The PromptManager keeps the prompt catalog and the set of enabled prompt
//! names, checks required arguments and routes requests to the matching
//! handler. Every prompt starts enabled.

use rmcp::{
    ErrorData as McpError,
    model::{GetPromptResult, Prompt},
};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use tracing::{error, info, instrument, warn};

use super::error::PromptError;
use super::handlers::PromptCapability;

/// Catalog and enabled set of the server's prompts.
pub struct PromptManager {
    catalog: HashMap<String, PromptCapability>,
    order: Vec<String>,
    enabled: RwLock<HashSet<String>>,
}

impl PromptManager {
    pub fn new(capabilities: Vec<PromptCapability>) -> Self {
        let mut catalog = HashMap::new();
        let mut order = Vec::new();

        for capability in capabilities {
            let name = capability.name().to_string();
            info!("Registering prompt: {}", name);
            if catalog.insert(name.clone(), capability).is_some() {
                warn!("Duplicate prompt {}, keeping the last one", name);
            } else {
                order.push(name);
            }
        }

        let enabled = order.iter().cloned().collect();
        Self {
            catalog,
            order,
            enabled: RwLock::new(enabled),
        }
    }

    pub fn has_prompts(&self) -> bool {
        !self.catalog.is_empty()
    }

    /// The enabled prompts, in registration order.
    pub async fn list_prompts(&self) -> Vec<Prompt> {
        let enabled = self.enabled.read().await;
        self.order
            .iter()
            .filter(|name| enabled.contains(*name))
            .filter_map(|name| self.catalog.get(name))
            .map(|capability| capability.prompt().clone())
            .collect()
    }

    /// Render a prompt.
    #[instrument(skip(self, arguments))]
    pub async fn get_prompt(
        &self,
        name: &str,
        arguments: Option<HashMap<String, String>>,
    ) -> Result<GetPromptResult, PromptError> {
        let capability = self
            .catalog
            .get(name)
            .ok_or_else(|| PromptError::unknown(name))?;

        if !self.enabled.read().await.contains(name) {
            return Err(PromptError::not_enabled(name));
        }

        let arguments = arguments.unwrap_or_default();
        if let Some(missing) = capability
            .required_arguments()
            .find(|arg| !arguments.contains_key(*arg))
        {
            return Err(PromptError::missing_argument(missing));
        }

        capability
            .handler()
            .get(arguments)
            .await
            .map_err(|err| match err.downcast::<McpError>() {
                Ok(mcp) => PromptError::Protocol(mcp),
                Err(err) => {
                    error!("Prompt handler failed for {}: {:#}", name, err);
                    PromptError::Handler(err.to_string())
                }
            })
    }

    /// Enable or disable a prompt.
    pub async fn set_enabled(&self, name: &str, enabled: bool) -> Result<(), PromptError> {
        if !self.catalog.contains_key(name) {
            return Err(PromptError::unknown(name));
        }

        let mut set = self.enabled.write().await;
        if enabled {
            set.insert(name.to_string());
        } else {
            set.remove(name);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::prompts::handlers::PromptHandler;
    use rmcp::model::{ErrorCode, PromptArgument, PromptMessage, PromptMessageRole};

    struct Greeting;

    #[async_trait::async_trait]
    impl PromptHandler for Greeting {
        async fn get(&self, arguments: HashMap<String, String>) -> anyhow::Result<GetPromptResult> {
            let name = arguments.get("name").cloned().unwrap_or_default();
            Ok(GetPromptResult {
                description: None,
                messages: vec![PromptMessage::new_text(
                    PromptMessageRole::User,
                    format!("Hello, {name}!"),
                )],
            })
        }
    }

    fn manager() -> PromptManager {
        PromptManager::new(vec![PromptCapability::build(
            "greeting",
            "Greets someone",
            vec![PromptArgument {
                name: "name".to_string(),
                title: None,
                description: Some("Who to greet".to_string()),
                required: Some(true),
            }],
            Greeting,
        )])
    }

    fn args(name: &str) -> Option<HashMap<String, String>> {
        Some(HashMap::from([("name".to_string(), name.to_string())]))
    }

    #[tokio::test]
    async fn test_get_prompt_with_arguments() {
        let manager = manager();
        assert!(manager.has_prompts());
        assert_eq!(manager.list_prompts().await.len(), 1);

        let result = manager.get_prompt("greeting", args("World")).await.unwrap();
        assert_eq!(result.messages.len(), 1);
    }

    #[tokio::test]
    async fn test_get_prompt_missing_required_argument() {
        let err: McpError = manager()
            .get_prompt("greeting", None)
            .await
            .unwrap_err()
            .into();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_unknown_and_disabled() {
        let manager = manager();

        let err: McpError = manager
            .get_prompt("nonexistent", None)
            .await
            .unwrap_err()
            .into();
        assert_eq!(err.code, ErrorCode::METHOD_NOT_FOUND);
        assert_eq!(err.message, "Unknown prompt: nonexistent");

        manager.set_enabled("greeting", false).await.unwrap();
        assert!(manager.list_prompts().await.is_empty());
        let err: McpError = manager
            .get_prompt("greeting", args("x"))
            .await
            .unwrap_err()
            .into();
        assert_eq!(err.message, "Prompt not enabled: greeting");

        manager.set_enabled("greeting", true).await.unwrap();
        assert!(manager.get_prompt("greeting", args("x")).await.is_ok());
    }
}
