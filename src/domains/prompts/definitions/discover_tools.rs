//! Tool discovery prompt definition.

use async_trait::async_trait;
use rmcp::model::{GetPromptResult, PromptArgument, PromptMessage, PromptMessageRole};
use std::collections::HashMap;
use std::sync::Arc;

use super::PromptDefinition;
use crate::domains::prompts::handlers::PromptHandler;
use crate::domains::tools::{ToolManager, meta, namespace};

/// Walks a client through the discover, enable, call workflow.
///
/// Meta-tool names are rendered under the manager's current namespace so the
/// instructions match what `tools/list` shows.
pub struct DiscoverToolsPrompt {
    tools: Arc<ToolManager>,
}

impl DiscoverToolsPrompt {
    pub fn new(tools: Arc<ToolManager>) -> Self {
        Self { tools }
    }

    fn render(&self, goal: &str) -> String {
        let ns = self.tools.namespace();
        let list = namespace::external_name(ns.as_deref(), meta::DYNAMIC_TOOL_LIST);
        let trigger = namespace::external_name(ns.as_deref(), meta::DYNAMIC_TOOL_TRIGGER);

        format!(
            "I want to accomplish the following: {goal}\n\n\
             Most tools on this server are disabled until requested.\n\
             1. Call `{list}` to see which tools are available and which are enabled.\n\
             2. Pick the tools that fit the goal and enable them with `{trigger}`, \
             passing {{\"toolsets\": [{{\"name\": \"<tool>\", \"trigger\": \"enable\"}}]}}.\n\
             3. Call the enabled tools to do the work.\n\
             4. Disable tools that are no longer needed with the same `{trigger}` call \
             and \"trigger\": \"disable\"."
        )
    }
}

impl PromptDefinition for DiscoverToolsPrompt {
    const NAME: &'static str = "discover_tools";
    const DESCRIPTION: &'static str =
        "Guide for finding and enabling the tools needed for a task";

    fn arguments() -> Vec<PromptArgument> {
        vec![PromptArgument {
            name: "goal".to_string(),
            title: None,
            description: Some("What you are trying to accomplish".to_string()),
            required: Some(true),
        }]
    }
}

#[async_trait]
impl PromptHandler for DiscoverToolsPrompt {
    async fn get(&self, arguments: HashMap<String, String>) -> anyhow::Result<GetPromptResult> {
        let goal = arguments.get("goal").map(String::as_str).unwrap_or_default();
        Ok(GetPromptResult {
            description: Some(Self::DESCRIPTION.to_string()),
            messages: vec![PromptMessage::new_text(
                PromptMessageRole::User,
                self.render(goal),
            )],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{DynamicDiscoveryConfig, ToolsetConfig};
    use crate::domains::tools::builtin_capabilities;
    use rmcp::model::PromptMessageContent;

    fn prompt(namespace: Option<&str>) -> DiscoverToolsPrompt {
        let tools = ToolManager::new(
            namespace.map(str::to_string),
            builtin_capabilities().unwrap(),
            ToolsetConfig::default(),
            Some(DynamicDiscoveryConfig {
                enabled: true,
                default_enabled_toolsets: Vec::new(),
            }),
        )
        .unwrap();
        DiscoverToolsPrompt::new(Arc::new(tools))
    }

    fn text(result: &GetPromptResult) -> String {
        match &result.messages[0].content {
            PromptMessageContent::Text { text } => text.clone(),
            _ => panic!("Expected text content"),
        }
    }

    #[test]
    fn test_metadata() {
        assert_eq!(DiscoverToolsPrompt::NAME, "discover_tools");
        let args = DiscoverToolsPrompt::arguments();
        assert_eq!(args[0].name, "goal");
        assert_eq!(args[0].required, Some(true));
    }

    #[tokio::test]
    async fn test_render_names_meta_tools() {
        let args = HashMap::from([("goal".to_string(), "count things".to_string())]);
        let result = prompt(None).get(args).await.unwrap();
        let text = text(&result);

        assert!(text.contains("count things"));
        assert!(text.contains("`dynamic_tool_list`"));
        assert!(text.contains("`dynamic_tool_trigger`"));
    }

    #[tokio::test]
    async fn test_render_uses_namespace() {
        let args = HashMap::from([("goal".to_string(), "x".to_string())]);
        let result = prompt(Some("acme")).get(args).await.unwrap();

        assert!(text(&result).contains("`acme__dynamic_tool_list`"));
    }
}
