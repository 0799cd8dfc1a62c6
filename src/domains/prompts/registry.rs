//! Prompt Registry - central registration of all prompts.
//!
//! When adding a new prompt:
//! 1. Create the prompt file in `definitions/`
//! 2. Export it in `definitions/mod.rs`
//! 3. Register it here in `builtin_prompts()`

use std::sync::Arc;

use super::definitions::{DiscoverToolsPrompt, PromptDefinition};
use super::handlers::PromptCapability;
use crate::domains::tools::ToolManager;

/// Get all built-in prompts.
///
/// The discovery guide only makes sense when the meta-tools are registered,
/// so it is left out otherwise.
pub fn builtin_prompts(tools: Arc<ToolManager>) -> Vec<PromptCapability> {
    let mut prompts = Vec::new();
    if tools.dynamic_discovery_enabled() {
        prompts.push(DiscoverToolsPrompt::new(tools).into_capability());
    }
    prompts
}

/// Get the list of all built-in prompt names.
pub fn prompt_names() -> Vec<&'static str> {
    vec![DiscoverToolsPrompt::NAME]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{DynamicDiscoveryConfig, ToolsConfig};
    use crate::domains::tools::builtin_capabilities;

    fn tools(discovery: bool) -> Arc<ToolManager> {
        let config = ToolsConfig {
            dynamic_discovery: DynamicDiscoveryConfig {
                enabled: discovery,
                default_enabled_toolsets: Vec::new(),
            },
            ..ToolsConfig::default()
        };
        Arc::new(ToolManager::from_config(&config, builtin_capabilities().unwrap()).unwrap())
    }

    #[test]
    fn test_builtin_prompts_with_discovery() {
        let prompts = builtin_prompts(tools(true));
        let names: Vec<&str> = prompts.iter().map(|p| p.name()).collect();
        assert_eq!(names, prompt_names());
    }

    #[test]
    fn test_builtin_prompts_without_discovery() {
        assert!(builtin_prompts(tools(false)).is_empty());
    }
}
