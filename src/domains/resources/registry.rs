//! Resource Registry - central registration of all resources.
//!
//! When adding a new resource:
//! 1. Create the resource file in `definitions/`
//! 2. Export it in `definitions/mod.rs`
//! 3. Register it here in `builtin_resources()`

use std::sync::Arc;

use super::definitions::{ResourceDefinition, ServerInfoResource};
use super::handlers::ResourceCapability;
use crate::core::config::Config;
use crate::domains::tools::ToolManager;

/// Get all built-in resources.
///
/// This is the central place where all resources are registered.
pub fn builtin_resources(config: Arc<Config>, tools: Arc<ToolManager>) -> Vec<ResourceCapability> {
    vec![ServerInfoResource::new(config, tools).into_capability()]
}

/// Get the list of all built-in resource URIs.
pub fn resource_uris() -> Vec<&'static str> {
    vec![ServerInfoResource::URI]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::builtin_capabilities;

    #[test]
    fn test_builtin_resources() {
        let config = Arc::new(Config::default());
        let tools = Arc::new(
            ToolManager::from_config(&config.tools, builtin_capabilities().unwrap()).unwrap(),
        );
        let resources = builtin_resources(config, tools);

        let uris: Vec<&str> = resources.iter().map(|r| r.uri()).collect();
        assert_eq!(uris, resource_uris());
    }
}
