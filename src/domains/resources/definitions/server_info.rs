//! Server info resource definition.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rmcp::model::{ReadResourceResult, ResourceContents};
use std::sync::Arc;

use super::ResourceDefinition;
use crate::core::config::Config;
use crate::domains::resources::handlers::ResourceHandler;
use crate::domains::tools::ToolManager;

/// Server information resource (dynamic).
///
/// Reports identity and the live state of the tool registry.
pub struct ServerInfoResource {
    config: Arc<Config>,
    tools: Arc<ToolManager>,
    started_at: DateTime<Utc>,
}

impl ServerInfoResource {
    pub fn new(config: Arc<Config>, tools: Arc<ToolManager>) -> Self {
        Self {
            config,
            tools,
            started_at: Utc::now(),
        }
    }

    async fn snapshot(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.config.server.name,
            "version": self.config.server.version,
            "namespace": self.tools.namespace(),
            "toolsetMode": self.config.tools.toolset.mode.as_str(),
            "dynamicDiscovery": self.tools.dynamic_discovery_enabled(),
            "enabledTools": self.tools.enabled_tools().await,
            "startedAt": self.started_at.to_rfc3339(),
        })
    }
}

impl ResourceDefinition for ServerInfoResource {
    const URI: &'static str = "mcp://server/info";
    const NAME: &'static str = "Server Information";
    const DESCRIPTION: &'static str =
        "Information about this MCP server and the current state of its tool registry";
    const MIME_TYPE: &'static str = "application/json";
}

#[async_trait]
impl ResourceHandler for ServerInfoResource {
    async fn read(&self, uri: &str) -> anyhow::Result<ReadResourceResult> {
        let text = serde_json::to_string_pretty(&self.snapshot().await)?;
        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(text, uri)],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::builtin_capabilities;

    fn resource() -> ServerInfoResource {
        let config = Arc::new(Config::default());
        let tools = Arc::new(
            ToolManager::from_config(&config.tools, builtin_capabilities().unwrap()).unwrap(),
        );
        ServerInfoResource::new(config, tools)
    }

    #[test]
    fn test_server_info_metadata() {
        assert_eq!(ServerInfoResource::URI, "mcp://server/info");
        assert_eq!(ServerInfoResource::MIME_TYPE, "application/json");
    }

    #[tokio::test]
    async fn test_server_info_read() {
        let result = resource().read(ServerInfoResource::URI).await.unwrap();
        let text = match &result.contents[0] {
            ResourceContents::TextResourceContents { text, .. } => text.clone(),
            _ => panic!("Expected text contents"),
        };
        let body: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(body["name"], "dynamic-tool-mcp");
        assert_eq!(body["toolsetMode"], "readOnly");
        assert_eq!(body["dynamicDiscovery"], false);
        assert!(
            body["enabledTools"]
                .as_array()
                .unwrap()
                .contains(&serde_json::json!("hello_world"))
        );
    }
}
