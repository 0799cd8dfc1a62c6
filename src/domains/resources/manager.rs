//! Resource manager implementation.
//!
//! The ResourceManager keeps the resource catalog and the set of enabled
//! URIs, and routes read requests to the matching handler. Every resource
//! starts enabled.

use rmcp::{
    ErrorData as McpError,
    model::{ReadResourceResult, Resource},
};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use tracing::{error, info, instrument, warn};

use super::error::ResourceError;
use super::handlers::ResourceCapability;

/// Catalog and enabled set of the server's resources.
pub struct ResourceManager {
    catalog: HashMap<String, ResourceCapability>,
    order: Vec<String>,
    enabled: RwLock<HashSet<String>>,
}

impl ResourceManager {
    pub fn new(capabilities: Vec<ResourceCapability>) -> Self {
        let mut catalog = HashMap::new();
        let mut order = Vec::new();

        for capability in capabilities {
            let uri = capability.uri().to_string();
            info!("Registering resource: {}", uri);
            if catalog.insert(uri.clone(), capability).is_some() {
                warn!("Duplicate resource {}, keeping the last one", uri);
            } else {
                order.push(uri);
            }
        }

        let enabled = order.iter().cloned().collect();
        Self {
            catalog,
            order,
            enabled: RwLock::new(enabled),
        }
    }

    pub fn has_resources(&self) -> bool {
        !self.catalog.is_empty()
    }

    /// The enabled resources, in registration order.
    pub async fn list_resources(&self) -> Vec<Resource> {
        let enabled = self.enabled.read().await;
        self.order
            .iter()
            .filter(|uri| enabled.contains(*uri))
            .filter_map(|uri| self.catalog.get(uri))
            .map(|capability| capability.resource().clone())
            .collect()
    }

    /// Read a resource by URI.
    #[instrument(skip(self))]
    pub async fn read_resource(&self, uri: &str) -> Result<ReadResourceResult, ResourceError> {
        let capability = self
            .catalog
            .get(uri)
            .ok_or_else(|| ResourceError::unknown(uri))?;

        if !self.enabled.read().await.contains(uri) {
            return Err(ResourceError::not_enabled(uri));
        }

        capability
            .handler()
            .read(uri)
            .await
            .map_err(|err| match err.downcast::<McpError>() {
                Ok(mcp) => ResourceError::Protocol(mcp),
                Err(err) => {
                    error!("Resource handler failed for {}: {:#}", uri, err);
                    ResourceError::Handler(err.to_string())
                }
            })
    }

    /// Enable or disable a resource.
    pub async fn set_enabled(&self, uri: &str, enabled: bool) -> Result<(), ResourceError> {
        if !self.catalog.contains_key(uri) {
            return Err(ResourceError::unknown(uri));
        }

        let mut set = self.enabled.write().await;
        if enabled {
            set.insert(uri.to_string());
        } else {
            set.remove(uri);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::resources::handlers::{ResourceHandler, StaticText};
    use rmcp::model::{ErrorCode, ResourceContents};

    struct Failing;

    #[async_trait::async_trait]
    impl ResourceHandler for Failing {
        async fn read(&self, _uri: &str) -> anyhow::Result<ReadResourceResult> {
            Err(anyhow::anyhow!("backend unavailable"))
        }
    }

    fn manager() -> ResourceManager {
        ResourceManager::new(vec![
            ResourceCapability::build(
                "mcp://test/b",
                "B",
                "Second",
                "text/plain",
                StaticText("bee".into()),
            ),
            ResourceCapability::build(
                "mcp://test/a",
                "A",
                "First",
                "text/plain",
                StaticText("ay".into()),
            ),
            ResourceCapability::build("mcp://test/broken", "Broken", "Fails", "text/plain", Failing),
        ])
    }

    #[tokio::test]
    async fn test_list_in_registration_order() {
        let manager = manager();
        assert!(manager.has_resources());

        let uris: Vec<String> = manager
            .list_resources()
            .await
            .iter()
            .map(|r| r.raw.uri.clone())
            .collect();
        assert_eq!(uris, vec!["mcp://test/b", "mcp://test/a", "mcp://test/broken"]);
    }

    #[tokio::test]
    async fn test_read_existing_resource() {
        let result = manager().read_resource("mcp://test/a").await.unwrap();
        match &result.contents[0] {
            ResourceContents::TextResourceContents { text, .. } => assert_eq!(text, "ay"),
            _ => panic!("Expected text contents"),
        }
    }

    #[tokio::test]
    async fn test_unknown_and_disabled() {
        let manager = manager();

        let err: McpError = manager
            .read_resource("mcp://test/missing")
            .await
            .unwrap_err()
            .into();
        assert_eq!(err.code, ErrorCode::METHOD_NOT_FOUND);
        assert_eq!(err.message, "Unknown resource: mcp://test/missing");

        manager.set_enabled("mcp://test/a", false).await.unwrap();
        assert_eq!(manager.list_resources().await.len(), 2);

        let err: McpError = manager
            .read_resource("mcp://test/a")
            .await
            .unwrap_err()
            .into();
        assert_eq!(err.message, "Resource not enabled: mcp://test/a");

        assert!(manager.set_enabled("mcp://test/missing", true).await.is_err());
    }

    #[tokio::test]
    async fn test_handler_failure() {
        let err = manager()
            .read_resource("mcp://test/broken")
            .await
            .unwrap_err();
        assert!(matches!(err, ResourceError::Handler(_)));
    }

    #[tokio::test]
    async fn test_empty_manager() {
        let manager = ResourceManager::new(vec![]);
        assert!(!manager.has_resources());
        assert!(manager.list_resources().await.is_empty());
    }
}
