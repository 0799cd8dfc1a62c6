//! Resource handlers module.
//!
//! This module contains the trait implemented by resource content providers
//! and the capability that binds one to its advertised metadata.

use async_trait::async_trait;
use rmcp::model::{AnnotateAble, RawResource, ReadResourceResult, Resource, ResourceContents};
use std::sync::Arc;

/// Trait for implementing resource content providers.
///
/// Return an `rmcp::ErrorData` (wrapped in `anyhow`) to reject a read with a
/// specific protocol error.
#[async_trait]
pub trait ResourceHandler: Send + Sync {
    /// Read the content of the resource at `uri`.
    async fn read(&self, uri: &str) -> anyhow::Result<ReadResourceResult>;
}

/// A handler serving fixed text.
#[derive(Debug, Clone)]
pub struct StaticText(pub String);

#[async_trait]
impl ResourceHandler for StaticText {
    async fn read(&self, uri: &str) -> anyhow::Result<ReadResourceResult> {
        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(self.0.clone(), uri)],
        })
    }
}

/// A resource's metadata bound to its content provider.
#[derive(Clone)]
pub struct ResourceCapability {
    resource: Resource,
    handler: Arc<dyn ResourceHandler>,
}

impl ResourceCapability {
    pub fn new(resource: Resource, handler: impl ResourceHandler + 'static) -> Self {
        Self {
            resource,
            handler: Arc::new(handler),
        }
    }

    /// Build the resource metadata from its parts.
    pub fn build(
        uri: &str,
        name: &str,
        description: &str,
        mime_type: &str,
        handler: impl ResourceHandler + 'static,
    ) -> Self {
        let mut raw = RawResource::new(uri, name);
        raw.description = Some(description.to_string());
        raw.mime_type = Some(mime_type.to_string());
        Self::new(raw.no_annotation(), handler)
    }

    pub fn uri(&self) -> &str {
        &self.resource.raw.uri
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn handler(&self) -> &Arc<dyn ResourceHandler> {
        &self.handler
    }
}

impl std::fmt::Debug for ResourceCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceCapability")
            .field("uri", &self.uri())
            .finish()
    }
}
