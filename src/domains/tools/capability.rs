//! A tool definition bound to its handler and optional authorization gate.

use std::sync::Arc;

use super::definition::ToolDefinition;
use super::handlers::{EnablementCheck, ToolHandler};

/// Everything the registry needs to list, gate and execute one tool.
#[derive(Clone)]
pub struct ToolCapability {
    definition: ToolDefinition,
    handler: Arc<dyn ToolHandler>,
    enablement: Option<Arc<dyn EnablementCheck>>,
}

impl ToolCapability {
    pub fn new(definition: ToolDefinition, handler: impl ToolHandler + 'static) -> Self {
        Self {
            definition,
            handler: Arc::new(handler),
            enablement: None,
        }
    }

    /// Only show the tool to callers the check admits.
    pub fn with_enablement(mut self, check: impl EnablementCheck + 'static) -> Self {
        self.enablement = Some(Arc::new(check));
        self
    }

    pub fn name(&self) -> &str {
        self.definition.name()
    }

    pub fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    pub fn handler(&self) -> &Arc<dyn ToolHandler> {
        &self.handler
    }

    pub fn enablement(&self) -> Option<&Arc<dyn EnablementCheck>> {
        self.enablement.as_ref()
    }
}

impl std::fmt::Debug for ToolCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolCapability")
            .field("definition", &self.definition)
            .field("gated", &self.enablement.is_some())
            .finish()
    }
}
