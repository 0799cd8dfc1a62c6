//! Tool Registry - the built-in tool catalog.
//!
//! This module provides:
//! - The list of built-in tool names
//! - The capabilities handed to [`ToolManager`](super::ToolManager) at startup

use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use super::capability::ToolCapability;
use super::definitions::{CounterIncrementTool, EchoTool, HelloWorldTool, WhoAmITool};
use super::error::ToolError;

// ============================================================================
// Tool Registry
// ============================================================================

/// Built-in tools and the state they share.
#[derive(Debug, Default, Clone)]
pub struct ToolRegistry {
    counter: Arc<AtomicU64>,
}

impl ToolRegistry {
    /// Create a new tool registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all built-in tool names.
    pub fn tool_names() -> Vec<&'static str> {
        vec![
            HelloWorldTool::NAME,
            EchoTool::NAME,
            CounterIncrementTool::NAME,
            WhoAmITool::NAME,
        ]
    }

    /// Build the capabilities for every built-in tool.
    ///
    /// Capabilities from one registry share its counter.
    pub fn capabilities(&self) -> Result<Vec<ToolCapability>, ToolError> {
        Ok(vec![
            HelloWorldTool::capability()?,
            EchoTool::capability()?,
            CounterIncrementTool::capability(self.counter.clone())?,
            WhoAmITool::capability()?,
        ])
    }
}

/// Capabilities of the built-in tools, backed by a fresh registry.
pub fn builtin_capabilities() -> Result<Vec<ToolCapability>, ToolError> {
    ToolRegistry::new().capabilities()
}
