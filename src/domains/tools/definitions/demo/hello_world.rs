//! Hello world tool definition.
//!
//! The smallest possible read-only tool: greets the caller.

use rmcp::model::{CallToolResult, Content};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::domains::tools::{
    ToolCapability, ToolDefinition, ToolError, annotations, handler_fn, parse_params,
};

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the hello world tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct HelloWorldParams {
    /// Who to greet. Defaults to "World".
    #[serde(default)]
    pub name: Option<String>,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Hello world tool - returns a greeting.
pub struct HelloWorldTool;

impl HelloWorldTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "hello_world";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Returns a friendly greeting. Optionally pass a name to greet someone specific.";

    /// Execute the tool logic.
    #[instrument(skip_all)]
    pub fn execute(params: &HelloWorldParams) -> CallToolResult {
        let name = params
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or("World");

        info!("Hello world tool called for: {}", name);

        CallToolResult::success(vec![Content::text(format!("Hello {}!", name))])
    }

    pub fn definition() -> Result<ToolDefinition, ToolError> {
        Ok(
            ToolDefinition::for_params::<HelloWorldParams>(Self::NAME, Self::DESCRIPTION)?
                .with_annotations(annotations("Hello World", true, false, true, false)),
        )
    }

    /// Create the registry capability for this tool.
    pub fn capability() -> Result<ToolCapability, ToolError> {
        Ok(ToolCapability::new(
            Self::definition()?,
            handler_fn(|arguments, _ctx| async move {
                let params: HelloWorldParams = parse_params(arguments)?;
                anyhow::Ok(Self::execute(&params))
            }),
        ))
    }
}

// ============================================================================
// Tests
// ============================================================================
