//! Discovery meta-tools.
//!
//! With dynamic discovery on, the registry exposes two tools of its own:
//! `dynamic_tool_list` reports which tools exist and which are enabled, and
//! `dynamic_tool_trigger` flips tools on and off. Neither can be toggled.

use rmcp::model::JsonObject;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::definition::{ToolDefinition, annotations};
use super::error::ToolError;
use super::schema::InputSchema;

pub const DYNAMIC_TOOL_LIST: &str = "dynamic_tool_list";
pub const DYNAMIC_TOOL_TRIGGER: &str = "dynamic_tool_trigger";

const LIST_DESCRIPTION: &str = "Lists every tool this server can expose and the ones that are enabled right now. \
Call it before enabling or disabling anything so you work with current tool names. \
The result has two arrays: 'available' holds every tool that can be toggled, 'enabled' holds the tools that are callable now. \
The discovery tools themselves never appear in either array.";

const TRIGGER_DESCRIPTION: &str = "Enables or disables tools on this server. \
Pass 'toolsets', a list of entries that each carry a 'name' exactly as reported by dynamic_tool_list and a 'trigger' of 'enable' or 'disable'. \
Either every entry is applied or none is. \
The response has the same shape as dynamic_tool_list and reflects the new state. \
The discovery tools themselves cannot be toggled and are rejected as names.";

/// Whether `name` is one of the registry's own tools.
pub fn is_meta_tool(name: &str) -> bool {
    name == DYNAMIC_TOOL_LIST || name == DYNAMIC_TOOL_TRIGGER
}

pub fn list_definition() -> Result<ToolDefinition, ToolError> {
    Ok(
        ToolDefinition::without_params(DYNAMIC_TOOL_LIST, LIST_DESCRIPTION)?.with_annotations(
            annotations("Dynamic Tool Discovery", true, false, true, false),
        ),
    )
}

pub fn trigger_definition() -> Result<ToolDefinition, ToolError> {
    let schema = InputSchema::from_value(json!({
        "type": "object",
        "properties": {
            "toolsets": {
                "type": "array",
                "description": "Tools to enable or disable, applied in order.",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": {
                            "type": "string",
                            "description": "Tool name as reported by dynamic_tool_list."
                        },
                        "trigger": {
                            "type": "string",
                            "enum": ["enable", "disable"]
                        }
                    },
                    "required": ["name", "trigger"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["toolsets"]
    }))?;

    Ok(
        ToolDefinition::new(DYNAMIC_TOOL_TRIGGER, TRIGGER_DESCRIPTION, schema)?.with_annotations(
            annotations("Dynamic Tool Trigger", false, false, true, false),
        ),
    )
}

/// Requested state change for one tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    Enable,
    Disable,
}

/// One entry of a `dynamic_tool_trigger` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolsetTrigger {
    /// External tool name.
    pub name: String,
    pub trigger: Trigger,
}

/// Arguments of `dynamic_tool_trigger`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TriggerParams {
    pub toolsets: Vec<ToolsetTrigger>,
}

impl TriggerParams {
    pub fn from_arguments(arguments: JsonObject) -> Result<Self, ToolError> {
        serde_json::from_value(serde_json::Value::Object(arguments))
            .map_err(|e| ToolError::invalid_parameters(e.to_string()))
    }
}

/// Name and description of a tool as shown by the discovery tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSummary {
    pub name: String,
    pub description: String,
}

/// Response body of both discovery tools.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryPayload {
    pub available: Vec<ToolSummary>,
    pub enabled: Vec<ToolSummary>,
}
