//! Echo tool definition.

use rmcp::model::{CallToolResult, Content};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::domains::tools::{
    ToolCapability, ToolDefinition, ToolError, annotations, handler_fn, parse_params,
};

/// Parameters for the echo tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct EchoParams {
    /// Text to send back.
    pub message: String,

    /// Upper-case the text before returning it.
    #[serde(default)]
    pub uppercase: bool,
}

/// Echo tool - returns the message it was given.
pub struct EchoTool;

impl EchoTool {
    pub const NAME: &'static str = "echo";

    pub const DESCRIPTION: &'static str =
        "Echoes the given message back, optionally upper-cased. Useful for checking that a tool is enabled and callable.";

    #[instrument(skip_all, fields(len = params.message.len()))]
    pub fn execute(params: &EchoParams) -> CallToolResult {
        debug!("Echo tool called");

        let text = if params.uppercase {
            params.message.to_uppercase()
        } else {
            params.message.clone()
        };

        CallToolResult::success(vec![Content::text(text)])
    }

    pub fn definition() -> Result<ToolDefinition, ToolError> {
        Ok(
            ToolDefinition::for_params::<EchoParams>(Self::NAME, Self::DESCRIPTION)?
                .with_annotations(annotations("Echo", true, false, true, false)),
        )
    }

    pub fn capability() -> Result<ToolCapability, ToolError> {
        Ok(ToolCapability::new(
            Self::definition()?,
            handler_fn(|arguments, _ctx| async move {
                let params: EchoParams = parse_params(arguments)?;
                anyhow::Ok(Self::execute(&params))
            }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_echo() {
        let params = EchoParams {
            message: "Hello".to_string(),
            uppercase: false,
        };
        let result = EchoTool::execute(&params);
        let text = match &result.content[0].raw {
            rmcp::model::RawContent::Text(text) => &text.text,
            _ => panic!("Expected text content"),
        };
        assert_eq!(text, "Hello");
    }

    #[test]
    fn test_echo_uppercase() {
        let params: EchoParams =
            serde_json::from_value(json!({"message": "quiet", "uppercase": true})).unwrap();
        let result = EchoTool::execute(&params);
        let text = match &result.content[0].raw {
            rmcp::model::RawContent::Text(text) => &text.text,
            _ => panic!("Expected text content"),
        };
        assert_eq!(text, "QUIET");
    }

    #[test]
    fn test_schema_requires_message() {
        let definition = EchoTool::definition().unwrap();
        let schema = definition.input_schema();
        assert!(schema.validate(&json!({"message": "x"})).is_ok());
        assert!(schema.validate(&json!({"uppercase": true})).is_err());
    }
}
