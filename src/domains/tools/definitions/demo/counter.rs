//! Counter tool definition.
//!
//! The one mutating demo tool. A read-only toolset never enables it, which
//! makes it the natural target for `dynamic_tool_trigger`.

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{info, instrument, warn};

use crate::domains::tools::{
    ToolCapability, ToolDefinition, ToolError, annotations, handler_fn, parse_params,
};

fn default_step() -> u64 {
    1
}

/// Parameters for the counter tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CounterIncrementParams {
    /// Amount to add. Defaults to 1.
    #[serde(default = "default_step")]
    #[schemars(range(min = 1))]
    pub by: u64,
}

/// Counter tool - adds to an in-memory counter and returns the new value.
pub struct CounterIncrementTool;

impl CounterIncrementTool {
    pub const NAME: &'static str = "counter_increment";

    pub const DESCRIPTION: &'static str =
        "Increments a server-side counter and returns its new value. The counter lives in memory and resets when the server restarts.";

    /// Add `params.by` to `counter`.
    ///
    /// An increment that would overflow is rejected and leaves the counter
    /// untouched.
    #[instrument(skip_all, fields(by = params.by))]
    pub fn execute(
        params: &CounterIncrementParams,
        counter: &AtomicU64,
    ) -> Result<CallToolResult, McpError> {
        let previous = counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| v.checked_add(params.by))
            .map_err(|current| {
                warn!("Counter at {} cannot grow by {}", current, params.by);
                McpError::invalid_params("Counter would overflow", None)
            })?;
        let value = previous + params.by;

        info!("Counter incremented to {}", value);

        Ok(CallToolResult::success(vec![Content::text(
            json!({ "value": value, "incrementedBy": params.by }).to_string(),
        )]))
    }

    pub fn definition() -> Result<ToolDefinition, ToolError> {
        Ok(
            ToolDefinition::for_params::<CounterIncrementParams>(Self::NAME, Self::DESCRIPTION)?
                .with_annotations(annotations("Increment Counter", false, false, false, false)),
        )
    }

    /// Create the registry capability, sharing `counter` across calls.
    pub fn capability(counter: Arc<AtomicU64>) -> Result<ToolCapability, ToolError> {
        Ok(ToolCapability::new(
            Self::definition()?,
            handler_fn(move |arguments, _ctx| {
                let counter = counter.clone();
                async move {
                    let params: CounterIncrementParams = parse_params(arguments)?;
                    anyhow::Ok(Self::execute(&params, &counter)?)
                }
            }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(result: &CallToolResult) -> u64 {
        let text = match &result.content[0].raw {
            rmcp::model::RawContent::Text(text) => &text.text,
            _ => panic!("Expected text content"),
        };
        let body: serde_json::Value = serde_json::from_str(text).unwrap();
        body["value"].as_u64().unwrap()
    }

    #[test]
    fn test_increment() {
        let counter = AtomicU64::new(0);
        let one = CounterIncrementParams { by: 1 };
        let five = CounterIncrementParams { by: 5 };

        assert_eq!(value(&CounterIncrementTool::execute(&one, &counter).unwrap()), 1);
        assert_eq!(value(&CounterIncrementTool::execute(&five, &counter).unwrap()), 6);
        assert_eq!(counter.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn test_overflow_is_rejected() {
        let counter = AtomicU64::new(u64::MAX - 1);
        let one = CounterIncrementParams { by: 1 };

        assert_eq!(
            value(&CounterIncrementTool::execute(&one, &counter).unwrap()),
            u64::MAX
        );

        let err = CounterIncrementTool::execute(&one, &counter).unwrap_err();
        assert_eq!(err.code, rmcp::model::ErrorCode::INVALID_PARAMS);
        assert_eq!(err.message, "Counter would overflow");
        assert_eq!(counter.load(Ordering::SeqCst), u64::MAX);
    }

    #[test]
    fn test_default_step() {
        let params: CounterIncrementParams = serde_json::from_value(json!({})).unwrap();
        assert_eq!(params.by, 1);
    }

    #[test]
    fn test_definition_is_not_read_only() {
        let definition = CounterIncrementTool::definition().unwrap();
        assert!(!definition.is_read_only());
        assert!(
            definition
                .input_schema()
                .validate(&json!({"by": 0}))
                .is_err()
        );
    }
}
