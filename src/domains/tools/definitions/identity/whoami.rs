//! Who-am-I tool definition.
//!
//! Reports the caller's identity as the server sees it. Only callers holding
//! the `profile:read` scope can see this tool.

use rmcp::model::{CallToolResult, Content};
use serde_json::json;
use tracing::{info, instrument};

use crate::core::auth::AuthInfo;
use crate::domains::tools::{
    ToolCapability, ToolDefinition, ToolError, annotations, enablement_fn, handler_fn,
};

/// Who-am-I tool - describes the authenticated caller.
pub struct WhoAmITool;

impl WhoAmITool {
    pub const NAME: &'static str = "whoami";

    pub const DESCRIPTION: &'static str =
        "Describes the calling client: its client id, granted scopes and identity claims.";

    /// Scope required to see the tool.
    pub const REQUIRED_SCOPE: &'static str = "profile:read";

    /// Render the caller's identity. The token itself is never included.
    #[instrument(skip_all)]
    pub fn execute(auth: &AuthInfo) -> CallToolResult {
        info!("Who-am-I tool called by client: {:?}", auth.client_id);

        let body = json!({
            "authenticated": auth.is_authenticated(),
            "clientId": auth.client_id,
            "scopes": auth.scopes,
            "claims": auth.extra,
        });

        match serde_json::to_string_pretty(&body) {
            Ok(text) => CallToolResult::success(vec![Content::text(text)]),
            Err(e) => CallToolResult::error(vec![Content::text(format!(
                "Failed to render identity: {}",
                e
            ))]),
        }
    }

    pub fn definition() -> Result<ToolDefinition, ToolError> {
        Ok(ToolDefinition::without_params(Self::NAME, Self::DESCRIPTION)?
            .with_annotations(annotations("Who Am I", true, false, true, false)))
    }

    pub fn capability() -> Result<ToolCapability, ToolError> {
        Ok(ToolCapability::new(
            Self::definition()?,
            handler_fn(|_arguments, ctx| async move { anyhow::Ok(Self::execute(&ctx.auth)) }),
        )
        .with_enablement(enablement_fn(|auth: AuthInfo| async move {
            anyhow::Ok(auth.has_scope(Self::REQUIRED_SCOPE))
        })))
    }
}
