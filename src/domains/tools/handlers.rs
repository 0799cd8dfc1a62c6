//! Tool handler contracts.
//!
//! A tool is executed by a [`ToolHandler`] and, optionally, gated per caller
//! by an [`EnablementCheck`]. Both are async traits so implementations can
//! reach out to databases or identity providers. The [`handler_fn`] and
//! [`enablement_fn`] adapters cover the common case of a plain async closure.

use rmcp::{
    ErrorData as McpError, Peer, RoleServer,
    model::{
        CallToolResult, JsonObject, LoggingLevel, LoggingMessageNotificationParam,
        ProgressNotificationParam,
    },
};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::core::auth::AuthInfo;

// ============================================================================
// Call context
// ============================================================================

/// Rank of a level, lowest for `debug`.
fn severity(level: LoggingLevel) -> u8 {
    level as u8
}

/// The raw `tools/call` request as received from the client.
#[derive(Debug, Clone, Default)]
pub struct CallRequest {
    /// External (possibly namespaced) tool name.
    pub name: String,
    pub arguments: Option<JsonObject>,
    /// Request `_meta`, e.g. a `progressToken`.
    pub meta: JsonObject,
}

/// Everything a handler knows about the call it is serving.
#[derive(Clone)]
pub struct CallContext {
    pub request: CallRequest,
    pub session_id: String,
    pub auth: AuthInfo,
    /// Set when the client cancels the request. Handlers may ignore it.
    pub cancellation: CancellationToken,
    /// Connected peer, when the transport has one.
    pub notifier: Option<Peer<RoleServer>>,
    /// Minimum level set by `logging/setLevel`; `None` forwards everything.
    pub min_log_level: Option<LoggingLevel>,
}

impl std::fmt::Debug for CallContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallContext")
            .field("request", &self.request)
            .field("session_id", &self.session_id)
            .field("auth", &self.auth)
            .field("cancelled", &self.cancellation.is_cancelled())
            .field("has_peer", &self.notifier.is_some())
            .field("min_log_level", &self.min_log_level)
            .finish()
    }
}

impl CallContext {
    pub fn new(request: CallRequest, auth: AuthInfo) -> Self {
        Self {
            request,
            session_id: String::new(),
            auth,
            cancellation: CancellationToken::new(),
            notifier: None,
            min_log_level: None,
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn with_peer(mut self, peer: Peer<RoleServer>) -> Self {
        self.notifier = Some(peer);
        self
    }

    pub fn with_log_level(mut self, level: Option<LoggingLevel>) -> Self {
        self.min_log_level = level;
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Whether a message at `level` passes the client's minimum level.
    pub fn wants_log(&self, level: LoggingLevel) -> bool {
        self.min_log_level
            .is_none_or(|min| severity(level) >= severity(min))
    }

    /// Send a `notifications/message` to the client, if one is connected
    /// and `level` is at or above the level it asked for.
    pub async fn send_log(&self, level: LoggingLevel, data: Value) {
        if !self.wants_log(level) {
            debug!("Dropping {:?} log notification below client level", level);
            return;
        }
        let Some(peer) = &self.notifier else {
            debug!("No peer attached, dropping log notification");
            return;
        };
        let param = LoggingMessageNotificationParam {
            level,
            logger: Some("tools".to_string()),
            data,
        };
        if let Err(e) = peer.notify_logging_message(param).await {
            warn!("Failed to send log notification: {}", e);
        }
    }

    /// Report progress, if the client asked for it with a `progressToken`.
    pub async fn send_progress(&self, progress: f64, total: Option<f64>, message: Option<&str>) {
        let (Some(peer), Some(token)) = (&self.notifier, self.request.meta.get("progressToken"))
        else {
            return;
        };

        let param = json!({
            "progressToken": token,
            "progress": progress,
            "total": total,
            "message": message,
        });
        match serde_json::from_value::<ProgressNotificationParam>(param) {
            Ok(param) => {
                if let Err(e) = peer.notify_progress(param).await {
                    warn!("Failed to send progress notification: {}", e);
                }
            }
            Err(e) => warn!("Invalid progress notification: {}", e),
        }
    }
}

// ============================================================================
// Handler traits
// ============================================================================

/// Executes a tool.
///
/// Return an [`McpError`] (wrapped in `anyhow`) to reject the call with a
/// specific protocol error; any other error is reported as a handler failure.
#[async_trait::async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, arguments: JsonObject, ctx: CallContext) -> anyhow::Result<CallToolResult>;
}

/// Decides whether a tool is visible and callable for a caller.
///
/// Evaluated on every `tools/list`. An error hides the tool.
#[async_trait::async_trait]
pub trait EnablementCheck: Send + Sync {
    async fn can_be_enabled(&self, auth: &AuthInfo) -> anyhow::Result<bool>;
}

/// [`ToolHandler`] backed by an async closure.
pub struct FnHandler<F>(F);

#[async_trait::async_trait]
impl<F, Fut> ToolHandler for FnHandler<F>
where
    F: Fn(JsonObject, CallContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<CallToolResult>> + Send + 'static,
{
    async fn call(&self, arguments: JsonObject, ctx: CallContext) -> anyhow::Result<CallToolResult> {
        (self.0)(arguments, ctx).await
    }
}

/// Wrap an async closure as a [`ToolHandler`].
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(JsonObject, CallContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<CallToolResult>> + Send + 'static,
{
    FnHandler(f)
}

/// [`EnablementCheck`] backed by an async closure.
pub struct FnCheck<F>(F);

#[async_trait::async_trait]
impl<F, Fut> EnablementCheck for FnCheck<F>
where
    F: Fn(AuthInfo) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<bool>> + Send + 'static,
{
    async fn can_be_enabled(&self, auth: &AuthInfo) -> anyhow::Result<bool> {
        (self.0)(auth.clone()).await
    }
}

/// Wrap an async closure as an [`EnablementCheck`].
pub fn enablement_fn<F, Fut>(f: F) -> FnCheck<F>
where
    F: Fn(AuthInfo) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<bool>> + Send + 'static,
{
    FnCheck(f)
}

/// Deserialize validated arguments into a typed parameter struct.
///
/// Failures surface to the client as `INVALID_PARAMS`.
pub fn parse_params<P: DeserializeOwned>(arguments: JsonObject) -> anyhow::Result<P> {
    serde_json::from_value(Value::Object(arguments))
        .map_err(|e| McpError::invalid_params(e.to_string(), None).into())
}
