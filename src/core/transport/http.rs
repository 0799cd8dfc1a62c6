//! HTTP transport implementation.
//!
//! HTTP server with JSON-RPC over POST requests and a server-sent event
//! stream for notifications. This allows standard HTTP clients (curl,
//! browsers, etc.) to communicate with the MCP server.
//!
//! Each POST may carry `Authorization: Bearer <token>`, which becomes the
//! caller identity for that request. `initialize` opens a session and returns
//! its id in the `Mcp-Session-Id` header; later requests echo it back.
//! `DELETE` on the RPC path closes a session. Sessions idle past the
//! configured TTL expire, and the least recently used one is evicted when
//! the session cap is reached.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header},
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use futures::{Stream, StreamExt};
use rmcp::{
    ErrorData as McpError,
    model::{LoggingLevel, SetLevelRequestParam},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, broadcast};
use tokio_stream::wrappers::{BroadcastStream, errors::BroadcastStreamRecvError};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{debug, info, instrument, warn};

use super::{TransportConfig, TransportError, TransportResult, config::HttpConfig};
use crate::core::{AuthInfo, McpServer};
use crate::domains::tools::Subscription;

/// Header carrying the session id.
pub const SESSION_HEADER: HeaderName = HeaderName::from_static("mcp-session-id");

const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
}

/// JSON-RPC request structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// JSON-RPC response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    /// Carry an MCP error's code, message and data unchanged.
    pub fn from_mcp_error(id: Option<Value>, err: McpError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code: err.code.0,
                message: err.message.into_owned(),
                data: err.data,
            }),
        }
    }

    /// Method not found error.
    pub fn method_not_found(id: Option<Value>) -> Self {
        Self::error(id, -32601, "Method not found")
    }

    /// Invalid request error.
    pub fn invalid_request(id: Option<Value>) -> Self {
        Self::error(id, -32600, "Invalid Request")
    }

    /// Invalid params error.
    pub fn invalid_params(id: Option<Value>, msg: impl Into<String>) -> Self {
        Self::error(id, -32602, msg)
    }

    fn from_result(id: Option<Value>, result: Result<Value, McpError>) -> Self {
        match result {
            Ok(value) => Self::success(id, value),
            Err(err) => Self::from_mcp_error(id, err),
        }
    }
}

/// Application state shared across HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// The MCP server instance.
    server: McpServer,
    rpc_path: String,
    /// Open sessions, by id.
    sessions: Arc<RwLock<HashMap<String, SessionState>>>,
    /// Notifications fanned out to `/events` subscribers.
    events: broadcast::Sender<Value>,
    max_sessions: usize,
    session_ttl: Duration,
}

/// Session state for a client.
#[derive(Debug, Clone)]
struct SessionState {
    initialized: bool,
    protocol_version: String,
    /// Identity presented on `initialize`.
    auth: Option<AuthInfo>,
    /// Minimum level for log notifications to this session.
    log_level: Option<LoggingLevel>,
    created_at: DateTime<Utc>,
    last_seen: DateTime<Utc>,
}

impl AppState {
    pub fn new(server: McpServer, rpc_path: impl Into<String>) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            server,
            rpc_path: rpc_path.into(),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            events,
            max_sessions: 1024,
            session_ttl: Duration::from_secs(30 * 60),
        }
    }

    /// Cap the number of open sessions and expire idle ones after `ttl`.
    pub fn with_session_limits(mut self, max_sessions: usize, ttl: Duration) -> Self {
        self.max_sessions = max_sessions.max(1);
        self.session_ttl = ttl;
        self
    }

    fn is_expired(&self, session: &SessionState, now: DateTime<Utc>) -> bool {
        (now - session.last_seen)
            .to_std()
            .is_ok_and(|idle| idle > self.session_ttl)
    }

    /// Store a new session, dropping expired ones and evicting the least
    /// recently used while the cap is reached.
    async fn open_session(&self, id: String, session: SessionState) {
        let mut sessions = self.sessions.write().await;

        let now = session.last_seen;
        let before = sessions.len();
        sessions.retain(|_, s| !self.is_expired(s, now));
        if sessions.len() < before {
            debug!("Expired {} idle sessions", before - sessions.len());
        }

        while !sessions.contains_key(&id) && sessions.len() >= self.max_sessions {
            let Some(oldest) = sessions
                .iter()
                .min_by_key(|(_, s)| s.last_seen)
                .map(|(key, _)| key.clone())
            else {
                break;
            };
            sessions.remove(&oldest);
            info!("Session cap reached, evicted session {}", oldest);
        }

        sessions.insert(id, session);
    }

    /// Mark a session as used now and return its log level.
    ///
    /// An expired session is removed instead.
    async fn touch_session(&self, id: &str) -> Option<LoggingLevel> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(id)?;
        if self.is_expired(session, now) {
            sessions.remove(id);
            info!("Session {} expired", id);
            return None;
        }
        session.last_seen = now;
        session.log_level
    }

    /// Close a session. Returns false if it was not open.
    pub async fn close_session(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    /// Number of open sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Publish enabled-set changes on the event stream until the guard drops.
    pub fn bridge_tool_list_changed(&self) -> Subscription {
        let events = self.events.clone();
        self.server.tools().on_enabled_tools_changed(move |_| {
            // Fails only when no stream is open
            let _ = events.send(json!({
                "jsonrpc": "2.0",
                "method": "notifications/tools/list_changed",
            }));
        })
    }

    /// Identity for a request: the bearer token, else the session's, else
    /// the server's.
    async fn resolve_auth(&self, headers: &HeaderMap, session_id: Option<&str>) -> AuthInfo {
        if let Some(auth) = bearer_auth(headers) {
            return auth;
        }

        if let Some(id) = session_id {
            if let Some(auth) = self
                .sessions
                .read()
                .await
                .get(id)
                .and_then(|session| session.auth.clone())
            {
                return auth;
            }
        }

        self.server.auth().clone()
    }
}

fn bearer_auth(headers: &HeaderMap) -> Option<AuthInfo> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(AuthInfo::from_authorization_header)
}

fn session_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

impl HttpTransport {
    /// Create a new HTTP transport with the given config.
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    /// Create from TransportConfig (extracts HTTP config).
    pub fn from_transport_config(config: &TransportConfig) -> Option<Self> {
        match config {
            TransportConfig::Http(http_config) => Some(Self::new(http_config.clone())),
            _ => None,
        }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Build the router for `state`.
    pub fn router(&self, state: AppState) -> Router {
        let mut app = Router::new()
            .route(
                &self.config.rpc_path,
                post(handle_rpc).delete(handle_delete_session),
            )
            .route("/events", get(handle_events))
            .route("/health", get(health_check))
            .route("/", get(root_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http());

        if self.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers([SESSION_HEADER]);
            app = app.layer(cors);
        }

        app
    }

    /// Run the HTTP transport until Ctrl-C.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        let addr = self.address();
        let state = AppState::new(server, self.config.rpc_path.clone()).with_session_limits(
            self.config.max_sessions,
            Duration::from_secs(self.config.session_ttl_secs),
        );

        let _bridge = state.bridge_tool_list_changed();

        let app = self.router(state);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        let cors_status = if self.config.enable_cors {
            "enabled"
        } else {
            "disabled"
        };
        info!(
            "Ready - listening on {} (JSON-RPC over HTTP, CORS {})",
            addr, cors_status
        );
        info!("  → JSON-RPC: POST {}", self.config.rpc_path);
        info!("  → Close:    DELETE {}", self.config.rpc_path);
        info!("  → Events:   GET /events");
        info!("  → Health:   GET /health");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| TransportError::http(e.to_string()))?;

        info!("HTTP transport finished");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl-C, shutting down");
}

/// Root handler - provides API info.
async fn root_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "name": state.server.name(),
        "version": state.server.version(),
        "transport": "HTTP",
        "endpoints": {
            "rpc": state.rpc_path,
            "events": "/events",
            "health": "/health"
        },
        "protocol": "JSON-RPC 2.0",
        "documentation": format!("Send POST requests to {} with JSON-RPC messages", state.rpc_path)
    }))
}

/// Health check endpoint.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "sessions": state.session_count().await,
        "timestamp": Utc::now().to_rfc3339()
    }))
}

/// Server-sent stream of JSON-RPC notifications.
async fn handle_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("Event stream opened");

    let stream = BroadcastStream::new(state.events.subscribe())
        .filter_map(|result| async move {
            match result {
                Ok(message) => Some(Event::default().event("message").data(message.to_string())),
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    warn!("Event stream lagged, dropped {} notifications", skipped);
                    None
                }
            }
        })
        .map(Ok::<_, Infallible>);

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Handle JSON-RPC requests.
#[instrument(skip_all, fields(method))]
async fn handle_rpc(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<JsonRpcRequest>,
) -> Response {
    tracing::Span::current().record("method", &request.method);
    info!("Received JSON-RPC request: {}", request.method);

    let (session_id, response) = process_request(&state, &headers, request).await;

    let mut response = (StatusCode::OK, Json(response)).into_response();
    if let Some(value) = session_id.and_then(|id| HeaderValue::from_str(&id).ok()) {
        response.headers_mut().insert(SESSION_HEADER, value);
    }
    response
}

/// Close the session named by the `Mcp-Session-Id` header.
async fn handle_delete_session(State(state): State<AppState>, headers: HeaderMap) -> StatusCode {
    let Some(id) = session_header(&headers) else {
        return StatusCode::BAD_REQUEST;
    };

    if state.close_session(&id).await {
        info!("Session {} closed by client", id);
        StatusCode::NO_CONTENT
    } else {
        debug!("Close requested for unknown session {}", id);
        StatusCode::NOT_FOUND
    }
}

/// Process a JSON-RPC request.
///
/// Returns the session id to echo alongside the response.
async fn process_request(
    state: &AppState,
    headers: &HeaderMap,
    request: JsonRpcRequest,
) -> (Option<String>, JsonRpcResponse) {
    let session_id = session_header(headers);

    // Validate JSON-RPC version
    if request.jsonrpc != "2.0" {
        return (session_id, JsonRpcResponse::invalid_request(request.id));
    }

    if request.method == "initialize" {
        let (session_id, response) = handle_initialize(state, headers, session_id, request).await;
        return (Some(session_id), response);
    }

    let session_level = match session_id.as_deref() {
        Some(id) => state.touch_session(id).await,
        None => None,
    };
    let auth = state.resolve_auth(headers, session_id.as_deref()).await;
    let server = &state.server;
    let id = request.id;
    let params = request.params;

    let response = match request.method.as_str() {
        "ping" => JsonRpcResponse::success(id, json!({})),

        "tools/list" => JsonRpcResponse::success(id, server.list_tools_json(&auth).await),

        "tools/call" => {
            let session = session_id.as_deref().unwrap_or(server.session_id());
            let level = session_level.or_else(|| server.log_level());
            let result = server
                .call_tool_json(params.unwrap_or(Value::Null), auth, session, level)
                .await;
            JsonRpcResponse::from_result(id, result)
        }

        "resources/list" => JsonRpcResponse::success(id, server.list_resources_json().await),

        "resources/read" => {
            match params.as_ref().and_then(|p| p.get("uri")).and_then(Value::as_str) {
                Some(uri) => JsonRpcResponse::from_result(id, server.read_resource_json(uri).await),
                None => JsonRpcResponse::invalid_params(id, "Missing resource URI"),
            }
        }

        "prompts/list" => JsonRpcResponse::success(id, server.list_prompts_json().await),

        "prompts/get" => {
            let name = params
                .as_ref()
                .and_then(|p| p.get("name"))
                .and_then(Value::as_str);
            match name {
                Some(name) => {
                    let arguments = params.as_ref().and_then(|p| p.get("arguments")).cloned();
                    JsonRpcResponse::from_result(id, server.get_prompt_json(name, arguments).await)
                }
                None => JsonRpcResponse::invalid_params(id, "Missing prompt name"),
            }
        }

        "logging/setLevel" => {
            match serde_json::from_value::<SetLevelRequestParam>(params.unwrap_or(Value::Null)) {
                Ok(SetLevelRequestParam { level }) => {
                    info!("Client requested log level {:?}", level);
                    set_log_level(state, session_id.as_deref(), level).await;
                    JsonRpcResponse::success(id, json!({}))
                }
                Err(e) => JsonRpcResponse::invalid_params(id, format!("Invalid log level: {e}")),
            }
        }

        // Notifications (no response needed for stateless HTTP)
        method if method.starts_with("notifications/") => {
            handle_notification(state, method, session_id.as_deref()).await;
            JsonRpcResponse::success(id, Value::Null)
        }

        // Unknown method
        method => {
            warn!("Unknown method: {}", method);
            JsonRpcResponse::method_not_found(id)
        }
    };

    (session_id, response)
}

/// Handle initialize request, opening (or reopening) a session.
async fn handle_initialize(
    state: &AppState,
    headers: &HeaderMap,
    session_id: Option<String>,
    request: JsonRpcRequest,
) -> (String, JsonRpcResponse) {
    let session_id = session_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    info!("Processing initialize request (session {})", session_id);

    let protocol_version = request
        .params
        .as_ref()
        .and_then(|p| p.get("protocolVersion"))
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_PROTOCOL_VERSION)
        .to_string();

    let now = Utc::now();
    state
        .open_session(
            session_id.clone(),
            SessionState {
                initialized: false,
                protocol_version: protocol_version.clone(),
                auth: bearer_auth(headers),
                log_level: None,
                created_at: now,
                last_seen: now,
            },
        )
        .await;

    let mut result = state.server.initialize_json();
    if let Some(object) = result.as_object_mut() {
        object.insert("protocolVersion".to_string(), json!(protocol_version));
    }

    (session_id, JsonRpcResponse::success(request.id, result))
}

/// Store `level` on the session, or on the server for sessionless callers.
async fn set_log_level(state: &AppState, session_id: Option<&str>, level: LoggingLevel) {
    if let Some(id) = session_id {
        if let Some(session) = state.sessions.write().await.get_mut(id) {
            session.log_level = Some(level);
            return;
        }
    }
    state.server.set_log_level(level);
}

/// Handle notifications (no response needed).
async fn handle_notification(state: &AppState, method: &str, session_id: Option<&str>) {
    match method {
        "notifications/initialized" => {
            info!("Client sent initialized notification");
            if let Some(id) = session_id {
                if let Some(session) = state.sessions.write().await.get_mut(id) {
                    session.initialized = true;
                    debug!(
                        "Session {} initialized (protocol {}, opened {})",
                        id, session.protocol_version, session.created_at
                    );
                }
            }
        }
        _ => {
            info!("Received notification: {}", method);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Config;
    use crate::core::config::DynamicDiscoveryConfig;
    use rmcp::model::ErrorCode;

    fn state(discovery: bool) -> AppState {
        let mut config = Config::default();
        config.tools.dynamic_discovery = DynamicDiscoveryConfig {
            enabled: discovery,
            default_enabled_toolsets: vec!["hello_world".to_string()],
        };
        AppState::new(McpServer::new(config).unwrap(), "/mcp")
    }

    fn request(method: &str, params: Value) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: Some(json!(1)),
            method: method.to_string(),
            params: Some(params),
        }
    }

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    fn tool_names(response: &JsonRpcResponse) -> Vec<String> {
        response.result.as_ref().unwrap()["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_initialize_opens_session() {
        let state = state(false);
        let (session_id, response) = process_request(
            &state,
            &HeaderMap::new(),
            request("initialize", json!({"protocolVersion": "2025-03-26"})),
        )
        .await;

        let session_id = session_id.unwrap();
        assert!(state.sessions.read().await.contains_key(&session_id));
        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], "2025-03-26");
        assert_eq!(result["serverInfo"]["name"], "dynamic-tool-mcp");

        let (_, _) = process_request(
            &state,
            &headers(&[("mcp-session-id", &session_id)]),
            request("notifications/initialized", json!({})),
        )
        .await;
        assert!(state.sessions.read().await[&session_id].initialized);
    }

    #[tokio::test]
    async fn test_session_id_is_echoed() {
        let state = state(false);
        let (session_id, _) = process_request(
            &state,
            &headers(&[("mcp-session-id", "abc")]),
            request("tools/list", json!({})),
        )
        .await;
        assert_eq!(session_id.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_bearer_token_becomes_caller_identity() {
        let state = state(false);

        // whoami needs a scope; a bare bearer token has none
        let (_, response) = process_request(
            &state,
            &headers(&[("authorization", "Bearer secret")]),
            request("tools/list", json!({})),
        )
        .await;
        assert!(!tool_names(&response).contains(&"whoami".to_string()));

        let auth = state
            .resolve_auth(&headers(&[("authorization", "Bearer secret")]), None)
            .await;
        assert!(auth.is_authenticated());
    }

    #[tokio::test]
    async fn test_session_auth_used_without_header() {
        let state = state(false);
        let (session_id, _) = process_request(
            &state,
            &headers(&[("authorization", "Bearer secret")]),
            request("initialize", json!({})),
        )
        .await;

        let auth = state
            .resolve_auth(&HeaderMap::new(), session_id.as_deref())
            .await;
        assert!(auth.is_authenticated());

        let auth = state.resolve_auth(&HeaderMap::new(), None).await;
        assert!(!auth.is_authenticated());
    }

    #[tokio::test]
    async fn test_tools_call_error_codes() {
        let state = state(false);

        let (_, response) = process_request(
            &state,
            &HeaderMap::new(),
            request("tools/call", json!({"name": "missing", "arguments": {}})),
        )
        .await;
        let error = response.error.unwrap();
        assert_eq!(error.code, ErrorCode::METHOD_NOT_FOUND.0);
        assert_eq!(error.message, "Unknown tool: missing");

        let (_, response) = process_request(
            &state,
            &HeaderMap::new(),
            request("tools/call", json!({"name": "echo", "arguments": {"message": 5}})),
        )
        .await;
        assert_eq!(response.error.unwrap().code, ErrorCode::INVALID_PARAMS.0);
    }

    #[tokio::test]
    async fn test_trigger_broadcasts_list_changed() {
        let state = state(true);
        let mut events = state.events.subscribe();
        let _bridge = state.bridge_tool_list_changed();

        let (_, response) = process_request(
            &state,
            &HeaderMap::new(),
            request(
                "tools/call",
                json!({
                    "name": "dynamic_tool_trigger",
                    "arguments": {"toolsets": [{"name": "echo", "trigger": "enable"}]}
                }),
            ),
        )
        .await;
        assert!(response.error.is_none());

        let event = events.recv().await.unwrap();
        assert_eq!(event["method"], "notifications/tools/list_changed");

        let (_, response) =
            process_request(&state, &HeaderMap::new(), request("tools/list", json!({}))).await;
        assert!(tool_names(&response).contains(&"echo".to_string()));
    }

    #[tokio::test]
    async fn test_invalid_version_and_unknown_method() {
        let state = state(false);

        let mut bad = request("tools/list", json!({}));
        bad.jsonrpc = "1.0".to_string();
        let (_, response) = process_request(&state, &HeaderMap::new(), bad).await;
        assert_eq!(response.error.unwrap().code, -32600);

        let (_, response) =
            process_request(&state, &HeaderMap::new(), request("bogus", json!({}))).await;
        assert_eq!(response.error.unwrap().code, -32601);
    }

    #[tokio::test]
    async fn test_prompts_and_resources() {
        let state = state(true);

        let (_, response) = process_request(
            &state,
            &HeaderMap::new(),
            request("resources/read", json!({"uri": "mcp://server/info"})),
        )
        .await;
        assert!(response.result.is_some());

        let (_, response) = process_request(
            &state,
            &HeaderMap::new(),
            request("prompts/get", json!({"name": "discover_tools"})),
        )
        .await;
        assert_eq!(response.error.unwrap().code, -32602);
    }

    async fn open(state: &AppState) -> String {
        let (session_id, _) =
            process_request(state, &HeaderMap::new(), request("initialize", json!({}))).await;
        session_id.unwrap()
    }

    fn backdate(session: &mut SessionState, minutes: i64) {
        session.last_seen = Utc::now() - chrono::Duration::minutes(minutes);
    }

    #[tokio::test]
    async fn test_session_cap_evicts_least_recently_used() {
        let state = state(false).with_session_limits(16, Duration::from_secs(60));

        let first = open(&state).await;
        let mut last = first.clone();
        for _ in 0..1000 {
            last = open(&state).await;
        }

        assert!(state.session_count().await <= 16);
        let sessions = state.sessions.read().await;
        assert!(!sessions.contains_key(&first));
        assert!(sessions.contains_key(&last));
    }

    #[tokio::test]
    async fn test_delete_closes_session() {
        let state = state(false);
        let id = open(&state).await;
        assert_eq!(state.session_count().await, 1);

        let status =
            handle_delete_session(State(state.clone()), headers(&[("mcp-session-id", &id)])).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(state.session_count().await, 0);

        let status =
            handle_delete_session(State(state.clone()), headers(&[("mcp-session-id", &id)])).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let status = handle_delete_session(State(state.clone()), HeaderMap::new()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_idle_sessions_expire() {
        let state = state(false).with_session_limits(16, Duration::from_secs(30 * 60));

        // Touched after expiry
        let stale = open(&state).await;
        backdate(state.sessions.write().await.get_mut(&stale).unwrap(), 31);
        let (_, response) = process_request(
            &state,
            &headers(&[("mcp-session-id", &stale)]),
            request("ping", json!({})),
        )
        .await;
        assert!(response.result.is_some());
        assert_eq!(state.session_count().await, 0);

        // Swept when another session opens
        let idle = open(&state).await;
        let active = open(&state).await;
        backdate(state.sessions.write().await.get_mut(&idle).unwrap(), 45);
        let fresh = open(&state).await;

        let sessions = state.sessions.read().await;
        assert!(!sessions.contains_key(&idle));
        assert!(sessions.contains_key(&active));
        assert!(sessions.contains_key(&fresh));
    }

    #[tokio::test]
    async fn test_activity_keeps_session_alive() {
        let state = state(false).with_session_limits(16, Duration::from_secs(30 * 60));
        let id = open(&state).await;
        backdate(state.sessions.write().await.get_mut(&id).unwrap(), 20);

        process_request(
            &state,
            &headers(&[("mcp-session-id", &id)]),
            request("tools/list", json!({})),
        )
        .await;

        let sessions = state.sessions.read().await;
        let session = &sessions[&id];
        assert!(Utc::now() - session.last_seen < chrono::Duration::minutes(1));
    }

    #[tokio::test]
    async fn test_set_level_is_stored() {
        let state = state(false);
        let id = open(&state).await;

        let (_, response) = process_request(
            &state,
            &headers(&[("mcp-session-id", &id)]),
            request("logging/setLevel", json!({"level": "warning"})),
        )
        .await;
        assert!(response.error.is_none());
        assert_eq!(
            state.sessions.read().await[&id].log_level,
            Some(LoggingLevel::Warning)
        );
        assert_eq!(state.server.log_level(), None);

        let (_, response) = process_request(
            &state,
            &HeaderMap::new(),
            request("logging/setLevel", json!({"level": "error"})),
        )
        .await;
        assert!(response.error.is_none());
        assert_eq!(state.server.log_level(), Some(LoggingLevel::Error));

        let (_, response) = process_request(
            &state,
            &HeaderMap::new(),
            request("logging/setLevel", json!({"level": "loud"})),
        )
        .await;
        assert_eq!(response.error.unwrap().code, -32602);
        assert_eq!(state.server.log_level(), Some(LoggingLevel::Error));
    }
}
