//! MCP Server implementation and lifecycle management.
//!
//! This module contains the main server handler that implements the MCP
//! protocol by delegating to the domain managers.
//!
//! ## Tool Architecture
//!
//! Tools are registered as [`ToolCapability`] values and owned by a shared
//! [`ToolManager`]. The manager decides which tools are visible per caller and
//! which may be called, so `tools/list` and `tools/call` are plain
//! delegations here. When dynamic discovery is on, changes to the enabled set
//! reach connected clients through [`McpServer::bridge_tool_list_changed`].

use rmcp::{
    ErrorData as McpError, Peer, RoleServer, ServerHandler, model::*, service::RequestContext,
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock as StdRwLock};
use tracing::{debug, info, instrument, warn};

use super::auth::AuthInfo;
use super::config::Config;
use super::error::Result;
use crate::domains::{
    prompts::{PromptCapability, PromptManager, builtin_prompts},
    resources::{ResourceCapability, ResourceManager, builtin_resources},
    tools::{
        CallContext, CallRequest, Subscription, ToolCapability, ToolManager,
        builtin_capabilities, meta, namespace,
    },
};

/// The main MCP server handler.
///
/// Cloning is cheap: clones share the managers, so a server cloned per
/// connection still sees one enabled set.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    tools: Arc<ToolManager>,
    resources: Arc<ResourceManager>,
    prompts: Arc<PromptManager>,

    /// Identity used when a request carries none.
    auth: AuthInfo,

    session_id: String,

    /// Minimum level for log notifications, set by `logging/setLevel`.
    log_level: Arc<StdRwLock<Option<LoggingLevel>>>,
}

impl McpServer {
    /// Create a new MCP server with the built-in tools, resources and prompts.
    pub fn new(config: Config) -> Result<Self> {
        let config = Arc::new(config);
        let tools = Arc::new(ToolManager::from_config(
            &config.tools,
            builtin_capabilities()?,
        )?);
        let resources = builtin_resources(config.clone(), tools.clone());
        let prompts = builtin_prompts(tools.clone());

        Ok(Self::assemble(config, tools, resources, prompts))
    }

    /// Create a server over caller-supplied catalogs.
    pub fn with_capabilities(
        config: Config,
        tools: Vec<ToolCapability>,
        resources: Vec<ResourceCapability>,
        prompts: Vec<PromptCapability>,
    ) -> Result<Self> {
        let tools = Arc::new(ToolManager::from_config(&config.tools, tools)?);
        Ok(Self::assemble(Arc::new(config), tools, resources, prompts))
    }

    fn assemble(
        config: Arc<Config>,
        tools: Arc<ToolManager>,
        resources: Vec<ResourceCapability>,
        prompts: Vec<PromptCapability>,
    ) -> Self {
        Self {
            auth: AuthInfo::from_config(&config.auth),
            config,
            tools,
            resources: Arc::new(ResourceManager::new(resources)),
            prompts: Arc::new(PromptManager::new(prompts)),
            session_id: uuid::Uuid::new_v4().to_string(),
            log_level: Arc::new(StdRwLock::new(None)),
        }
    }

    /// A clone bound to one client connection.
    ///
    /// `auth` replaces the configured identity for this connection when given.
    /// The connection starts with no log level of its own.
    pub fn for_connection(&self, session_id: impl Into<String>, auth: Option<AuthInfo>) -> Self {
        let mut server = self.clone();
        server.session_id = session_id.into();
        server.log_level = Arc::new(StdRwLock::new(None));
        if let Some(auth) = auth {
            server.auth = auth;
        }
        server
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub fn tools(&self) -> &Arc<ToolManager> {
        &self.tools
    }

    pub fn resources(&self) -> &Arc<ResourceManager> {
        &self.resources
    }

    pub fn prompts(&self) -> &Arc<PromptManager> {
        &self.prompts
    }

    pub fn auth(&self) -> &AuthInfo {
        &self.auth
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn log_level(&self) -> Option<LoggingLevel> {
        *self.log_level.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_log_level(&self, level: LoggingLevel) {
        *self.log_level.write().unwrap_or_else(PoisonError::into_inner) = Some(level);
    }

    /// Capabilities advertised to clients.
    ///
    /// Domains with an empty catalog are left out; logging is always on.
    pub fn capabilities(&self) -> ServerCapabilities {
        let mut capabilities = ServerCapabilities::builder().enable_logging().build();

        if self.tools.has_tools() {
            capabilities.tools = Some(ToolsCapability {
                list_changed: Some(true),
            });
        }
        if self.resources.has_resources() {
            capabilities.resources = Some(ResourcesCapability::default());
        }
        if self.prompts.has_prompts() {
            capabilities.prompts = Some(PromptsCapability::default());
        }

        capabilities
    }

    fn instructions(&self) -> String {
        let mut instructions = self.config.server.instructions.clone();

        if self.tools.dynamic_discovery_enabled() {
            let ns = self.tools.namespace();
            let list = namespace::external_name(ns.as_deref(), meta::DYNAMIC_TOOL_LIST);
            let trigger = namespace::external_name(ns.as_deref(), meta::DYNAMIC_TOOL_TRIGGER);
            instructions.push_str(&format!(
                "\n\n## Dynamic Tool Discovery\n\n\
                 Only a few tools are enabled at startup. Call `{list}` to see every \
                 available tool and which ones are enabled, then call `{trigger}` to \
                 enable or disable tools by name. The tool list is updated after each \
                 change."
            ));
        }

        instructions
    }

    /// Identity for a request: an `AuthInfo` placed in the request
    /// extensions by the transport, else the connection identity.
    pub fn resolve_auth(&self, extensions: &Extensions) -> AuthInfo {
        extensions
            .get::<AuthInfo>()
            .cloned()
            .unwrap_or_else(|| self.auth.clone())
    }

    /// Forward enabled-set changes to `peer` as `notifications/tools/list_changed`.
    ///
    /// Notifications stop when the returned guard is dropped.
    pub fn bridge_tool_list_changed(&self, peer: Peer<RoleServer>) -> Subscription {
        self.tools.on_enabled_tools_changed(move |response| {
            debug!("Tool list changed, {} tools visible", response.tools.len());
            let peer = peer.clone();
            tokio::spawn(async move {
                if let Err(e) = peer.notify_tool_list_changed().await {
                    warn!("Failed to send tools/list_changed: {}", e);
                }
            });
        })
    }

    // ========================================================================
    // HTTP Transport Support Methods
    // ========================================================================

    /// `initialize` result body.
    pub fn initialize_json(&self) -> Value {
        serde_json::to_value(self.get_info()).unwrap_or_else(|_| json!({}))
    }

    pub fn capabilities_json(&self) -> Value {
        serde_json::to_value(self.capabilities()).unwrap_or_else(|_| json!({}))
    }

    /// List the tools `auth` may see (for HTTP transport).
    pub async fn list_tools_json(&self, auth: &AuthInfo) -> Value {
        let response = self.tools.list_tools(auth).await;
        json!({ "tools": response.tools })
    }

    /// Call a tool from raw `tools/call` params (for HTTP transport).
    pub async fn call_tool_json(
        &self,
        params: Value,
        auth: AuthInfo,
        session_id: &str,
        log_level: Option<LoggingLevel>,
    ) -> std::result::Result<Value, McpError> {
        let Value::Object(mut params) = params else {
            return Err(McpError::invalid_params("Missing params", None));
        };

        let name = match params.remove("name") {
            Some(Value::String(name)) => name,
            _ => return Err(McpError::invalid_params("Missing tool name", None)),
        };
        let arguments = match params.remove("arguments") {
            None | Some(Value::Null) => None,
            Some(Value::Object(arguments)) => Some(arguments),
            Some(_) => {
                return Err(McpError::invalid_params(
                    "Tool arguments must be an object",
                    None,
                ));
            }
        };
        let meta = match params.remove("_meta") {
            Some(Value::Object(meta)) => meta,
            _ => JsonObject::new(),
        };

        let request = CallRequest {
            name: name.clone(),
            arguments: arguments.clone(),
            meta,
        };
        let ctx = CallContext::new(request, auth)
            .with_session(session_id)
            .with_log_level(log_level);

        let result = self.tools.call_tool(&name, arguments, ctx).await?;
        serde_json::to_value(result).map_err(|e| McpError::internal_error(e.to_string(), None))
    }

    /// List the enabled resources (for HTTP transport).
    pub async fn list_resources_json(&self) -> Value {
        json!({ "resources": self.resources.list_resources().await })
    }

    /// Read a resource by URI (for HTTP transport).
    pub async fn read_resource_json(&self, uri: &str) -> std::result::Result<Value, McpError> {
        let result = self.resources.read_resource(uri).await?;
        serde_json::to_value(result).map_err(|e| McpError::internal_error(e.to_string(), None))
    }

    /// List the enabled prompts (for HTTP transport).
    pub async fn list_prompts_json(&self) -> Value {
        json!({ "prompts": self.prompts.list_prompts().await })
    }

    /// Render a prompt (for HTTP transport).
    pub async fn get_prompt_json(
        &self,
        name: &str,
        arguments: Option<Value>,
    ) -> std::result::Result<Value, McpError> {
        let arguments = arguments.and_then(|v| match v {
            Value::Object(map) => Some(string_arguments(map)),
            _ => None,
        });

        let result = self.prompts.get_prompt(name, arguments).await?;
        serde_json::to_value(result).map_err(|e| McpError::internal_error(e.to_string(), None))
    }
}

/// Keep the string-valued prompt arguments.
fn string_arguments(map: JsonObject) -> HashMap<String, String> {
    map.into_iter()
        .filter_map(|(k, v)| match v {
            Value::String(s) => Some((k, s)),
            _ => None,
        })
        .collect()
}

fn request_meta(meta: &Meta) -> JsonObject {
    match serde_json::to_value(meta) {
        Ok(Value::Object(map)) => map,
        _ => JsonObject::new(),
    }
}

impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(self.instructions()),
            capabilities: self.capabilities(),
            server_info: Implementation {
                name: self.config.server.name.clone(),
                version: self.config.server.version.clone(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[instrument(skip(self, context))]
    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        context: RequestContext<RoleServer>,
    ) -> std::result::Result<ListToolsResult, McpError> {
        let auth = self.resolve_auth(&context.extensions);
        let response = self.tools.list_tools(&auth).await;
        info!("Listing {} tools", response.tools.len());
        Ok(ListToolsResult {
            tools: response.tools,
            next_cursor: None,
            meta: None,
        })
    }

    #[instrument(skip(self, request, context), fields(tool = %request.name))]
    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> std::result::Result<CallToolResult, McpError> {
        info!("Calling tool: {}", request.name);
        let auth = self.resolve_auth(&context.extensions);
        let call = CallRequest {
            name: request.name.to_string(),
            arguments: request.arguments.clone(),
            meta: request_meta(&context.meta),
        };
        let ctx = CallContext::new(call, auth)
            .with_session(self.session_id.clone())
            .with_cancellation(context.ct.clone())
            .with_peer(context.peer.clone())
            .with_log_level(self.log_level());

        self.tools
            .call_tool(&request.name, request.arguments, ctx)
            .await
            .map_err(McpError::from)
    }

    #[instrument(skip(self, _context))]
    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<ListResourcesResult, McpError> {
        info!("Listing resources");
        let resources = self.resources.list_resources().await;
        Ok(ListResourcesResult {
            resources,
            next_cursor: None,
            meta: None,
        })
    }

    #[instrument(skip(self, _context))]
    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<ReadResourceResult, McpError> {
        info!("Reading resource: {}", request.uri);
        self.resources
            .read_resource(&request.uri)
            .await
            .map_err(McpError::from)
    }

    #[instrument(skip(self, _context))]
    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<ListPromptsResult, McpError> {
        info!("Listing prompts");
        let prompts = self.prompts.list_prompts().await;
        Ok(ListPromptsResult {
            prompts,
            next_cursor: None,
            meta: None,
        })
    }

    #[instrument(skip(self, _context))]
    async fn get_prompt(
        &self,
        request: GetPromptRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<GetPromptResult, McpError> {
        info!("Getting prompt: {}", request.name);
        let arguments = request.arguments.map(string_arguments);
        self.prompts
            .get_prompt(&request.name, arguments)
            .await
            .map_err(McpError::from)
    }

    #[instrument(skip(self, _context))]
    async fn set_level(
        &self,
        request: SetLevelRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<(), McpError> {
        info!("Client requested log level {:?}", request.level);
        self.set_log_level(request.level);
        Ok(())
    }
}
