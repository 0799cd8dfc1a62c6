//! The tool registry.
//!
//! [`ToolManager`] owns the tool catalog, the set of currently enabled tools,
//! the namespace used to render names for clients and the subscribers that
//! want to hear about changes. The catalog is fixed at construction; only the
//! enabled set and the namespace change afterwards.

use futures::future::join_all;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content, JsonObject, Tool},
};
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock as StdRwLock};
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};

use crate::core::auth::AuthInfo;
use crate::core::config::{DynamicDiscoveryConfig, ToolsConfig, ToolsetConfig, ToolsetMode};

use super::capability::ToolCapability;
use super::definition::ToolDefinition;
use super::error::ToolError;
use super::handlers::{CallContext, EnablementCheck};
use super::meta::{self, DiscoveryPayload, ToolSummary, Trigger, TriggerParams};
use super::namespace::{external_description, external_name, internal_name};
use super::notifier::{ChangeNotifier, Subscription};

/// The tool list as one caller sees it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ToolListResponse {
    pub tools: Vec<Tool>,
}

impl ToolListResponse {
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_ref()).collect()
    }
}

enum ToolEntry {
    Handler(ToolCapability),
    DynamicList(ToolDefinition),
    DynamicTrigger(ToolDefinition),
}

impl ToolEntry {
    fn definition(&self) -> &ToolDefinition {
        match self {
            Self::Handler(capability) => capability.definition(),
            Self::DynamicList(definition) | Self::DynamicTrigger(definition) => definition,
        }
    }

    fn enablement(&self) -> Option<&std::sync::Arc<dyn EnablementCheck>> {
        match self {
            Self::Handler(capability) => capability.enablement(),
            _ => None,
        }
    }

    fn is_toggleable(&self) -> bool {
        matches!(self, Self::Handler(_))
    }
}

/// Catalog, enabled set and namespace of one server's tools.
pub struct ToolManager {
    catalog: HashMap<String, ToolEntry>,
    order: Vec<String>,
    enabled: RwLock<HashSet<String>>,
    namespace: StdRwLock<Option<String>>,
    dynamic_discovery: bool,
    notifier: ChangeNotifier,
    last_auth: StdRwLock<Option<AuthInfo>>,
}

impl ToolManager {
    /// Build the registry.
    ///
    /// With dynamic discovery enabled, exactly the `default_enabled_toolsets`
    /// start enabled and the two discovery tools are added. Otherwise the
    /// toolset mode decides: every tool for `readWrite`, only tools hinted
    /// read-only for `readOnly`.
    pub fn new(
        namespace: Option<String>,
        capabilities: Vec<ToolCapability>,
        toolset: ToolsetConfig,
        dynamic_discovery: Option<DynamicDiscoveryConfig>,
    ) -> Result<Self, ToolError> {
        let mut catalog = HashMap::new();
        let mut order = Vec::new();

        for capability in capabilities {
            let name = capability.name().to_string();
            if catalog
                .insert(name.clone(), ToolEntry::Handler(capability))
                .is_some()
            {
                warn!(tool = %name, "Duplicate tool definition, keeping the last one");
            } else {
                order.push(name);
            }
        }

        let discovery = dynamic_discovery.filter(|d| d.enabled);

        let mut enabled: HashSet<String> = match &discovery {
            Some(discovery) => discovery
                .default_enabled_toolsets
                .iter()
                .filter(|name| {
                    let known = catalog.contains_key(name.as_str());
                    if !known {
                        debug!(tool = %name, "Ignoring unknown default-enabled tool");
                    }
                    known
                })
                .cloned()
                .collect(),
            None => catalog
                .iter()
                .filter(|(_, entry)| match toolset.mode {
                    ToolsetMode::ReadWrite => true,
                    ToolsetMode::ReadOnly => entry.definition().is_read_only(),
                })
                .map(|(name, _)| name.clone())
                .collect(),
        };

        if discovery.is_some() {
            let meta_entries = [
                ToolEntry::DynamicList(meta::list_definition()?),
                ToolEntry::DynamicTrigger(meta::trigger_definition()?),
            ];
            for entry in meta_entries {
                let name = entry.definition().name().to_string();
                if catalog.insert(name.clone(), entry).is_some() {
                    warn!(tool = %name, "Tool is shadowed by the built-in discovery tool");
                } else {
                    order.push(name.clone());
                }
                enabled.insert(name);
            }
        }

        info!(
            "Tool registry initialized: {} tools, {} enabled, dynamic discovery {}",
            order.len(),
            enabled.len(),
            if discovery.is_some() { "on" } else { "off" }
        );

        Ok(Self {
            catalog,
            order,
            enabled: RwLock::new(enabled),
            namespace: StdRwLock::new(namespace),
            dynamic_discovery: discovery.is_some(),
            notifier: ChangeNotifier::new(),
            last_auth: StdRwLock::new(None),
        })
    }

    /// Build the registry from the `tools` section of the configuration.
    pub fn from_config(
        config: &ToolsConfig,
        capabilities: Vec<ToolCapability>,
    ) -> Result<Self, ToolError> {
        Self::new(
            config.namespace.clone(),
            capabilities,
            config.toolset,
            Some(config.dynamic_discovery.clone()),
        )
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn has_tools(&self) -> bool {
        !self.catalog.is_empty()
    }

    pub fn dynamic_discovery_enabled(&self) -> bool {
        self.dynamic_discovery
    }

    pub fn namespace(&self) -> Option<String> {
        self.namespace
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether the tool with this internal name is enabled.
    pub async fn is_enabled(&self, name: &str) -> bool {
        self.enabled.read().await.contains(name)
    }

    /// Internal names of the enabled tools, in catalog order.
    pub async fn enabled_tools(&self) -> Vec<String> {
        let enabled = self.enabled.read().await;
        self.order
            .iter()
            .filter(|name| enabled.contains(*name))
            .cloned()
            .collect()
    }

    // ========================================================================
    // Listing
    // ========================================================================

    /// The tools `auth` may see right now.
    ///
    /// Also records `auth` as the context used to render change
    /// notifications.
    #[instrument(skip_all)]
    pub async fn list_tools(&self, auth: &AuthInfo) -> ToolListResponse {
        *self
            .last_auth
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(auth.clone());
        self.render(auth).await
    }

    async fn render(&self, auth: &AuthInfo) -> ToolListResponse {
        let candidates: Vec<&ToolEntry> = {
            let enabled = self.enabled.read().await;
            self.order
                .iter()
                .filter(|name| enabled.contains(*name))
                .filter_map(|name| self.catalog.get(name))
                .collect()
        };

        let admitted = join_all(candidates.iter().map(|entry| admits(entry, auth))).await;

        let namespace = self.namespace();
        let tools = candidates
            .into_iter()
            .zip(admitted)
            .filter(|(_, admitted)| *admitted)
            .map(|(entry, _)| entry.definition().to_tool(namespace.as_deref()))
            .collect();

        ToolListResponse { tools }
    }

    // ========================================================================
    // Calling
    // ========================================================================

    /// Execute the tool with external name `name`.
    #[instrument(skip_all, fields(tool = %name))]
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
        ctx: CallContext,
    ) -> Result<CallToolResult, ToolError> {
        let namespace = self.namespace();
        let internal =
            internal_name(namespace.as_deref(), name).ok_or_else(|| ToolError::unknown(name))?;
        let entry = self
            .catalog
            .get(internal)
            .ok_or_else(|| ToolError::unknown(name))?;

        if !self.is_enabled(internal).await {
            return Err(ToolError::not_enabled(name));
        }

        let arguments = arguments.ok_or_else(|| ToolError::MissingArguments(name.to_string()))?;
        let arguments = entry
            .definition()
            .input_schema()
            .validate(&Value::Object(arguments))?;

        debug!("Dispatching tool call");

        match entry {
            ToolEntry::Handler(capability) => capability
                .handler()
                .call(arguments, ctx)
                .await
                .map_err(|err| handler_error(name, err)),
            ToolEntry::DynamicList(_) => {
                let enabled = self.enabled.read().await;
                payload_result(&self.payload(&enabled))
            }
            ToolEntry::DynamicTrigger(_) => self.trigger(arguments).await,
        }
    }

    /// Apply a `dynamic_tool_trigger` call.
    ///
    /// Every name is resolved before anything changes; the entries are then
    /// applied in order under one write lock and subscribers are notified
    /// once.
    async fn trigger(&self, arguments: JsonObject) -> Result<CallToolResult, ToolError> {
        let params = TriggerParams::from_arguments(arguments)?;
        let namespace = self.namespace();

        let mut changes = Vec::with_capacity(params.toolsets.len());
        for toolset in &params.toolsets {
            let internal = internal_name(namespace.as_deref(), &toolset.name)
                .filter(|name| self.catalog.get(*name).is_some_and(ToolEntry::is_toggleable))
                .ok_or_else(|| {
                    ToolError::invalid_parameters(format!(
                        "Invalid toolset name: {}",
                        toolset.name
                    ))
                })?;
            changes.push((internal.to_string(), toolset.trigger));
        }

        let payload = {
            let mut enabled = self.enabled.write().await;
            for (name, trigger) in changes {
                match trigger {
                    Trigger::Enable => {
                        enabled.insert(name.clone());
                        info!(tool = %name, "Tool enabled");
                    }
                    Trigger::Disable => {
                        enabled.remove(&name);
                        info!(tool = %name, "Tool disabled");
                    }
                }
            }
            self.payload(&enabled)
        };

        self.notify_changed().await;
        payload_result(&payload)
    }

    fn payload(&self, enabled: &HashSet<String>) -> DiscoveryPayload {
        let namespace = self.namespace();
        let summarize = |name: &String| -> Option<ToolSummary> {
            let entry = self.catalog.get(name).filter(|e| e.is_toggleable())?;
            Some(ToolSummary {
                name: external_name(namespace.as_deref(), name),
                description: external_description(
                    namespace.as_deref(),
                    entry.definition().description(),
                ),
            })
        };

        DiscoveryPayload {
            available: self.order.iter().filter_map(summarize).collect(),
            enabled: self
                .order
                .iter()
                .filter(|name| enabled.contains(*name))
                .filter_map(summarize)
                .collect(),
        }
    }

    // ========================================================================
    // Change notification
    // ========================================================================

    /// Register a callback for enabled-set changes.
    pub fn on_enabled_tools_changed<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&ToolListResponse) + Send + Sync + 'static,
    {
        self.notifier.subscribe(callback)
    }

    pub fn subscriber_count(&self) -> usize {
        self.notifier.subscriber_count()
    }

    /// Rename the namespace. Notifies subscribers when discovery is on.
    pub async fn set_namespace(&self, namespace: Option<String>) {
        *self
            .namespace
            .write()
            .unwrap_or_else(PoisonError::into_inner) = namespace;

        if self.dynamic_discovery {
            self.notify_changed().await;
        }
    }

    async fn notify_changed(&self) {
        if self.notifier.subscriber_count() == 0 {
            return;
        }

        let auth = self
            .last_auth
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .unwrap_or_default();
        let response = self.render(&auth).await;
        debug!("Notifying {} subscribers", self.notifier.subscriber_count());
        self.notifier.notify(&response);
    }
}

impl std::fmt::Debug for ToolManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolManager")
            .field("tools", &self.order)
            .field("namespace", &self.namespace())
            .field("dynamic_discovery", &self.dynamic_discovery)
            .field("notifier", &self.notifier)
            .finish()
    }
}

async fn admits(entry: &ToolEntry, auth: &AuthInfo) -> bool {
    let Some(check) = entry.enablement() else {
        return true;
    };
    match check.can_be_enabled(auth).await {
        Ok(admitted) => admitted,
        Err(e) => {
            warn!(
                tool = %entry.definition().name(),
                "Enablement check failed, hiding tool: {:#}", e
            );
            false
        }
    }
}

fn handler_error(name: &str, err: anyhow::Error) -> ToolError {
    match err.downcast::<McpError>() {
        Ok(mcp) => ToolError::Protocol(mcp),
        Err(err) => {
            error!(tool = %name, "Tool handler failed: {:#}", err);
            ToolError::Handler(err.to_string())
        }
    }
}

fn payload_result(payload: &DiscoveryPayload) -> Result<CallToolResult, ToolError> {
    let text = serde_json::to_string_pretty(payload)
        .map_err(|e| ToolError::internal(format!("failed to render tool list: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}
