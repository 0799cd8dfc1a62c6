//! STDIO transport implementation.
//!
//! Standard input/output transport for MCP - the default and recommended mode.

use rmcp::{
    ServiceExt,
    model::{LoggingLevel, LoggingMessageNotificationParam},
};
use tracing::{info, warn};

use super::{TransportError, TransportResult};
use crate::core::McpServer;

/// STDIO transport handler.
pub struct StdioTransport;

impl StdioTransport {
    /// Run the STDIO transport.
    ///
    /// Returns when the client closes stdin or on Ctrl-C.
    pub async fn run(server: McpServer) -> TransportResult<()> {
        info!("Ready - communicating via stdin/stdout");

        let service = server
            .clone()
            .serve(rmcp::transport::stdio())
            .await
            .map_err(|e| TransportError::init(e.to_string()))?;

        let peer = service.peer().clone();
        let _bridge = server.bridge_tool_list_changed(peer.clone());

        let started = LoggingMessageNotificationParam {
            level: LoggingLevel::Info,
            logger: Some(server.name().to_string()),
            data: serde_json::json!("MCP server started"),
        };
        if let Err(e) = peer.notify_logging_message(started).await {
            warn!("Failed to send startup notification: {}", e);
        }

        let cancel = service.cancellation_token();
        tokio::select! {
            result = service.waiting() => {
                result.map_err(|e| TransportError::ServiceError(e.to_string()))?;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl-C, shutting down");
                cancel.cancel();
            }
        }

        info!("STDIO transport finished");
        Ok(())
    }
}
