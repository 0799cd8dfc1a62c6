//! Caller authorization context.
//!
//! The server never authenticates anyone itself. An `AuthInfo` is either
//! built from configuration (stdio/TCP, one identity per process) or from the
//! `Authorization` header of an HTTP request, and is then handed untouched to
//! tool enablement checks and tool handlers.

use rmcp::model::JsonObject;
use serde::{Deserialize, Serialize};

use super::config::AuthConfig;

/// Authorization information attached to a request.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthInfo {
    /// Bearer token (or equivalent) presented by the caller.
    pub token: Option<String>,

    /// Identifier of the client the token was issued to.
    pub client_id: Option<String>,

    /// Scopes granted to the token.
    #[serde(default)]
    pub scopes: Vec<String>,

    /// Free-form claims resolved from the token by an identity provider.
    #[serde(default)]
    pub extra: JsonObject,
}

/// Custom Debug implementation to redact the token from logs.
impl std::fmt::Debug for AuthInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthInfo")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("client_id", &self.client_id)
            .field("scopes", &self.scopes)
            .field("extra", &self.extra)
            .finish()
    }
}

impl AuthInfo {
    /// An unauthenticated caller.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A caller identified by a bearer token.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..Self::default()
        }
    }

    /// Build the process-wide identity from configuration.
    pub fn from_config(config: &AuthConfig) -> Self {
        Self {
            token: config.token.clone(),
            client_id: config.client_id.clone(),
            scopes: config.scopes.clone(),
            extra: JsonObject::new(),
        }
    }

    /// Parse an HTTP `Authorization` header value.
    ///
    /// Only the `Bearer` scheme is understood; anything else yields `None`.
    pub fn from_authorization_header(value: &str) -> Option<Self> {
        let (scheme, token) = value.trim().split_once(' ')?;
        let token = token.trim();
        if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
            return None;
        }
        Some(Self::bearer(token))
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_claim(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Whether a token was presented.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Whether the given scope was granted.
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_header_parsing() {
        let auth = AuthInfo::from_authorization_header("Bearer abc123").unwrap();
        assert_eq!(auth.token.as_deref(), Some("abc123"));

        let auth = AuthInfo::from_authorization_header("bearer   xyz ").unwrap();
        assert_eq!(auth.token.as_deref(), Some("xyz"));
    }

    #[test]
    fn test_non_bearer_header_is_ignored() {
        assert!(AuthInfo::from_authorization_header("Basic dXNlcjpwYXNz").is_none());
        assert!(AuthInfo::from_authorization_header("Bearer ").is_none());
        assert!(AuthInfo::from_authorization_header("abc123").is_none());
    }

    #[test]
    fn test_scopes() {
        let auth = AuthInfo::bearer("t").with_scopes(["profile:read", "tools:write"]);
        assert!(auth.has_scope("profile:read"));
        assert!(!auth.has_scope("admin"));
        assert!(auth.is_authenticated());
        assert!(!AuthInfo::anonymous().is_authenticated());
    }

    #[test]
    fn test_token_redacted_in_debug() {
        let auth = AuthInfo::bearer("super_secret_token").with_client_id("agent-1");
        let debug_str = format!("{:?}", auth);
        assert!(debug_str.contains("REDACTED"));
        assert!(debug_str.contains("agent-1"));
        assert!(!debug_str.contains("super_secret_token"));
    }
}
