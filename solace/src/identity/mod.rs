//! Identity provider adapter.
//!
//! Token verification is delegated to an external provider: the adapter
//! either calls an OIDC-style userinfo endpoint with the presented bearer
//! token, or (for local development and tests) resolves the token against a
//! static table from `AUTH_DEV_TOKENS`. The adapter only resolves a token
//! to a subject string; mapping subjects to accounts happens in the auth
//! middleware.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::config::AuthConfig;
use crate::error::{Result, SolaceError};

#[derive(Debug, Clone)]
pub enum IdentityBackend {
    /// Verify tokens against a remote userinfo endpoint.
    Userinfo { url: String },
    /// Static token -> subject table.
    DevTokens { tokens: HashMap<String, String> },
    Unavailable { reason: String },
}

#[derive(Clone)]
pub struct IdentityProvider {
    backend: IdentityBackend,
    client: Option<Arc<reqwest::Client>>,
}

impl IdentityProvider {
    pub fn new(config: &AuthConfig) -> Self {
        if let Some(url) = &config.userinfo_url {
            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .ok()
                .map(Arc::new);

            return Self {
                backend: IdentityBackend::Userinfo { url: url.clone() },
                client,
            };
        }

        if !config.dev_tokens.is_empty() {
            return Self {
                backend: IdentityBackend::DevTokens {
                    tokens: config.dev_tokens.clone(),
                },
                client: None,
            };
        }

        Self::unavailable("No identity provider configured. Set AUTH_USERINFO_URL or AUTH_DEV_TOKENS.")
    }

    pub fn unavailable(reason: &str) -> Self {
        Self {
            backend: IdentityBackend::Unavailable {
                reason: reason.to_string(),
            },
            client: None,
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self.backend, IdentityBackend::Unavailable { .. })
    }

    pub fn backend(&self) -> &IdentityBackend {
        &self.backend
    }

    /// Resolve a bearer token to the identity provider's subject claim.
    pub async fn verify(&self, token: &str) -> Result<String> {
        if token.is_empty() {
            return Err(SolaceError::ApiAuth("Empty bearer token".to_string()));
        }

        match &self.backend {
            IdentityBackend::DevTokens { tokens } => tokens
                .get(token)
                .cloned()
                .ok_or_else(|| SolaceError::ApiAuth("Invalid token".to_string())),
            IdentityBackend::Userinfo { url } => self.verify_remote(url, token).await,
            IdentityBackend::Unavailable { reason } => {
                Err(SolaceError::ApiAuth(reason.clone()))
            }
        }
    }

    async fn verify_remote(&self, url: &str, token: &str) -> Result<String> {
        let client = self
            .client
            .as_deref()
            .ok_or_else(|| SolaceError::ApiAuth("Identity client not initialized".to_string()))?;

        let response = client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| SolaceError::ApiAuth(format!("Identity provider unreachable: {e}")))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED
            || response.status() == reqwest::StatusCode::FORBIDDEN
        {
            return Err(SolaceError::ApiAuth("Invalid token".to_string()));
        }
        if !response.status().is_success() {
            return Err(SolaceError::ApiAuth(format!(
                "Identity provider returned status {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SolaceError::ApiAuth(format!("Invalid userinfo response: {e}")))?;

        body.get("sub")
            .and_then(Value::as_str)
            .filter(|sub| !sub.is_empty())
            .map(|sub| sub.to_string())
            .ok_or_else(|| {
                SolaceError::ApiAuth("Userinfo response missing subject claim".to_string())
            })
    }
}
