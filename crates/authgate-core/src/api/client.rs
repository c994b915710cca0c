//! HTTP client for the token-issuance endpoint.
//!
//! [`HttpAuthClient`] performs the single credential-for-token exchange the
//! login flow needs. Retry policy, if any, belongs to the flow layer; this
//! client makes exactly one round trip per call.

use std::time::Duration;

use anyhow::Result;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Credentials, SessionToken};
use crate::session::SessionRegistry;

use super::AuthError;

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Path of the token-issuance endpoint, relative to the API base URL.
const TOKENS_PATH: &str = "/tokens";

#[derive(Serialize)]
struct TokenRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

/// Exchanges a credential pair for a session token.
#[allow(async_fn_in_trait)]
pub trait AuthClient {
    async fn exchange(&self, credentials: &Credentials) -> Result<SessionToken, AuthError>;
}

/// Client for the remote token authority.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpAuthClient {
    client: Client,
    base_url: String,
}

impl HttpAuthClient {
    /// Create a new client against the given API base URL
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

impl AuthClient for HttpAuthClient {
    async fn exchange(&self, credentials: &Credentials) -> Result<SessionToken, AuthError> {
        let url = format!("{}{}", self.base_url, TOKENS_PATH);
        let payload = TokenRequest {
            username: &credentials.username,
            password: &credentials.password,
        };

        debug!(url = %url, "requesting session token");

        let response = self.client.post(&url).json(&payload).send().await?;

        let status = response.status();
        let body = response.text().await.map_err(AuthError::Transport)?;

        if !status.is_success() {
            return Err(AuthError::from_status(status, &body));
        }

        let parsed: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| AuthError::Malformed(format!("undecodable token response: {}", e)))?;

        Ok(SessionToken::new(parsed.token))
    }
}

/// Headers every outgoing authenticated request carries: JSON content type
/// always, the current session token when one exists.
pub fn signed_headers(session: &SessionRegistry) -> Result<header::HeaderMap> {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );
    if let Some(token) = session.token() {
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(token.as_str())?,
        );
    }
    Ok(headers)
}
