//! Access tokens for the planner API
//!
//! Every planner call is authorized with a short-lived bearer token. By
//! default the token is obtained by exchanging the API key; a custom provider
//! can be plugged in instead (e.g. a token cache or a proxy).
//!
//! # Example: custom token source
//!
//! ```ignore
//! use game_agent_sdk::api::{token_provider, GameClient};
//!
//! let client = GameClient::new(config).with_token_provider(token_provider(|| async {
//!     let token = my_vault.fetch_game_token().await?;
//!     Ok(token)
//! }));
//! ```

use std::future::Future;
use std::pin::Pin;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

/// Type alias for the boxed future returned by token providers
pub type TokenFuture<'a> = Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

/// Source of bearer tokens
///
/// Called before each planner request. Implementations handle caching and
/// refresh internally.
pub trait TokenProvider: Send + Sync {
    fn access_token(&self) -> TokenFuture<'_>;
}

/// Wrapper to implement TokenProvider for async closures
pub struct FnTokenProvider<F> {
    func: F,
}

impl<F, Fut> TokenProvider for FnTokenProvider<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<String>> + Send + 'static,
{
    fn access_token(&self) -> TokenFuture<'_> {
        Box::pin((self.func)())
    }
}

/// Create a token provider from an async closure
pub fn token_provider<F, Fut>(func: F) -> FnTokenProvider<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<String>> + Send + 'static,
{
    FnTokenProvider { func }
}

#[derive(Debug, Deserialize)]
struct TokenEnvelope {
    data: TokenData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenData {
    access_token: String,
}

/// Default provider: exchanges the API key for a fresh token on every call
pub struct ApiKeyExchange {
    client: Client,
    api_key: String,
    token_url: String,
}

impl ApiKeyExchange {
    pub fn new(client: Client, api_key: impl Into<String>, token_url: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            token_url: token_url.into(),
        }
    }

    async fn exchange(&self) -> Result<String> {
        let response = self
            .client
            .post(&self.token_url)
            .header("x-api-key", &self.api_key)
            .json(&json!({ "data": {} }))
            .send()
            .await
            .context("Failed to send token request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read token response body")?;

        if !status.is_success() {
            tracing::error!("[Auth] Token exchange failed: {} - {}", status, body);
            anyhow::bail!("Failed to get token ({}): {}", status, body);
        }

        let envelope: TokenEnvelope =
            serde_json::from_str(&body).context("Failed to parse token response")?;

        Ok(envelope.data.access_token)
    }
}

impl TokenProvider for ApiKeyExchange {
    fn access_token(&self) -> TokenFuture<'_> {
        Box::pin(self.exchange())
    }
}
