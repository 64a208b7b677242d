//! Planner client configuration

use std::env;

use crate::core::{GameError, GameResult};

/// Default planner endpoint
pub const DEFAULT_BASE_URL: &str = "https://game.virtuals.io";

/// Default access-token exchange endpoint
pub const DEFAULT_TOKEN_URL: &str = "https://api.virtuals.io/api/accesses/tokens";

/// Connection settings for [`GameClient`](super::GameClient)
#[derive(Clone)]
pub struct ClientConfig {
    /// API key exchanged for access tokens
    pub api_key: String,
    pub base_url: String,
    pub token_url: String,
}

impl ClientConfig {
    /// Create a configuration with default endpoints
    ///
    /// Fails with [`GameError::MissingApiKey`] if the key is empty.
    pub fn new(api_key: impl Into<String>) -> GameResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(GameError::MissingApiKey);
        }

        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
        })
    }

    /// Create a configuration from environment variables
    ///
    /// Reads from:
    /// - `GAME_API_KEY` (required)
    /// - `GAME_BASE_URL` (optional)
    /// - `GAME_TOKEN_URL` (optional)
    pub fn from_env() -> GameResult<Self> {
        tracing::info!("Loading planner client config from environment");

        let api_key = env::var("GAME_API_KEY").map_err(|_| GameError::MissingApiKey)?;
        let mut config = Self::new(api_key)?;

        if let Ok(base_url) = env::var("GAME_BASE_URL") {
            config = config.with_base_url(base_url);
        }
        if let Ok(token_url) = env::var("GAME_TOKEN_URL") {
            config = config.with_token_url(token_url);
        }

        config.validate()?;
        tracing::info!("Planner base URL: {}", config.base_url);
        Ok(config)
    }

    /// Check that both endpoints are http(s) URLs
    pub fn validate(&self) -> GameResult<()> {
        for (name, url) in [("base_url", &self.base_url), ("token_url", &self.token_url)] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(GameError::invalid_config(format!(
                    "{} must be an http(s) URL, got '{}'",
                    name, url
                )));
            }
        }
        Ok(())
    }

    /// Override the planner endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the token exchange endpoint
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("token_url", &self.token_url)
            .finish()
    }
}
