//! HTTP client for the hosted planner
//!
//! All planner routes are reached through a single prompt proxy: the request
//! is wrapped in an envelope naming the route, posted with a bearer token, and
//! the `data` field of the reply is the route's response.
//!
//! ```ignore
//! // From environment variables
//! let client = GameClient::from_env()?;
//!
//! // With explicit API key
//! let client = GameClient::new(ClientConfig::new("apt-...")?);
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use super::auth::{ApiKeyExchange, TokenProvider};
use super::config::ClientConfig;
use super::provider::PlannerApi;
use super::types::{
    ActionResponse, AgentActionRequest, CreateAgentRequest, Location, WorkerActionRequest,
};
use crate::core::{GameError, GameResult};

/// [`PlannerApi`] implementation over HTTPS
pub struct GameClient {
    client: Client,
    config: ClientConfig,
    tokens: Arc<dyn TokenProvider>,
}

impl GameClient {
    /// Create a client that exchanges the configured API key for tokens
    pub fn new(config: ClientConfig) -> Self {
        let client = Client::new();
        let tokens = Arc::new(ApiKeyExchange::new(
            client.clone(),
            config.api_key.clone(),
            config.token_url.clone(),
        ));

        Self {
            client,
            config,
            tokens,
        }
    }

    /// Create a client from environment variables (see [`ClientConfig::from_env`])
    pub fn from_env() -> GameResult<Self> {
        Ok(Self::new(ClientConfig::from_env()?))
    }

    /// Replace the token source
    pub fn with_token_provider<P: TokenProvider + 'static>(mut self, provider: P) -> Self {
        self.tokens = Arc::new(provider);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Post `data` to a planner route through the prompt proxy
    async fn post(&self, route: &str, data: Value) -> GameResult<Value> {
        let token = self
            .tokens
            .access_token()
            .await
            .map_err(|e| GameError::Auth(format!("{:#}", e)))?;

        let url = format!("{}/prompts", self.config.base_url);
        let body = prompt_envelope(route, data);
        tracing::debug!("[GameClient] POST {} -> {}", route, body);

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        tracing::debug!("[GameClient] Response status: {}", status);
        tracing::debug!("[GameClient] Response body: {}", text);

        if !status.is_success() {
            tracing::error!("[GameClient] API error on {}: {} - {}", route, status, text);
        }
        read_data(status, text)
    }
}

/// Check the proxy reply and extract its `data` field
fn read_data(status: StatusCode, text: String) -> GameResult<Value> {
    if !status.is_success() {
        return Err(GameError::Api {
            status: status.as_u16(),
            body: text,
        });
    }

    let mut reply: Value = serde_json::from_str(&text)?;
    match reply.get_mut("data").map(Value::take) {
        Some(data) if !data.is_null() => Ok(data),
        _ => Err(GameError::MissingField("data")),
    }
}

/// Wrap a route call for the prompt proxy
fn prompt_envelope(route: &str, data: Value) -> Value {
    json!({
        "data": {
            "method": "post",
            "headers": { "Content-Type": "application/json" },
            "route": route,
            "data": data,
        }
    })
}

fn string_field(data: &Value, field: &'static str) -> GameResult<String> {
    match data.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(GameError::MissingField(field)),
    }
}

#[async_trait]
impl PlannerApi for GameClient {
    async fn create_agent(&self, request: &CreateAgentRequest) -> GameResult<String> {
        tracing::info!("[GameClient] Creating agent '{}'", request.name);
        let data = self.post("/v2/agents", serde_json::to_value(request)?).await?;
        string_field(&data, "id")
    }

    async fn create_workers(&self, locations: &[Location]) -> GameResult<String> {
        tracing::info!("[GameClient] Registering {} workers", locations.len());
        let data = self
            .post("/v2/maps", json!({ "locations": locations }))
            .await?;
        string_field(&data, "id")
    }

    async fn set_worker_task(&self, agent_id: &str, task: &str) -> GameResult<String> {
        let route = format!("/v2/agents/{}/tasks", agent_id);
        let data = self.post(&route, json!({ "task": task })).await?;
        string_field(&data, "submission_id")
    }

    async fn get_worker_action(
        &self,
        agent_id: &str,
        submission_id: &str,
        request: &WorkerActionRequest,
    ) -> GameResult<ActionResponse> {
        let route = format!("/v2/agents/{}/tasks/{}/next", agent_id, submission_id);
        let data = self.post(&route, serde_json::to_value(request)?).await?;
        ActionResponse::from_value(data)
    }

    async fn get_agent_action(
        &self,
        agent_id: &str,
        request: &AgentActionRequest,
    ) -> GameResult<ActionResponse> {
        let route = format!("/v2/agents/{}/actions", agent_id);
        let data = self.post(&route, serde_json::to_value(request)?).await?;
        ActionResponse::from_value(data)
    }
}
