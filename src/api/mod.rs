//! Planner API boundary
//!
//! - `PlannerApi` trait - The only way agents and workers reach the planner
//! - `GameClient` - HTTP implementation against the hosted planner
//! - `ClientConfig` - Credentials and endpoints
//! - Wire types, including the validated `Decision` enum

pub mod auth;
pub mod client;
pub mod config;
pub mod provider;
pub mod types;

pub use auth::{token_provider, ApiKeyExchange, FnTokenProvider, TokenProvider};
pub use client::GameClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TOKEN_URL};
pub use provider::PlannerApi;
pub use types::{
    ActionResponse, AgentActionRequest, AgentStateResponse, CreateAgentRequest,
    CurrentTaskResponse, Decision, DecisionKind, FunctionCall, HlpResponse, Location,
    LlpResponse, WorkerActionRequest,
};
