//! Planner API trait
//!
//! The remote planner is an opaque decision oracle. Agents and workers only
//! talk to it through this trait, so the HTTP client can be swapped for a
//! scripted planner in tests or a proxy in production.

use async_trait::async_trait;

use super::types::{
    ActionResponse, AgentActionRequest, CreateAgentRequest, Location, WorkerActionRequest,
};
use crate::core::GameResult;

/// Remote calls used by agents and workers
///
/// Every method is a single request/response call. Implementations may retry
/// internally; the step loops never do.
#[async_trait]
pub trait PlannerApi: Send + Sync {
    /// Create an agent identity, returning its id
    async fn create_agent(&self, request: &CreateAgentRequest) -> GameResult<String>;

    /// Register the worker map, returning the map id
    async fn create_workers(&self, locations: &[Location]) -> GameResult<String>;

    /// Set the task of a standalone worker, returning the submission id
    async fn set_worker_task(&self, agent_id: &str, task: &str) -> GameResult<String>;

    /// Fetch the next decision for a standalone worker
    async fn get_worker_action(
        &self,
        agent_id: &str,
        submission_id: &str,
        request: &WorkerActionRequest,
    ) -> GameResult<ActionResponse>;

    /// Fetch the next decision for a multi-worker agent
    async fn get_agent_action(
        &self,
        agent_id: &str,
        request: &AgentActionRequest,
    ) -> GameResult<ActionResponse>;
}
