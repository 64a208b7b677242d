//! Standalone Worker
//!
//! Runs a single action space against the planner, without routing between
//! workers. The planner is given a task and then polled for decisions until it
//! answers `wait`.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use super::config::WorkerConfig;
use super::executor::{FunctionExecutor, StepOutcome};
use crate::api::{
    ClientConfig, CreateAgentRequest, Decision, GameClient, PlannerApi, WorkerActionRequest,
};
use crate::core::{GameError, GameResult, WorkerState};
use crate::functions::FunctionResult;

/// Name under which standalone workers are registered with the planner
const STANDALONE_WORKER_NAME: &str = "StandaloneWorker";

/// A worker that talks to the planner on its own
///
/// # Example
///
/// ```ignore
/// let worker = Worker::from_api_key(
///     &api_key,
///     "A worker specialized in getting price predictions",
///     WorkerConfig::new("prices", "Price predictions", get_state, vec![get_price_prediction]),
/// )
/// .await?;
///
/// worker.run("What's the price of BTC in 5min?").await?;
/// ```
pub struct Worker<S = Value> {
    api: Arc<dyn PlannerApi>,
    agent_id: String,
    description: String,
    config: WorkerConfig<S>,
    state: WorkerState<S>,
    submission_id: Option<String>,
    function_result: Option<FunctionResult>,
}

impl<S: Serialize> Worker<S> {
    /// Create a worker and register it with the planner (one RPC)
    ///
    /// `description` is what the planner sees as the worker's character;
    /// `config.worker_description` is not used by a standalone worker.
    pub async fn new(
        api: Arc<dyn PlannerApi>,
        description: impl Into<String>,
        config: WorkerConfig<S>,
    ) -> GameResult<Self> {
        let description = description.into();

        let state = config
            .state_fn()
            .next_state(&FunctionResult::bootstrap(), None);

        let agent_id = api
            .create_agent(&CreateAgentRequest {
                name: STANDALONE_WORKER_NAME.to_string(),
                description: description.clone(),
                goal: "N/A".to_string(),
            })
            .await?;

        tracing::info!(
            "[Worker] Created standalone worker '{}' (agent id {}) with {} functions",
            config.id,
            agent_id,
            config.action_space().len()
        );

        Ok(Self {
            api,
            agent_id,
            description,
            config,
            state,
            submission_id: None,
            function_result: None,
        })
    }

    /// Create a worker backed by the hosted planner
    pub async fn from_api_key(
        api_key: &str,
        description: impl Into<String>,
        config: WorkerConfig<S>,
    ) -> GameResult<Self> {
        let client = GameClient::new(ClientConfig::new(api_key)?);
        Self::new(Arc::new(client), description, config).await
    }

    pub fn id(&self) -> &str {
        &self.config.id
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Current state, including the standing instruction
    pub fn state(&self) -> &WorkerState<S> {
        &self.state
    }

    /// Result of the most recent function call
    pub fn function_result(&self) -> Option<&FunctionResult> {
        self.function_result.as_ref()
    }

    /// Whether a task is in progress
    pub fn has_task(&self) -> bool {
        self.submission_id.is_some()
    }

    /// Give the worker a task (one RPC)
    pub async fn set_task(&mut self, task: &str) -> GameResult<&str> {
        tracing::info!("[Worker] Setting task: {}", task);
        let submission_id = self.api.set_worker_task(&self.agent_id, task).await?;
        Ok(self.submission_id.insert(submission_id).as_str())
    }

    /// Ask the planner for one decision and carry it out
    pub async fn step(&mut self) -> GameResult<StepOutcome> {
        let submission_id = self.submission_id.clone().ok_or(GameError::NoTask)?;

        let bootstrap = FunctionResult::bootstrap();
        let last_result = self.function_result.as_ref().unwrap_or(&bootstrap);

        let request = WorkerActionRequest {
            environment: serde_json::to_value(&self.state)?,
            functions: self.config.action_space().definitions(),
            action_result: last_result.to_action_report(),
        };

        let response = self
            .api
            .get_worker_action(&self.agent_id, &submission_id, &request)
            .await?;
        let kind = response.decision.kind();
        tracing::info!("[Worker] {} step: {}", self.config.id, kind);

        let mut produced = None;
        match response.decision {
            Decision::CallFunction(call) | Decision::ContinueFunction(call) => {
                let result =
                    FunctionExecutor::execute(&self.config.id, self.config.action_space(), &call)
                        .await?;
                self.state = self.config.next_state(&result, Some(&self.state));
                self.function_result = Some(result.clone());
                produced = Some(result);
            }
            Decision::Wait => {
                tracing::info!("[Worker] Task completed or ended (not possible with current actions)");
                self.submission_id = None;
            }
            Decision::GoTo { .. } => {
                return Err(GameError::UnexpectedDecision(kind.to_string()));
            }
        }

        Ok(StepOutcome {
            kind,
            function_result: produced,
            planner_state: response.agent_state,
        })
    }

    /// Set a task and step until the planner ends it
    pub async fn run(&mut self, task: &str) -> GameResult<()> {
        self.set_task(task).await?;
        while self.has_task() {
            self.step().await?;
        }
        tracing::info!("[Worker] {} finished task", self.config.id);
        Ok(())
    }
}
