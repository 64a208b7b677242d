//! Multi-worker Agent
//!
//! The agent registers a map of workers with the planner and then loops:
//!
//! 1. Send the active worker's state and function definitions, the agent
//!    state and the last function result to the planner
//! 2. Carry out the decision: call a function in the active worker, wait, or
//!    switch the active worker
//! 3. Fold the last function result into the agent state
//!
//! Worker states are kept per worker id, so switching workers never touches
//! another worker's accumulated state.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use super::config::{AgentOptions, WorkerConfig};
use super::executor::{FunctionExecutor, StepOutcome};
use super::worker::Worker;
use crate::api::{
    AgentActionRequest, ClientConfig, CreateAgentRequest, Decision, GameClient, PlannerApi,
};
use crate::core::{GameError, GameResult, SharedStateFn, WorkerState};
use crate::functions::FunctionResult;
use crate::session::Session;

/// Protocol version sent with every action request
const PROTOCOL_VERSION: &str = "v2";

/// Agent that routes planner decisions between several workers
///
/// # Example
///
/// ```ignore
/// let mut agent = Agent::from_api_key(
///     &api_key,
///     AgentOptions::new("Chaos", "Conquer the world by causing chaos.", "You are mischievous"),
///     get_agent_state,
///     vec![fruit_thrower, furniture_thrower],
/// )
/// .await?;
///
/// agent.compile().await?;
/// agent.run().await?;
/// ```
pub struct Agent<A = Value, S = Value> {
    api: Arc<dyn PlannerApi>,
    options: AgentOptions,
    agent_id: String,
    session: Session,

    /// Workers in insertion order; the first one starts active
    workers: Vec<WorkerConfig<S>>,
    map_id: Option<String>,
    current_worker_id: Option<String>,
    worker_states: HashMap<String, WorkerState<S>>,

    agent_state_fn: SharedStateFn<A>,
    agent_state: A,
}

impl<A: Serialize, S: Serialize> Agent<A, S> {
    /// Create an agent and register it with the planner (one RPC)
    ///
    /// The agent state callback is called once with no result and no previous
    /// state to produce the initial agent state.
    pub async fn new<F>(
        api: Arc<dyn PlannerApi>,
        options: AgentOptions,
        agent_state_fn: F,
        workers: Vec<WorkerConfig<S>>,
    ) -> GameResult<Self>
    where
        F: Fn(Option<&FunctionResult>, Option<&A>) -> A + Send + Sync + 'static,
        A: 'static,
    {
        Self::with_state_provider(api, options, Arc::new(agent_state_fn), workers).await
    }

    /// Create an agent from a shared [`StateFn`](crate::core::StateFn)
    pub async fn with_state_provider(
        api: Arc<dyn PlannerApi>,
        options: AgentOptions,
        agent_state_fn: SharedStateFn<A>,
        workers: Vec<WorkerConfig<S>>,
    ) -> GameResult<Self> {
        let agent_state = agent_state_fn.next_state(None, None);

        let agent_id = api
            .create_agent(&CreateAgentRequest {
                name: options.name.clone(),
                description: options.description.clone(),
                goal: options.goal.clone(),
            })
            .await?;

        tracing::info!("[Agent] Created agent '{}' with id {}", options.name, agent_id);

        let mut agent = Self {
            api,
            options,
            agent_id,
            session: Session::new(),
            workers: Vec::new(),
            map_id: None,
            current_worker_id: None,
            worker_states: HashMap::new(),
            agent_state_fn,
            agent_state,
        };
        for worker in workers {
            agent.add_worker(worker);
        }

        Ok(agent)
    }

    /// Create an agent backed by the hosted planner
    ///
    /// Fails with [`GameError::MissingApiKey`] before any RPC if the key is empty.
    pub async fn from_api_key<F>(
        api_key: &str,
        options: AgentOptions,
        agent_state_fn: F,
        workers: Vec<WorkerConfig<S>>,
    ) -> GameResult<Self>
    where
        F: Fn(Option<&FunctionResult>, Option<&A>) -> A + Send + Sync + 'static,
        A: 'static,
    {
        let client = GameClient::new(ClientConfig::new(api_key)?);
        Self::new(Arc::new(client), options, agent_state_fn, workers).await
    }

    /// Register the workers with the planner and seed every worker's state
    ///
    /// Must be called before stepping, and again after adding workers.
    /// Returns the map id.
    pub async fn compile(&mut self) -> GameResult<String> {
        let first = self.workers.first().ok_or(GameError::NoWorkers)?;
        let first_id = first.id.clone();

        let locations: Vec<_> = self.workers.iter().map(|w| w.location()).collect();
        let map_id = self.api.create_workers(&locations).await?;

        let bootstrap = FunctionResult::bootstrap();
        self.worker_states = self
            .workers
            .iter()
            .map(|w| (w.id.clone(), w.next_state(&bootstrap, None)))
            .collect();

        tracing::info!(
            "[Agent] Compiled {} workers into map {}, starting with '{}'",
            self.workers.len(),
            map_id,
            first_id
        );

        self.current_worker_id = Some(first_id);
        self.map_id = Some(map_id.clone());
        Ok(map_id)
    }

    /// Add a worker, replacing any worker with the same id in place
    ///
    /// Adding to a compiled agent un-compiles it.
    pub fn add_worker(&mut self, config: WorkerConfig<S>) {
        if self.map_id.take().is_some() {
            tracing::warn!("[Agent] Worker '{}' added after compile(); compile again", config.id);
        }

        match self.workers.iter_mut().find(|w| w.id == config.id) {
            Some(existing) => *existing = config,
            None => self.workers.push(config),
        }
    }

    /// Get a worker's configuration
    pub fn get_worker_config(&self, worker_id: &str) -> Option<&WorkerConfig<S>> {
        self.workers.iter().find(|w| w.id == worker_id)
    }

    /// Build a standalone worker from one of this agent's workers
    ///
    /// The standalone worker uses the agent's description as its character.
    pub async fn get_worker(&self, worker_id: &str) -> GameResult<Worker<S>> {
        let config = self
            .get_worker_config(worker_id)
            .ok_or_else(|| GameError::UnknownWorker(worker_id.to_string()))?
            .clone();

        Worker::new(Arc::clone(&self.api), self.options.description.clone(), config).await
    }

    /// Start a new session (new id, no previous function result)
    pub fn reset(&mut self) {
        self.session.reset();
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn options(&self) -> &AgentOptions {
        &self.options
    }

    pub fn map_id(&self) -> Option<&str> {
        self.map_id.as_deref()
    }

    pub fn current_worker_id(&self) -> Option<&str> {
        self.current_worker_id.as_deref()
    }

    /// Worker ids in insertion order
    pub fn worker_ids(&self) -> Vec<&str> {
        self.workers.iter().map(|w| w.id.as_str()).collect()
    }

    /// Stored state of a worker
    pub fn worker_state(&self, worker_id: &str) -> Option<&WorkerState<S>> {
        self.worker_states.get(worker_id)
    }

    pub fn agent_state(&self) -> &A {
        &self.agent_state
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Ask the planner for one decision and carry it out
    pub async fn step(&mut self) -> GameResult<StepOutcome> {
        let map_id = self.map_id.clone().ok_or(GameError::NotCompiled)?;
        let worker_id = self.current_worker_id.clone().ok_or(GameError::NotCompiled)?;

        let worker = self
            .workers
            .iter()
            .find(|w| w.id == worker_id)
            .ok_or_else(|| GameError::UnknownWorker(worker_id.clone()))?;
        let worker_state = self
            .worker_states
            .get(&worker_id)
            .ok_or_else(|| GameError::UnknownWorker(worker_id.clone()))?;

        let bootstrap = FunctionResult::bootstrap();
        let last_result = self.session.function_result().unwrap_or(&bootstrap);

        let request = AgentActionRequest {
            location: worker_id.clone(),
            map_id,
            environment: serde_json::to_value(worker_state)?,
            functions: worker.action_space().definitions(),
            events: Map::new(),
            agent_state: serde_json::to_value(&self.agent_state)?,
            current_action: last_result.to_action_report(),
            version: PROTOCOL_VERSION.to_string(),
        };

        let response = self.api.get_agent_action(&self.agent_id, &request).await?;
        let kind = response.decision.kind();

        tracing::info!("[Agent] Step in '{}': {}", worker_id, kind);
        if let Some(task) = &response.agent_state.current_task {
            tracing::debug!("[Agent] Current task: {}", task.task);
        }
        if response.agent_state.task_changed() {
            tracing::info!("[Agent] New task generated");
        }

        let mut produced = None;
        match response.decision {
            Decision::CallFunction(call) | Decision::ContinueFunction(call) => {
                let result =
                    FunctionExecutor::execute(&worker_id, worker.action_space(), &call).await?;

                let updated = worker.next_state(&result, self.worker_states.get(&worker_id));
                self.worker_states.insert(worker_id.clone(), updated);

                self.session.set_function_result(result.clone());
                produced = Some(result);
            }
            Decision::Wait => {
                tracing::info!("[Agent] Task completed or ended (not possible with current actions)");
            }
            Decision::GoTo { location_id } => {
                if !self.worker_states.contains_key(&location_id) {
                    return Err(GameError::UnknownWorker(location_id));
                }
                tracing::info!("[Agent] Next worker selected: {}", location_id);
                self.current_worker_id = Some(location_id);
            }
        }

        // Runs on every step; WAIT and GO_TO see the carried-forward result
        self.agent_state = self
            .agent_state_fn
            .next_state(self.session.function_result(), Some(&self.agent_state));

        Ok(StepOutcome {
            kind,
            function_result: produced,
            planner_state: response.agent_state,
        })
    }

    /// Start a fresh session and step until an error occurs
    ///
    /// There is no in-band termination; stop the process (or drop the future)
    /// to end the run.
    pub async fn run(&mut self) -> GameResult<()> {
        self.reset();
        tracing::info!("[Agent] Running session {}", self.session.id());
        loop {
            self.step().await?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ActionResponse, DecisionKind};
    use crate::functions::{Function, FunctionResultStatus};
    use crate::testing::{call, counting_state, go_to, take_fn, ScriptedPlanner};
    use serde_json::json;

    fn options() -> AgentOptions {
        AgentOptions::new("Chaos", "Cause chaos", "A mischievous agent")
    }

    fn worker(id: &str, functions: Vec<Function>) -> WorkerConfig {
        WorkerConfig::new(id, format!("{} worker", id), counting_state, functions)
    }

    async fn agent(planner: Arc<ScriptedPlanner>, workers: Vec<WorkerConfig>) -> Agent {
        Agent::new(planner, options(), counting_state, workers)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_empty_api_key_fails_fast() {
        let result: GameResult<Agent> =
            Agent::from_api_key("", options(), counting_state, vec![]).await;
        assert!(matches!(result, Err(GameError::MissingApiKey)));
    }

    #[tokio::test]
    async fn test_new_creates_agent_and_initial_state() {
        let planner = Arc::new(ScriptedPlanner::new(vec![]));
        let agent = agent(planner.clone(), vec![]).await;

        assert_eq!(agent.agent_id(), "agent-1");
        assert_eq!(agent.agent_state(), &json!({ "calls": 0, "last": null }));

        let created = planner.created_agents.lock().unwrap().clone();
        assert_eq!(created[0].name, "Chaos");
        assert_eq!(created[0].goal, "Cause chaos");
        assert_eq!(created[0].description, "A mischievous agent");
    }

    #[tokio::test]
    async fn test_compile_requires_workers() {
        let planner = Arc::new(ScriptedPlanner::new(vec![]));
        let mut agent = agent(planner, vec![]).await;
        assert!(matches!(agent.compile().await, Err(GameError::NoWorkers)));
    }

    #[tokio::test]
    async fn test_step_requires_compile() {
        let planner = Arc::new(ScriptedPlanner::new(vec![Decision::Wait]));
        let mut agent = agent(planner, vec![worker("w1", vec![take_fn()])]).await;
        assert!(matches!(agent.step().await, Err(GameError::NotCompiled)));
    }

    #[tokio::test]
    async fn test_compile_registers_and_seeds() {
        let planner = Arc::new(ScriptedPlanner::new(vec![]));
        let w1 = worker("w1", vec![take_fn()]).with_instruction("be quick");
        let w2 = worker("w2", vec![take_fn()]);
        let mut agent = agent(planner.clone(), vec![w1, w2]).await;

        let map_id = agent.compile().await.unwrap();
        assert_eq!(map_id, "map-1");
        assert_eq!(agent.current_worker_id(), Some("w1"));

        let locations = planner.locations.lock().unwrap().clone();
        assert_eq!(locations.len(), 2);
        assert_eq!(locations[1].id, "w2");
        assert_eq!(locations[1].name, "w2");
        assert_eq!(locations[1].description, "w2 worker");

        let seeded = agent.worker_state("w1").unwrap();
        assert_eq!(seeded.instructions, "be quick");
        assert_eq!(seeded.state, json!({ "calls": 0, "last": null }));
        assert_eq!(agent.worker_state("w2").unwrap().instructions, "");
    }

    #[tokio::test]
    async fn test_compile_seeds_without_previous_state() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);
        let w1 = WorkerConfig::new(
            "w1",
            "Recording worker",
            move |result: Option<&FunctionResult>, previous: Option<&Value>| {
                recorder
                    .lock()
                    .unwrap()
                    .push((result.map(|r| r.action_id.clone()), previous.cloned()));
                json!({ "seeded": true })
            },
            vec![take_fn()],
        );

        let planner = Arc::new(ScriptedPlanner::new(vec![]));
        let mut agent = agent(planner, vec![w1]).await;
        assert!(seen.lock().unwrap().is_empty());

        agent.compile().await.unwrap();

        // Seeded from the bootstrap result alone, never from the agent state
        assert_eq!(seen.lock().unwrap().clone(), vec![(Some(String::new()), None)]);
        assert_eq!(agent.worker_state("w1").unwrap().state, json!({ "seeded": true }));
    }

    #[tokio::test]
    async fn test_call_then_wait() {
        let planner = Arc::new(ScriptedPlanner::new(vec![
            call("take", "a1", "apple"),
            Decision::Wait,
        ]));
        let mut agent = agent(planner.clone(), vec![worker("w1", vec![take_fn()])]).await;
        agent.compile().await.unwrap();

        let first = agent.step().await.unwrap();
        assert_eq!(first.kind, DecisionKind::CallFunction);
        let result = first.function_result.unwrap();
        assert_eq!(
            result,
            FunctionResult::done("a1", "Successfully took the apple")
        );
        let after_call = agent.worker_state("w1").unwrap().clone();
        assert_eq!(after_call.state["calls"], 1);

        let second = agent.step().await.unwrap();
        assert_eq!(second.kind, DecisionKind::Wait);
        assert!(second.function_result.is_none());
        assert_eq!(agent.worker_state("w1").unwrap(), &after_call);

        // The agent callback ran on both steps; WAIT saw the carried-forward result
        assert_eq!(agent.agent_state()["calls"], 2);
        assert_eq!(agent.agent_state()["last"], "Successfully took the apple");

        let requests = planner.agent_requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].location, "w1");
        assert_eq!(requests[0].map_id, "map-1");
        assert_eq!(requests[0].version, "v2");
        assert_eq!(requests[0].current_action["action_id"], "");
        assert_eq!(requests[0].functions[0].fn_name, "take");
        assert_eq!(requests[1].current_action["action_id"], "a1");
        assert_eq!(requests[1].current_action["action_status"], "done");
        assert_eq!(requests[1].environment["calls"], 1);
        assert_eq!(requests[1].agent_state["calls"], 1);
    }

    #[tokio::test]
    async fn test_go_to_switches_worker_and_keeps_state() {
        let sit = Function::new("sit", "Sit on object");
        let planner = Arc::new(ScriptedPlanner::new(vec![
            call("take", "a1", "apple"),
            go_to("w2"),
            call("sit", "a2", "chair"),
        ]));
        let mut agent = agent(
            planner.clone(),
            vec![worker("w1", vec![take_fn()]), worker("w2", vec![sit])],
        )
        .await;
        agent.compile().await.unwrap();

        agent.step().await.unwrap();
        let w1_state = agent.worker_state("w1").unwrap().clone();

        let outcome = agent.step().await.unwrap();
        assert_eq!(outcome.kind, DecisionKind::GoTo);
        assert_eq!(agent.current_worker_id(), Some("w2"));
        assert_eq!(agent.worker_state("w1").unwrap(), &w1_state);

        let outcome = agent.step().await.unwrap();
        assert_eq!(
            outcome.function_result.unwrap().feedback_message.as_deref(),
            Some("Default implementation - no action taken")
        );
        assert_eq!(agent.worker_state("w1").unwrap(), &w1_state);
        assert_eq!(agent.worker_state("w2").unwrap().state["calls"], 1);

        let requests = planner.agent_requests();
        assert_eq!(requests[2].location, "w2");
        assert_eq!(requests[2].functions[0].fn_name, "sit");
    }

    #[tokio::test]
    async fn test_go_to_unknown_worker_fails_fast() {
        let planner = Arc::new(ScriptedPlanner::new(vec![go_to("ghost")]));
        let mut agent = agent(planner, vec![worker("w1", vec![take_fn()])]).await;
        agent.compile().await.unwrap();

        let err = agent.step().await.unwrap_err();
        assert!(matches!(err, GameError::UnknownWorker(ref id) if id == "ghost"));
        assert_eq!(agent.current_worker_id(), Some("w1"));
    }

    #[tokio::test]
    async fn test_function_from_other_worker_is_unknown() {
        let planner = Arc::new(ScriptedPlanner::new(vec![call("sit", "a1", "chair")]));
        let mut agent = agent(
            planner,
            vec![
                worker("w1", vec![take_fn()]),
                worker("w2", vec![Function::new("sit", "Sit")]),
            ],
        )
        .await;
        agent.compile().await.unwrap();

        let err = agent.step().await.unwrap_err();
        assert!(matches!(err, GameError::UnknownFunction { ref worker, .. } if worker == "w1"));
    }

    #[tokio::test]
    async fn test_failed_function_flows_to_planner() {
        let planner = Arc::new(ScriptedPlanner::new(vec![
            call("take", "a1", ""),
            Decision::Wait,
        ]));
        let mut agent = agent(planner.clone(), vec![worker("w1", vec![take_fn()])]).await;
        agent.compile().await.unwrap();

        let outcome = agent.step().await.unwrap();
        let result = outcome.function_result.unwrap();
        assert_eq!(result.action_status, FunctionResultStatus::Failed);

        agent.step().await.unwrap();
        let requests = planner.agent_requests();
        assert_eq!(requests[1].current_action["action_status"], "failed");
        assert_eq!(requests[1].current_action["feedback_message"], "No object specified");
        assert_eq!(requests[1].environment["last"], "No object specified");
    }

    #[tokio::test]
    async fn test_null_args_fail_without_ending_run() {
        let null_args = ActionResponse::from_value(json!({
            "action_type": "call_function",
            "agent_state": {},
            "action_args": { "fn_name": "take", "fn_id": "a1", "args": null }
        }))
        .unwrap()
        .decision;
        let planner = Arc::new(ScriptedPlanner::new(vec![
            null_args,
            call("take", "a2", "apple"),
        ]));
        let mut agent = agent(planner.clone(), vec![worker("w1", vec![take_fn()])]).await;
        agent.compile().await.unwrap();

        let outcome = agent.step().await.unwrap();
        let result = outcome.function_result.unwrap();
        assert_eq!(result.action_id, "a1");
        assert_eq!(result.action_status, FunctionResultStatus::Failed);
        assert!(result
            .feedback_message
            .as_deref()
            .unwrap()
            .starts_with("Error executing function:"));
        assert_eq!(agent.worker_state("w1").unwrap().state["calls"], 1);

        let outcome = agent.step().await.unwrap();
        assert!(outcome.function_result.unwrap().is_done());
        assert_eq!(
            planner.agent_requests()[1].current_action["action_status"],
            "failed"
        );
    }

    #[tokio::test]
    async fn test_continue_function_executes() {
        let continued = match call("take", "a3", "pear") {
            Decision::CallFunction(c) => Decision::ContinueFunction(c),
            other => other,
        };
        let planner = Arc::new(ScriptedPlanner::new(vec![continued, Decision::Wait]));
        let mut agent = agent(planner.clone(), vec![worker("w1", vec![take_fn()])]).await;
        agent.compile().await.unwrap();

        let outcome = agent.step().await.unwrap();
        assert_eq!(outcome.kind, DecisionKind::ContinueFunction);
        assert_eq!(
            outcome.function_result.unwrap(),
            FunctionResult::done("a3", "Successfully took the pear")
        );
        assert_eq!(agent.worker_state("w1").unwrap().state["calls"], 1);
        assert_eq!(
            agent.session().function_result().map(|r| r.action_id.as_str()),
            Some("a3")
        );

        agent.step().await.unwrap();
        assert_eq!(planner.agent_requests()[1].current_action["action_id"], "a3");
    }

    #[tokio::test]
    async fn test_run_resets_session_and_propagates_errors() {
        let planner = Arc::new(ScriptedPlanner::new(vec![
            call("take", "a1", "apple"),
            Decision::Wait,
        ]));
        let mut agent = agent(planner.clone(), vec![worker("w1", vec![take_fn()])]).await;
        agent.compile().await.unwrap();
        let before = agent.session().id().to_string();

        // Script runs out after two decisions; the planner error ends the run
        let err = agent.run().await.unwrap_err();
        assert!(matches!(err, GameError::Api { status: 500, .. }));
        assert_ne!(agent.session().id(), before);
        assert_eq!(planner.agent_requests().len(), 3);
    }

    #[tokio::test]
    async fn test_add_worker_keeps_order_and_uncompiles() {
        let planner = Arc::new(ScriptedPlanner::new(vec![]));
        let mut agent = agent(
            planner,
            vec![worker("w1", vec![take_fn()]), worker("w2", vec![])],
        )
        .await;
        agent.compile().await.unwrap();

        agent.add_worker(worker("w1", vec![]).with_instruction("replaced"));
        agent.add_worker(worker("w3", vec![]));

        assert_eq!(agent.worker_ids(), vec!["w1", "w2", "w3"]);
        assert_eq!(agent.get_worker_config("w1").unwrap().instruction(), "replaced");
        assert!(agent.map_id().is_none());
        assert!(matches!(agent.step().await, Err(GameError::NotCompiled)));
    }

    #[tokio::test]
    async fn test_get_worker_uses_agent_description() {
        let planner = Arc::new(ScriptedPlanner::new(vec![]));
        let agent = agent(planner.clone(), vec![worker("w1", vec![take_fn()])]).await;

        let standalone = agent.get_worker("w1").await.unwrap();
        assert_eq!(standalone.id(), "w1");
        assert_eq!(standalone.description(), "A mischievous agent");
        assert!(matches!(
            agent.get_worker("nope").await,
            Err(GameError::UnknownWorker(_))
        ));
    }
}
