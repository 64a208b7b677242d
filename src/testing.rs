//! Test doubles shared by the agent and worker tests

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::api::{
    ActionResponse, AgentActionRequest, CreateAgentRequest, Decision, FunctionCall, Location,
    PlannerApi, WorkerActionRequest,
};
use crate::core::{GameError, GameResult};
use crate::functions::{Argument, Function, FunctionResultStatus, InfoMap};

/// Planner that replays a fixed list of decisions and records every request
#[derive(Default)]
pub(crate) struct ScriptedPlanner {
    decisions: Mutex<VecDeque<ActionResponse>>,
    pub created_agents: Mutex<Vec<CreateAgentRequest>>,
    pub locations: Mutex<Vec<Location>>,
    pub tasks: Mutex<Vec<String>>,
    pub agent_requests: Mutex<Vec<AgentActionRequest>>,
    pub worker_requests: Mutex<Vec<WorkerActionRequest>>,
}

impl ScriptedPlanner {
    pub fn new(decisions: Vec<Decision>) -> Self {
        Self {
            decisions: Mutex::new(decisions.into_iter().map(ActionResponse::new).collect()),
            ..Default::default()
        }
    }

    fn next_decision(&self) -> GameResult<ActionResponse> {
        self.decisions
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| GameError::Api {
                status: 500,
                body: "script exhausted".into(),
            })
    }

    pub fn agent_requests(&self) -> Vec<AgentActionRequest> {
        self.agent_requests.lock().unwrap().clone()
    }

    pub fn worker_requests(&self) -> Vec<WorkerActionRequest> {
        self.worker_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlannerApi for ScriptedPlanner {
    async fn create_agent(&self, request: &CreateAgentRequest) -> GameResult<String> {
        let mut created = self.created_agents.lock().unwrap();
        created.push(request.clone());
        Ok(format!("agent-{}", created.len()))
    }

    async fn create_workers(&self, locations: &[Location]) -> GameResult<String> {
        self.locations.lock().unwrap().extend_from_slice(locations);
        Ok("map-1".into())
    }

    async fn set_worker_task(&self, _agent_id: &str, task: &str) -> GameResult<String> {
        let mut tasks = self.tasks.lock().unwrap();
        tasks.push(task.to_string());
        Ok(format!("submission-{}", tasks.len()))
    }

    async fn get_worker_action(
        &self,
        _agent_id: &str,
        _submission_id: &str,
        request: &WorkerActionRequest,
    ) -> GameResult<ActionResponse> {
        self.worker_requests.lock().unwrap().push(request.clone());
        self.next_decision()
    }

    async fn get_agent_action(
        &self,
        _agent_id: &str,
        request: &AgentActionRequest,
    ) -> GameResult<ActionResponse> {
        self.agent_requests.lock().unwrap().push(request.clone());
        self.next_decision()
    }
}

/// `CALL_FUNCTION` decision with `{"object": {"value": object}}`
pub(crate) fn call(fn_name: &str, fn_id: &str, object: &str) -> Decision {
    let mut args = Map::new();
    args.insert("object".into(), json!({ "value": object }));
    Decision::CallFunction(FunctionCall::new(fn_name, fn_id, args))
}

pub(crate) fn go_to(location_id: &str) -> Decision {
    Decision::GoTo {
        location_id: location_id.into(),
    }
}

/// `take(object)` from the chaos agent demo
pub(crate) fn take_fn() -> Function {
    Function::new("take", "Take object")
        .with_arg(Argument::new("object", "Object to take").with_type("item"))
        .with_fn(|args| {
            let object = args.get_str("object")?;
            if object.is_empty() {
                return Ok((
                    FunctionResultStatus::Failed,
                    "No object specified".to_string(),
                    InfoMap::new(),
                ));
            }
            Ok((
                FunctionResultStatus::Done,
                format!("Successfully took the {}", object),
                InfoMap::new(),
            ))
        })
}

/// State that counts function calls and remembers the last feedback
pub(crate) fn counting_state(
    result: Option<&crate::functions::FunctionResult>,
    previous: Option<&Value>,
) -> Value {
    match previous {
        None => json!({ "calls": 0, "last": null }),
        Some(prev) => json!({
            "calls": prev["calls"].as_u64().unwrap_or(0) + 1,
            "last": result.and_then(|r| r.feedback_message.clone()),
        }),
    }
}
