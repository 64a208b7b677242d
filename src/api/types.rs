//! Planner API wire types
//!
//! Requests are plain serde structs. Responses go through a loose wire form
//! first and are then validated into the closed [`Decision`] enum, so the
//! step loops never see a decision without the arguments its kind needs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::{GameError, GameResult};
use crate::functions::FunctionDef;

// ============================================================================
// Requests
// ============================================================================

/// Payload for creating an agent identity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateAgentRequest {
    pub name: String,
    pub description: String,
    pub goal: String,
}

/// One worker as registered in the planner's map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// Next-action request for a standalone worker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerActionRequest {
    /// Current worker state
    pub environment: Value,
    pub functions: Vec<FunctionDef>,
    /// Last function result, `info` stripped
    pub action_result: Value,
}

/// Next-action request for a multi-worker agent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentActionRequest {
    /// Id of the active worker
    pub location: String,
    pub map_id: String,
    /// State of the active worker
    pub environment: Value,
    /// Definitions of the active worker's functions
    pub functions: Vec<FunctionDef>,
    pub events: Map<String, Value>,
    pub agent_state: Value,
    /// Last function result, `info` stripped
    pub current_action: Value,
    pub version: String,
}

// ============================================================================
// Decisions
// ============================================================================

/// Tag of a planner decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecisionKind {
    CallFunction,
    ContinueFunction,
    Wait,
    GoTo,
}

impl DecisionKind {
    /// Wire name of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionKind::CallFunction => "call_function",
            DecisionKind::ContinueFunction => "continue_function",
            DecisionKind::Wait => "wait",
            DecisionKind::GoTo => "go_to",
        }
    }

    fn parse(tag: &str) -> Option<Self> {
        match tag {
            "call_function" => Some(DecisionKind::CallFunction),
            "continue_function" => Some(DecisionKind::ContinueFunction),
            "wait" => Some(DecisionKind::Wait),
            "go_to" => Some(DecisionKind::GoTo),
            _ => None,
        }
    }
}

impl std::fmt::Display for DecisionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A function invocation requested by the planner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub fn_name: String,
    /// Action id stamped onto the resulting `FunctionResult`
    #[serde(default)]
    pub fn_id: String,
    /// Raw arguments as sent, possibly `{"value": ...}` wrapped
    ///
    /// Kept undecoded: a `null` or non-object value is rejected when the
    /// function runs, as a failed result.
    #[serde(default = "empty_args")]
    pub args: Value,
}

fn empty_args() -> Value {
    Value::Object(Map::new())
}

impl FunctionCall {
    pub fn new(fn_name: impl Into<String>, fn_id: impl Into<String>, args: Map<String, Value>) -> Self {
        Self {
            fn_name: fn_name.into(),
            fn_id: fn_id.into(),
            args: Value::Object(args),
        }
    }
}

/// What the planner wants done this step
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    CallFunction(FunctionCall),
    ContinueFunction(FunctionCall),
    Wait,
    GoTo { location_id: String },
}

impl Decision {
    pub fn kind(&self) -> DecisionKind {
        match self {
            Decision::CallFunction(_) => DecisionKind::CallFunction,
            Decision::ContinueFunction(_) => DecisionKind::ContinueFunction,
            Decision::Wait => DecisionKind::Wait,
            Decision::GoTo { .. } => DecisionKind::GoTo,
        }
    }

    /// The requested call for function-call kinds
    pub fn function_call(&self) -> Option<&FunctionCall> {
        match self {
            Decision::CallFunction(call) | Decision::ContinueFunction(call) => Some(call),
            _ => None,
        }
    }
}

// ============================================================================
// Planner-side state summaries
// ============================================================================

/// High-level plan summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HlpResponse {
    pub plan_id: String,
    pub observation_reflection: String,
    pub plan: Vec<String>,
    pub plan_reasoning: String,
    pub current_state_of_execution: String,
    pub change_indicator: Option<String>,
    pub log: Vec<Value>,
}

/// Low-level plan summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlpResponse {
    pub plan_id: String,
    pub plan_reasoning: String,
    pub situation_analysis: String,
    pub plan: Vec<String>,
    pub change_indicator: Option<String>,
    pub reflection: Option<String>,
}

/// The task the planner is currently pursuing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrentTaskResponse {
    pub task: String,
    pub task_reasoning: String,
    pub location_id: String,
    pub llp: Option<LlpResponse>,
}

impl Default for CurrentTaskResponse {
    fn default() -> Self {
        Self {
            task: String::new(),
            task_reasoning: String::new(),
            location_id: "*not provided*".to_string(),
            llp: None,
        }
    }
}

/// Planner-side state attached to every decision
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentStateResponse {
    pub hlp: Option<HlpResponse>,
    pub current_task: Option<CurrentTaskResponse>,
}

impl AgentStateResponse {
    /// Whether the planner generated or changed its task this step
    pub fn task_changed(&self) -> bool {
        self.hlp
            .as_ref()
            .and_then(|h| h.change_indicator.as_deref())
            .is_some_and(|c| !c.is_empty())
    }
}

// ============================================================================
// Action response
// ============================================================================

/// Loose wire form of a decision
#[derive(Debug, Deserialize)]
struct RawActionResponse {
    action_type: String,
    #[serde(default)]
    agent_state: AgentStateResponse,
    #[serde(default)]
    action_args: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct GoToArgs {
    location_id: String,
}

/// A validated planner decision plus the planner's state summary
#[derive(Debug, Clone, PartialEq)]
pub struct ActionResponse {
    pub decision: Decision,
    pub agent_state: AgentStateResponse,
}

impl ActionResponse {
    /// Wrap a decision with an empty state summary
    pub fn new(decision: Decision) -> Self {
        Self {
            decision,
            agent_state: AgentStateResponse::default(),
        }
    }

    /// Decode and validate a decision from the planner's `data` payload
    pub fn from_value(value: Value) -> GameResult<Self> {
        let raw: RawActionResponse = serde_json::from_value(value)?;

        let kind = DecisionKind::parse(&raw.action_type)
            .ok_or_else(|| GameError::UnknownDecision(raw.action_type.clone()))?;

        let args = raw.action_args.filter(|v| !v.is_null());

        let decision = match kind {
            DecisionKind::CallFunction => Decision::CallFunction(parse_call(args)?),
            DecisionKind::ContinueFunction => Decision::ContinueFunction(parse_call(args)?),
            DecisionKind::Wait => Decision::Wait,
            DecisionKind::GoTo => {
                let args = args.ok_or(GameError::MissingActionArgs("location"))?;
                let parsed: GoToArgs =
                    serde_json::from_value(args).map_err(|e| GameError::MalformedActionArgs {
                        kind: "location",
                        reason: e.to_string(),
                    })?;
                Decision::GoTo {
                    location_id: parsed.location_id,
                }
            }
        };

        Ok(Self {
            decision,
            agent_state: raw.agent_state,
        })
    }
}

fn parse_call(args: Option<Value>) -> GameResult<FunctionCall> {
    let args = args.ok_or(GameError::MissingActionArgs("function"))?;
    serde_json::from_value(args).map_err(|e| GameError::MalformedActionArgs {
        kind: "function",
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_call_function() {
        let response = ActionResponse::from_value(json!({
            "action_type": "call_function",
            "agent_state": {},
            "action_args": {
                "fn_name": "take",
                "fn_id": "a1",
                "args": { "object": { "value": "apple" } }
            }
        }))
        .unwrap();

        assert_eq!(response.decision.kind(), DecisionKind::CallFunction);
        let call = response.decision.function_call().unwrap();
        assert_eq!(call.fn_name, "take");
        assert_eq!(call.fn_id, "a1");
        assert_eq!(call.args["object"], json!({ "value": "apple" }));
    }

    #[test]
    fn test_decode_call_keeps_raw_args() {
        let decode = |action_args: Value| {
            ActionResponse::from_value(json!({
                "action_type": "call_function",
                "agent_state": {},
                "action_args": action_args
            }))
            .unwrap()
        };

        let null_args = decode(json!({ "fn_name": "noop", "fn_id": "a1", "args": null }));
        assert_eq!(null_args.decision.function_call().unwrap().args, Value::Null);

        let no_args = decode(json!({ "fn_name": "noop", "fn_id": "a2" }));
        assert_eq!(no_args.decision.function_call().unwrap().args, json!({}));
    }

    #[test]
    fn test_decode_wait_without_args() {
        let response = ActionResponse::from_value(json!({ "action_type": "wait" })).unwrap();
        assert_eq!(response.decision, Decision::Wait);
        assert!(!response.agent_state.task_changed());
    }

    #[test]
    fn test_decode_go_to() {
        let response = ActionResponse::from_value(json!({
            "action_type": "go_to",
            "agent_state": {},
            "action_args": { "location_id": "furniture_thrower" }
        }))
        .unwrap();
        assert_eq!(
            response.decision,
            Decision::GoTo {
                location_id: "furniture_thrower".into()
            }
        );
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let err = ActionResponse::from_value(json!({ "action_type": "teleport" })).unwrap_err();
        assert!(matches!(err, GameError::UnknownDecision(ref k) if k == "teleport"));
        assert!(err.is_protocol());
    }

    #[test]
    fn test_missing_args_rejected() {
        let err = ActionResponse::from_value(json!({
            "action_type": "call_function",
            "action_args": null
        }))
        .unwrap_err();
        assert!(matches!(err, GameError::MissingActionArgs("function")));

        let err = ActionResponse::from_value(json!({ "action_type": "go_to" })).unwrap_err();
        assert!(matches!(err, GameError::MissingActionArgs("location")));
    }

    #[test]
    fn test_malformed_args_rejected() {
        let err = ActionResponse::from_value(json!({
            "action_type": "go_to",
            "action_args": { "worker": "w2" }
        }))
        .unwrap_err();
        assert!(matches!(err, GameError::MalformedActionArgs { kind: "location", .. }));
    }

    #[test]
    fn test_task_change_indicator() {
        let response = ActionResponse::from_value(json!({
            "action_type": "wait",
            "agent_state": {
                "hlp": { "plan_id": "p1", "plan": ["cause chaos"], "change_indicator": "next_step" },
                "current_task": { "task": "throw fruit", "task_reasoning": "fun" }
            }
        }))
        .unwrap();

        assert!(response.agent_state.task_changed());
        let task = response.agent_state.current_task.unwrap();
        assert_eq!(task.task, "throw fruit");
        assert_eq!(task.location_id, "*not provided*");
    }
}
