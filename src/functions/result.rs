//! Function result types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form data an executable exposes to state callbacks
pub type InfoMap = Map<String, Value>;

/// Outcome status of a function execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionResultStatus {
    Done,
    Failed,
}

impl FunctionResultStatus {
    pub fn is_done(&self) -> bool {
        matches!(self, FunctionResultStatus::Done)
    }
}

impl std::fmt::Display for FunctionResultStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FunctionResultStatus::Done => write!(f, "done"),
            FunctionResultStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Record produced by exactly one function execution
///
/// Consumed by the owning state callback and sent back to the planner (without
/// `info`) on the next request. Never mutated once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResult {
    /// Identifier of the decision that triggered the call (empty for bootstrap)
    pub action_id: String,

    pub action_status: FunctionResultStatus,

    /// Human readable feedback for the planner
    pub feedback_message: Option<String>,

    /// Data for state callbacks; never sent to the planner
    pub info: Option<InfoMap>,
}

impl FunctionResult {
    /// Create a result
    pub fn new(
        action_id: impl Into<String>,
        action_status: FunctionResultStatus,
        feedback_message: impl Into<String>,
        info: InfoMap,
    ) -> Self {
        Self {
            action_id: action_id.into(),
            action_status,
            feedback_message: Some(feedback_message.into()),
            info: Some(info),
        }
    }

    /// Create a successful result with no info
    pub fn done(action_id: impl Into<String>, feedback_message: impl Into<String>) -> Self {
        Self::new(
            action_id,
            FunctionResultStatus::Done,
            feedback_message,
            InfoMap::new(),
        )
    }

    /// Create a failed result with no info
    pub fn failed(action_id: impl Into<String>, feedback_message: impl Into<String>) -> Self {
        Self::new(
            action_id,
            FunctionResultStatus::Failed,
            feedback_message,
            InfoMap::new(),
        )
    }

    /// Synthetic result used before any function has run
    ///
    /// Lets state callbacks and the planner request take the same input shape
    /// on the very first step.
    pub fn bootstrap() -> Self {
        Self::done("", "")
    }

    pub fn is_done(&self) -> bool {
        self.action_status.is_done()
    }

    /// Serialized form sent to the planner (`info` stripped)
    pub fn to_action_report(&self) -> Value {
        serde_json::json!({
            "action_id": self.action_id,
            "action_status": self.action_status,
            "feedback_message": self.feedback_message,
        })
    }
}
