//! Function Executor
//!
//! Resolves a planner-issued call against an action space and runs it.

use crate::api::{AgentStateResponse, DecisionKind, FunctionCall};
use crate::core::{GameError, GameResult};
use crate::functions::{ActionSpace, FunctionResult};

/// What happened during one step of an agent or worker
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    /// Kind of decision the planner returned
    pub kind: DecisionKind,

    /// Result of the function executed this step, if any
    pub function_result: Option<FunctionResult>,

    /// Planner-side state summary attached to the decision
    pub planner_state: AgentStateResponse,
}

/// Runs planner-issued function calls
pub struct FunctionExecutor;

impl FunctionExecutor {
    /// Look up `call.fn_name` in `action_space` and execute it
    ///
    /// An unknown function name is a protocol error. Anything that goes wrong
    /// inside the function itself comes back as a failed result instead.
    pub async fn execute(
        worker_id: &str,
        action_space: &ActionSpace,
        call: &FunctionCall,
    ) -> GameResult<FunctionResult> {
        let function = action_space
            .get(&call.fn_name)
            .ok_or_else(|| GameError::UnknownFunction {
                worker: worker_id.to_string(),
                name: call.fn_name.clone(),
            })?;

        tracing::info!("[Executor] Action selected: {}", call.fn_name);
        tracing::debug!("[Executor] Action args: {:?}", call.args);

        let result = function.execute(&call.fn_id, &call.args).await;

        if result.is_done() {
            tracing::debug!("[Executor] {} completed: {:?}", call.fn_name, result.feedback_message);
        } else {
            tracing::warn!(
                "[Executor] {} failed: {}",
                call.fn_name,
                result.feedback_message.as_deref().unwrap_or("")
            );
        }

        Ok(result)
    }
}
