//! Agent and worker configuration

use std::sync::Arc;

use serde_json::Value;

use crate::api::Location;
use crate::core::{InstructedStateFn, SharedStateFn, WorkerState};
use crate::functions::{ActionSpace, Function, FunctionResult};

/// Identity of an agent as registered with the planner
#[derive(Debug, Clone, PartialEq)]
pub struct AgentOptions {
    pub name: String,
    pub goal: String,
    /// Character card of the agent; also used by standalone workers
    pub description: String,
}

impl AgentOptions {
    pub fn new(
        name: impl Into<String>,
        goal: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            goal: goal.into(),
            description: description.into(),
        }
    }
}

/// Declarative description of one worker of an agent
///
/// ```ignore
/// let fruit_thrower = WorkerConfig::new(
///     "fruit_thrower",
///     "A worker specialized in throwing fruits ONLY with precision",
///     get_worker_state,
///     vec![take_fn, sit_fn, throw_fruit_fn],
/// )
/// .with_instruction("Never throw anything that is not a fruit");
/// ```
pub struct WorkerConfig<S = Value> {
    /// Worker id, also used as its name in the planner map
    pub id: String,

    /// Description given to the planner's task generator (not to the worker itself)
    pub worker_description: String,

    state_fn: InstructedStateFn<S>,

    action_space: ActionSpace,
}

impl<S> WorkerConfig<S> {
    /// Create a worker config from a state closure
    pub fn new<F>(
        id: impl Into<String>,
        worker_description: impl Into<String>,
        state_fn: F,
        action_space: Vec<Function>,
    ) -> Self
    where
        F: Fn(Option<&FunctionResult>, Option<&S>) -> S + Send + Sync + 'static,
        S: 'static,
    {
        Self::with_state_provider(id, worker_description, Arc::new(state_fn), action_space)
    }

    /// Create a worker config from a shared [`StateFn`](crate::core::StateFn)
    pub fn with_state_provider(
        id: impl Into<String>,
        worker_description: impl Into<String>,
        state_fn: SharedStateFn<S>,
        action_space: Vec<Function>,
    ) -> Self {
        Self {
            id: id.into(),
            worker_description: worker_description.into(),
            state_fn: InstructedStateFn::new("", state_fn),
            action_space: ActionSpace::new(action_space),
        }
    }

    /// Set the standing instruction injected into every state of this worker
    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.state_fn = self.state_fn.with_instruction(instruction);
        self
    }

    pub fn instruction(&self) -> &str {
        self.state_fn.instruction()
    }

    pub fn action_space(&self) -> &ActionSpace {
        &self.action_space
    }

    pub(crate) fn state_fn(&self) -> &InstructedStateFn<S> {
        &self.state_fn
    }

    /// Fold a function result into this worker's state
    pub fn next_state(
        &self,
        result: &FunctionResult,
        previous: Option<&WorkerState<S>>,
    ) -> WorkerState<S> {
        self.state_fn.next_state(result, previous)
    }

    /// Entry for the planner's worker map
    pub fn location(&self) -> Location {
        Location {
            id: self.id.clone(),
            name: self.id.clone(),
            description: self.worker_description.clone(),
        }
    }
}

impl<S> Clone for WorkerConfig<S> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            worker_description: self.worker_description.clone(),
            state_fn: self.state_fn.clone(),
            action_space: self.action_space.clone(),
        }
    }
}

impl<S> std::fmt::Debug for WorkerConfig<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerConfig")
            .field("id", &self.id)
            .field("worker_description", &self.worker_description)
            .field("instruction", &self.instruction())
            .field("functions", &self.action_space.names())
            .finish()
    }
}
