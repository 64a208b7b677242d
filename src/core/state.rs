//! Worker and agent state plumbing
//!
//! State is owned by the application: a callback receives the latest
//! [`FunctionResult`] together with the previous state and returns a complete
//! replacement. `None` as the previous state marks the first call, which must
//! produce the initial state.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::functions::FunctionResult;

/// Callback that folds a function result into a new state value
///
/// Implement this trait for stateful reducers. Plain closures with the
/// signature `Fn(Option<&FunctionResult>, Option<&S>) -> S` implement it
/// automatically.
pub trait StateFn<S>: Send + Sync {
    /// Produce the next state
    ///
    /// # Arguments
    /// * `result` - Outcome of the last function call (`None` only for the
    ///   agent-level initial state)
    /// * `previous` - The state being replaced, `None` on the first call
    fn next_state(&self, result: Option<&FunctionResult>, previous: Option<&S>) -> S;
}

impl<S, F> StateFn<S> for F
where
    F: Fn(Option<&FunctionResult>, Option<&S>) -> S + Send + Sync,
{
    fn next_state(&self, result: Option<&FunctionResult>, previous: Option<&S>) -> S {
        self(result, previous)
    }
}

/// Arc-wrapped state callback for sharing between agent and workers
pub type SharedStateFn<S> = Arc<dyn StateFn<S>>;

/// State of a worker as seen by the planner
///
/// The standing instruction is a named field rather than a key inside the
/// application state. On the wire both are flattened into one object:
/// `{"instructions": "...", ...state}`, so `S` must serialize as a map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerState<S> {
    /// Standing instruction of the owning worker
    pub instructions: String,

    /// Application state produced by the worker's callback
    #[serde(flatten)]
    pub state: S,
}

impl<S> WorkerState<S> {
    /// Wrap an application state with an instruction
    pub fn new(instructions: impl Into<String>, state: S) -> Self {
        Self {
            instructions: instructions.into(),
            state,
        }
    }
}

/// Wraps a worker's state callback and stamps its instruction onto every state
///
/// The wrapped callback never sees the instruction: it receives and returns
/// its own state type only.
pub struct InstructedStateFn<S> {
    instruction: String,
    inner: SharedStateFn<S>,
}

impl<S> InstructedStateFn<S> {
    /// Create a wrapper around `inner`
    pub fn new(instruction: impl Into<String>, inner: SharedStateFn<S>) -> Self {
        Self {
            instruction: instruction.into(),
            inner,
        }
    }

    /// Same callback, different instruction
    pub fn with_instruction(&self, instruction: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            inner: Arc::clone(&self.inner),
        }
    }

    /// The instruction injected into every state
    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// Produce the next worker state
    pub fn next_state(
        &self,
        result: &FunctionResult,
        previous: Option<&WorkerState<S>>,
    ) -> WorkerState<S> {
        let state = self
            .inner
            .next_state(Some(result), previous.map(|p| &p.state));
        WorkerState::new(self.instruction.clone(), state)
    }
}

impl<S> Clone for InstructedStateFn<S> {
    fn clone(&self) -> Self {
        Self {
            instruction: self.instruction.clone(),
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> std::fmt::Debug for InstructedStateFn<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstructedStateFn")
            .field("instruction", &self.instruction)
            .finish()
    }
}
