//! Client SDK for a hosted agent planner
//!
//! Agents own a set of workers; each worker exposes an action space of
//! functions. The planner decides which function to call next and the SDK
//! executes it locally, folding results back into per-worker state.

pub mod agent;
pub mod api;
pub mod core;
pub mod functions;
pub mod logging;
pub mod session;

#[cfg(test)]
mod testing;

pub use agent::{Agent, AgentOptions, StepOutcome, Worker, WorkerConfig};
pub use api::{ClientConfig, GameClient, PlannerApi};
pub use self::core::{GameError, GameResult, WorkerState};
pub use functions::{Argument, Function, FunctionResult, FunctionResultStatus};
