pub mod agent_loop;
pub mod config;
pub mod executor;
pub mod worker;

pub use agent_loop::Agent;
pub use config::{AgentOptions, WorkerConfig};
pub use executor::{FunctionExecutor, StepOutcome};
pub use worker::Worker;
