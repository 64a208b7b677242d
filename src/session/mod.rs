//! Run sessions
//!
//! A `Session` lives for one `run()` of an agent and chains each step's
//! function result into the next planner request. Nothing is persisted.

mod session;

pub use session::Session;
