//! Core types for the SDK
//!
//! This module provides the fundamental types used throughout the crate:
//! - `GameError` - Error types
//! - `StateFn` - State callback interface
//! - `WorkerState` - Worker state with its standing instruction

pub mod error;
pub mod state;

pub use error::{GameError, GameResult};
pub use state::{InstructedStateFn, SharedStateFn, StateFn, WorkerState};
