//! Per-run session state

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::functions::FunctionResult;

/// Ephemeral identity of one run plus the last function result
///
/// Owned by exactly one agent; never shared between runs.
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    started_at: DateTime<Utc>,
    function_result: Option<FunctionResult>,
}

impl Session {
    /// Start a new session with a fresh id
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            function_result: None,
        }
    }

    /// Regenerate the id and clear the last result
    pub fn reset(&mut self) {
        *self = Self::new();
        tracing::debug!("[Session] Reset, new session id: {}", self.id);
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Result of the most recent function call in this run
    pub fn function_result(&self) -> Option<&FunctionResult> {
        self.function_result.as_ref()
    }

    /// Replace the most recent function result
    pub fn set_function_result(&mut self, result: FunctionResult) {
        self.function_result = Some(result);
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
