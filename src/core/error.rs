//! SDK error types

use thiserror::Error;

/// Errors that can occur while driving an agent or worker
#[derive(Error, Debug)]
pub enum GameError {
    /// No API key was provided
    #[error("API key not set")]
    MissingApiKey,

    /// `compile()` was called on an agent without workers
    #[error("No workers added to the agent")]
    NoWorkers,

    /// The agent was stepped before `compile()`
    #[error("Agent not compiled: call compile() before stepping")]
    NotCompiled,

    /// A standalone worker was stepped without a task
    #[error("No task set for worker")]
    NoTask,

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The planner returned a decision kind this client does not know
    #[error("Unknown action type: {0}")]
    UnknownDecision(String),

    /// The planner returned a known decision kind that is not valid here
    #[error("Unexpected action type: {0}")]
    UnexpectedDecision(String),

    /// A payload-bearing decision arrived without its arguments
    #[error("No {0} information provided by planner")]
    MissingActionArgs(&'static str),

    /// Decision arguments were present but could not be decoded
    #[error("Malformed {kind} arguments: {reason}")]
    MalformedActionArgs { kind: &'static str, reason: String },

    /// The planner named a function outside the active action space
    #[error("Function '{name}' not found in action space of worker '{worker}'")]
    UnknownFunction { worker: String, name: String },

    /// The planner referenced a worker that is not registered
    #[error("Worker not found: {0}")]
    UnknownWorker(String),

    /// Non-success response from the planner API
    #[error("Planner API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// Success response missing a required field
    #[error("Planner response missing field: {0}")]
    MissingField(&'static str),

    /// Could not obtain an access token
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GameError {
    /// Errors raised at construction or compile time
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            GameError::MissingApiKey
                | GameError::NoWorkers
                | GameError::NotCompiled
                | GameError::NoTask
                | GameError::InvalidConfig(_)
        )
    }

    /// Contract violations between this client and the planner
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            GameError::UnknownDecision(_)
                | GameError::UnexpectedDecision(_)
                | GameError::MissingActionArgs(_)
                | GameError::MalformedActionArgs { .. }
                | GameError::UnknownFunction { .. }
                | GameError::UnknownWorker(_)
                | GameError::Api { .. }
                | GameError::MissingField(_)
        )
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        GameError::InvalidConfig(msg.into())
    }
}

/// Result type alias for SDK operations
pub type GameResult<T> = Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GameError::UnknownFunction {
            worker: "fruit_thrower".into(),
            name: "fly".into(),
        };
        assert_eq!(
            err.to_string(),
            "Function 'fly' not found in action space of worker 'fruit_thrower'"
        );

        let err = GameError::MissingActionArgs("function");
        assert_eq!(err.to_string(), "No function information provided by planner");
    }

    #[test]
    fn test_error_classification() {
        assert!(GameError::MissingApiKey.is_config());
        assert!(GameError::NoWorkers.is_config());
        assert!(!GameError::NoWorkers.is_protocol());

        assert!(GameError::UnknownDecision("jump".into()).is_protocol());
        assert!(GameError::UnknownWorker("w9".into()).is_protocol());
        assert!(!GameError::UnknownWorker("w9".into()).is_config());
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: GameError = json_err.into();
        assert!(matches!(err, GameError::Serialization(_)));
    }
}
