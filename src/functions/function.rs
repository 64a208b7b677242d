//! Function definition and execution contract
//!
//! A [`Function`] pairs a serializable definition (what the planner sees) with
//! a local [`Executable`] (what actually runs). The executable never crosses
//! the planner boundary.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::args::FunctionArgs;
use super::result::{FunctionResult, FunctionResultStatus, InfoMap};

/// What an executable returns: status, feedback for the planner, info for state
pub type ExecutableOutput = (FunctionResultStatus, String, InfoMap);

/// Declared type of an argument (planner-side schema only, not enforced locally)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgumentType {
    One(String),
    Many(Vec<String>),
}

impl From<&str> for ArgumentType {
    fn from(s: &str) -> Self {
        ArgumentType::One(s.to_string())
    }
}

impl From<Vec<&str>> for ArgumentType {
    fn from(types: Vec<&str>) -> Self {
        ArgumentType::Many(types.into_iter().map(String::from).collect())
    }
}

/// A named argument of a function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub arg_type: Option<ArgumentType>,
    #[serde(default)]
    pub optional: bool,
}

impl Argument {
    /// Create a required argument without a declared type
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            arg_type: None,
            optional: false,
        }
    }

    /// Declare the argument type(s)
    pub fn with_type(mut self, arg_type: impl Into<ArgumentType>) -> Self {
        self.arg_type = Some(arg_type.into());
        self
    }

    /// Mark the argument as optional
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// The part of a function that is sent to the planner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDef {
    pub fn_name: String,
    pub fn_description: String,
    pub args: Vec<Argument>,
    pub hint: Option<String>,
}

/// Capability implemented by every integration
///
/// Receives normalized arguments. Returning `Err` (or panicking) is allowed:
/// [`Function::execute`] turns it into a failed result.
#[async_trait]
pub trait Executable: Send + Sync {
    async fn invoke(&self, args: &FunctionArgs) -> Result<ExecutableOutput>;
}

/// An executable created from a synchronous closure
pub struct FnExecutable<F>
where
    F: Fn(&FunctionArgs) -> Result<ExecutableOutput> + Send + Sync,
{
    func: F,
}

impl<F> FnExecutable<F>
where
    F: Fn(&FunctionArgs) -> Result<ExecutableOutput> + Send + Sync,
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

#[async_trait]
impl<F> Executable for FnExecutable<F>
where
    F: Fn(&FunctionArgs) -> Result<ExecutableOutput> + Send + Sync,
{
    async fn invoke(&self, args: &FunctionArgs) -> Result<ExecutableOutput> {
        (self.func)(args)
    }
}

/// Default executable: succeeds without doing anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopExecutable;

#[async_trait]
impl Executable for NoopExecutable {
    async fn invoke(&self, _args: &FunctionArgs) -> Result<ExecutableOutput> {
        Ok((
            FunctionResultStatus::Done,
            "Default implementation - no action taken".to_string(),
            InfoMap::new(),
        ))
    }
}

/// A function the planner can ask a worker to call
///
/// ```ignore
/// let take = Function::new("take", "Take object")
///     .with_arg(Argument::new("object", "Object to take").with_type("item"))
///     .with_fn(|args| {
///         let object = args.get_str("object")?;
///         Ok((FunctionResultStatus::Done, format!("Took the {}", object), InfoMap::new()))
///     });
/// ```
#[derive(Clone)]
pub struct Function {
    definition: FunctionDef,
    executable: Arc<dyn Executable>,
}

impl Function {
    /// Create a function with no arguments and the no-op executable
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            definition: FunctionDef {
                fn_name: name.into(),
                fn_description: description.into(),
                args: Vec::new(),
                hint: None,
            },
            executable: Arc::new(NoopExecutable),
        }
    }

    /// Append an argument
    pub fn with_arg(mut self, arg: Argument) -> Self {
        self.definition.args.push(arg);
        self
    }

    /// Set the hint shown to the planner
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.definition.hint = Some(hint.into());
        self
    }

    /// Set the executable
    pub fn with_executable<E: Executable + 'static>(mut self, executable: E) -> Self {
        self.executable = Arc::new(executable);
        self
    }

    /// Set the executable from a synchronous closure
    pub fn with_fn<F>(self, func: F) -> Self
    where
        F: Fn(&FunctionArgs) -> Result<ExecutableOutput> + Send + Sync + 'static,
    {
        self.with_executable(FnExecutable::new(func))
    }

    pub fn name(&self) -> &str {
        &self.definition.fn_name
    }

    pub fn description(&self) -> &str {
        &self.definition.fn_description
    }

    pub fn args(&self) -> &[Argument] {
        &self.definition.args
    }

    /// Definition for the planner (everything except the executable)
    pub fn definition(&self) -> FunctionDef {
        self.definition.clone()
    }

    /// Execute with arguments as received from the planner
    ///
    /// Never fails: errors and panics from the executable become a
    /// [`FunctionResultStatus::Failed`] result carrying the error text.
    pub async fn execute(&self, action_id: &str, raw_args: &Value) -> FunctionResult {
        let args = match raw_args {
            Value::Object(map) => FunctionArgs::normalize(map),
            other => {
                tracing::warn!("[Function] {} received non-object arguments: {}", self.name(), other);
                return FunctionResult::failed(
                    action_id,
                    format!("Error executing function: arguments must be an object, got {}", other),
                );
            }
        };

        let outcome = AssertUnwindSafe(self.executable.invoke(&args))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok((status, feedback, info))) => {
                FunctionResult::new(action_id, status, feedback, info)
            }
            Ok(Err(e)) => {
                tracing::warn!("[Function] {} returned an error: {:#}", self.name(), e);
                FunctionResult::failed(action_id, format!("Error executing function: {:#}", e))
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::warn!("[Function] {} panicked: {}", self.name(), message);
                FunctionResult::failed(action_id, format!("Error executing function: {}", message))
            }
        }
    }
}

impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Function")
            .field("definition", &self.definition)
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "executable panicked".to_string()
    }
}
