//! Function system
//!
//! This module provides:
//! - `Function` / `FunctionDef` - A callable capability and its planner-facing definition
//! - `Executable` trait - Interface implemented by integrations
//! - `FunctionArgs` - Normalized arguments passed to executables
//! - `FunctionResult` - Outcome of one execution
//! - `ActionSpace` - Ordered set of functions owned by a worker

mod args;
mod function;
mod registry;
mod result;

pub use args::FunctionArgs;
pub use function::{
    Argument, ArgumentType, Executable, ExecutableOutput, FnExecutable, Function, FunctionDef,
    NoopExecutable,
};
pub use registry::ActionSpace;
pub use result::{FunctionResult, FunctionResultStatus, InfoMap};
