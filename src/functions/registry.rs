//! Action space: the functions a worker may be asked to call
//!
//! Built once per worker and immutable afterwards. Keeps declaration order so
//! the planner sees functions in the order they were given.

use std::collections::HashMap;
use std::sync::Arc;

use super::function::{Function, FunctionDef};

/// Ordered, name-indexed set of functions
#[derive(Debug, Clone, Default)]
pub struct ActionSpace {
    functions: Vec<Arc<Function>>,
    index: HashMap<String, usize>,
}

impl ActionSpace {
    /// Build an action space from functions in declaration order
    ///
    /// A later function with an already used name replaces the earlier one in
    /// its original position.
    pub fn new(functions: impl IntoIterator<Item = Function>) -> Self {
        let mut space = Self::default();
        for function in functions {
            let name = function.name().to_string();
            match space.index.get(&name) {
                Some(&pos) => {
                    tracing::warn!("[ActionSpace] Function '{}' declared twice, keeping the last", name);
                    space.functions[pos] = Arc::new(function);
                }
                None => {
                    space.index.insert(name, space.functions.len());
                    space.functions.push(Arc::new(function));
                }
            }
        }
        space
    }

    /// Get a function by name
    pub fn get(&self, name: &str) -> Option<Arc<Function>> {
        self.index.get(name).map(|&pos| Arc::clone(&self.functions[pos]))
    }

    /// Definitions of all functions, in order
    pub fn definitions(&self) -> Vec<FunctionDef> {
        self.functions.iter().map(|f| f.definition()).collect()
    }

    /// Function names, in order
    pub fn names(&self) -> Vec<&str> {
        self.functions.iter().map(|f| f.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl FromIterator<Function> for ActionSpace {
    fn from_iter<I: IntoIterator<Item = Function>>(iter: I) -> Self {
        Self::new(iter)
    }
}
