//! Named variables consulted before bindings.

use std::collections::HashMap;

use crate::value::Value;

/// Variables visible to every evaluation of an expression. Empty by default.
#[derive(Debug, Clone, Default)]
pub struct VariableTable {
    variables: HashMap<String, Value>,
}

impl VariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define or replace a variable.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.variables.insert(name.into(), value.into());
    }

    pub fn resolve(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}
