//! Name-to-value bindings visible to an expression during one evaluation.

use std::collections::HashMap;

use crate::value::Value;

/// Ordered name-to-value mapping built fresh for each evaluation.
///
/// Binding a name twice replaces the earlier value while keeping its
/// original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindingEnvironment {
    entries: Vec<(String, Value)>,
}

impl BindingEnvironment {
    /// Create an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an environment with room for `capacity` bindings.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Bind `name` to `value`.
    pub fn bind(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Builder form of [`bind`](Self::bind).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.bind(name, value);
        self
    }

    /// Look up a binding.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Whether `name` is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the environment is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate bindings in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Copy the bindings into a map, as handed to external engines.
    pub fn to_map(&self) -> HashMap<String, Value> {
        self.entries.iter().cloned().collect()
    }
}

impl<N: Into<String>, V: Into<Value>> FromIterator<(N, V)> for BindingEnvironment {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut env = BindingEnvironment::new();
        for (name, value) in iter {
            env.bind(name, value);
        }
        env
    }
}
