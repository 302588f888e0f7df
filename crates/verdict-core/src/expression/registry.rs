//! Registry of external script engines.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;
use tracing::debug;

use crate::value::Value;

/// Error reported by a script engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct EngineError {
    /// Engine-provided message.
    pub message: String,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// An external expression language.
pub trait ScriptEngine: Send + Sync {
    /// Language identifiers this engine answers to.
    fn names(&self) -> Vec<String>;

    /// Check a script before first use.
    ///
    /// Called once at preparation; the default accepts everything and
    /// leaves errors to [`eval`](Self::eval).
    fn check(&self, script: &str) -> Result<(), EngineError> {
        let _ = script;
        Ok(())
    }

    /// Evaluate `script` with the given bindings.
    fn eval(&self, script: &str, bindings: &HashMap<String, Value>) -> Result<Value, EngineError>;
}

/// Concurrent map from language identifier to engine.
#[derive(Default)]
pub struct EngineRegistry {
    engines: DashMap<String, Arc<dyn ScriptEngine>>,
}

impl std::fmt::Debug for EngineRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineRegistry")
            .field("languages", &self.languages())
            .finish()
    }
}

impl EngineRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `engine` under every name it reports, replacing earlier
    /// registrations of those names.
    pub fn register(&self, engine: Arc<dyn ScriptEngine>) {
        for name in engine.names() {
            debug!(language = %name, "registered expression engine");
            self.engines.insert(name, Arc::clone(&engine));
        }
    }

    /// Find the engine for `language`.
    pub fn lookup(&self, language: &str) -> Option<Arc<dyn ScriptEngine>> {
        self.engines.get(language).map(|e| Arc::clone(e.value()))
    }

    /// Remove the registration for `language`.
    pub fn unregister(&self, language: &str) -> bool {
        self.engines.remove(language).is_some()
    }

    /// Registered language identifiers, sorted.
    pub fn languages(&self) -> Vec<String> {
        let mut names: Vec<String> = self.engines.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Constant(bool);

    impl ScriptEngine for Constant {
        fn names(&self) -> Vec<String> {
            vec!["const".to_string(), "constant".to_string()]
        }

        fn eval(&self, _script: &str, _bindings: &HashMap<String, Value>) -> Result<Value, EngineError> {
            Ok(Value::Bool(self.0))
        }
    }

    #[test]
    fn test_register_under_all_names() {
        let registry = EngineRegistry::new();
        assert!(registry.is_empty());
        registry.register(Arc::new(Constant(true)));
        assert_eq!(registry.languages(), vec!["const", "constant"]);
        assert!(registry.lookup("constant").is_some());
        assert!(registry.lookup("lua").is_none());
    }

    #[test]
    fn test_replace_and_unregister() {
        let registry = EngineRegistry::new();
        registry.register(Arc::new(Constant(true)));
        registry.register(Arc::new(Constant(false)));
        let engine = registry.lookup("const").unwrap();
        assert_eq!(engine.eval("", &HashMap::new()).unwrap(), Value::Bool(false));
        assert!(registry.unregister("const"));
        assert!(!registry.unregister("const"));
        assert_eq!(registry.languages(), vec!["constant"]);
    }
}
