//! Backend delegating to a registered script engine.

use std::fmt;
use std::sync::Arc;

use super::backend::ExpressionBackend;
use super::registry::ScriptEngine;
use crate::binding::BindingEnvironment;
use crate::error::EvaluationError;
use crate::value::Value;

/// Runs an expression through an external [`ScriptEngine`].
pub struct ExternalEngineBackend {
    language: String,
    expression: String,
    engine: Arc<dyn ScriptEngine>,
}

impl ExternalEngineBackend {
    pub fn new(
        language: impl Into<String>,
        expression: impl Into<String>,
        engine: Arc<dyn ScriptEngine>,
    ) -> Self {
        Self {
            language: language.into(),
            expression: expression.into(),
            engine,
        }
    }
}

impl fmt::Debug for ExternalEngineBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalEngineBackend")
            .field("language", &self.language)
            .field("expression", &self.expression)
            .finish_non_exhaustive()
    }
}

impl ExpressionBackend for ExternalEngineBackend {
    fn language(&self) -> &str {
        &self.language
    }

    fn evaluate(&self, bindings: &BindingEnvironment) -> Result<Value, EvaluationError> {
        self.engine
            .eval(&self.expression, &bindings.to_map())
            .map_err(|e| EvaluationError::BackendFailure {
                language: self.language.clone(),
                expression: self.expression.clone(),
                message: e.message,
            })
    }
}
