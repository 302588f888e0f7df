//! Backend selection, preparation and result normalization.

use std::fmt;
use std::sync::Arc;

#[cfg(feature = "embedded-el")]
use parking_lot::RwLock;
use tracing::{debug, instrument, trace, warn};

use super::backend::ExpressionBackend;
use super::capability::{Capabilities, CapabilityProbe};
use super::external::ExternalEngineBackend;
use super::registry::EngineRegistry;
use super::spec::{BindingNames, ExpressionSpec};
use crate::binding::BindingEnvironment;
use crate::error::{EvaluationError, PreparationError};
use crate::value::Value;

#[cfg(feature = "embedded-el")]
use super::embedded::{
    EmbeddedContext, EmbeddedInterpreterBackend, FunctionTable, PropertyResolver, ResolverChain,
    VariableTable,
};
#[cfg(feature = "embedded-el")]
use verdict_lang::Arity;

/// Prepares expressions for evaluation.
///
/// Holds the capability probe, the external engine registry and, with the
/// `embedded-el` feature, the function table, variables and custom
/// resolvers handed to embedded expressions. Functions registered after an
/// expression was prepared are not visible to it.
pub struct ExpressionEvaluator {
    capabilities: Arc<dyn CapabilityProbe>,
    engines: Arc<EngineRegistry>,
    #[cfg(feature = "embedded-el")]
    functions: RwLock<FunctionTable>,
    #[cfg(feature = "embedded-el")]
    variables: Arc<VariableTable>,
    #[cfg(feature = "embedded-el")]
    resolvers: Arc<ResolverChain>,
}

impl fmt::Debug for ExpressionEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpressionEvaluator")
            .field("capabilities", &self.capabilities)
            .field("engines", &self.engines)
            .finish_non_exhaustive()
    }
}

impl Default for ExpressionEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpressionEvaluator {
    /// Evaluator with build-time capabilities, no external engines and the
    /// built-in functions.
    pub fn new() -> Self {
        Self {
            capabilities: Arc::new(Capabilities::detect()),
            engines: Arc::new(EngineRegistry::new()),
            #[cfg(feature = "embedded-el")]
            functions: RwLock::new(FunctionTable::builtins().clone()),
            #[cfg(feature = "embedded-el")]
            variables: Arc::new(VariableTable::new()),
            #[cfg(feature = "embedded-el")]
            resolvers: ResolverChain::standard(),
        }
    }

    /// Replace the capability probe.
    pub fn with_capabilities(mut self, probe: impl CapabilityProbe + 'static) -> Self {
        self.capabilities = Arc::new(probe);
        self
    }

    /// Share an existing engine registry.
    pub fn with_engines(mut self, engines: Arc<EngineRegistry>) -> Self {
        self.engines = engines;
        self
    }

    /// The external engine registry.
    pub fn engines(&self) -> &EngineRegistry {
        &self.engines
    }

    /// Define a variable visible to embedded expressions.
    #[cfg(feature = "embedded-el")]
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        Arc::make_mut(&mut self.variables).set(name, value);
        self
    }

    /// Add resolvers consulted before the built-in method fallback.
    #[cfg(feature = "embedded-el")]
    pub fn with_resolvers(mut self, custom: Vec<Arc<dyn PropertyResolver>>) -> Self {
        self.resolvers = Arc::new(ResolverChain::with_custom(custom));
        self
    }

    /// Register a function for embedded expressions prepared from now on.
    #[cfg(feature = "embedded-el")]
    pub fn register_function<F>(&self, prefix: &str, name: &str, arity: Arity, function: F)
    where
        F: Fn(&[Value]) -> Result<Value, EvaluationError> + Send + Sync + 'static,
    {
        debug!(prefix, name, "registered expression function");
        self.functions.write().register(prefix, name, arity, function);
    }

    /// Select a backend and prepare `spec`.
    #[instrument(skip(self, spec), fields(language = %spec.language()))]
    pub fn prepare(&self, spec: &ExpressionSpec) -> Result<PreparedExpression, PreparationError> {
        let backend = self.backend_for(spec).inspect_err(|e| {
            warn!(error = %e, "expression preparation failed");
        })?;
        debug!(
            bindings = spec.bindings().names().len(),
            "expression prepared"
        );
        Ok(PreparedExpression {
            spec: Arc::new(spec.clone()),
            backend,
        })
    }

    fn backend_for(&self, spec: &ExpressionSpec) -> Result<Arc<dyn ExpressionBackend>, PreparationError> {
        if spec.is_embedded() {
            if !self.capabilities.embedded_runtime_available() {
                return Err(PreparationError::EmbeddedRuntimeUnavailable);
            }
            return self.embedded_backend(spec);
        }

        let engine = self
            .engines
            .lookup(spec.language())
            .ok_or_else(|| PreparationError::EngineNotFound(spec.language().to_string()))?;
        engine
            .check(spec.expression())
            .map_err(|e| PreparationError::InvalidExpression {
                language: spec.language().to_string(),
                expression: spec.expression().to_string(),
                message: e.message.clone(),
                diagnostic: e.message,
            })?;
        Ok(Arc::new(ExternalEngineBackend::new(
            spec.language(),
            spec.expression(),
            engine,
        )))
    }

    #[cfg(feature = "embedded-el")]
    fn embedded_backend(&self, spec: &ExpressionSpec) -> Result<Arc<dyn ExpressionBackend>, PreparationError> {
        let context = EmbeddedContext::new(
            Arc::clone(&self.resolvers),
            Arc::new(self.functions.read().clone()),
            Arc::clone(&self.variables),
        );
        let backend = EmbeddedInterpreterBackend::prepare(spec.expression(), context)?;
        Ok(Arc::new(backend))
    }

    #[cfg(not(feature = "embedded-el"))]
    fn embedded_backend(&self, _spec: &ExpressionSpec) -> Result<Arc<dyn ExpressionBackend>, PreparationError> {
        Err(PreparationError::EmbeddedRuntimeUnavailable)
    }
}

/// An expression with its backend resolved, ready for repeated evaluation.
///
/// Cheap to clone and safe to share across threads.
#[derive(Debug, Clone)]
pub struct PreparedExpression {
    spec: Arc<ExpressionSpec>,
    backend: Arc<dyn ExpressionBackend>,
}

impl PreparedExpression {
    pub fn spec(&self) -> &ExpressionSpec {
        &self.spec
    }

    /// Evaluate against positional values.
    ///
    /// In parameter mode the number of values must equal the number of
    /// aliases. In bean mode exactly one value is expected.
    pub fn evaluate(&self, values: &[Value]) -> Result<bool, EvaluationError> {
        let names = self.spec.bindings().names();
        if values.len() != names.len() {
            return Err(EvaluationError::ArityMismatch {
                expected: names.len(),
                actual: values.len(),
            });
        }
        let bindings: BindingEnvironment = names.iter().cloned().zip(values.iter().cloned()).collect();
        self.run(&bindings)
    }

    /// Evaluate with `value` bound to the bean alias.
    pub fn evaluate_value(&self, value: impl Into<Value>) -> Result<bool, EvaluationError> {
        match self.spec.bindings() {
            BindingNames::Bean(alias) => {
                let bindings = BindingEnvironment::with_capacity(1).with(alias.clone(), value);
                self.run(&bindings)
            }
            BindingNames::Parameters(_) => self.evaluate(&[value.into()]),
        }
    }

    fn run(&self, bindings: &BindingEnvironment) -> Result<bool, EvaluationError> {
        let raw = self.backend.evaluate(bindings)?;
        let valid = normalize(self.spec.expression(), raw)?;
        trace!(language = self.backend.language(), valid, "expression evaluated");
        Ok(valid)
    }
}

/// Map a raw result onto pass/fail.
fn normalize(expression: &str, raw: Value) -> Result<bool, EvaluationError> {
    match raw {
        Value::Bool(b) => Ok(b),
        Value::Null => Err(EvaluationError::NullResult {
            expression: expression.to_string(),
        }),
        other => Err(EvaluationError::TypeMismatch {
            expression: expression.to_string(),
            actual: other.type_name(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::expression::registry::{EngineError, ScriptEngine};

    struct Echo;

    impl ScriptEngine for Echo {
        fn names(&self) -> Vec<String> {
            vec!["echo".to_string()]
        }

        fn check(&self, script: &str) -> Result<(), EngineError> {
            if script.is_empty() {
                Err(EngineError::new("empty script"))
            } else {
                Ok(())
            }
        }

        fn eval(&self, script: &str, bindings: &HashMap<String, Value>) -> Result<Value, EngineError> {
            Ok(bindings.get(script).cloned().unwrap_or(Value::Null))
        }
    }

    fn evaluator() -> ExpressionEvaluator {
        let evaluator = ExpressionEvaluator::new();
        evaluator.engines().register(Arc::new(Echo));
        evaluator
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("x", Value::Bool(true)), Ok(true));
        assert_eq!(
            normalize("x", Value::Null),
            Err(EvaluationError::NullResult {
                expression: "x".into()
            })
        );
        assert_eq!(
            normalize("x", Value::Int(1)),
            Err(EvaluationError::TypeMismatch {
                expression: "x".into(),
                actual: "integer".into()
            })
        );
    }

    #[test]
    fn test_unknown_engine() {
        let spec = ExpressionSpec::for_bean("x", "x").with_language("lua");
        assert_eq!(
            evaluator().prepare(&spec).unwrap_err(),
            PreparationError::EngineNotFound("lua".into())
        );
    }

    #[test]
    fn test_external_engine_check_runs_at_preparation() {
        let spec = ExpressionSpec::for_bean("", "x").with_language("echo");
        assert!(matches!(
            evaluator().prepare(&spec),
            Err(PreparationError::InvalidExpression { .. })
        ));
    }

    #[test]
    fn test_external_engine_normalization() {
        let spec = ExpressionSpec::for_parameters("b", ["a", "b"])
            .unwrap()
            .with_language("echo");
        let prepared = evaluator().prepare(&spec).unwrap();
        assert!(prepared.evaluate(&[Value::Null, true.into()]).unwrap());
        assert!(matches!(
            prepared.evaluate(&[true.into(), Value::Null]),
            Err(EvaluationError::NullResult { .. })
        ));
        assert!(matches!(
            prepared.evaluate(&[true.into(), "yes".into()]),
            Err(EvaluationError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_arity_mismatch() {
        let spec = ExpressionSpec::for_parameters("b", ["a", "b"])
            .unwrap()
            .with_language("echo");
        let prepared = evaluator().prepare(&spec).unwrap();
        assert_eq!(
            prepared.evaluate(&[true.into()]).unwrap_err(),
            EvaluationError::ArityMismatch {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_embedded_unavailable_by_probe() {
        let evaluator = ExpressionEvaluator::new().with_capabilities(Capabilities::none());
        let spec = ExpressionSpec::for_bean("true", "x");
        assert_eq!(
            evaluator.prepare(&spec).unwrap_err(),
            PreparationError::EmbeddedRuntimeUnavailable
        );
    }

    #[cfg(feature = "embedded-el")]
    #[test]
    fn test_registered_function_visible_to_later_preparations() {
        let evaluator = ExpressionEvaluator::new();
        let spec = ExpressionSpec::for_bean("app:even(n)", "n");
        assert!(evaluator.prepare(&spec).is_err());

        evaluator.register_function("app", "even", Arity::Exact(1), |args| match &args[0] {
            Value::Int(i) => Ok(Value::Bool(i % 2 == 0)),
            other => Err(EvaluationError::InvalidArgument {
                function: "app:even".into(),
                message: format!("expected integer, got {}", other.type_name()),
            }),
        });
        let prepared = evaluator.prepare(&spec).unwrap();
        assert!(prepared.evaluate_value(4).unwrap());
        assert!(!prepared.evaluate_value(3).unwrap());
    }

    #[cfg(feature = "embedded-el")]
    #[test]
    fn test_evaluator_variables() {
        let evaluator = ExpressionEvaluator::new().with_variable("minimum", 18);
        let spec = ExpressionSpec::for_bean("age >= minimum", "age");
        let prepared = evaluator.prepare(&spec).unwrap();
        assert!(prepared.evaluate_value(21).unwrap());
        assert!(!prepared.evaluate_value(12).unwrap());
    }
}
