//! Embedded expression interpreter.
//!
//! Expressions are parsed and checked once at preparation by `verdict-lang`
//! and then evaluated by walking the tree. Evaluation is read-only: the
//! resolver chain, function table and variable table are shared immutably
//! by every evaluation of the prepared expression.
//!
//! There is no evaluation budget. A custom function that never returns
//! blocks the calling thread.

mod coerce;
mod functions;
mod interpreter;
mod methods;
mod resolver;
mod variables;

use std::sync::Arc;

use verdict_lang::CompiledExpression;

pub use verdict_lang::Arity;

pub use functions::{FunctionEntry, FunctionTable, NativeFunction, BUILTIN_PREFIX};
pub use resolver::{
    ArrayResolver, BeanResolver, BindingResolver, FallbackResolver, ListResolver, MapResolver,
    PropertyResolver, ResolutionContext, ResolverChain,
};
pub use variables::VariableTable;

use self::interpreter::Interpreter;
use super::backend::ExpressionBackend;
use super::spec::EMBEDDED_LANGUAGE;
use crate::binding::BindingEnvironment;
use crate::error::{EvaluationError, PreparationError};
use crate::value::Value;

/// Everything an embedded expression resolves against, frozen at
/// preparation.
#[derive(Debug, Clone)]
pub struct EmbeddedContext {
    pub(crate) resolvers: Arc<ResolverChain>,
    pub(crate) functions: Arc<FunctionTable>,
    pub(crate) variables: Arc<VariableTable>,
}

impl Default for EmbeddedContext {
    fn default() -> Self {
        Self {
            resolvers: ResolverChain::standard(),
            functions: Arc::new(FunctionTable::builtins().clone()),
            variables: Arc::new(VariableTable::new()),
        }
    }
}

impl EmbeddedContext {
    pub fn new(
        resolvers: Arc<ResolverChain>,
        functions: Arc<FunctionTable>,
        variables: Arc<VariableTable>,
    ) -> Self {
        Self {
            resolvers,
            functions,
            variables,
        }
    }
}

/// A parsed expression bound to its context.
#[derive(Debug)]
pub struct EmbeddedInterpreterBackend {
    compiled: CompiledExpression,
    context: EmbeddedContext,
}

impl EmbeddedInterpreterBackend {
    /// Parse and check `expression` against the context's functions.
    pub fn prepare(expression: &str, context: EmbeddedContext) -> Result<Self, PreparationError> {
        let compiled = verdict_lang::parse_and_compile(expression, context.functions.as_ref())
            .map_err(|e| PreparationError::InvalidExpression {
                language: EMBEDDED_LANGUAGE.to_string(),
                expression: expression.to_string(),
                message: e.to_string(),
                diagnostic: e.format_with_source(expression),
            })?;
        Ok(Self { compiled, context })
    }

    /// Identifiers the expression reads.
    pub fn identifiers(&self) -> &[String] {
        &self.compiled.identifiers
    }
}

impl ExpressionBackend for EmbeddedInterpreterBackend {
    fn language(&self) -> &str {
        EMBEDDED_LANGUAGE
    }

    fn evaluate(&self, bindings: &BindingEnvironment) -> Result<Value, EvaluationError> {
        Interpreter::new(&self.context, bindings).eval(&self.compiled.root)
    }
}
