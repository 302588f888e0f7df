//! Backend seam between prepared expressions and interpreters.

use std::fmt;

use crate::binding::BindingEnvironment;
use crate::error::EvaluationError;
use crate::value::Value;

/// An interpreter holding one prepared expression.
///
/// Backends are immutable after preparation and evaluated concurrently.
pub trait ExpressionBackend: Send + Sync + fmt::Debug {
    /// Language identifier the backend was selected for.
    fn language(&self) -> &str;

    /// Evaluate against `bindings`, returning the raw result.
    fn evaluate(&self, bindings: &BindingEnvironment) -> Result<Value, EvaluationError>;
}
