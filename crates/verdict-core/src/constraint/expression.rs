//! Expression constraints.

use std::sync::{Arc, OnceLock};

use tracing::warn;

use crate::error::{ConfigError, ConstraintError, PreparationError};
use crate::expression::{ExpressionAttributes, ExpressionEvaluator, ExpressionSpec, PreparedExpression};
use crate::value::Value;

/// Preparation state of an [`ExpressionConstraint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreparationState {
    /// Not prepared yet.
    Unprepared,
    /// Prepared; evaluations run.
    Ready,
    /// Preparation failed; every evaluation reports the same error.
    Failed,
}

/// A constraint whose verdict is a boolean expression.
///
/// The expression is prepared exactly once, on [`initialize`](Self::initialize)
/// or the first evaluation, whichever comes first. Concurrent first callers
/// block until that single preparation finishes.
#[derive(Debug)]
pub struct ExpressionConstraint {
    spec: ExpressionSpec,
    evaluator: Arc<ExpressionEvaluator>,
    prepared: OnceLock<Result<PreparedExpression, PreparationError>>,
}

impl ExpressionConstraint {
    pub fn new(spec: ExpressionSpec, evaluator: Arc<ExpressionEvaluator>) -> Self {
        Self {
            spec,
            evaluator,
            prepared: OnceLock::new(),
        }
    }

    /// Build from declaration attributes.
    pub fn from_attributes(
        attrs: ExpressionAttributes,
        evaluator: Arc<ExpressionEvaluator>,
    ) -> Result<Self, ConfigError> {
        Ok(Self::new(ExpressionSpec::try_from(attrs)?, evaluator))
    }

    pub fn spec(&self) -> &ExpressionSpec {
        &self.spec
    }

    /// Prepare now, reporting a setup error.
    pub fn initialize(&self) -> Result<(), PreparationError> {
        self.prepared().map(|_| ())
    }

    pub fn state(&self) -> PreparationState {
        match self.prepared.get() {
            None => PreparationState::Unprepared,
            Some(Ok(_)) => PreparationState::Ready,
            Some(Err(_)) => PreparationState::Failed,
        }
    }

    /// Validate a single object bound to the bean alias.
    pub fn is_valid_value(&self, value: impl Into<Value>) -> Result<bool, ConstraintError> {
        Ok(self.prepared()?.evaluate_value(value)?)
    }

    /// Validate positional parameters bound to the parameter aliases.
    pub fn is_valid_parameters(&self, values: &[Value]) -> Result<bool, ConstraintError> {
        Ok(self.prepared()?.evaluate(values)?)
    }

    fn prepared(&self) -> Result<&PreparedExpression, PreparationError> {
        self.prepared
            .get_or_init(|| {
                self.evaluator.prepare(&self.spec).inspect_err(|e| {
                    warn!(
                        expression = self.spec.expression(),
                        error = %e,
                        "expression constraint unusable"
                    );
                })
            })
            .as_ref()
            .map_err(Clone::clone)
    }
}
