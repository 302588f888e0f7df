//! Error types.

use thiserror::Error;

use crate::checkdigit::Algorithm;

/// Invalid constraint declaration, rejected when the constraint is built.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Window start lies after window end.
    #[error("invalid window: start index {start} is greater than end index {end}")]
    InvalidWindow {
        /// Window start.
        start: usize,
        /// Window end.
        end: usize,
    },

    /// Explicit check digit position lies inside the checked window.
    #[error("check digit index {index} lies inside the checked window [{start}, {end})")]
    CheckDigitInsideWindow {
        /// Check digit position.
        index: usize,
        /// Window start.
        start: usize,
        /// Window end.
        end: usize,
    },

    /// Multiplier unusable for the algorithm.
    #[error("multiplier {multiplier} is not valid for {algorithm}")]
    InvalidMultiplier {
        /// The algorithm.
        algorithm: Algorithm,
        /// The rejected multiplier.
        multiplier: i32,
    },

    /// Negative check digit index other than the "absent" sentinel.
    #[error("invalid check digit index: {0}")]
    InvalidCheckDigitIndex(i64),

    /// Both a bean alias and parameter aliases were declared.
    #[error("a bean alias and parameter aliases cannot both be declared")]
    ConflictingBindings,

    /// Neither a bean alias nor parameter aliases were declared.
    #[error("either a bean alias or parameter aliases must be declared")]
    MissingBindings,

    /// A binding name was empty.
    #[error("binding names must not be empty")]
    EmptyBindingName,

    /// The same parameter alias was declared twice.
    #[error("binding name '{0}' is declared more than once")]
    DuplicateBindingName(String),
}

/// Failure while computing a check digit.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CheckDigitError {
    /// A non-digit inside the window while non-digits are not ignored.
    #[error("non-digit character '{character}' at index {index}")]
    NonDigitCharacter {
        /// Character position.
        index: usize,
        /// The offending character.
        character: char,
    },

    /// The check digit is missing, not a digit, or cannot be represented.
    #[error("invalid check digit at index {index}: {reason}")]
    InvalidCheckDigit {
        /// Check digit position.
        index: usize,
        /// What went wrong.
        reason: String,
    },
}

/// Failure while preparing an expression.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PreparationError {
    /// No external engine is registered for the language.
    #[error("no expression engine registered for language '{0}'")]
    EngineNotFound(String),

    /// The embedded interpreter is not available.
    #[error("embedded expression runtime is not available")]
    EmbeddedRuntimeUnavailable,

    /// The expression does not parse or compile.
    #[error("invalid {language} expression '{expression}': {message}")]
    InvalidExpression {
        /// Language identifier.
        language: String,
        /// Expression source.
        expression: String,
        /// Short message.
        message: String,
        /// Rendered diagnostic with source context.
        diagnostic: String,
    },
}

/// Failure while evaluating a prepared expression.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvaluationError {
    /// Wrong number of values for a multi-binding expression.
    #[error("expected {expected} value(s), got {actual}")]
    ArityMismatch {
        /// Declared binding count.
        expected: usize,
        /// Supplied value count.
        actual: usize,
    },

    /// The expression produced null.
    #[error("expression '{expression}' evaluated to null")]
    NullResult {
        /// Expression source.
        expression: String,
    },

    /// The expression produced a non-boolean.
    #[error("expression '{expression}' evaluated to {actual}, expected boolean")]
    TypeMismatch {
        /// Expression source.
        expression: String,
        /// Description of the actual result type.
        actual: String,
    },

    /// An external engine failed.
    #[error("{language} engine failed on '{expression}': {message}")]
    BackendFailure {
        /// Language identifier.
        language: String,
        /// Expression source.
        expression: String,
        /// Engine message.
        message: String,
    },

    /// Assignment attempted in read-only evaluation.
    #[error("cannot assign to '{property}': evaluation is read-only")]
    ReadOnlyAssignment {
        /// Assignment target.
        property: String,
    },

    /// No resolver could resolve the property.
    #[error("property '{property}' not found on {base}")]
    PropertyNotFound {
        /// Property name.
        property: String,
        /// Base type description.
        base: String,
    },

    /// No resolver could invoke the method.
    #[error("method '{method}' not found on {base}")]
    MethodNotFound {
        /// Method name.
        method: String,
        /// Base type description.
        base: String,
    },

    /// Function missing from the function table.
    #[error("function '{0}' not found")]
    FunctionNotFound(String),

    /// A value could not be coerced.
    #[error("cannot coerce {from} to {to}")]
    Coercion {
        /// Source type.
        from: String,
        /// Target type.
        to: String,
    },

    /// Division or remainder by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// Bad argument to a function or method.
    #[error("invalid argument to '{function}': {message}")]
    InvalidArgument {
        /// Function or method name.
        function: String,
        /// What went wrong.
        message: String,
    },
}

#[cfg_attr(not(feature = "embedded-el"), allow(dead_code))]
impl EvaluationError {
    pub(crate) fn coercion(from: &crate::Value, to: &str) -> Self {
        EvaluationError::Coercion {
            from: from.type_name(),
            to: to.to_string(),
        }
    }

    pub(crate) fn invalid_argument(function: &str, message: impl Into<String>) -> Self {
        EvaluationError::InvalidArgument {
            function: function.to_string(),
            message: message.into(),
        }
    }
}

/// Any failure raised by a constraint.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConstraintError {
    /// Preparation failed.
    #[error("preparation error: {0}")]
    Preparation(#[from] PreparationError),

    /// Evaluation failed.
    #[error("evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),

    /// Check digit computation failed.
    #[error("check digit error: {0}")]
    CheckDigit(#[from] CheckDigitError),

    /// Declaration was invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = EvaluationError::ArityMismatch {
            expected: 2,
            actual: 3,
        };
        assert_eq!(err.to_string(), "expected 2 value(s), got 3");

        let err = ConfigError::InvalidMultiplier {
            algorithm: Algorithm::Mod11,
            multiplier: 1,
        };
        assert_eq!(err.to_string(), "multiplier 1 is not valid for MOD11");
    }

    #[test]
    fn test_constraint_error_from() {
        let err: ConstraintError = PreparationError::EngineNotFound("lua".into()).into();
        assert!(matches!(err, ConstraintError::Preparation(_)));
        assert!(err.to_string().contains("lua"));
    }
}
