//! Verdict core: constraint evaluation.
//!
//! Two families of constraints are provided:
//!
//! - Check digits ([`checkdigit`]): MOD10 and MOD11 weighted checksums over
//!   a configurable window of a string, covering Luhn, EAN/UPC and ISBN-10.
//! - Expressions ([`expression`]): a boolean expression over a value or a
//!   list of parameters, evaluated by the embedded interpreter (feature
//!   `embedded-el`) or an externally registered script engine.
//!
//! [`constraint`] wraps both into reusable, thread-safe constraint
//! instances. The library logs through `tracing` and never installs a
//! subscriber.

pub mod binding;
pub mod checkdigit;
pub mod constraint;
pub mod error;
pub mod expression;
pub mod value;

pub use binding::BindingEnvironment;
pub use checkdigit::{Algorithm, CheckDigitConfig, CheckDigitEngine};
pub use constraint::{ExpressionConstraint, ModulusConstraint, Nullability, PreparationState};
pub use error::{CheckDigitError, ConfigError, ConstraintError, EvaluationError, PreparationError};
pub use expression::{
    Capabilities, CapabilityProbe, EngineRegistry, ExpressionEvaluator, ExpressionSpec,
    PreparedExpression, ScriptEngine, EMBEDDED_LANGUAGE,
};
pub use value::{Bean, Record, Value};
