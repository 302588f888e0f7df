//! Pluggable expression evaluation.
//!
//! An [`ExpressionSpec`] names an expression, its language and its binding
//! names. [`ExpressionEvaluator::prepare`] selects a backend once: the
//! embedded interpreter for [`EMBEDDED_LANGUAGE`], otherwise an engine from
//! the [`EngineRegistry`]. The resulting [`PreparedExpression`] is evaluated
//! any number of times and always yields a boolean or an error.
//!
//! # Example
//!
//! ```rust
//! # #[cfg(feature = "embedded-el")]
//! # {
//! use verdict_core::expression::{ExpressionEvaluator, ExpressionSpec};
//!
//! let evaluator = ExpressionEvaluator::new();
//! let spec = ExpressionSpec::for_parameters("start < end", ["start", "end"]).unwrap();
//! let prepared = evaluator.prepare(&spec).unwrap();
//! assert!(prepared.evaluate(&[1.into(), 2.into()]).unwrap());
//! # }
//! ```

mod backend;
mod capability;
#[cfg(feature = "embedded-el")]
pub mod embedded;
mod evaluator;
mod external;
mod registry;
mod spec;

pub use backend::ExpressionBackend;
pub use capability::{Capabilities, CapabilityProbe};
pub use evaluator::{ExpressionEvaluator, PreparedExpression};
pub use external::ExternalEngineBackend;
pub use registry::{EngineError, EngineRegistry, ScriptEngine};
pub use spec::{BindingNames, ExpressionAttributes, ExpressionSpec, EMBEDDED_LANGUAGE};
