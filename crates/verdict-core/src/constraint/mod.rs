//! Constraint instances attached to validated values.
//!
//! - [`ModulusConstraint`] - check digit validation of strings
//! - [`ExpressionConstraint`] - boolean expressions over a value or parameters

mod expression;
mod modulus;

pub use expression::{ExpressionConstraint, PreparationState};
pub use modulus::{ModulusConstraint, Nullability};
