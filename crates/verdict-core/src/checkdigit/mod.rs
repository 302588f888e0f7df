//! Modulus-family check digit validation.
//!
//! Covers MOD10 (Luhn when the multiplier is positive, EAN/UPC style plain
//! weighting when it is negative) and MOD11 (cycling weights 2..=10).
//!
//! # Example
//!
//! ```rust
//! use verdict_core::checkdigit::{CheckDigitConfig, CheckDigitEngine};
//!
//! let config = CheckDigitConfig::luhn();
//! assert!(CheckDigitEngine::evaluate(&config, "4417123456789113").unwrap());
//! ```

mod config;
mod engine;

pub use config::{Algorithm, CheckDigitConfig, CheckDigitConfigBuilder, ModulusAttributes};
pub use engine::CheckDigitEngine;
