//! Check digit constraints.

use tracing::trace;

use crate::checkdigit::{CheckDigitConfig, CheckDigitEngine, ModulusAttributes};
use crate::error::{CheckDigitError, ConfigError};

/// How an absent value is judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Nullability {
    /// Absent values are valid.
    #[default]
    Nullable,
    /// Absent values are violations.
    NotNull,
}

/// A string constraint validated by a modulus check digit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModulusConstraint {
    config: CheckDigitConfig,
    nullability: Nullability,
}

impl ModulusConstraint {
    /// Absent values pass.
    pub fn new(config: CheckDigitConfig) -> Self {
        Self {
            config,
            nullability: Nullability::Nullable,
        }
    }

    /// Absent values fail.
    pub fn not_null(config: CheckDigitConfig) -> Self {
        Self {
            config,
            nullability: Nullability::NotNull,
        }
    }

    /// Payment card numbers (Luhn).
    pub fn credit_card_number() -> Self {
        Self::new(CheckDigitConfig::luhn())
    }

    /// Build from declaration attributes.
    pub fn from_attributes(
        attrs: ModulusAttributes,
        nullability: Nullability,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            config: CheckDigitConfig::try_from(attrs)?,
            nullability,
        })
    }

    pub fn config(&self) -> &CheckDigitConfig {
        &self.config
    }

    pub fn nullability(&self) -> Nullability {
        self.nullability
    }

    /// Validate `value`.
    pub fn is_valid(&self, value: Option<&str>) -> Result<bool, CheckDigitError> {
        match value {
            Some(input) => CheckDigitEngine::evaluate(&self.config, input),
            None => {
                let valid = self.nullability == Nullability::Nullable;
                trace!(valid, "absent value");
                Ok(valid)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_card_number() {
        let constraint = ModulusConstraint::credit_card_number();
        assert!(constraint.is_valid(Some("4417123456789113")).unwrap());
        assert!(!constraint.is_valid(Some("4417123456789114")).unwrap());
        assert!(constraint.is_valid(None).unwrap());
    }

    #[test]
    fn test_not_null() {
        let constraint = ModulusConstraint::not_null(CheckDigitConfig::luhn());
        assert!(!constraint.is_valid(None).unwrap());
        assert!(constraint.is_valid(Some("")).unwrap());
        assert!(constraint.is_valid(Some("79927398713")).unwrap());
    }

    #[test]
    fn test_from_attributes() {
        let attrs: ModulusAttributes = serde_json::from_str(
            r#"{"type": "MOD10", "multiplier": 3, "digitSumReduction": false}"#,
        )
        .unwrap();
        let constraint = ModulusConstraint::from_attributes(attrs, Nullability::NotNull).unwrap();
        assert_eq!(constraint.nullability(), Nullability::NotNull);
        assert!(constraint.is_valid(Some("4006381333931")).unwrap());
    }
}
