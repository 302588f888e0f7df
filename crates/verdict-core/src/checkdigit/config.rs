//! Check digit configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Checksum algorithm family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Algorithm {
    /// Modulus 10 (Luhn, EAN/UPC).
    Mod10,
    /// Modulus 11 (ISBN-10 and relatives).
    Mod11,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Mod10 => write!(f, "MOD10"),
            Algorithm::Mod11 => write!(f, "MOD11"),
        }
    }
}

/// Validated, immutable check digit configuration.
///
/// Built through [`CheckDigitConfig::builder`]; invalid combinations are
/// rejected by [`CheckDigitConfigBuilder::build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckDigitConfig {
    algorithm: Algorithm,
    multiplier: i32,
    start_index: usize,
    end_index: usize,
    check_digit_index: Option<usize>,
    ignore_non_digits: bool,
    digit_sum_reduction: bool,
}

impl CheckDigitConfig {
    /// Start building a configuration.
    pub fn builder(algorithm: Algorithm, multiplier: i32) -> CheckDigitConfigBuilder {
        CheckDigitConfigBuilder {
            config: CheckDigitConfig {
                algorithm,
                multiplier,
                start_index: 0,
                end_index: usize::MAX,
                check_digit_index: None,
                ignore_non_digits: true,
                digit_sum_reduction: true,
            },
        }
    }

    /// Whole-string configuration with default options.
    pub fn new(algorithm: Algorithm, multiplier: i32) -> Result<Self, ConfigError> {
        Self::builder(algorithm, multiplier).build()
    }

    /// Luhn: MOD10 with multiplier 2, as used for payment card numbers.
    pub fn luhn() -> Self {
        CheckDigitConfig {
            algorithm: Algorithm::Mod10,
            multiplier: 2,
            start_index: 0,
            end_index: usize::MAX,
            check_digit_index: None,
            ignore_non_digits: true,
            digit_sum_reduction: true,
        }
    }

    /// ISBN-10 style MOD11 with weights 2, 3, 4, ... from the check digit.
    pub fn isbn10() -> Self {
        CheckDigitConfig {
            algorithm: Algorithm::Mod11,
            multiplier: 2,
            ..Self::luhn()
        }
    }

    /// EAN-13 / UPC: MOD10 with weights 3 and 1 from the check digit and
    /// no digit-sum reduction.
    pub fn ean13() -> Self {
        CheckDigitConfig {
            multiplier: 3,
            digit_sum_reduction: false,
            ..Self::luhn()
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn multiplier(&self) -> i32 {
        self.multiplier
    }

    pub fn start_index(&self) -> usize {
        self.start_index
    }

    /// Window end, exclusive. `usize::MAX` means the end of the input.
    pub fn end_index(&self) -> usize {
        self.end_index
    }

    pub fn check_digit_index(&self) -> Option<usize> {
        self.check_digit_index
    }

    pub fn ignore_non_digits(&self) -> bool {
        self.ignore_non_digits
    }

    /// Whether MOD10 weighted values above 9 have 9 subtracted.
    pub fn digit_sum_reduction(&self) -> bool {
        self.digit_sum_reduction
    }
}

/// Builder for [`CheckDigitConfig`].
#[derive(Debug, Clone)]
pub struct CheckDigitConfigBuilder {
    config: CheckDigitConfig,
}

impl CheckDigitConfigBuilder {
    /// Restrict checking to the characters in `[start, end)`.
    pub fn window(mut self, start: usize, end: usize) -> Self {
        self.config.start_index = start;
        self.config.end_index = end;
        self
    }

    /// Set the window start.
    pub fn start_index(mut self, start: usize) -> Self {
        self.config.start_index = start;
        self
    }

    /// Set the window end (exclusive).
    pub fn end_index(mut self, end: usize) -> Self {
        self.config.end_index = end;
        self
    }

    /// Read the check digit from a position outside the window.
    pub fn check_digit_index(mut self, index: usize) -> Self {
        self.config.check_digit_index = Some(index);
        self
    }

    /// Whether non-digits inside the window are skipped.
    pub fn ignore_non_digits(mut self, ignore: bool) -> Self {
        self.config.ignore_non_digits = ignore;
        self
    }

    /// Turn the MOD10 digit-sum reduction off for plain weighted sums.
    /// MOD11 ignores this.
    pub fn digit_sum_reduction(mut self, reduce: bool) -> Self {
        self.config.digit_sum_reduction = reduce;
        self
    }

    /// Validate and build.
    pub fn build(self) -> Result<CheckDigitConfig, ConfigError> {
        let config = self.config;

        let multiplier_ok = match config.algorithm {
            Algorithm::Mod10 => (1..=9).contains(&config.multiplier.unsigned_abs()),
            Algorithm::Mod11 => (2..=10).contains(&config.multiplier.unsigned_abs()),
        };
        if !multiplier_ok {
            return Err(ConfigError::InvalidMultiplier {
                algorithm: config.algorithm,
                multiplier: config.multiplier,
            });
        }

        if config.start_index > config.end_index {
            return Err(ConfigError::InvalidWindow {
                start: config.start_index,
                end: config.end_index,
            });
        }

        if let Some(index) = config.check_digit_index {
            if (config.start_index..config.end_index).contains(&index) {
                return Err(ConfigError::CheckDigitInsideWindow {
                    index,
                    start: config.start_index,
                    end: config.end_index,
                });
            }
        }

        Ok(config)
    }
}

fn default_end_index() -> usize {
    usize::MAX
}

fn no_check_digit_index() -> i64 {
    -1
}

fn default_true() -> bool {
    true
}

/// Declaration-layer form of a modulus constraint.
///
/// Field names and defaults mirror the annotation attributes: the whole
/// string is checked, the check digit is the last character, and non-digits
/// are ignored. A negative `checkDigitIndex` means "no explicit index".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ModulusAttributes {
    /// Algorithm family.
    #[serde(rename = "type")]
    pub algorithm: Algorithm,
    /// Weight multiplier.
    pub multiplier: i32,
    /// Window start.
    #[serde(default)]
    pub start_index: usize,
    /// Window end, exclusive.
    #[serde(default = "default_end_index")]
    pub end_index: usize,
    /// Explicit check digit position, negative when absent.
    #[serde(default = "no_check_digit_index")]
    pub check_digit_index: i64,
    /// Whether non-digits are skipped.
    #[serde(default = "default_true")]
    pub ignore_non_digits: bool,
    /// Whether MOD10 weighted values above 9 have 9 subtracted.
    #[serde(default = "default_true")]
    pub digit_sum_reduction: bool,
}

impl TryFrom<ModulusAttributes> for CheckDigitConfig {
    type Error = ConfigError;

    fn try_from(attrs: ModulusAttributes) -> Result<Self, Self::Error> {
        let mut builder = CheckDigitConfig::builder(attrs.algorithm, attrs.multiplier)
            .window(attrs.start_index, attrs.end_index)
            .ignore_non_digits(attrs.ignore_non_digits)
            .digit_sum_reduction(attrs.digit_sum_reduction);
        match attrs.check_digit_index {
            -1 => {}
            i if i < 0 => return Err(ConfigError::InvalidCheckDigitIndex(i)),
            i => {
                let index = usize::try_from(i)
                    .map_err(|_| ConfigError::InvalidCheckDigitIndex(i))?;
                builder = builder.check_digit_index(index);
            }
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        for config in [
            CheckDigitConfig::luhn(),
            CheckDigitConfig::isbn10(),
            CheckDigitConfig::ean13(),
        ] {
            let rebuilt = CheckDigitConfig::builder(config.algorithm(), config.multiplier())
                .digit_sum_reduction(config.digit_sum_reduction())
                .build()
                .unwrap();
            assert_eq!(rebuilt, config);
        }
    }

    #[test]
    fn test_invalid_window() {
        let err = CheckDigitConfig::builder(Algorithm::Mod10, 2)
            .window(5, 2)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidWindow { start: 5, end: 2 });
    }

    #[test]
    fn test_check_digit_inside_window() {
        let err = CheckDigitConfig::builder(Algorithm::Mod10, 2)
            .window(0, 10)
            .check_digit_index(4)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::CheckDigitInsideWindow { index: 4, .. }));

        // Boundary: the end index itself is outside the window.
        assert!(CheckDigitConfig::builder(Algorithm::Mod10, 2)
            .window(0, 10)
            .check_digit_index(10)
            .build()
            .is_ok());
    }

    #[test]
    fn test_invalid_multipliers() {
        assert!(CheckDigitConfig::new(Algorithm::Mod10, 0).is_err());
        assert!(CheckDigitConfig::new(Algorithm::Mod10, 10).is_err());
        assert!(CheckDigitConfig::new(Algorithm::Mod10, -9).is_ok());
        assert_eq!(
            CheckDigitConfig::new(Algorithm::Mod10, 1_000_000_000).unwrap_err(),
            ConfigError::InvalidMultiplier {
                algorithm: Algorithm::Mod10,
                multiplier: 1_000_000_000,
            }
        );
        assert!(CheckDigitConfig::new(Algorithm::Mod10, i32::MIN).is_err());
        assert!(CheckDigitConfig::new(Algorithm::Mod11, i32::MIN).is_err());
        assert!(CheckDigitConfig::new(Algorithm::Mod11, 1).is_err());
        assert!(CheckDigitConfig::new(Algorithm::Mod11, 11).is_err());
        assert!(CheckDigitConfig::new(Algorithm::Mod11, -10).is_ok());
    }

    #[test]
    fn test_attributes_defaults() {
        let attrs: ModulusAttributes =
            serde_json::from_str(r#"{"type": "MOD10", "multiplier": 2}"#).unwrap();
        assert_eq!(attrs.end_index, usize::MAX);
        assert_eq!(attrs.check_digit_index, -1);
        assert!(attrs.ignore_non_digits);
        assert!(attrs.digit_sum_reduction);

        let config = CheckDigitConfig::try_from(attrs).unwrap();
        assert_eq!(config, CheckDigitConfig::luhn());
    }

    #[test]
    fn test_attributes_with_check_digit_index() {
        let attrs: ModulusAttributes = serde_json::from_str(
            r#"{"type": "MOD11", "multiplier": -2, "startIndex": 0, "endIndex": 9,
                "checkDigitIndex": 9, "ignoreNonDigits": false}"#,
        )
        .unwrap();
        let config = CheckDigitConfig::try_from(attrs).unwrap();
        assert_eq!(config.check_digit_index(), Some(9));
        assert!(!config.ignore_non_digits());
    }

    #[test]
    fn test_attributes_reject_bad_sentinel() {
        let attrs = ModulusAttributes {
            algorithm: Algorithm::Mod10,
            multiplier: 2,
            start_index: 0,
            end_index: usize::MAX,
            check_digit_index: -7,
            ignore_non_digits: true,
            digit_sum_reduction: true,
        };
        assert_eq!(
            CheckDigitConfig::try_from(attrs).unwrap_err(),
            ConfigError::InvalidCheckDigitIndex(-7)
        );
    }
}
