//! Weighted checksum computation.

use tracing::trace;

use super::config::{Algorithm, CheckDigitConfig};
use crate::error::CheckDigitError;

/// Stateless check digit validator.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckDigitEngine;

/// Window and check digit resolved against a concrete input.
struct Layout {
    check_digit_index: usize,
    /// Payload positions, starting next to the check digit.
    positions: Vec<usize>,
}

impl CheckDigitEngine {
    /// Validate `input` against `config`.
    ///
    /// Empty input is vacuously valid.
    pub fn evaluate(config: &CheckDigitConfig, input: &str) -> Result<bool, CheckDigitError> {
        if input.is_empty() {
            return Ok(true);
        }

        let chars: Vec<char> = input.chars().collect();
        let layout = Self::layout(config, chars.len())?;

        let cd_char = chars[layout.check_digit_index];
        let actual = cd_char
            .to_digit(10)
            .ok_or_else(|| CheckDigitError::InvalidCheckDigit {
                index: layout.check_digit_index,
                reason: format!("'{}' is not a decimal digit", cd_char),
            })?;

        let mut digits = Vec::with_capacity(layout.positions.len());
        for index in layout.positions {
            let c = chars[index];
            match c.to_digit(10) {
                Some(d) => digits.push(d),
                None if config.ignore_non_digits() => {}
                None => {
                    return Err(CheckDigitError::NonDigitCharacter {
                        index,
                        character: c,
                    })
                }
            }
        }

        let expected = match config.algorithm() {
            Algorithm::Mod10 => mod10(
                &digits,
                config.multiplier(),
                config.digit_sum_reduction(),
            ),
            Algorithm::Mod11 => mod11(&digits, config.multiplier()).ok_or_else(|| {
                CheckDigitError::InvalidCheckDigit {
                    index: layout.check_digit_index,
                    reason: "checksum requires a check value of 10".to_string(),
                }
            })?,
        };

        let valid = expected == actual;
        trace!(
            algorithm = %config.algorithm(),
            expected,
            actual,
            valid,
            "check digit evaluated"
        );
        Ok(valid)
    }

    fn layout(config: &CheckDigitConfig, len: usize) -> Result<Layout, CheckDigitError> {
        let end = config.end_index().min(len);
        let start = config.start_index().min(end);

        match config.check_digit_index() {
            None => {
                if start == end {
                    return Err(CheckDigitError::InvalidCheckDigit {
                        index: end,
                        reason: "window contains no check digit".to_string(),
                    });
                }
                let cd = end - 1;
                Ok(Layout {
                    check_digit_index: cd,
                    positions: (start..cd).rev().collect(),
                })
            }
            Some(cd) => {
                if cd >= len {
                    return Err(CheckDigitError::InvalidCheckDigit {
                        index: cd,
                        reason: format!("index is beyond input of length {}", len),
                    });
                }
                let positions = if cd >= config.end_index() {
                    (start..end).rev().collect()
                } else {
                    (start..end).collect()
                };
                Ok(Layout {
                    check_digit_index: cd,
                    positions,
                })
            }
        }
    }
}

/// Expected MOD10 digit for payload `digits`, ordered from the check digit.
///
/// Weights alternate `|multiplier|` and 1. A positive multiplier puts the
/// first `|multiplier|` next to the check digit, a negative one on the digit
/// farthest from it. With `reduce`, weighted values above 9 lose 9.
fn mod10(digits: &[u32], multiplier: i32, reduce: bool) -> u32 {
    let weight = multiplier.unsigned_abs();
    let n = digits.len();

    let sum = digits.iter().enumerate().fold(0, |acc, (k, &d)| {
        let offset = if multiplier > 0 { k } else { n - 1 - k };
        let mut p = if offset % 2 == 0 { d * weight } else { d };
        if reduce && p > 9 {
            p -= 9;
        }
        (acc + p) % 10
    });

    (10 - sum) % 10
}

/// Expected MOD11 digit, or `None` when the checksum would need a 10.
fn mod11(digits: &[u32], multiplier: i32) -> Option<u32> {
    let first = multiplier.unsigned_abs() as usize;
    let n = digits.len();
    let cycle = |offset: usize| (2 + (first - 2 + offset) % 9) as u32;

    let sum = digits.iter().enumerate().fold(0, |acc, (k, &d)| {
        let offset = if multiplier > 0 { k } else { n - 1 - k };
        (acc + d * cycle(offset)) % 11
    });

    match 11 - sum {
        11 => Some(0),
        10 => None,
        r => Some(r),
    }
}
