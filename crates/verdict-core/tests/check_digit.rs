//! Integration tests for check digit validation.

use proptest::prelude::*;
use verdict_core::checkdigit::{Algorithm, CheckDigitConfig, CheckDigitConfigBuilder, CheckDigitEngine};
use verdict_core::{CheckDigitError, ConfigError};

fn luhn_with(builder: impl FnOnce(CheckDigitConfigBuilder) -> CheckDigitConfigBuilder) -> CheckDigitConfig {
    builder(CheckDigitConfig::builder(Algorithm::Mod10, 2))
        .build()
        .unwrap()
}

/// The single check digit that makes `payload` valid under Luhn.
fn luhn_check_digit(payload: &str) -> char {
    let config = CheckDigitConfig::luhn();
    let valid: Vec<char> = ('0'..='9')
        .filter(|d| CheckDigitEngine::evaluate(&config, &format!("{}{}", payload, d)).unwrap())
        .collect();
    assert_eq!(valid.len(), 1, "payload {} has check digits {:?}", payload, valid);
    valid[0]
}

#[test]
fn luhn_reference_vector() {
    let config = CheckDigitConfig::luhn();
    assert!(CheckDigitEngine::evaluate(&config, "4417123456789113").unwrap());
}

#[test]
fn window_inside_longer_string() {
    let config = luhn_with(|b| b.window(2, 18));
    assert!(CheckDigitEngine::evaluate(&config, "XX4417123456789113YY").unwrap());
    assert!(!CheckDigitEngine::evaluate(&config, "XX4417123456789114YY").unwrap());
}

#[test]
fn end_index_is_clamped_to_input() {
    let config = luhn_with(|b| b.window(0, 100));
    assert!(CheckDigitEngine::evaluate(&config, "4417123456789113").unwrap());
}

#[test]
fn separators_are_ignored_by_default() {
    let config = CheckDigitConfig::luhn();
    assert!(CheckDigitEngine::evaluate(&config, "4417-1234-5678-9113").unwrap());
    assert!(CheckDigitEngine::evaluate(&config, "4417 1234 5678 9113").unwrap());
}

#[test]
fn separators_rejected_in_strict_mode() {
    let config = luhn_with(|b| b.ignore_non_digits(false));
    let err = CheckDigitEngine::evaluate(&config, "4417-1234-5678-9113").unwrap_err();
    assert_eq!(
        err,
        CheckDigitError::NonDigitCharacter {
            index: 14,
            character: '-'
        }
    );
}

#[test]
fn check_digit_after_window() {
    let config = luhn_with(|b| b.window(0, 15).check_digit_index(16));
    assert!(CheckDigitEngine::evaluate(&config, "441712345678911-3").unwrap());
    assert!(!CheckDigitEngine::evaluate(&config, "441712345678911-4").unwrap());
}

#[test]
fn check_digit_before_window() {
    // Payload reversed so the digit next to the check digit is unchanged.
    let config = luhn_with(|b| b.window(1, 16).check_digit_index(0));
    assert!(CheckDigitEngine::evaluate(&config, "3119876543217144").unwrap());
}

#[test]
fn check_digit_index_beyond_input() {
    let config = luhn_with(|b| b.window(0, 4).check_digit_index(10));
    let err = CheckDigitEngine::evaluate(&config, "12345").unwrap_err();
    assert!(matches!(err, CheckDigitError::InvalidCheckDigit { index: 10, .. }));
}

#[test]
fn empty_window_without_check_digit() {
    let config = luhn_with(|b| b.window(3, 3));
    let err = CheckDigitEngine::evaluate(&config, "12345").unwrap_err();
    assert!(matches!(err, CheckDigitError::InvalidCheckDigit { .. }));
}

#[test]
fn unicode_positions_are_characters() {
    let config = luhn_with(|b| b.window(2, 18));
    assert!(CheckDigitEngine::evaluate(&config, "éé4417123456789113").unwrap());
}

#[test]
fn ean13_and_isbn10() {
    assert!(CheckDigitEngine::evaluate(&CheckDigitConfig::ean13(), "4006381333931").unwrap());
    assert!(CheckDigitEngine::evaluate(&CheckDigitConfig::isbn10(), "0306406152").unwrap());
    assert!(CheckDigitEngine::evaluate(&CheckDigitConfig::isbn10(), "0-306-40615-2").unwrap());
}

#[test]
fn oversized_mod10_multipliers_are_rejected() {
    for multiplier in [10, -10, 1_000_000_000, i32::MIN, i32::MAX] {
        assert_eq!(
            CheckDigitConfig::new(Algorithm::Mod10, multiplier).unwrap_err(),
            ConfigError::InvalidMultiplier {
                algorithm: Algorithm::Mod10,
                multiplier
            }
        );
    }
}

#[test]
fn largest_multiplier_evaluates_long_input() {
    let input = "9".repeat(200_000);
    for multiplier in [9, -9] {
        let config = CheckDigitConfig::new(Algorithm::Mod10, multiplier).unwrap();
        assert!(CheckDigitEngine::evaluate(&config, "90").is_ok());
        assert!(CheckDigitEngine::evaluate(&config, &input).is_ok());
    }
}

#[test]
fn mod10_reduction_applies_to_every_multiplier() {
    // Payload 9 weighted by 5 is 45, reduced once to 36: check digit 4.
    let config = CheckDigitConfig::new(Algorithm::Mod10, 5).unwrap();
    assert!(CheckDigitEngine::evaluate(&config, "94").unwrap());
    assert!(!CheckDigitEngine::evaluate(&config, "91").unwrap());

    // Same payload, plain weighted sum: 45 gives check digit 5.
    let plain = CheckDigitConfig::builder(Algorithm::Mod10, 5)
        .digit_sum_reduction(false)
        .build()
        .unwrap();
    assert!(CheckDigitEngine::evaluate(&plain, "95").unwrap());
}

#[test]
fn negative_mod10_multiplier_weights_from_the_far_end() {
    // Payload "91" from the check digit: [1, 9]. Descending doubles the 9.
    let descending = CheckDigitConfig::new(Algorithm::Mod10, -2).unwrap();
    assert!(CheckDigitEngine::evaluate(&descending, "910").unwrap());
    // Ascending doubles the 1: 2 + 9 = 11, check digit 9.
    assert!(CheckDigitEngine::evaluate(&CheckDigitConfig::luhn(), "919").unwrap());
}

proptest! {
    #[test]
    fn single_digit_change_is_detected(
        payload in "[0-9]{1,24}",
        position in any::<prop::sample::Index>(),
        delta in 1u32..10,
    ) {
        let config = CheckDigitConfig::luhn();
        let valid = format!("{}{}", payload, luhn_check_digit(&payload));
        prop_assert!(CheckDigitEngine::evaluate(&config, &valid).unwrap());

        let mut chars: Vec<char> = valid.chars().collect();
        let i = position.index(chars.len());
        let d = chars[i].to_digit(10).unwrap();
        chars[i] = char::from_digit((d + delta) % 10, 10).unwrap();
        let altered: String = chars.into_iter().collect();
        prop_assert!(!CheckDigitEngine::evaluate(&config, &altered).unwrap());
    }

    #[test]
    fn window_equals_slice(
        prefix in "[a-z0-9]{0,6}",
        body in "[0-9]{1,20}",
        suffix in "[a-z0-9]{0,6}",
    ) {
        let start = prefix.chars().count();
        let end = start + body.chars().count();
        let windowed = luhn_with(|b| b.window(start, end));
        let full = format!("{}{}{}", prefix, body, suffix);
        prop_assert_eq!(
            CheckDigitEngine::evaluate(&windowed, &full).unwrap(),
            CheckDigitEngine::evaluate(&CheckDigitConfig::luhn(), &body).unwrap()
        );
    }

    #[test]
    fn digits_only_matches_separated(body in "[0-9]{2,20}") {
        let separated: String = body
            .chars()
            .enumerate()
            .flat_map(|(i, c)| if i > 0 && i % 4 == 0 { vec!['-', c] } else { vec![c] })
            .collect();
        let config = CheckDigitConfig::luhn();
        prop_assert_eq!(
            CheckDigitEngine::evaluate(&config, &body).unwrap(),
            CheckDigitEngine::evaluate(&config, &separated).unwrap()
        );
    }
}
