//! Shared helpers for the ASCII dialects
//!
//! Most scale firmwares agree on little beyond "there is a decimal number in
//! there somewhere". These helpers implement that last-resort extraction.

use std::sync::LazyLock;

use regex::Regex;
use weighlink_types::Reading;

static DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.\d+)").expect("invalid regex pattern"));

static SIGNED_DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([+-]?\d+\.\d+)").expect("invalid regex pattern"));

/// First unsigned decimal number in `text`
pub fn first_decimal(text: &str) -> Option<f64> {
    DECIMAL
        .captures(text)
        .and_then(|caps| parse_weight(&caps[1]))
}

/// First decimal number in `text`, keeping a leading sign
pub fn first_signed_decimal(text: &str) -> Option<f64> {
    SIGNED_DECIMAL
        .captures(text)
        .and_then(|caps| parse_weight(&caps[1]))
}

/// Kilogram reading from the first unsigned decimal number in `text`
pub fn decimal_reading(text: &str, stable: bool) -> Option<Reading> {
    first_decimal(text).map(|weight| Reading::kg(weight, stable))
}

/// Kilogram reading from the first signed decimal number in `text`
pub fn signed_decimal_reading(text: &str, stable: bool) -> Option<Reading> {
    first_signed_decimal(text).map(|weight| Reading::kg(weight, stable))
}

/// Parse a weight token, ignoring embedded whitespace (`"+  1.500"`)
pub fn parse_weight(raw: &str) -> Option<f64> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    compact.parse::<f64>().ok().filter(|w| w.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_decimal() {
        assert_eq!(first_decimal("abc 12.500 xyz"), Some(12.5));
        assert_eq!(first_decimal("-3.25 kg"), Some(3.25));
        assert_eq!(first_decimal("no number 42 here"), None);
        assert_eq!(first_decimal(""), None);
    }

    #[test]
    fn test_first_signed_decimal() {
        assert_eq!(first_signed_decimal("U  -000.500 kg"), Some(-0.5));
        assert_eq!(first_signed_decimal("+001.234"), Some(1.234));
    }

    #[test]
    fn test_parse_weight_with_spaces() {
        assert_eq!(parse_weight("+  1.500"), Some(1.5));
        assert_eq!(parse_weight("- 0.25"), Some(-0.25));
        assert_eq!(parse_weight("|1.5"), None);
    }

    #[test]
    fn test_decimal_reading() {
        let reading = decimal_reading("weight 7.125", true).unwrap();
        assert_eq!(reading.weight, 7.125);
        assert!(reading.stable);
        assert!(decimal_reading("none", true).is_none());
    }
}
