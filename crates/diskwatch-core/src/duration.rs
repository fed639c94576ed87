use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use thiserror::Error;

static DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)([smhdy])$").expect("duration pattern is valid"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DurationError {
    #[error("invalid duration format: {0:?} (expected <integer><s|m|h|d|y>)")]
    InvalidFormat(String),
    #[error("duration out of range: {0:?}")]
    OutOfRange(String),
}

fn unit_seconds(unit: &str) -> Option<u64> {
    match unit {
        "s" => Some(1),
        "m" => Some(60),
        "h" => Some(3_600),
        "d" => Some(86_400),
        "y" => Some(31_536_000),
        _ => None,
    }
}

/// Parses `15s`, `1h` and the like into whole seconds; the whole string must match.
pub fn parse_duration_secs(input: &str) -> Result<u64, DurationError> {
    let invalid = || DurationError::InvalidFormat(input.to_string());

    let caps = DURATION_RE.captures(input).ok_or_else(invalid)?;
    let unit = unit_seconds(&caps[2]).ok_or_else(invalid)?;
    let value: u64 = caps[1]
        .parse()
        .map_err(|_| DurationError::OutOfRange(input.to_string()))?;

    value
        .checked_mul(unit)
        .ok_or_else(|| DurationError::OutOfRange(input.to_string()))
}

pub fn parse_duration(input: &str) -> Result<Duration, DurationError> {
    parse_duration_secs(input).map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_unit_scales_by_its_factor() {
        let cases = [
            ("15s", 15),
            ("2m", 120),
            ("1h", 3_600),
            ("3d", 259_200),
            ("1y", 31_536_000),
            ("0s", 0),
        ];

        for (input, expected) in cases {
            assert_eq!(parse_duration_secs(input), Ok(expected), "input {input}");
        }
    }

    #[test]
    fn rejects_anything_outside_the_grammar() {
        let inputs = [
            "", "15", "s", "15w", "-5s", "1.5h", "15s ", " 15s", "15sx", "1h30m", "15S",
            // digits outside ASCII
            "\u{0661}\u{0665}s", "\u{FF11}\u{FF15}m",
        ];
        for input in inputs {
            assert_eq!(
                parse_duration_secs(input),
                Err(DurationError::InvalidFormat(input.to_string())),
                "input {input:?}"
            );
        }
    }

    #[test]
    fn overflow_is_reported_instead_of_wrapping() {
        let input = "18446744073709551615y";
        assert_eq!(
            parse_duration_secs(input),
            Err(DurationError::OutOfRange(input.to_string()))
        );
        assert!(matches!(
            parse_duration_secs("99999999999999999999999s"),
            Err(DurationError::OutOfRange(_))
        ));
    }

    #[test]
    fn parse_duration_wraps_seconds() {
        assert_eq!(parse_duration("1m"), Ok(Duration::from_secs(60)));
    }
}
