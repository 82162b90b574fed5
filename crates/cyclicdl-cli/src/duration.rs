//! Run duration parsing: a number with an optional `s`, `m`, `h` or `d`
//! suffix. A bare number is seconds.

use std::time::Duration;

use crate::error::CliError;

pub fn parse_duration(input: &str) -> Result<Duration, CliError> {
    let invalid = |reason| CliError::InvalidDuration {
        input: input.to_string(),
        reason,
    };

    let trimmed = input.trim();
    let (digits, multiplier) = match trimmed.char_indices().last() {
        None => return Err(invalid("empty")),
        Some((at, unit)) if unit.is_ascii_alphabetic() => {
            let multiplier = match unit.to_ascii_lowercase() {
                's' => 1,
                'm' => 60,
                'h' => 60 * 60,
                'd' => 24 * 60 * 60,
                _ => return Err(invalid("unknown unit, expected s, m, h or d")),
            };
            (trimmed.get(..at).unwrap_or_default(), multiplier)
        }
        Some(_) => (trimmed, 1),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("not a non-negative integer"));
    }
    let value: u64 = digits.parse().ok().ok_or_else(|| invalid("too large"))?;
    let secs = value.checked_mul(multiplier).ok_or_else(|| invalid("too large"))?;
    Ok(Duration::from_secs(secs))
}
