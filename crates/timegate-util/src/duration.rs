//! Duration string parsing
//!
//! Grant durations are written as `<integer><unit>` with unit one of
//! `d`, `h`, `m`, `s`. The compound form concatenates tokens which are
//! summed: `"1h30m"` is ninety minutes. Invalid or empty input is always a
//! parse error, never a default.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DurationParseError {
    #[error("empty duration string")]
    Empty,

    #[error("invalid duration token at {0:?}")]
    BadToken(String),

    #[error("unknown duration unit {0:?}")]
    UnknownUnit(char),

    #[error("duration out of range")]
    Overflow,
}

const SECS_PER_UNIT: [(char, u64); 4] = [('d', 86400), ('h', 3600), ('m', 60), ('s', 1)];

fn unit_secs(unit: char) -> Result<u64, DurationParseError> {
    SECS_PER_UNIT
        .iter()
        .find(|(u, _)| *u == unit)
        .map(|(_, s)| *s)
        .ok_or(DurationParseError::UnknownUnit(unit))
}

/// Parse a single `<integer><unit>` token, e.g. `"2h"`.
///
/// The whole input must be one token; `"1h30m"` is rejected here and only
/// accepted by [`parse_duration_multi`].
pub fn parse_duration(input: &str) -> Result<Duration, DurationParseError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(DurationParseError::Empty);
    }

    let mut chars = input.chars();
    let unit = chars.next_back().ok_or(DurationParseError::Empty)?;
    let digits = chars.as_str();

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DurationParseError::BadToken(input.to_string()));
    }

    let amount: u64 = digits
        .parse()
        .map_err(|_| DurationParseError::Overflow)?;
    let secs = amount
        .checked_mul(unit_secs(unit.to_ascii_lowercase())?)
        .ok_or(DurationParseError::Overflow)?;

    Ok(Duration::from_secs(secs))
}

/// Parse a compound duration of concatenated tokens summed together,
/// e.g. `"1h30m"` or `"7d12h"`. A single token is also accepted.
pub fn parse_duration_multi(input: &str) -> Result<Duration, DurationParseError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(DurationParseError::Empty);
    }

    let mut total: u64 = 0;
    let mut digits = String::new();

    for c in input.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
        } else {
            if digits.is_empty() {
                return Err(DurationParseError::BadToken(input.to_string()));
            }
            let amount: u64 = digits
                .parse()
                .map_err(|_| DurationParseError::Overflow)?;
            digits.clear();

            let secs = amount
                .checked_mul(unit_secs(c.to_ascii_lowercase())?)
                .ok_or(DurationParseError::Overflow)?;
            total = total.checked_add(secs).ok_or(DurationParseError::Overflow)?;
        }
    }

    // Trailing digits with no unit
    if !digits.is_empty() {
        return Err(DurationParseError::BadToken(input.to_string()));
    }

    Ok(Duration::from_secs(total))
}
