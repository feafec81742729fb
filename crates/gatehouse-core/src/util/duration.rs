use chrono::Duration;

use crate::error::{CoreError, CoreResult};

/// ## Summary
/// Parses a human duration such as `7d`, `1d12h`, `90m`, `30s` or `250ms`.
///
/// A bare integer is read as seconds.
///
/// ## Errors
/// Returns `CoreError::InvalidDuration` for empty input, unknown units, missing
/// numbers or values that overflow.
pub fn parse_duration(input: &str) -> CoreResult<Duration> {
    let trimmed = input.trim();
    let invalid = |reason| CoreError::InvalidDuration {
        input: input.to_owned(),
        reason,
    };

    if trimmed.is_empty() {
        return Err(invalid("empty duration"));
    }

    if let Ok(seconds) = trimmed.parse::<i64>() {
        return Duration::try_seconds(seconds).ok_or_else(|| invalid("out of range"));
    }

    let mut total = Duration::zero();
    let mut rest = trimmed;

    while !rest.is_empty() {
        let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        if digits == 0 {
            return Err(invalid("expected a number"));
        }
        let value: i64 = rest[..digits]
            .parse()
            .map_err(|_err| invalid("number out of range"))?;
        rest = &rest[digits..];

        let unit_len = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
        let unit = &rest[..unit_len];
        rest = &rest[unit_len..];

        let part = match unit {
            "d" => Duration::try_days(value),
            "h" => Duration::try_hours(value),
            "m" => Duration::try_minutes(value),
            "s" => Duration::try_seconds(value),
            "ms" => Duration::try_milliseconds(value),
            "" => return Err(invalid("missing unit")),
            _ => return Err(invalid("unknown unit")),
        }
        .ok_or_else(|| invalid("out of range"))?;

        total = total
            .checked_add(&part)
            .ok_or_else(|| invalid("out of range"))?;
    }

    Ok(total)
}
