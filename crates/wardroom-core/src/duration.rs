//! Human-readable durations for `/silence`.
//!
//! Accepts the compact `30s` / `5m` / `1h30m` / `1.5s` notation and prints
//! durations back in the same style (`5m0s`, `1m30s`), matching what chat
//! users expect to type and read.

use std::time::Duration;

use crate::error::DurationError;

// Anything past this is treated as a typo rather than a sentence.
const MAX_SECONDS: f64 = 1e12;

/// Parse a duration string such as `30s`, `5m`, `1h30m` or `1.5s`.
///
/// A duration is one or more `<number><unit>` segments which are summed;
/// units are `ns`, `us`/`µs`, `ms`, `s`, `m`, `h`.
pub fn parse_duration(input: &str) -> Result<Duration, DurationError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(DurationError::Empty);
    }

    let mut total_secs = 0f64;
    let mut rest = input;
    while !rest.is_empty() {
        let num_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if num_end == 0 {
            return Err(DurationError::InvalidNumber(rest.to_string()));
        }
        let (num, after) = rest.split_at(num_end);
        let value: f64 = num
            .parse()
            .map_err(|_| DurationError::InvalidNumber(num.to_string()))?;

        let unit_end = after
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(after.len());
        let (unit, tail) = after.split_at(unit_end);
        let scale = match unit {
            "ns" => 1e-9,
            "us" | "µs" => 1e-6,
            "ms" => 1e-3,
            "s" => 1.0,
            "m" => 60.0,
            "h" => 3600.0,
            _ => return Err(DurationError::UnknownUnit(unit.to_string())),
        };

        total_secs += value * scale;
        rest = tail;
    }

    if !total_secs.is_finite() || total_secs > MAX_SECONDS {
        return Err(DurationError::InvalidNumber(input.to_string()));
    }
    Ok(Duration::from_secs_f64(total_secs))
}

/// Render a duration the way [`parse_duration`] reads one: `5m0s`, `1m30s`,
/// `1h1m1s`, `1.5s`, `500ms`.
pub fn format_duration(d: Duration) -> String {
    if d.is_zero() {
        return "0s".to_string();
    }

    if d < Duration::from_secs(1) {
        let nanos = d.subsec_nanos();
        return if nanos % 1_000_000 == 0 {
            format!("{}ms", nanos / 1_000_000)
        } else if nanos % 1_000 == 0 {
            format!("{}µs", nanos / 1_000)
        } else {
            format!("{nanos}ns")
        };
    }

    let total = d.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = (total % 60) as f64 + f64::from(d.subsec_nanos()) / 1e9;

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if hours > 0 || minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    out.push_str(&format!("{secs}s"));
    out
}
