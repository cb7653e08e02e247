//! Parsing for the CLI duration grammar: `<integer><unit>` with unit
//! one of `s`, `m`, `h` or `d`.

use chrono::Duration;

use crate::error::{LifecycleError, LifecycleResult};

/// Parse a duration string such as `"30d"` or `"3600s"`
///
/// A missing or unknown unit suffix, or a non-integer value, is an
/// [`LifecycleError::InvalidDuration`].
pub fn parse_duration(input: &str) -> LifecycleResult<Duration> {
    let invalid = |cause: &str| LifecycleError::InvalidDuration {
        input: input.to_string(),
        cause: cause.to_string(),
    };

    let mut chars = input.chars();
    let unit = chars.next_back().ok_or_else(|| invalid("empty string"))?;
    let value = chars.as_str();

    let multiplier: i64 = match unit {
        's' => 1,
        'm' => 60,
        'h' => 3600,
        'd' => 86400,
        u if u.is_ascii_digit() => return Err(invalid("missing unit suffix (s, m, h or d)")),
        _ => return Err(invalid("unknown unit suffix (expected s, m, h or d)")),
    };

    if value.is_empty() {
        return Err(invalid("missing integer value"));
    }
    let value: i64 = value
        .parse()
        .map_err(|_| invalid("value is not a non-negative integer"))?;
    if value < 0 {
        return Err(invalid("value is not a non-negative integer"));
    }

    // Grammar-valid input can still name a span no i64 of seconds (or
    // chrono Duration) can hold; that is a user error, not a panic.
    let seconds = value
        .checked_mul(multiplier)
        .ok_or_else(|| invalid("duration too large"))?;
    Duration::try_seconds(seconds).ok_or_else(|| invalid("duration too large"))
}

/// Render a duration compactly for human-readable output, e.g. `2d3h`
pub fn format_duration(duration: Duration) -> String {
    let mut secs = duration.num_seconds().max(0);

    let days = secs / 86400;
    secs %= 86400;
    let hours = secs / 3600;
    secs %= 3600;
    let minutes = secs / 60;
    secs %= 60;

    let mut out = String::new();
    if days > 0 {
        out.push_str(&format!("{}d", days));
    }
    if hours > 0 {
        out.push_str(&format!("{}h", hours));
    }
    if minutes > 0 {
        out.push_str(&format!("{}m", minutes));
    }
    if secs > 0 || out.is_empty() {
        out.push_str(&format!("{}s", secs));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LifecycleError;

    #[test]
    fn test_parse_all_units() {
        assert_eq!(parse_duration("1d").unwrap(), Duration::seconds(86_400));
        assert_eq!(parse_duration("24h").unwrap(), Duration::seconds(86_400));
        assert_eq!(parse_duration("60m").unwrap(), Duration::seconds(3_600));
        assert_eq!(parse_duration("3600s").unwrap(), Duration::seconds(3_600));
    }

    #[test]
    fn test_parse_rejects_unknown_suffix() {
        let err = parse_duration("80l").unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidDuration { .. }));
    }

    #[test]
    fn test_parse_rejects_missing_suffix() {
        let err = parse_duration("80").unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidDuration { .. }));
    }

    #[test]
    fn test_parse_rejects_overlarge_values() {
        // i64 overflow in the unit multiplication
        let err = parse_duration("9223372036854775807d").unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidDuration { .. }));
        // fits in i64 seconds but exceeds chrono's Duration bounds
        let err = parse_duration("9300000000000000s").unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidDuration { .. }));
    }

    #[test]
    fn test_parse_rejects_empty_and_bare_unit() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("d").is_err());
        assert!(parse_duration("1.5h").is_err());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::seconds(0)), "0s");
        assert_eq!(format_duration(Duration::seconds(59)), "59s");
        assert_eq!(format_duration(Duration::seconds(3_661)), "1h1m1s");
        assert_eq!(format_duration(Duration::seconds(180_000)), "2d2h");
    }
}
