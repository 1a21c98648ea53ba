//! Time parsing and display helpers.

use crate::error::{PerfError, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

/// Parse a flexible time specification into a `DateTime<Utc>`.
///
/// Supports:
/// - RFC3339: `2025-01-15T12:00:00Z`, `2025-01-15T12:00:00+00:00`
/// - Simple date: `2025-01-15` (midnight UTC)
/// - Relative duration into the past: `-7d`, `-2w`, `-12h`, `-30m`
///
/// # Errors
///
/// Returns a validation error naming `field_name` if the format is not
/// recognized.
pub fn parse_flexible_timestamp(s: &str, field_name: &str) -> Result<DateTime<Utc>> {
    parse_flexible_timestamp_at(s, field_name, Utc::now())
}

/// Same as [`parse_flexible_timestamp`] with an explicit "now".
///
/// # Errors
///
/// Returns a validation error if the format is not recognized.
pub fn parse_flexible_timestamp_at(
    s: &str,
    field_name: &str,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::default()).and_utc());
    }

    if let Some(rest) = s.strip_prefix('-') {
        if let Some(unit_char) = rest.chars().last() {
            let amount_str = &rest[..rest.len() - unit_char.len_utf8()];
            if let Ok(amount) = amount_str.parse::<i64>() {
                let duration = match unit_char {
                    'm' => Duration::minutes(amount),
                    'h' => Duration::hours(amount),
                    'd' => Duration::days(amount),
                    'w' => Duration::weeks(amount),
                    _ => {
                        return Err(PerfError::validation(
                            field_name,
                            "invalid unit (use m, h, d, w)",
                        ));
                    }
                };
                return Ok(now - duration);
            }
        }
    }

    Err(PerfError::validation(
        field_name,
        "invalid time format (try: -7d, -2w, 2025-01-15, or 2025-01-15T12:00:00Z)",
    ))
}

/// Compact display form used in listings: `2025-01-15 12:00`.
#[must_use]
pub fn format_short(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_flexible_rfc3339() {
        let dt = parse_flexible_timestamp_at("2025-01-10T08:30:00+01:00", "since", now()).unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 1, 10, 7, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_flexible_simple_date() {
        let dt = parse_flexible_timestamp_at("2025-01-10", "since", now()).unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_flexible_relative() {
        let dt = parse_flexible_timestamp_at("-2d", "since", now()).unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 1, 13, 12, 0, 0).unwrap());
        let dt = parse_flexible_timestamp_at("-1w", "since", now()).unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 1, 8, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_flexible_invalid() {
        assert!(parse_flexible_timestamp_at("-3y", "since", now()).is_err());
        assert!(parse_flexible_timestamp_at("soon", "since", now()).is_err());
    }

    #[test]
    fn test_format_short() {
        assert_eq!(format_short(&now()), "2025-01-15 12:00");
    }
}
