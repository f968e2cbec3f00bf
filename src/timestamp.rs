//! Date-time parsing for the `*-utc` attributes in both feeds.
//!
//! Observation periods carry a zero UTC offset (`2024-03-01T10:00:00+00:00`),
//! forecast periods a trailing `Z`. Both are UTC, so the marker is dropped
//! and the remainder parsed against a fixed format without a zone.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::FeedError;

/// `time-utc` / `start-time-utc` in the observation feed.
pub const OBSERVATION_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// `start-time-utc` on forecast periods.
pub const FORECAST_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Remove a trailing zero UTC offset such as `+00:00`, `+00` or `+0000`.
///
/// Stripping is idempotent across those variants. A non-zero offset is
/// rejected since the feeds only ever publish UTC.
pub fn strip_utc_offset(raw: &str) -> Result<&str, FeedError> {
    let raw = raw.trim();
    let time_start = raw.find('T').unwrap_or(0);

    let Some(sign) = raw[time_start..].rfind(['+', '-']).map(|i| time_start + i) else {
        return Ok(raw);
    };

    let offset = &raw[sign + 1..];
    if offset.chars().all(|c| c == '0' || c == ':') {
        Ok(&raw[..sign])
    } else {
        Err(FeedError::Timestamp(format!(
            "'{raw}' has a non-UTC offset"
        )))
    }
}

/// Resolve a feed date string into a UTC instant.
///
/// A trailing literal `Z` is optional on both the input and the format, so
/// the same resolver handles both feeds.
pub fn resolve(raw: &str, format: &str) -> Result<DateTime<Utc>, FeedError> {
    let stripped = strip_utc_offset(raw)?;
    let body = stripped.strip_suffix('Z').unwrap_or(stripped);
    let format = format.strip_suffix('Z').unwrap_or(format);

    let naive = NaiveDateTime::parse_from_str(body, format)
        .map_err(|e| FeedError::Timestamp(format!("'{raw}': {e}")))?;

    Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn expected() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_offset_variants_resolve_identically() {
        let variants = [
            "2024-03-01T10:00:00+00:00",
            "2024-03-01T10:00:00+00",
            "2024-03-01T10:00:00+0000",
            "2024-03-01T10:00:00",
        ];
        for raw in variants {
            assert_eq!(resolve(raw, OBSERVATION_FORMAT).unwrap(), expected(), "{raw}");
        }
    }

    #[test]
    fn test_forecast_z_suffix() {
        assert_eq!(
            resolve("2024-03-01T10:00:00Z", FORECAST_FORMAT).unwrap(),
            expected()
        );
        assert_eq!(
            resolve("2024-03-01T10:00:00+00:00", FORECAST_FORMAT).unwrap(),
            expected()
        );
    }

    #[test]
    fn test_strip_keeps_time_digits() {
        // Trailing zeros in the time itself must survive the offset strip
        assert_eq!(
            strip_utc_offset("2024-03-01T10:00:00+00:00").unwrap(),
            "2024-03-01T10:00:00"
        );
        assert_eq!(
            strip_utc_offset("2024-03-01T10:00:00").unwrap(),
            "2024-03-01T10:00:00"
        );
    }

    #[test]
    fn test_negative_zero_offset() {
        assert_eq!(
            resolve("2024-03-01T10:00:00-00:00", OBSERVATION_FORMAT).unwrap(),
            expected()
        );
    }

    #[test]
    fn test_non_utc_offset_rejected() {
        let result = resolve("2024-03-01T21:00:00+11:00", OBSERVATION_FORMAT);
        assert!(matches!(result, Err(FeedError::Timestamp(_))));
    }

    #[test]
    fn test_malformed_input() {
        assert!(resolve("yesterday", OBSERVATION_FORMAT).is_err());
        assert!(resolve("", OBSERVATION_FORMAT).is_err());
        assert!(resolve("2024-13-01T10:00:00", OBSERVATION_FORMAT).is_err());
    }
}
