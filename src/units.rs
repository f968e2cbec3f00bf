//! Numeric parsing and unit conversions for feed values.

use crate::error::FeedError;

/// Parse a feed value as a float.
///
/// Missing or blank text is "no value" rather than an error. Anything else
/// that is not a finite number (including `NaN` and `inf`) is a
/// [`FeedError::FieldParse`] the caller is expected to log and treat as an
/// absent field.
pub fn to_number(text: Option<&str>) -> Result<Option<f64>, FeedError> {
    let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };

    let value = text
        .parse::<f64>()
        .map_err(|e| FeedError::FieldParse(format!("'{text}': {e}")))?;
    if !value.is_finite() {
        return Err(FeedError::FieldParse(format!("'{text}' is not a finite number")));
    }
    Ok(Some(value))
}

/// Parse a feed value as a whole number, e.g. a percentage.
pub fn to_integer(text: Option<&str>) -> Result<Option<i64>, FeedError> {
    let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };

    text.parse::<i64>()
        .map(Some)
        .map_err(|e| FeedError::FieldParse(format!("'{text}': {e}")))
}

pub fn hectopascal_to_kilopascal(hpa: f64) -> f64 {
    hpa / 10.0
}

pub fn kmh_to_ms(kmh: f64) -> f64 {
    kmh / 3.6
}

/// Drop a single trailing `%`, leaving everything else untouched.
pub fn strip_percent_suffix(text: &str) -> &str {
    text.strip_suffix('%').unwrap_or(text)
}
