//! Field table for `period` elements of the observation feed.
//!
//! Element types are described in the BoM "Observations XML" product notes.

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use super::{FeedKind, NormalizedReading, RawPeriod, TypedEntry};
use crate::condition::map_condition;
use crate::error::FeedError;
use crate::store::Metric;
use crate::timestamp::{self, OBSERVATION_FORMAT};
use crate::units::{hectopascal_to_kilopascal, kmh_to_ms, to_number};

#[derive(Debug, Clone, Copy)]
pub enum ObservationField {
    /// Numeric value stored under `metric` after `convert`.
    Number { metric: Metric, convert: fn(f64) -> f64 },
    /// Free-text `weather` phrase.
    Condition,
    /// Rainfall since 9am, stored at its own start time.
    Rainfall24Hour,
    /// Rainfall since the last report. Logged, never stored: the 24 hour
    /// figure replaces it.
    RainfallSinceLast,
    /// Known type with no canonical metric.
    Ignored,
}

fn unchanged(value: f64) -> f64 {
    value
}

pub const OBSERVATION_FIELDS: &[(&str, ObservationField)] = &[
    ("air_temperature", ObservationField::Number { metric: Metric::Temperature, convert: unchanged }),
    ("dew_point", ObservationField::Number { metric: Metric::Dewpoint, convert: unchanged }),
    ("pres", ObservationField::Number { metric: Metric::Pressure, convert: hectopascal_to_kilopascal }),
    ("rel-humidity", ObservationField::Number { metric: Metric::RelativeHumidity, convert: unchanged }),
    ("wind_spd_kmh", ObservationField::Number { metric: Metric::WindSpeed, convert: kmh_to_ms }),
    ("maximum_air_temperature", ObservationField::Number { metric: Metric::MaxTemp, convert: unchanged }),
    ("minimum_air_temperature", ObservationField::Number { metric: Metric::MinTemp, convert: unchanged }),
    ("weather", ObservationField::Condition),
    ("rainfall_24hr", ObservationField::Rainfall24Hour),
    ("rainfall", ObservationField::RainfallSinceLast),
    ("apparent_temp", ObservationField::Ignored),
    ("delta_t", ObservationField::Ignored),
    ("msl_pres", ObservationField::Ignored),
    ("qnh_pres", ObservationField::Ignored),
    ("rain_hour", ObservationField::Ignored),
    ("rain_ten", ObservationField::Ignored),
    ("wind_dir", ObservationField::Ignored),
    ("wind_dir_deg", ObservationField::Ignored),
    ("wind_spd", ObservationField::Ignored),
];

pub fn lookup(tag: &str) -> Option<ObservationField> {
    OBSERVATION_FIELDS
        .iter()
        .find(|(t, _)| *t == tag)
        .map(|(_, field)| *field)
}

/// Normalize one observation period.
///
/// Only an unresolvable period time fails the whole period; a bad field is
/// logged and left out.
pub fn normalize(period: &RawPeriod<'_>) -> Result<NormalizedReading, FeedError> {
    let timestamp = period.timestamp(FeedKind::Observation)?;
    info!("Observation time: {}", period.start.unwrap_or_default());

    let mut reading = NormalizedReading::new(timestamp);

    for entry in &period.entries {
        debug!("Got {:?} for {}", entry.text, entry.tag);

        let Some(field) = lookup(entry.tag) else {
            debug!("Got unknown type {}", entry.tag);
            continue;
        };

        match field {
            ObservationField::Number { metric, convert } => {
                if let Some(value) = number(entry) {
                    reading.set(metric, convert(value));
                }
            }
            ObservationField::Condition => {
                if let Some(code) = entry.text.and_then(map_condition) {
                    reading.set(Metric::Condition, code);
                }
            }
            ObservationField::Rainfall24Hour => {
                let Some(value) = number(entry) else {
                    continue;
                };
                match side_timestamp(entry, timestamp) {
                    Ok(rain_timestamp) => {
                        debug!(
                            "Got {} for {} with a timestamp of {}",
                            value, entry.tag, rain_timestamp
                        );
                        reading.set_at(Metric::Rainfall, rain_timestamp, value);
                    }
                    Err(e) => error!("Dropping {}: {}", entry.tag, e),
                }
            }
            ObservationField::RainfallSinceLast => {
                if let (Some(value), Ok(since)) = (number(entry), side_timestamp(entry, timestamp)) {
                    debug!("Got {} for {} with a timestamp of {} (not stored)", value, entry.tag, since);
                }
            }
            ObservationField::Ignored => {}
        }
    }

    debug!("Update {}", reading);
    Ok(reading)
}

fn number(entry: &TypedEntry<'_>) -> Option<f64> {
    match to_number(entry.text) {
        Ok(value) => value,
        Err(e) => {
            warn!("Cannot get {}: {}", entry.tag, e);
            None
        }
    }
}

/// Start of a range field's validity window, falling back to the period
/// time when the element does not carry one.
fn side_timestamp(
    entry: &TypedEntry<'_>,
    period_timestamp: DateTime<Utc>,
) -> Result<DateTime<Utc>, FeedError> {
    match entry.start_time {
        Some(raw) => timestamp::resolve(raw, OBSERVATION_FORMAT),
        None => {
            error!("Failed to find element date for {}", entry.tag);
            Ok(period_timestamp)
        }
    }
}
