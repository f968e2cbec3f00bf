//! Field table for `forecast-period` elements of the précis forecast feed.

use tracing::{debug, error, info};

use super::{FeedKind, NormalizedReading, RawPeriod};
use crate::error::FeedError;
use crate::store::Metric;
use crate::units::{strip_percent_suffix, to_integer, to_number};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastField {
    MinTemp,
    MaxTemp,
    /// `"<min> to <max> <units>"`, stored as the midpoint.
    PrecipitationRange,
    /// Whole percentage with a trailing `%`.
    PrecipitationProbability,
}

pub const FORECAST_FIELDS: &[(&str, ForecastField)] = &[
    ("air_temperature_minimum", ForecastField::MinTemp),
    ("air_temperature_maximum", ForecastField::MaxTemp),
    ("precipitation_range", ForecastField::PrecipitationRange),
    ("probability_of_precipitation", ForecastField::PrecipitationProbability),
];

pub fn lookup(tag: &str) -> Option<ForecastField> {
    FORECAST_FIELDS
        .iter()
        .find(|(t, _)| *t == tag)
        .map(|(_, field)| *field)
}

/// Normalize one forecast period.
///
/// QPF and POP default to zero: a period without precipitation elements
/// means no rain is expected. Malformed values for either also fall back
/// to zero.
pub fn normalize(period: &RawPeriod<'_>) -> Result<NormalizedReading, FeedError> {
    let timestamp = period.timestamp(FeedKind::Forecast)?;
    info!("forecast-period time - {}", period.start.unwrap_or_default());

    let mut reading = NormalizedReading::new(timestamp);
    reading.set(Metric::QuantitativePrecipitationForecast, 0.0);
    reading.set(Metric::ProbabilityOfPrecipitation, 0.0);

    for entry in &period.entries {
        let Some(field) = lookup(entry.tag) else {
            debug!("Skipping forecast element type {}", entry.tag);
            continue;
        };

        match field {
            ForecastField::MinTemp | ForecastField::MaxTemp => {
                let metric = if field == ForecastField::MinTemp {
                    Metric::MinTemp
                } else {
                    Metric::MaxTemp
                };
                match to_number(entry.text) {
                    Ok(Some(value)) => {
                        debug!("\t{}: {}", metric, value);
                        reading.set(metric, value);
                    }
                    Ok(None) => {}
                    Err(e) => error!("Cannot get {} ({:?}): {}", metric, entry.text, e),
                }
            }
            ForecastField::PrecipitationRange => {
                match parse_precipitation_range(entry.text.unwrap_or_default()) {
                    Ok(qpf) => {
                        debug!("\tQPF Avg: {}", qpf);
                        reading.set(Metric::QuantitativePrecipitationForecast, qpf);
                    }
                    Err(e) => {
                        error!("Cannot get precipitation forecast ({:?}): {}", entry.text, e);
                    }
                }
            }
            ForecastField::PrecipitationProbability => {
                let text = entry.text.map(str::trim).map(strip_percent_suffix);
                match to_integer(text) {
                    Ok(Some(pop)) => {
                        debug!("\tPOP: {}", pop);
                        reading.set(Metric::ProbabilityOfPrecipitation, pop as f64);
                    }
                    Ok(None) => {}
                    Err(e) => error!(
                        "Cannot get probability_of_precipitation forecast ({:?}): {}",
                        entry.text, e
                    ),
                }
            }
        }
    }

    Ok(reading)
}

/// Midpoint of a `"<min> to <max> <units>"` range. The units token is
/// optional and discarded.
pub fn parse_precipitation_range(text: &str) -> Result<f64, FeedError> {
    let parts: Vec<&str> = text.split_whitespace().collect();

    let (min, max) = match parts.as_slice() {
        [min, "to", max] | [min, "to", max, _] => (*min, *max),
        _ => {
            return Err(FeedError::FieldParse(format!(
                "'{text}' is not a '<min> to <max>' range"
            )))
        }
    };

    let min = to_number(Some(min))?.unwrap_or_default();
    let max = to_number(Some(max))?.unwrap_or_default();
    Ok((min + max) / 2.0)
}
