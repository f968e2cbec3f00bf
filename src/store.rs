//! Time-indexed store of normalized readings.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::condition::ConditionCode;
use crate::extractor::FeedKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Metric {
    Temperature,
    MinTemp,
    MaxTemp,
    RelativeHumidity,
    WindSpeed,
    Rainfall,
    Dewpoint,
    Pressure,
    #[serde(rename = "pop")]
    ProbabilityOfPrecipitation,
    #[serde(rename = "qpf")]
    QuantitativePrecipitationForecast,
    Condition,
}

impl Metric {
    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Temperature => "temperature",
            Metric::MinTemp => "min-temp",
            Metric::MaxTemp => "max-temp",
            Metric::RelativeHumidity => "relative-humidity",
            Metric::WindSpeed => "wind-speed",
            Metric::Rainfall => "rainfall",
            Metric::Dewpoint => "dewpoint",
            Metric::Pressure => "pressure",
            Metric::ProbabilityOfPrecipitation => "pop",
            Metric::QuantitativePrecipitationForecast => "qpf",
            Metric::Condition => "condition",
        }
    }

    /// Metrics that are only ever prospective when they come from a forecast.
    pub fn is_forecast(self) -> bool {
        matches!(
            self,
            Metric::MinTemp
                | Metric::MaxTemp
                | Metric::ProbabilityOfPrecipitation
                | Metric::QuantitativePrecipitationForecast
        )
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Condition(ConditionCode),
}

impl MetricValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            MetricValue::Number(n) => Some(*n),
            MetricValue::Condition(_) => None,
        }
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        MetricValue::Number(value)
    }
}

impl From<ConditionCode> for MetricValue {
    fn from(code: ConditionCode) -> Self {
        MetricValue::Condition(code)
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Number(n) => write!(f, "{n}"),
            MetricValue::Condition(code) => write!(f, "{code:?}"),
        }
    }
}

/// Where extracted readings go. Called once per resolved reading.
pub trait ReadingSink {
    /// Record `value` for `metric` at `timestamp`, returning whether the
    /// value was kept.
    fn add_value(
        &mut self,
        origin: FeedKind,
        metric: Metric,
        timestamp: DateTime<Utc>,
        value: Option<MetricValue>,
    ) -> bool;
}

/// Readings grouped by timestamp, then by metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesStore {
    #[serde(skip)]
    now: DateTime<Utc>,
    #[serde(flatten)]
    records: BTreeMap<DateTime<Utc>, BTreeMap<Metric, MetricValue>>,
}

impl TimeSeriesStore {
    /// Create an empty store; `now` is the processing instant forecast
    /// values are checked against.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            records: BTreeMap::new(),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn get(&self, metric: Metric, timestamp: DateTime<Utc>) -> Option<MetricValue> {
        self.records
            .get(&timestamp)
            .and_then(|values| values.get(&metric))
            .copied()
    }

    /// All values for one metric in timestamp order.
    pub fn series(&self, metric: Metric) -> Vec<(DateTime<Utc>, MetricValue)> {
        self.records
            .iter()
            .filter_map(|(ts, values)| values.get(&metric).map(|v| (*ts, *v)))
            .collect()
    }

    pub fn timestamps(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        self.records.keys().copied()
    }

    pub fn contains_timestamp(&self, timestamp: DateTime<Utc>) -> bool {
        self.records.contains_key(&timestamp)
    }

    pub fn values_at(&self, timestamp: DateTime<Utc>) -> Option<&BTreeMap<Metric, MetricValue>> {
        self.records.get(&timestamp)
    }

    /// Number of stored (metric, timestamp) entries.
    pub fn len(&self) -> usize {
        self.records.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Dump every record at debug level, oldest first.
    pub fn log_contents(&self) {
        for (timestamp, values) in &self.records {
            let rendered = values
                .iter()
                .map(|(metric, value)| format!("{metric}={value}"))
                .collect::<Vec<_>>()
                .join(", ");
            debug!("{} : {}", timestamp, rendered);
        }
    }
}

impl ReadingSink for TimeSeriesStore {
    fn add_value(
        &mut self,
        origin: FeedKind,
        metric: Metric,
        timestamp: DateTime<Utc>,
        value: Option<MetricValue>,
    ) -> bool {
        let Some(value) = value else {
            return false;
        };

        if origin == FeedKind::Forecast && metric.is_forecast() && timestamp < self.now {
            debug!(
                "Dropping historical forecast {} at {} (now {})",
                metric, timestamp, self.now
            );
            return false;
        }

        self.records
            .entry(timestamp)
            .or_default()
            .insert(metric, value);
        true
    }
}
