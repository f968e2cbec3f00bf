//! Walks the periods of a located area or station and turns each one into
//! a [`NormalizedReading`].
//!
//! Each feed has its own fixed table from element `type` to field handler,
//! see [`observation`] and [`forecast`].

pub mod forecast;
pub mod observation;

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::document::XmlElement;
use crate::error::FeedError;
use crate::store::{Metric, MetricValue, ReadingSink};
use crate::timestamp::{FORECAST_FORMAT, OBSERVATION_FORMAT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    Forecast,
    Observation,
}

impl FeedKind {
    /// Tag of the named sections in this feed.
    pub fn section_tag(self) -> &'static str {
        match self {
            FeedKind::Forecast => "area",
            FeedKind::Observation => "station",
        }
    }

    pub fn period_tag(self) -> &'static str {
        match self {
            FeedKind::Forecast => "forecast-period",
            FeedKind::Observation => "period",
        }
    }

    /// Attribute holding a period's start time.
    pub fn period_time_attribute(self) -> &'static str {
        match self {
            FeedKind::Forecast => "start-time-utc",
            FeedKind::Observation => "time-utc",
        }
    }

    pub fn timestamp_format(self) -> &'static str {
        match self {
            FeedKind::Forecast => FORECAST_FORMAT,
            FeedKind::Observation => OBSERVATION_FORMAT,
        }
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedKind::Forecast => write!(f, "Forecast"),
            FeedKind::Observation => write!(f, "Observation"),
        }
    }
}

/// Name attribute shared by areas and stations.
pub const SECTION_NAME_ATTRIBUTE: &str = "description";

/// Side timestamp on range fields such as `rainfall_24hr`.
pub const ENTRY_START_TIME_ATTRIBUTE: &str = "start-time-utc";

/// One `type`-tagged element inside a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypedEntry<'a> {
    pub tag: &'a str,
    pub text: Option<&'a str>,
    pub start_time: Option<&'a str>,
}

/// One time bucket of an area or station, borrowed from the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPeriod<'a> {
    pub start: Option<&'a str>,
    pub entries: Vec<TypedEntry<'a>>,
}

impl<'a> RawPeriod<'a> {
    fn from_element(element: &'a XmlElement, kind: FeedKind) -> Self {
        let entries = element
            .descendants()
            .skip(1)
            .filter_map(|e| {
                e.attr("type").map(|tag| TypedEntry {
                    tag,
                    text: e.text(),
                    start_time: e.attr(ENTRY_START_TIME_ATTRIBUTE),
                })
            })
            .collect();

        Self {
            start: element.attr(kind.period_time_attribute()),
            entries,
        }
    }

    /// Resolve the period's own start time.
    pub fn timestamp(&self, kind: FeedKind) -> Result<DateTime<Utc>, FeedError> {
        let start = self.start.ok_or_else(|| {
            FeedError::Timestamp(format!("period has no {}", kind.period_time_attribute()))
        })?;
        crate::timestamp::resolve(start, kind.timestamp_format())
    }
}

/// Lazily yield the periods of `section` in document order.
pub fn periods<'a>(
    section: &'a XmlElement,
    kind: FeedKind,
) -> impl Iterator<Item = RawPeriod<'a>> + 'a {
    section
        .find_all(kind.period_tag())
        .map(move |element| RawPeriod::from_element(element, kind))
}

/// The outcome of processing one period: every metric that resolved to a
/// value, each with the instant it applies to.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedReading {
    pub timestamp: DateTime<Utc>,
    values: BTreeMap<Metric, (DateTime<Utc>, MetricValue)>,
}

impl NormalizedReading {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            values: BTreeMap::new(),
        }
    }

    /// Set a metric at the period's own timestamp.
    pub fn set(&mut self, metric: Metric, value: impl Into<MetricValue>) {
        self.values.insert(metric, (self.timestamp, value.into()));
    }

    /// Set a metric whose validity window starts elsewhere.
    pub fn set_at(&mut self, metric: Metric, timestamp: DateTime<Utc>, value: impl Into<MetricValue>) {
        self.values.insert(metric, (timestamp, value.into()));
    }

    pub fn get(&self, metric: Metric) -> Option<MetricValue> {
        self.values.get(&metric).map(|(_, v)| *v)
    }

    pub fn timestamp_of(&self, metric: Metric) -> Option<DateTime<Utc>> {
        self.values.get(&metric).map(|(ts, _)| *ts)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Hand every value to `sink`, returning how many it kept.
    pub fn emit_into(&self, origin: FeedKind, sink: &mut impl ReadingSink) -> usize {
        let mut kept = 0;
        for (metric, (timestamp, value)) in &self.values {
            if sink.add_value(origin, *metric, *timestamp, Some(*value)) {
                kept += 1;
            }
        }
        kept
    }
}

impl fmt::Display for NormalizedReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (metric, (_, value)) in &self.values {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{metric}: {value}")?;
            first = false;
        }
        Ok(())
    }
}

/// Normalize one period with the table for `kind`.
pub fn normalize(kind: FeedKind, period: &RawPeriod<'_>) -> Result<NormalizedReading, FeedError> {
    match kind {
        FeedKind::Forecast => forecast::normalize(period),
        FeedKind::Observation => observation::normalize(period),
    }
}
