//! Drives the forecast and observation feeds through to the store.
//!
//! Each run has two independent phases, forecast first. A phase that fails
//! records why and stops; the other phase still runs. Only an invalid
//! region fails both up front.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::config::Config;
use crate::document::XmlDocument;
use crate::error::FeedError;
use crate::extractor::{self, FeedKind, SECTION_NAME_ATTRIBUTE};
use crate::fetcher::FeedSource;
use crate::locator::{find_section, SectionMissing};
use crate::region::Region;
use crate::store::TimeSeriesStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseState {
    ResolvingUrl,
    Fetching,
    Parsing,
    LocatingSection,
    ExtractingPeriods,
    Done,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseReport {
    pub feed: FeedKind,
    pub state: PhaseState,
    /// Stage the phase was in when it failed.
    pub failed_at: Option<PhaseState>,
    pub periods_processed: usize,
    pub periods_skipped: usize,
    pub values_stored: usize,
    pub error: Option<String>,
}

impl PhaseReport {
    fn new(feed: FeedKind) -> Self {
        Self {
            feed,
            state: PhaseState::ResolvingUrl,
            failed_at: None,
            periods_processed: 0,
            periods_skipped: 0,
            values_stored: 0,
            error: None,
        }
    }

    fn advance(&mut self, state: PhaseState) {
        debug!("{} phase: {:?} -> {:?}", self.feed, self.state, state);
        self.state = state;
    }

    fn fail(&mut self, err: &FeedError) {
        self.failed_at = Some(self.state);
        self.state = PhaseState::Failed;
        self.error = Some(err.to_string());
    }

    pub fn is_done(&self) -> bool {
        self.state == PhaseState::Done
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Both phases finished.
    Complete,
    /// One phase failed.
    Partial,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResult {
    pub store: TimeSeriesStore,
    /// Most recent phase-level failure, if any.
    pub last_error: Option<String>,
    pub forecast: PhaseReport,
    pub observation: PhaseReport,
}

impl RunResult {
    pub fn status(&self) -> RunStatus {
        match (self.forecast.is_done(), self.observation.is_done()) {
            (true, true) => RunStatus::Complete,
            (false, false) => RunStatus::Failed,
            _ => RunStatus::Partial,
        }
    }
}

#[derive(Debug)]
pub struct FeedOrchestrator<S> {
    config: Config,
    source: S,
}

impl<S: FeedSource> FeedOrchestrator<S> {
    pub fn new(config: Config, source: S) -> Self {
        Self { config, source }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn run(&self) -> RunResult {
        self.run_at(Utc::now())
    }

    /// Run both phases with `now` as the processing instant.
    #[instrument(skip(self), fields(region = %self.config.region))]
    pub fn run_at(&self, now: DateTime<Utc>) -> RunResult {
        let mut store = TimeSeriesStore::new(now);
        let mut forecast = PhaseReport::new(FeedKind::Forecast);
        let mut observation = PhaseReport::new(FeedKind::Observation);

        let region = match self.config.region.parse::<Region>() {
            Ok(region) => region,
            Err(e) => {
                error!("Got an invalid region '{}': {}", self.config.region, e);
                forecast.fail(&e);
                observation.fail(&e);
                return RunResult {
                    store,
                    last_error: Some(e.to_string()),
                    forecast,
                    observation,
                };
            }
        };

        let mut last_error = None;
        for report in [&mut forecast, &mut observation] {
            self.run_phase(region, &mut store, report);
            if let Some(err) = &report.error {
                last_error = Some(err.clone());
            }
        }

        info!(
            "Parsing done at {}: {} values at {} timestamps",
            store.now(),
            store.len(),
            store.timestamps().count()
        );
        store.log_contents();

        RunResult {
            store,
            last_error,
            forecast,
            observation,
        }
    }

    #[instrument(skip(self, store, report), fields(feed = %report.feed))]
    fn run_phase(&self, region: Region, store: &mut TimeSeriesStore, report: &mut PhaseReport) {
        match self.drive_phase(region, store, report) {
            Ok(()) => {
                report.advance(PhaseState::Done);
                info!(
                    "{} phase done: {} periods, {} skipped, {} values stored",
                    report.feed, report.periods_processed, report.periods_skipped, report.values_stored
                );
            }
            Err(e) => {
                error!("{} phase failed while {:?}: {}", report.feed, report.state, e);
                report.fail(&e);
            }
        }
    }

    fn drive_phase(
        &self,
        region: Region,
        store: &mut TimeSeriesStore,
        report: &mut PhaseReport,
    ) -> Result<(), FeedError> {
        let kind = report.feed;
        let base_url = &self.config.feed_base_url;

        let url = match kind {
            FeedKind::Forecast => region.forecast_url(base_url),
            FeedKind::Observation => region.observation_url(base_url)?,
        };
        debug!("Got a URL of {}", url);

        report.advance(PhaseState::Fetching);
        let bytes = self.source.fetch_document(&url).ok_or(FeedError::Fetch)?;
        debug!("Retrieved {} data from BOM", kind);

        report.advance(PhaseState::Parsing);
        let document = XmlDocument::parse(&bytes)?;

        report.advance(PhaseState::LocatingSection);
        let area_name = self.area_name(kind);
        let section = find_section(
            document.root(),
            kind.section_tag(),
            SECTION_NAME_ATTRIBUTE,
            area_name,
        )
        .map_err(|missing| {
            match missing {
                SectionMissing::NoSections => {
                    warn!("{} document has no '{}' sections", kind, kind.section_tag())
                }
                SectionMissing::NotFound { candidates } => warn!(
                    "'{}' is not among {} '{}' sections",
                    area_name,
                    candidates,
                    kind.section_tag()
                ),
            }
            FeedError::AreaNotFound(kind)
        })?;
        debug!("Matched on {}", area_name);

        report.advance(PhaseState::ExtractingPeriods);
        for period in extractor::periods(section, kind) {
            let reading = match extractor::normalize(kind, &period) {
                Ok(reading) => reading,
                Err(e) => {
                    warn!("Skipping {} period: {}", kind, e);
                    report.periods_skipped += 1;
                    continue;
                }
            };

            report.values_stored += reading.emit_into(kind, store);
            report.periods_processed += 1;

            if kind == FeedKind::Forecast {
                match store.values_at(reading.timestamp) {
                    Some(values) => debug!("Forecast: {} : {:?}", reading.timestamp, values),
                    None => debug!("Forecast: {} not found", reading.timestamp),
                }
            }
        }

        Ok(())
    }

    fn area_name(&self, kind: FeedKind) -> &str {
        match kind {
            FeedKind::Forecast => &self.config.forecast_area,
            FeedKind::Observation => &self.config.observation_area,
        }
    }
}
