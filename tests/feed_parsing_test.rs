// End-to-end runs over recorded BoM product files served from memory

use bom_feed_parser::condition::ConditionCode;
use bom_feed_parser::config::Config;
use bom_feed_parser::fetcher::StaticFeedSource;
use bom_feed_parser::orchestrator::{FeedOrchestrator, PhaseState, RunResult, RunStatus};
use bom_feed_parser::store::{Metric, MetricValue};
use chrono::{DateTime, TimeZone, Utc};

const BASE_URL: &str = "http://feeds.test/fwo";
const FORECAST_XML: &str = include_str!("fixtures/IDN11060.xml");
const OBSERVATION_XML: &str = include_str!("fixtures/IDN60920.xml");

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

fn now() -> DateTime<Utc> {
    utc(2024, 3, 1, 11, 0)
}

fn test_config() -> Config {
    Config {
        region: "NSW".to_string(),
        forecast_area: "Terrey Hills".to_string(),
        observation_area: "Sydney - Observatory Hill".to_string(),
        feed_base_url: BASE_URL.to_string(),
        request_timeout_secs: 5,
    }
}

fn both_feeds() -> StaticFeedSource {
    StaticFeedSource::new()
        .with_document(format!("{BASE_URL}/IDN11060.xml"), FORECAST_XML)
        .with_document(format!("{BASE_URL}/IDN60920.xml"), OBSERVATION_XML)
}

fn run(config: Config, source: StaticFeedSource) -> RunResult {
    FeedOrchestrator::new(config, source).run_at(now())
}

fn number(result: &RunResult, metric: Metric, ts: DateTime<Utc>) -> Option<f64> {
    result.store.get(metric, ts).and_then(|v| v.as_number())
}

#[test]
fn test_full_run_completes() {
    let result = run(test_config(), both_feeds());

    assert_eq!(result.status(), RunStatus::Complete);
    assert_eq!(result.last_error, None);

    assert_eq!(result.forecast.periods_processed, 4);
    assert_eq!(result.forecast.values_stored, 12);

    assert_eq!(result.observation.periods_processed, 2);
    assert_eq!(result.observation.periods_skipped, 1);
    assert_eq!(result.observation.values_stored, 10);

    assert_eq!(result.store.timestamps().count(), 6);
}

#[test]
fn test_observation_values_are_normalized() {
    let result = run(test_config(), both_feeds());
    let ts = utc(2024, 3, 1, 10, 0);

    assert_eq!(number(&result, Metric::Temperature, ts), Some(21.5));
    assert_eq!(number(&result, Metric::RelativeHumidity, ts), Some(60.0));
    assert!((number(&result, Metric::WindSpeed, ts).unwrap() - 5.0).abs() < 1e-9);
    assert!((number(&result, Metric::Pressure, ts).unwrap() - 101.3).abs() < 1e-9);
    assert_eq!(number(&result, Metric::Dewpoint, ts), Some(13.5));
    assert_eq!(number(&result, Metric::MaxTemp, ts), Some(26.4));
    assert_eq!(number(&result, Metric::MinTemp, ts), Some(17.9));
    assert_eq!(
        result.store.get(Metric::Condition, ts),
        Some(MetricValue::Condition(ConditionCode::ShowersNearby))
    );
}

#[test]
fn test_24_hour_rainfall_is_stored_at_its_start_time() {
    let result = run(test_config(), both_feeds());

    assert_eq!(
        result.store.series(Metric::Rainfall),
        vec![(utc(2024, 2, 28, 22, 0), MetricValue::Number(3.4))]
    );
    // The since-last-report rainfall (0.2) is not emitted
    assert_eq!(number(&result, Metric::Rainfall, utc(2024, 2, 29, 22, 0)), None);
}

#[test]
fn test_bad_observation_fields_only_drop_that_field() {
    let result = run(test_config(), both_feeds());
    let ts = utc(2024, 3, 1, 9, 30);

    assert_eq!(number(&result, Metric::Temperature, ts), Some(22.3));
    assert_eq!(number(&result, Metric::RelativeHumidity, ts), None);
    assert_eq!(result.store.get(Metric::Condition, ts), None);
}

#[test]
fn test_historical_forecast_period_is_not_stored() {
    let result = run(test_config(), both_feeds());
    let past_period = utc(2024, 3, 1, 6, 0);

    assert!(!result.store.contains_timestamp(past_period));
    for metric in [
        Metric::MinTemp,
        Metric::MaxTemp,
        Metric::ProbabilityOfPrecipitation,
        Metric::QuantitativePrecipitationForecast,
    ] {
        assert_eq!(result.store.get(metric, past_period), None);
    }
}

#[test]
fn test_forecast_values() {
    let result = run(test_config(), both_feeds());

    let rainy = utc(2024, 3, 1, 13, 0);
    assert_eq!(number(&result, Metric::QuantitativePrecipitationForecast, rainy), Some(10.0));
    assert_eq!(number(&result, Metric::ProbabilityOfPrecipitation, rainy), Some(90.0));
    assert_eq!(number(&result, Metric::MinTemp, rainy), Some(18.0));
    assert_eq!(number(&result, Metric::MaxTemp, rainy), Some(25.0));

    // No precipitation elements at all: both default to zero
    let dry = utc(2024, 3, 2, 13, 0);
    assert_eq!(number(&result, Metric::QuantitativePrecipitationForecast, dry), Some(0.0));
    assert_eq!(number(&result, Metric::ProbabilityOfPrecipitation, dry), Some(0.0));

    // Malformed range: QPF falls back to zero, the rest of the period survives
    let malformed = utc(2024, 3, 3, 13, 0);
    assert_eq!(number(&result, Metric::QuantitativePrecipitationForecast, malformed), Some(0.0));
    assert_eq!(number(&result, Metric::ProbabilityOfPrecipitation, malformed), Some(80.0));
    assert_eq!(number(&result, Metric::MaxTemp, malformed), Some(26.0));
}

#[test]
fn test_minimal_observation_document() {
    let xml = r#"<product><observations>
        <station description="Sydney - Observatory Hill">
          <period index="0" time-utc="2024-03-01T10:00:00+00:00">
            <level index="0" type="surface">
              <element type="air_temperature">21.5</element>
              <element type="rel-humidity">60</element>
              <element type="wind_spd_kmh">18.0</element>
            </level>
          </period>
        </station>
    </observations></product>"#;
    let source = StaticFeedSource::new()
        .with_document(format!("{BASE_URL}/IDN11060.xml"), FORECAST_XML)
        .with_document(format!("{BASE_URL}/IDN60920.xml"), xml);

    let result = run(test_config(), source);
    let ts = utc(2024, 3, 1, 10, 0);

    assert_eq!(result.observation.values_stored, 3);
    assert_eq!(number(&result, Metric::Temperature, ts), Some(21.5));
    assert_eq!(number(&result, Metric::RelativeHumidity, ts), Some(60.0));
    assert!((number(&result, Metric::WindSpeed, ts).unwrap() - 5.0).abs() < 1e-9);
}

#[test]
fn test_unknown_observation_area_leaves_forecast_intact() {
    let config = Config {
        observation_area: "Sydney - Observatory Hil".to_string(),
        ..test_config()
    };
    let result = run(config, both_feeds());

    assert_eq!(result.status(), RunStatus::Partial);
    assert_eq!(
        result.last_error.as_deref(),
        Some("Failed to find Observation Area")
    );
    assert_eq!(result.observation.failed_at, Some(PhaseState::LocatingSection));
    assert!(result.forecast.is_done());
    assert_eq!(result.forecast.values_stored, 12);
    assert!(result.store.series(Metric::Temperature).is_empty());
}

#[test]
fn test_unknown_forecast_area_leaves_observation_intact() {
    let config = Config {
        forecast_area: "terrey hills".to_string(),
        ..test_config()
    };
    let result = run(config, both_feeds());

    assert_eq!(result.status(), RunStatus::Partial);
    assert_eq!(result.last_error.as_deref(), Some("Failed to find Forecast Area"));
    assert!(result.observation.is_done());
    assert_eq!(result.observation.values_stored, 10);
}

#[test]
fn test_no_data_from_server() {
    let result = run(test_config(), StaticFeedSource::new());

    assert_eq!(result.status(), RunStatus::Failed);
    assert_eq!(
        result.last_error.as_deref(),
        Some("Error: No data received from server")
    );
    assert_eq!(result.forecast.failed_at, Some(PhaseState::Fetching));
    assert_eq!(result.observation.failed_at, Some(PhaseState::Fetching));
}

#[test]
fn test_invalid_region() {
    let config = Config {
        region: "Queensland".to_string(),
        ..test_config()
    };
    let result = run(config, both_feeds());

    assert_eq!(result.status(), RunStatus::Failed);
    assert_eq!(
        result.last_error.as_deref(),
        Some("Error: Invalid state, must be QLD, NSW, NT, SA, TAS, VIC or WA")
    );
    assert!(result.store.is_empty());
}

#[test]
fn test_result_serializes_to_json() {
    let result = run(test_config(), both_feeds());
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["last_error"], serde_json::Value::Null);
    assert_eq!(json["forecast"]["state"], "done");
    assert_eq!(json["observation"]["feed"], "observation");
    assert_eq!(json["store"]["2024-03-01T10:00:00Z"]["temperature"], 21.5);
    assert_eq!(json["store"]["2024-03-01T13:00:00Z"]["qpf"], 10.0);
    assert_eq!(json["store"]["2024-03-01T10:00:00Z"]["condition"], "showers_nearby");
}
