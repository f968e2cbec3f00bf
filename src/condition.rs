//! Mapping of the free-text `weather` phrases in observation feeds onto
//! canonical condition codes.
//!
//! The phrases are typed in by hand upstream, so an unmatched phrase is a
//! data-quality signal (logged) rather than a failure.

use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionCode {
    LightRain,
    RainShowers,
    Smoke,
    Fair,
    Fog,
    Haze,
    FreezingRain,
    Thunderstorm,
    ThunderstormNearby,
    Hot,
    PartlyCloudy,
    ShowersNearby,
    FewClouds,
    Overcast,
}

const CONDITION_TABLE: &[(&str, ConditionCode)] = &[
    ("Rain", ConditionCode::LightRain),
    ("Showers", ConditionCode::RainShowers),
    ("Smoke", ConditionCode::Smoke),
    ("Fine", ConditionCode::Fair),
    ("Fog", ConditionCode::Fog),
    ("Haze", ConditionCode::Haze),
    ("Recent precip", ConditionCode::ShowersNearby),
    ("Freezing rain", ConditionCode::FreezingRain),
    ("Thunderstorm", ConditionCode::Thunderstorm),
    ("Recent thunderstorm", ConditionCode::ThunderstormNearby),
    ("Sunny", ConditionCode::Hot),
    ("Mostly sunny", ConditionCode::Fair),
    ("Partly cloudy", ConditionCode::PartlyCloudy),
    ("Possible shower", ConditionCode::ShowersNearby),
    ("Becoming cloudy", ConditionCode::FewClouds),
    ("Cloudy", ConditionCode::Overcast),
];

/// Look up the condition code for a weather phrase.
///
/// Matching is exact and case-sensitive once trailing full stops are
/// removed, so `"Recent precip."` and `"Recent precip"` are the same phrase.
/// Returns `None` for an unknown phrase.
pub fn map_condition(raw: &str) -> Option<ConditionCode> {
    let phrase = raw.trim_end_matches('.');

    let code = CONDITION_TABLE
        .iter()
        .find(|(text, _)| *text == phrase)
        .map(|(_, code)| *code);

    if code.is_none() {
        warn!("Unknown weather type '{}'", raw);
    }
    code
}
