use std::env;
use std::time::Duration;

pub const DEFAULT_REGION: &str = "NSW";
pub const DEFAULT_FORECAST_AREA: &str = "Terrey Hills";
pub const DEFAULT_OBSERVATION_AREA: &str = "Sydney - Observatory Hill";
pub const DEFAULT_FEED_BASE_URL: &str = "http://www.bom.gov.au/fwo";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Operator settings, read once per run.
///
/// `region` is kept as entered; it is validated when a run starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub region: String,
    pub forecast_area: String,
    pub observation_area: String,
    pub feed_base_url: String,
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup, falling back to the defaults for missing
    /// or unparseable values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Config {
            region: lookup("BOM_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            forecast_area: lookup("BOM_FORECAST_AREA")
                .unwrap_or_else(|| DEFAULT_FORECAST_AREA.to_string()),
            observation_area: lookup("BOM_OBSERVATION_AREA")
                .unwrap_or_else(|| DEFAULT_OBSERVATION_AREA.to_string()),
            feed_base_url: lookup("BOM_FEED_BASE_URL")
                .unwrap_or_else(|| DEFAULT_FEED_BASE_URL.to_string()),
            request_timeout_secs: lookup("BOM_REQUEST_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.region, "NSW");
        assert_eq!(config.forecast_area, "Terrey Hills");
        assert_eq!(config.observation_area, "Sydney - Observatory Hill");
        assert_eq!(config.feed_base_url, "http://www.bom.gov.au/fwo");
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("BOM_REGION", "VIC"),
            ("BOM_FORECAST_AREA", "Melbourne"),
            ("BOM_REQUEST_TIMEOUT_SECS", "15"),
        ]);
        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.region, "VIC");
        assert_eq!(config.forecast_area, "Melbourne");
        assert_eq!(config.observation_area, "Sydney - Observatory Hill");
        assert_eq!(config.request_timeout_secs, 15);
    }

    #[test]
    fn test_invalid_timeout_uses_default() {
        let config = Config::from_lookup(|key| {
            (key == "BOM_REQUEST_TIMEOUT_SECS").then(|| "soon".to_string())
        });
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    }

    #[test]
    fn test_region_is_not_validated_at_load() {
        let config = Config::from_lookup(|key| (key == "BOM_REGION").then(|| "ACT".to_string()));
        assert_eq!(config.region, "ACT");
    }
}
