use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::FeedError;

/// Australian state or territory with a BoM précis forecast product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Region {
    #[serde(rename = "QLD")]
    Qld,
    #[serde(rename = "NSW")]
    Nsw,
    #[serde(rename = "NT")]
    Nt,
    #[serde(rename = "SA")]
    Sa,
    #[serde(rename = "TAS")]
    Tas,
    #[serde(rename = "VIC")]
    Vic,
    #[serde(rename = "WA")]
    Wa,
}

impl Region {
    pub const ALL: [Region; 7] = [
        Region::Qld,
        Region::Nsw,
        Region::Nt,
        Region::Sa,
        Region::Tas,
        Region::Vic,
        Region::Wa,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Region::Qld => "QLD",
            Region::Nsw => "NSW",
            Region::Nt => "NT",
            Region::Sa => "SA",
            Region::Tas => "TAS",
            Region::Vic => "VIC",
            Region::Wa => "WA",
        }
    }

    /// Product file of the town and city précis forecast.
    pub fn forecast_product(self) -> &'static str {
        match self {
            Region::Qld => "IDQ11295.xml",
            Region::Nsw => "IDN11060.xml",
            Region::Nt => "IDD10207.xml",
            Region::Sa => "IDS10044.xml",
            Region::Tas => "IDT16710.xml",
            Region::Vic => "IDV10753.xml",
            Region::Wa => "IDW14199.xml",
        }
    }

    /// Product file of the station observations, published for NSW only.
    pub fn observation_product(self) -> Option<&'static str> {
        match self {
            Region::Nsw => Some("IDN60920.xml"),
            _ => None,
        }
    }

    pub fn forecast_url(self, base_url: &str) -> String {
        product_url(base_url, self.forecast_product())
    }

    pub fn observation_url(self, base_url: &str) -> Result<String, FeedError> {
        self.observation_product()
            .map(|product| product_url(base_url, product))
            .ok_or_else(|| FeedError::NoObservationFeed(observation_regions()))
    }
}

/// Codes of the regions with an observation product, e.g. `"NSW"`.
fn observation_regions() -> String {
    Region::ALL
        .iter()
        .filter(|r| r.observation_product().is_some())
        .map(|r| r.code())
        .collect::<Vec<_>>()
        .join(", ")
}

fn product_url(base_url: &str, product: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), product)
}

impl FromStr for Region {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Region::ALL
            .into_iter()
            .find(|r| r.code() == s)
            .ok_or_else(|| FeedError::Configuration(s.to_string()))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
