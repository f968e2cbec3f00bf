use crate::extractor::FeedKind;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FeedError {
    #[error("Error: Invalid state, must be QLD, NSW, NT, SA, TAS, VIC or WA")]
    Configuration(String),
    #[error("Error: Only {0} supported")]
    NoObservationFeed(String),
    #[error("Error: No data received from server")]
    Fetch,
    #[error("Error: Failed to parse feed document: {0}")]
    Xml(String),
    #[error("Failed to find {0} Area")]
    AreaNotFound(FeedKind),
    #[error("Failed to parse number: {0}")]
    FieldParse(String),
    #[error("Failed to parse date/time: {0}")]
    Timestamp(String),
}
