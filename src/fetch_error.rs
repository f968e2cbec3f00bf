#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Feed not found (404): {0}")]
    NotFound(String),
    #[error("Unexpected HTTP status {status} for {url}")]
    Status { status: u16, url: String },
    #[error("Empty response body from {0}")]
    EmptyBody(String),
}
