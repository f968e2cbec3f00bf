use std::collections::HashMap;
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{debug, error, instrument};

use crate::fetch_error::FetchError;

/// Retrieves a feed document by URL.
///
/// `None` means no data could be obtained, for whatever reason; the
/// implementation is responsible for logging why.
pub trait FeedSource {
    fn fetch_document(&self, url: &str) -> Option<Vec<u8>>;
}

/// Blocking HTTP source for the BoM product files.
#[derive(Debug, Clone)]
pub struct HttpFeedSource {
    client: Client,
}

impl HttpFeedSource {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    #[instrument(skip(self))]
    pub fn download(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        debug!("Sending HTTP request for feed");
        let response = self.client.get(url).send()?;
        let status = response.status();
        debug!("Received HTTP response with status: {}", status);

        if status.as_u16() == 404 {
            return Err(FetchError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let bytes = response.bytes()?;
        if bytes.is_empty() {
            return Err(FetchError::EmptyBody(url.to_string()));
        }
        debug!("Retrieved feed document, size: {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }
}

impl FeedSource for HttpFeedSource {
    fn fetch_document(&self, url: &str) -> Option<Vec<u8>> {
        match self.download(url) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                error!("Error while downloading data from {}: {}", url, e);
                None
            }
        }
    }
}

/// In-memory source keyed by URL, for offline runs and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticFeedSource {
    documents: HashMap<String, Vec<u8>>,
}

impl StaticFeedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.documents.insert(url.into(), body.into());
        self
    }
}

impl FeedSource for StaticFeedSource {
    fn fetch_document(&self, url: &str) -> Option<Vec<u8>> {
        let document = self.documents.get(url).cloned();
        if document.is_none() {
            debug!("No static document registered for {}", url);
        }
        document
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_source_lookup() {
        let source = StaticFeedSource::new().with_document("http://feeds/a.xml", "<product/>");
        assert_eq!(
            source.fetch_document("http://feeds/a.xml"),
            Some(b"<product/>".to_vec())
        );
        assert_eq!(source.fetch_document("http://feeds/b.xml"), None);
    }

    #[test]
    fn test_http_source_unreachable_host_yields_none() {
        let source = HttpFeedSource::new(Duration::from_secs(2)).unwrap();
        // Nothing listens on the discard port
        assert_eq!(source.fetch_document("http://127.0.0.1:9/IDN11060.xml"), None);
    }
}
