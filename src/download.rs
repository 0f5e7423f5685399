//! One-shot HTTP download
//!
//! Fetches a URL once and classifies the outcome. Callers can map a 404 or an
//! empty body to an error of their choosing, which is how platforms signal
//! "no configuration source" separately from a transport failure.
//! Retrying is left to the caller.

use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::PlatformError;

/// Default timeout for a single download
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

type ErrorFn = fn() -> PlatformError;

/// Download options
#[derive(Debug, Clone)]
pub struct Download {
    url: String,
    timeout: Duration,
    error_on_not_found: Option<ErrorFn>,
    error_on_empty_response: Option<ErrorFn>,
}

impl Download {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: DEFAULT_TIMEOUT,
            error_on_not_found: None,
            error_on_empty_response: None,
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Return the given error instead of a status error on 404
    pub fn with_error_on_not_found(mut self, err: ErrorFn) -> Self {
        self.error_on_not_found = Some(err);
        self
    }

    /// Return the given error when the server answers 200 with an empty body
    pub fn with_error_on_empty_response(mut self, err: ErrorFn) -> Self {
        self.error_on_empty_response = Some(err);
        self
    }

    /// Perform the download, racing it against `ctx` cancellation
    pub async fn fetch(&self, ctx: &CancellationToken) -> Result<Vec<u8>, PlatformError> {
        info!("Fetching {:?}", self.url);

        let client = Client::builder().timeout(self.timeout).build()?;

        tokio::select! {
            result = self.fetch_with(&client) => result,
            _ = ctx.cancelled() => Err(PlatformError::Cancelled),
        }
    }

    async fn fetch_with(&self, client: &Client) -> Result<Vec<u8>, PlatformError> {
        let response = client.get(&self.url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            if let Some(err) = self.error_on_not_found {
                debug!("{} not found", self.url);
                return Err(err());
            }
        }

        if status != StatusCode::OK {
            return Err(PlatformError::status(&self.url, status));
        }

        let body = response.bytes().await?;

        if body.is_empty() {
            if let Some(err) = self.error_on_empty_response {
                debug!("{} returned an empty body", self.url);
                return Err(err());
            }
        }

        Ok(body.to_vec())
    }
}

/// Download `url` once with default options
pub async fn download(url: &str, ctx: &CancellationToken) -> Result<Vec<u8>, PlatformError> {
    Download::new(url).fetch(ctx).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_not_found_without_mapping_is_status_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/config"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let url = format!("{}/config", mock_server.uri());
        let err = download(&url, &CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, PlatformError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_empty_body_without_mapping_is_ok() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/config"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let url = format!("{}/config", mock_server.uri());
        let data = download(&url, &CancellationToken::new()).await.unwrap();
        assert!(data.is_empty());
    }

    #[tokio::test]
    async fn test_mapped_errors() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let err = Download::new(format!("{}/missing", mock_server.uri()))
            .with_error_on_not_found(|| PlatformError::NoConfigSource)
            .fetch(&CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.is_no_config_source());
    }

    #[tokio::test]
    async fn test_cancelled_in_flight() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(30)))
            .mount(&mock_server)
            .await;

        let ctx = CancellationToken::new();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.cancel();
        });

        let err = Download::new(format!("{}/slow", mock_server.uri()))
            .fetch(&ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::Cancelled));
    }
}
