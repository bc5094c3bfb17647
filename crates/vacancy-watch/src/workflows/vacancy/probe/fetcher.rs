use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::config::FetchConfig;

/// Retrieves rendered page content for a listing URL.
pub trait PageFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, TransportError>> + Send;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },
    #[error("{url} responded with HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("gave up on {url} after {attempts} attempts: {last}")]
    Exhausted {
        url: String,
        attempts: u32,
        #[source]
        last: Box<TransportError>,
    },
}

impl TransportError {
    /// Connection failures, timeouts, throttling and server errors are worth another try.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Request { .. } => true,
            TransportError::Status { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS.as_u16() || *status >= 500
            }
            TransportError::Exhausted { .. } => false,
        }
    }
}

/// Bounded attempts with a linearly growing pause between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl HttpPageFetcher {
    pub fn new(client: reqwest::Client, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    pub fn from_config(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self::new(
            client,
            RetryPolicy {
                max_attempts: config.max_attempts.max(1),
                backoff: config.backoff,
            },
        ))
    }

    async fn fetch_once(&self, url: &str) -> Result<String, TransportError> {
        let request_error = |err: reqwest::Error| TransportError::Request {
            url: url.to_string(),
            message: err.to_string(),
        };

        let response = self.client.get(url).send().await.map_err(request_error)?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(request_error)
    }
}

impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<String, TransportError> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.fetch_once(url).await {
                Ok(body) => {
                    debug!(%url, attempt, bytes = body.len(), "page fetched");
                    return Ok(body);
                }
                Err(err) if !err.is_retryable() => return Err(err),
                Err(err) if attempt >= max_attempts => {
                    return Err(TransportError::Exhausted {
                        url: url.to_string(),
                        attempts: attempt,
                        last: Box::new(err),
                    });
                }
                Err(err) => {
                    let delay = self.retry.delay_after(attempt);
                    warn!(
                        %url,
                        attempt,
                        error = %err,
                        delay_ms = delay.as_millis() as u64,
                        "fetch attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
