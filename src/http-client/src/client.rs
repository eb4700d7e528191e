use std::time::Duration;

use reqwest::{Client, Url};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use reqwest_tracing::TracingMiddleware;
use snafu::ResultExt;

use crate::{RequestBuilder, Result, error::error::BuildSnafu};

const DEFAULT_MAX_RETRIES: u32 = 3;
const MIN_RETRY_INTERVAL: Duration = Duration::from_millis(500);
const MAX_RETRY_INTERVAL: Duration = Duration::from_secs(30);

/// Cheap to clone, all clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient(ClientWithMiddleware);

#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Option<Duration>,
    max_retries: u32,
    user_agent: String,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    pub fn get(&self, url: Url) -> RequestBuilder {
        RequestBuilder::new(self.0.get(url.clone()), url)
    }

    pub fn post(&self, url: Url) -> RequestBuilder {
        RequestBuilder::new(self.0.post(url.clone()), url)
    }
}

impl HttpClientBuilder {
    /// Total time allowed for a single attempt, connect through body.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Retries on connection errors, timeouts, 5xx and 429. Zero disables retrying.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn build(self) -> Result<HttpClient> {
        let mut inner = Client::builder().gzip(true).user_agent(self.user_agent);
        if let Some(timeout) = self.timeout {
            inner = inner.timeout(timeout);
        }
        let inner = inner.build().context(BuildSnafu)?;

        let policy = ExponentialBackoff::builder()
            .retry_bounds(MIN_RETRY_INTERVAL, MAX_RETRY_INTERVAL)
            .build_with_max_retries(self.max_retries);

        let client = ClientBuilder::new(inner)
            .with(TracingMiddleware::default())
            .with(RetryTransientMiddleware::new_with_policy(policy))
            .build();

        Ok(HttpClient(client))
    }
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: None,
            max_retries: DEFAULT_MAX_RETRIES,
            user_agent: concat!("kystdata-ais/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
