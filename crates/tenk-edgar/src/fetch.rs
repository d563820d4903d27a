//! HTTP fetching with SEC rate limiting.
//!
//! [`Fetcher`] is the network seam of the pipeline. [`HttpFetcher`] talks to
//! EDGAR through `reqwest`; [`StaticFetcher`] serves canned documents.

use async_trait::async_trait;
use reqwest::Url;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;
use tenk_core::{Result, TenkError};
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::debug;

/// Default rate limit: 10 requests per second (SEC requirement)
pub const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(100);

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Performs plain HTTP GET requests.
#[async_trait]
pub trait Fetcher: Send + Sync + Debug {
    /// Fetches `url` with the given query parameters and returns the raw body.
    ///
    /// # Errors
    /// Returns [`TenkError::Network`] if the request fails or the response
    /// status is not a success.
    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Vec<u8>>;
}

/// Builds the full URL for a request, query string included.
pub fn request_url(url: &str, query: &[(&str, &str)]) -> Result<Url> {
    let parsed = if query.is_empty() {
        Url::parse(url)
    } else {
        Url::parse_with_params(url, query)
    };
    parsed.map_err(|e| TenkError::InvalidParameter(format!("Invalid URL {url}: {e}")))
}

/// Rate limiter to ensure we don't exceed SEC's rate limits
#[derive(Debug)]
struct RateLimiter {
    last_request: Instant,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Instant::now() - min_interval,
            min_interval,
        }
    }

    async fn wait(&mut self) {
        let elapsed = self.last_request.elapsed();
        if elapsed < self.min_interval {
            sleep(self.min_interval - elapsed).await;
        }
        self.last_request = Instant::now();
    }
}

/// `reqwest`-backed fetcher with SEC rate limiting.
///
/// No retries are attempted; a failed request surfaces as
/// [`TenkError::Network`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl HttpFetcher {
    /// Create a new fetcher with the specified user agent.
    ///
    /// The SEC requires identifying user agent headers. Format should be:
    /// "AppName/Version (contact@email.com)"
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    ///
    /// # Example
    /// ```
    /// use tenk_edgar::HttpFetcher;
    ///
    /// let fetcher = HttpFetcher::new("MyApp/1.0 (contact@example.com)").unwrap();
    /// ```
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| TenkError::Network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self::with_client(client))
    }

    /// Create a new fetcher with a custom HTTP client.
    ///
    /// The client should already carry an identifying user agent.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(DEFAULT_RATE_LIMIT))),
        }
    }

    /// Override the minimum interval between two requests.
    #[must_use]
    pub fn with_rate_limit(mut self, min_interval: Duration) -> Self {
        self.rate_limiter = Arc::new(Mutex::new(RateLimiter::new(min_interval)));
        self
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Vec<u8>> {
        let url = request_url(url, query)?;

        // Rate limit
        self.rate_limiter.lock().await.wait().await;

        debug!("Fetching {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| TenkError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TenkError::Network(format!(
                "Failed to fetch {}: HTTP {}",
                url,
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| TenkError::Network(format!("Failed to read body of {url}: {e}")))?;

        Ok(body.to_vec())
    }
}

/// Fetcher serving canned documents keyed by full request URL.
///
/// Unknown URLs fail with [`TenkError::Network`], like an unreachable host.
/// Every request is recorded.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    documents: HashMap<String, Vec<u8>>,
    requests: std::sync::Mutex<Vec<String>>,
}

impl StaticFetcher {
    /// Create an empty fetcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the body served for `url` with `query`.
    ///
    /// # Errors
    /// Returns [`TenkError::InvalidParameter`] if the URL does not parse.
    pub fn insert(
        &mut self,
        url: &str,
        query: &[(&str, &str)],
        body: impl Into<Vec<u8>>,
    ) -> Result<()> {
        let key = request_url(url, query)?.to_string();
        self.documents.insert(key, body.into());
        Ok(())
    }

    /// Builder-style variant of [`StaticFetcher::insert`].
    ///
    /// # Errors
    /// Returns [`TenkError::InvalidParameter`] if the URL does not parse.
    pub fn with_document(
        mut self,
        url: &str,
        query: &[(&str, &str)],
        body: impl Into<Vec<u8>>,
    ) -> Result<Self> {
        self.insert(url, query, body)?;
        Ok(self)
    }

    /// Returns the URLs requested so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Vec<u8>> {
        let key = request_url(url, query)?.to_string();
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(key.clone());
        }
        self.documents
            .get(&key)
            .cloned()
            .ok_or_else(|| TenkError::Network(format!("Failed to fetch {key}: unreachable")))
    }
}
