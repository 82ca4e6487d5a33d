use std::fmt;

use reqwest::Client;
use tracing::{debug, instrument, warn};

use crate::config::ClientConfig;
use crate::error::{AttemptError, LiteratureError, Result};
use crate::rate_limit::RateLimiter;
use crate::retry::with_retry;

/// E-utilities endpoints used by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// ESearch: query expression to ranked id list (JSON)
    Search,
    /// EFetch: id list to full records (XML)
    Fetch,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Search => "esearch.fcgi",
            Endpoint::Fetch => "efetch.fcgi",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Endpoint::Search => "esearch",
            Endpoint::Fetch => "efetch",
        })
    }
}

/// A single logical request to the remote service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    Search { term: String, retmax: usize },
    Fetch { ids: Vec<String> },
}

impl FetchRequest {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            FetchRequest::Search { .. } => Endpoint::Search,
            FetchRequest::Fetch { .. } => Endpoint::Fetch,
        }
    }

    fn query_params(&self) -> Vec<(&'static str, String)> {
        match self {
            FetchRequest::Search { term, retmax } => vec![
                ("db", "pubmed".to_string()),
                ("term", term.clone()),
                ("retmax", retmax.to_string()),
                ("retmode", "json".to_string()),
            ],
            FetchRequest::Fetch { ids } => vec![
                ("db", "pubmed".to_string()),
                ("id", ids.join(",")),
                ("retmode", "xml".to_string()),
            ],
        }
    }
}

/// Body of a successful response plus how many retries it took
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub endpoint: Endpoint,
    pub status: u16,
    pub body: String,
    pub retries: u32,
}

/// HTTP layer that spaces requests, times them out, and retries transient failures
///
/// Cloned fetchers share the same rate gate.
#[derive(Clone)]
pub struct ResilientFetcher {
    client: Client,
    base_url: String,
    rate_limiter: RateLimiter,
    config: ClientConfig,
}

impl ResilientFetcher {
    /// Create a fetcher with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::new())
    }

    /// Create a fetcher whose HTTP client honors the configured timeout and user agent
    ///
    /// # Errors
    ///
    /// * `LiteratureError::Fetch` - if the underlying HTTP client cannot be built
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.effective_user_agent())
            .build()
            .map_err(|e| LiteratureError::Fetch {
                status: None,
                cause: format!("failed to create HTTP client: {e}"),
                retries: 0,
            })?;

        Ok(Self::with_client(client, config))
    }

    /// Create a fetcher around a caller-supplied HTTP client
    ///
    /// The client's own timeout settings take the place of `config.timeout`.
    pub fn with_client(client: Client, config: ClientConfig) -> Self {
        let rate_limiter = config.create_rate_limiter();
        let base_url = config.effective_base_url().to_string();

        Self {
            client,
            base_url,
            rate_limiter,
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    /// Full request URL including credential parameters
    pub fn build_url(&self, request: &FetchRequest) -> String {
        let mut url = format!("{}/{}", self.base_url, request.endpoint().path());

        let params = request
            .query_params()
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .chain(self.config.build_api_params());

        for (idx, (key, value)) in params.enumerate() {
            url.push(if idx == 0 { '?' } else { '&' });
            url.push_str(&key);
            url.push('=');
            url.push_str(&urlencoding::encode(&value));
        }

        url
    }

    /// Perform `request`, retrying transient failures with exponential backoff
    ///
    /// Every attempt, retries included, passes through the shared rate gate.
    ///
    /// # Errors
    ///
    /// * `LiteratureError::Fetch` - on a non-retryable status, or once the
    ///   retry budget is exhausted; carries the last status and the retry count
    #[instrument(skip(self, request), fields(endpoint = %request.endpoint()))]
    pub async fn fetch(&self, request: &FetchRequest) -> Result<RawResponse> {
        let url = self.build_url(request);
        let endpoint = request.endpoint();
        let context = endpoint.to_string();

        let (result, retries) =
            with_retry(|| self.attempt(&url), &self.config.retry_config, &context).await;

        match result {
            Ok((status, body)) => {
                debug!(status, retries, body_size = body.len(), "Request succeeded");
                Ok(RawResponse {
                    endpoint,
                    status,
                    body,
                    retries,
                })
            }
            Err(err) => {
                warn!(retries, error = %err, "Request failed");
                Err(err.into_fetch_error(retries))
            }
        }
    }

    async fn attempt(&self, url: &str) -> std::result::Result<(u16, String), AttemptError> {
        let permit = self.rate_limiter.acquire().await;
        debug!("Sending E-utilities request");
        let response = self.client.get(url).send().await;
        drop(permit);

        let response = response?;
        let status = response.status();
        if !status.is_success() {
            return Err(AttemptError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown error").to_string(),
            });
        }

        let body = response.text().await?;
        Ok((status.as_u16(), body))
    }
}
