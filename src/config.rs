//! Client configuration for NCBI E-utilities access
//!
//! Configuration is plain data assembled with builder methods. Loading it from
//! the process environment is available through [`ClientConfig::from_env`].

use std::env;
use std::time::Duration;

use crate::rate_limit::RateLimiter;
use crate::retry::RetryConfig;

const DEFAULT_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";
const DEFAULT_TOOL: &str = "pubmed-literature";

/// Configuration for the literature engine and its HTTP layer
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// NCBI API key; raises the allowed rate from 3 to 10 requests/second
    pub api_key: Option<String>,
    /// Contact email sent with every request, as NCBI asks
    pub email: Option<String>,
    /// Tool name sent with every request
    pub tool: Option<String>,
    /// Custom E-utilities base URL (mock servers, mirrors)
    pub base_url: Option<String>,
    /// Custom rate limit in requests per second
    pub rate_limit: Option<f64>,
    /// Timeout for a single HTTP attempt
    pub timeout: Duration,
    pub user_agent: Option<String>,
    pub retry_config: RetryConfig,
    /// Number of ids searched when computing researcher statistics
    pub stats_result_limit: usize,
    /// Number of journals kept in researcher statistics
    pub stats_top_journals: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            email: None,
            tool: None,
            base_url: None,
            rate_limit: None,
            timeout: Duration::from_secs(5),
            user_agent: None,
            retry_config: RetryConfig::default(),
            stats_result_limit: 100,
            stats_top_journals: 5,
        }
    }
}

impl ClientConfig {
    /// Create a configuration with NCBI defaults and no credentials
    ///
    /// # Example
    ///
    /// ```
    /// use pubmed_literature::ClientConfig;
    ///
    /// let config = ClientConfig::new()
    ///     .with_api_key("your_api_key_here")
    ///     .with_email("researcher@university.edu");
    ///
    /// assert_eq!(config.effective_rate_limit(), 10.0);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration from `NCBI_API_KEY`, `NCBI_EMAIL`, `NCBI_TOOL`
    /// and `NCBI_BASE_URL`; unset or blank variables keep their defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with a caller-supplied variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::new();
        config.api_key = read("NCBI_API_KEY");
        config.email = read("NCBI_EMAIL");
        config.tool = read("NCBI_TOOL");
        config.base_url = read("NCBI_BASE_URL");
        config
    }

    pub fn with_api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_email<S: Into<String>>(mut self, email: S) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_tool<S: Into<String>>(mut self, tool: S) -> Self {
        self.tool = Some(tool.into());
        self
    }

    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Override the request rate (requests per second)
    pub fn with_rate_limit(mut self, rate: f64) -> Self {
        self.rate_limit = Some(rate);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    pub fn with_stats_result_limit(mut self, limit: usize) -> Self {
        self.stats_result_limit = limit;
        self
    }

    pub fn with_stats_top_journals(mut self, top_n: usize) -> Self {
        self.stats_top_journals = top_n;
        self
    }

    /// Requests per second actually applied
    pub fn effective_rate_limit(&self) -> f64 {
        match (self.rate_limit, &self.api_key) {
            (Some(rate), _) => rate,
            (None, Some(_)) => 10.0,
            (None, None) => 3.0,
        }
    }

    pub fn effective_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn effective_user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("pubmed-literature/{}", env!("CARGO_PKG_VERSION")))
    }

    pub fn effective_tool(&self) -> &str {
        self.tool.as_deref().unwrap_or(DEFAULT_TOOL)
    }

    /// Credential parameters appended to every E-utilities request
    pub fn build_api_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();

        if let Some(ref api_key) = self.api_key {
            params.push(("api_key".to_string(), api_key.clone()));
        }
        if let Some(ref email) = self.email {
            params.push(("email".to_string(), email.clone()));
        }
        params.push(("tool".to_string(), self.effective_tool().to_string()));

        params
    }

    pub fn create_rate_limiter(&self) -> RateLimiter {
        RateLimiter::new(self.effective_rate_limit())
    }
}
