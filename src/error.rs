use std::result;

use crate::retry::RetryableError;
use thiserror::Error;

/// Error types for literature engine operations
///
/// Every public operation returns one of these as a value; transient network
/// faults never appear here directly because the fetcher retries them first.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LiteratureError {
    /// Caller input violates a precondition
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Remote call failed on a non-retryable status or after exhausting retries
    #[error("Request failed after {retries} retries: {cause}")]
    Fetch {
        /// Last observed HTTP status, if a response was received at all
        status: Option<u16>,
        cause: String,
        retries: u32,
    },

    /// Payload as a whole did not have the expected container shape
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// A requested article id does not exist
    #[error("Article not found: PMID {id}")]
    NotFound { id: String },
}

impl LiteratureError {
    /// Stable snake_case tag used when the error is reported to a caller
    pub fn kind(&self) -> &'static str {
        match self {
            LiteratureError::InvalidQuery(_) => "invalid_query",
            LiteratureError::Fetch { .. } => "fetch_error",
            LiteratureError::Parse(_) => "parse_error",
            LiteratureError::NotFound { .. } => "not_found",
        }
    }

    /// Number of retries consumed before the error was produced
    pub fn retries(&self) -> u32 {
        match self {
            LiteratureError::Fetch { retries, .. } => *retries,
            _ => 0,
        }
    }
}

impl From<serde_json::Error> for LiteratureError {
    fn from(err: serde_json::Error) -> Self {
        LiteratureError::Parse(format!("invalid JSON payload: {err}"))
    }
}

impl From<quick_xml::Error> for LiteratureError {
    fn from(err: quick_xml::Error) -> Self {
        LiteratureError::Parse(format!("malformed XML: {err}"))
    }
}

impl From<quick_xml::DeError> for LiteratureError {
    fn from(err: quick_xml::DeError) -> Self {
        LiteratureError::Parse(format!("invalid XML payload: {err}"))
    }
}

pub type Result<T> = result::Result<T, LiteratureError>;

/// Failure of a single HTTP attempt, before the retry policy has been applied
#[derive(Error, Debug)]
pub(crate) enum AttemptError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {reason}")]
    Status { status: u16, reason: String },
}

impl AttemptError {
    pub(crate) fn status(&self) -> Option<u16> {
        match self {
            AttemptError::Transport(err) => err.status().map(|s| s.as_u16()),
            AttemptError::Status { status, .. } => Some(*status),
        }
    }

    /// Convert into the caller-facing error, recording how many retries were spent
    pub(crate) fn into_fetch_error(self, retries: u32) -> LiteratureError {
        LiteratureError::Fetch {
            status: self.status(),
            cause: self.to_string(),
            retries,
        }
    }
}

impl RetryableError for AttemptError {
    fn is_retryable(&self) -> bool {
        match self {
            AttemptError::Transport(err) => {
                if err.is_timeout() || err.is_connect() {
                    return true;
                }

                if let Some(status) = err.status() {
                    return status.is_server_error() || status.as_u16() == 429;
                }

                // Resets and other I/O failures while sending or reading the body
                !err.is_builder() && !err.is_redirect() && !err.is_decode()
            }
            AttemptError::Status { status, .. } => *status == 429 || (500..600).contains(status),
        }
    }

    fn retry_reason(&self) -> &str {
        match self {
            AttemptError::Transport(err) if err.is_timeout() => "Request timeout",
            AttemptError::Transport(err) if err.is_connect() => "Connection error",
            AttemptError::Transport(_) => "Network error",
            AttemptError::Status { status: 429, .. } => "Rate limit exceeded",
            AttemptError::Status { status: 500..=599, .. } => "Server error",
            AttemptError::Status { .. } => "Client error",
        }
    }
}
