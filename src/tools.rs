//! JSON-facing wrappers around [`LiteratureEngine`] for agent tool calls
//!
//! Each function accepts a deserialized request and always returns a
//! serializable [`ToolResponse`]. Errors become an `error` payload instead
//! of propagating, so the caller can forward the value as-is.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::engine::{LiteratureEngine, PublicationDetails};
use crate::error::LiteratureError;
use crate::pubmed::models::{Article, PerformanceMetrics, SearchResult};
use crate::pubmed::query::SearchQuery;
use crate::stats::ResearcherStatistics;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FindArticlesRequest {
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub researchers: Vec<String>,
    /// Maximum number of articles; 15 when absent
    #[serde(default)]
    pub result_limit: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublicationDetailsRequest {
    pub article_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArticleStatisticsRequest {
    pub researcher: String,
}

/// `{"status": "success", ...payload}` or `{"status": "error", "error": {...}}`
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ToolResponse<T> {
    Success(T),
    Error { error: ErrorPayload },
}

impl<T> ToolResponse<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, ToolResponse::Success(_))
    }

    pub fn payload(&self) -> Option<&T> {
        match self {
            ToolResponse::Success(payload) => Some(payload),
            ToolResponse::Error { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorPayload> {
        match self {
            ToolResponse::Success(_) => None,
            ToolResponse::Error { error } => Some(error),
        }
    }
}

impl<T> From<crate::error::Result<T>> for ToolResponse<T> {
    fn from(result: crate::error::Result<T>) -> Self {
        match result {
            Ok(payload) => ToolResponse::Success(payload),
            Err(err) => {
                warn!(kind = err.kind(), error = %err, "Tool call failed");
                ToolResponse::Error {
                    error: ErrorPayload::from(&err),
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPayload {
    pub kind: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,
}

impl From<&LiteratureError> for ErrorPayload {
    fn from(err: &LiteratureError) -> Self {
        let (status, retries) = match err {
            LiteratureError::Fetch {
                status, retries, ..
            } => (*status, Some(*retries)),
            _ => (None, None),
        };

        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
            status,
            retries,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchMetadata {
    pub query: String,
    pub total_found: usize,
    pub returned: usize,
    pub dropped_records: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FindArticlesPayload {
    pub results: Vec<Article>,
    pub metadata: SearchMetadata,
    pub performance: PerformanceMetrics,
}

impl From<SearchResult> for FindArticlesPayload {
    fn from(result: SearchResult) -> Self {
        let metadata = SearchMetadata {
            returned: result.returned(),
            query: result.query,
            total_found: result.total_found,
            dropped_records: result.dropped_records,
        };

        Self {
            results: result.articles,
            metadata,
            performance: result.performance,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatisticsPayload {
    pub statistics: ResearcherStatistics,
}

/// Search articles by topics and researchers
pub async fn find_articles(
    engine: &LiteratureEngine,
    request: FindArticlesRequest,
) -> ToolResponse<FindArticlesPayload> {
    info!(
        topics = ?request.topics,
        researchers = ?request.researchers,
        result_limit = ?request.result_limit,
        "find_articles called"
    );

    let result = match result_limit(request.result_limit) {
        Ok(limit) => engine
            .find_articles(&request.topics, &request.researchers, limit)
            .await
            .map(FindArticlesPayload::from),
        Err(err) => Err(err),
    };

    result.into()
}

/// Look up one article by PubMed id
pub async fn get_publication_details(
    engine: &LiteratureEngine,
    request: PublicationDetailsRequest,
) -> ToolResponse<PublicationDetails> {
    info!(article_id = %request.article_id, "get_publication_details called");
    engine.get_publication_details(&request.article_id).await.into()
}

/// Publication statistics for one researcher
pub async fn get_article_statistics(
    engine: &LiteratureEngine,
    request: ArticleStatisticsRequest,
) -> ToolResponse<StatisticsPayload> {
    info!(researcher = %request.researcher, "get_article_statistics called");
    engine
        .get_article_statistics(&request.researcher)
        .await
        .map(|statistics| StatisticsPayload { statistics })
        .into()
}

fn result_limit(requested: Option<i64>) -> crate::error::Result<usize> {
    match requested {
        None => Ok(SearchQuery::DEFAULT_LIMIT),
        Some(limit) => usize::try_from(limit).map_err(|_| {
            LiteratureError::InvalidQuery(format!(
                "result_limit must be a positive integer, got {limit}"
            ))
        }),
    }
}
