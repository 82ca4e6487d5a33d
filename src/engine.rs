//! The three literature operations exposed to callers

use std::collections::HashMap;

use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::citation::CitationFormatter;
use crate::config::ClientConfig;
use crate::error::{LiteratureError, Result};
use crate::pubmed::fetcher::{FetchRequest, ResilientFetcher};
use crate::pubmed::models::{Article, PerformanceMetrics, SearchResult};
use crate::pubmed::parser::ResponseParser;
use crate::pubmed::query::{QueryBuilder, SearchQuery};
use crate::stats::{ResearcherStatistics, StatisticsAggregator};

/// Ids per EFetch request
const FETCH_BATCH_SIZE: usize = 200;

/// An article together with its public PubMed link
#[derive(Debug, Clone, Serialize)]
pub struct ArticleDetails {
    #[serde(flatten)]
    pub article: Article,
    pub url: String,
}

/// Full record of one article plus a ready-made citation
#[derive(Debug, Clone, Serialize)]
pub struct PublicationDetails {
    pub details: ArticleDetails,
    pub citation: String,
}

/// Literature search, lookup and statistics over PubMed
///
/// Clones share the rate gate of the underlying fetcher, so every clone's
/// requests count against the same budget.
#[derive(Clone)]
pub struct LiteratureEngine {
    fetcher: ResilientFetcher,
    config: ClientConfig,
}

impl LiteratureEngine {
    /// Create an engine with default configuration
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pubmed_literature::LiteratureEngine;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let engine = LiteratureEngine::new()?;
    ///     let result = engine
    ///         .find_articles(&["CRISPR"], &["Doudna JA"], 10)
    ///         .await?;
    ///
    ///     for article in &result.articles {
    ///         println!("{}: {}", article.id, article.title);
    ///     }
    ///     Ok(())
    /// }
    /// ```
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::new())
    }

    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let fetcher = ResilientFetcher::with_config(config.clone())?;
        Ok(Self { fetcher, config })
    }

    /// Build an engine on top of an existing fetcher, sharing its rate gate
    pub fn with_fetcher(fetcher: ResilientFetcher) -> Self {
        let config = fetcher.config().clone();
        Self { fetcher, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Search by topics and researchers, then fetch the matching records
    ///
    /// Articles come back in the search service's rank order. Ids that the
    /// detail fetch does not return are left out.
    ///
    /// # Errors
    ///
    /// * `LiteratureError::InvalidQuery` - if no terms are given or the limit is invalid
    /// * `LiteratureError::Fetch` - if either phase fails after retries
    /// * `LiteratureError::Parse` - if a response is not the expected shape
    #[instrument(skip(self, topics, researchers))]
    pub async fn find_articles<S: AsRef<str>>(
        &self,
        topics: &[S],
        researchers: &[S],
        result_limit: usize,
    ) -> Result<SearchResult> {
        let query = QueryBuilder::build(topics, researchers, result_limit)?;
        self.run_query(&query).await
    }

    #[instrument(skip(self, query), fields(query = %query.expression()))]
    async fn run_query(&self, query: &SearchQuery) -> Result<SearchResult> {
        let mut performance = PerformanceMetrics::default();

        let started = Instant::now();
        let search = self
            .fetcher
            .fetch(&FetchRequest::Search {
                term: query.expression().to_string(),
                retmax: query.result_limit(),
            })
            .await?;
        performance.query_retries = search.retries;
        let ids = ResponseParser::parse_search(&search.body)?;
        performance.query_duration = started.elapsed();

        debug!(
            ids = ids.ids.len(),
            total_found = ids.total_found,
            "Search phase complete"
        );

        let mut by_id: HashMap<String, Article> = HashMap::with_capacity(ids.ids.len());
        let mut dropped_records = 0;

        let started = Instant::now();
        for batch in ids.ids.chunks(FETCH_BATCH_SIZE) {
            let response = self
                .fetcher
                .fetch(&FetchRequest::Fetch {
                    ids: batch.to_vec(),
                })
                .await?;
            performance.fetch_retries += response.retries;

            let parsed = ResponseParser::parse_summaries(&response.body)?;
            dropped_records += parsed.dropped;
            for article in parsed.articles {
                by_id.entry(article.id.clone()).or_insert(article);
            }
        }
        performance.fetch_duration = started.elapsed();

        let articles: Vec<Article> = ids
            .ids
            .iter()
            .filter_map(|id| by_id.remove(id))
            .collect();

        if articles.len() < ids.ids.len() {
            warn!(
                requested = ids.ids.len(),
                returned = articles.len(),
                "Some searched ids had no detail record"
            );
        }

        info!(
            returned = articles.len(),
            total_found = ids.total_found,
            dropped_records,
            retries = performance.total_retries(),
            "Search completed"
        );

        Ok(SearchResult {
            query: query.expression().to_string(),
            articles,
            total_found: ids.total_found,
            dropped_records,
            performance,
        })
    }

    /// Fetch one article by PubMed id and render its citation
    ///
    /// # Errors
    ///
    /// * `LiteratureError::InvalidQuery` - if `article_id` is not a numeric PMID
    /// * `LiteratureError::NotFound` - if PubMed has no record for the id
    /// * `LiteratureError::Fetch` / `LiteratureError::Parse` - on transport or payload failure
    #[instrument(skip(self), fields(pmid = %article_id))]
    pub async fn get_publication_details(&self, article_id: &str) -> Result<PublicationDetails> {
        let id = article_id.trim();
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
            warn!("Invalid PMID format provided");
            return Err(LiteratureError::InvalidQuery(format!(
                "article id must be a numeric PubMed id, got {article_id:?}"
            )));
        }

        let response = self
            .fetcher
            .fetch(&FetchRequest::Fetch {
                ids: vec![id.to_string()],
            })
            .await?;
        let parsed = ResponseParser::parse_summaries(&response.body)?;

        let mut articles = parsed.articles;
        let position = articles
            .iter()
            .position(|article| article.id == id)
            .or(if articles.len() == 1 { Some(0) } else { None });

        let Some(position) = position else {
            debug!("No record returned for id");
            return Err(LiteratureError::NotFound { id: id.to_string() });
        };

        let article = articles.swap_remove(position);
        if article.id != id {
            warn!(returned = %article.id, "Using sole returned record for a different id");
        }

        Ok(Self::details_for(article))
    }

    fn details_for(article: Article) -> PublicationDetails {
        let citation = CitationFormatter::format(&article);
        let url = article.url();

        info!(
            title = %article.title,
            authors_count = article.authors.len(),
            has_abstract = article.abstract_text.is_some(),
            "Fetched publication details"
        );

        PublicationDetails {
            details: ArticleDetails { article, url },
            citation,
        }
    }

    /// Aggregate publication statistics for one researcher
    ///
    /// # Errors
    ///
    /// * `LiteratureError::InvalidQuery` - if `researcher` is blank
    /// * `LiteratureError::Fetch` / `LiteratureError::Parse` - on transport or payload failure
    #[instrument(skip(self), fields(researcher = %researcher))]
    pub async fn get_article_statistics(&self, researcher: &str) -> Result<ResearcherStatistics> {
        let name = researcher.trim();
        if name.is_empty() {
            return Err(LiteratureError::InvalidQuery(
                "researcher name must not be empty".to_string(),
            ));
        }

        let result = self
            .find_articles(&[], &[name], self.config.stats_result_limit)
            .await?;

        let mut statistics = StatisticsAggregator::new()
            .top_n(self.config.stats_top_journals)
            .aggregate(name, &result.articles);
        statistics.total_found = Some(result.total_found);

        Ok(statistics)
    }
}
