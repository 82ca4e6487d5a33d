//! # PubMed Literature
//!
//! Literature retrieval over the NCBI PubMed E-utilities: topic and author
//! search, single-article lookup with citation rendering, and per-researcher
//! publication statistics.
//!
//! ## Features
//!
//! - **Query building**: topics and researcher names combined into a PubMed expression
//! - **Resilient fetching**: NCBI rate limits, per-attempt timeouts, retries with backoff
//! - **Parsing**: ESearch JSON and EFetch XML normalized into [`Article`] records
//! - **Citations**: Vancouver/NLM style strings
//! - **Statistics**: top journals and publication years for a researcher
//!
//! ## Quick Start
//!
//! ```no_run
//! use pubmed_literature::{ClientConfig, LiteratureEngine};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::from_env().with_email("researcher@university.edu");
//!     let engine = LiteratureEngine::with_config(config)?;
//!
//!     let result = engine
//!         .find_articles(&["heart failure"], &["Jane Doe"], 10)
//!         .await?;
//!     println!("{} of {} matches", result.returned(), result.total_found);
//!
//!     let details = engine.get_publication_details("32015507").await?;
//!     println!("{}", details.citation);
//!
//!     let stats = engine.get_article_statistics("Jane Doe").await?;
//!     for journal in &stats.top_journals {
//!         println!("{}: {}", journal.journal, journal.count);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod citation;
pub mod config;
pub mod engine;
pub mod error;
pub mod pubmed;
pub mod rate_limit;
pub mod retry;
pub mod stats;
pub mod tools;

// Re-export main types for convenience
pub use citation::CitationFormatter;
pub use config::ClientConfig;
pub use engine::{ArticleDetails, LiteratureEngine, PublicationDetails};
pub use error::{LiteratureError, Result};
pub use pubmed::{
    Article, PerformanceMetrics, PublicationDate, QueryBuilder, ResilientFetcher, ResponseParser,
    SearchQuery, SearchResult,
};
pub use rate_limit::RateLimiter;
pub use retry::RetryConfig;
pub use stats::{JournalCount, ResearcherStatistics, StatisticsAggregator, YearBucket};
