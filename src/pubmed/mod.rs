//! PubMed E-utilities access: query construction, HTTP fetching and parsing
//!
//! These are the building blocks [`crate::LiteratureEngine`] composes; each is
//! usable on its own.

pub mod date;
pub mod fetcher;
pub mod models;
pub mod parser;
pub mod query;
pub(crate) mod responses;

// Re-export public types
pub use date::PublicationDate;
pub use fetcher::{Endpoint, FetchRequest, RawResponse, ResilientFetcher};
pub use models::{Article, PerformanceMetrics, SearchResult};
pub use parser::{ParsedArticles, ResponseParser, SearchIds};
pub use query::{MAX_RESULT_LIMIT, QueryBuilder, SearchQuery};
