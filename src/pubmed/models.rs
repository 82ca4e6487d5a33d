use std::hash::{Hash, Hasher};
use std::time::Duration;

use serde::{Deserialize, Serialize, Serializer};

pub use super::date::PublicationDate;

const ARTICLE_VIEW_BASE: &str = "https://pubmed.ncbi.nlm.nih.gov";

/// Normalized PubMed article record
///
/// Identity is the PubMed id alone: two records with the same `id` compare
/// equal and hash identically even when the rest of the metadata differs,
/// since repeated fetches may return slightly different data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// PubMed ID
    pub id: String,
    pub title: String,
    /// Authors in byline order, in citation form (`"Wu F"`)
    pub authors: Vec<String>,
    /// Journal name
    pub journal: String,
    pub volume: Option<String>,
    pub issue: Option<String>,
    /// Page range as printed (`"727-733"`)
    pub pages: Option<String>,
    pub publication_date: PublicationDate,
    /// Abstract text (if available)
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    /// DOI (Digital Object Identifier)
    pub doi: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Article {
    /// Minimal record with only the id and title set
    pub fn new<S: Into<String>, T: Into<String>>(id: S, title: T) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            authors: Vec::new(),
            journal: String::new(),
            volume: None,
            issue: None,
            pages: None,
            publication_date: PublicationDate::unknown(),
            abstract_text: None,
            doi: None,
            keywords: Vec::new(),
        }
    }

    /// Public PubMed page for this article
    pub fn url(&self) -> String {
        format!("{ARTICLE_VIEW_BASE}/{}/", self.id)
    }
}

impl PartialEq for Article {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Article {}

impl Hash for Article {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Timing and retry accounting for one search-and-fetch pipeline
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    /// Wall-clock time of the search (id list) phase
    #[serde(rename = "query_ms", serialize_with = "serialize_millis")]
    pub query_duration: Duration,
    /// Wall-clock time of the detail fetch phase
    #[serde(rename = "fetch_ms", serialize_with = "serialize_millis")]
    pub fetch_duration: Duration,
    pub query_retries: u32,
    pub fetch_retries: u32,
}

impl PerformanceMetrics {
    pub fn total_retries(&self) -> u32 {
        self.query_retries + self.fetch_retries
    }

    pub fn total_duration(&self) -> Duration {
        self.query_duration + self.fetch_duration
    }
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_micros() as f64 / 1000.0)
}

/// Ranked search results with the remote-reported total
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    /// Query expression sent to ESearch
    pub query: String,
    /// Articles in the rank order reported by ESearch
    pub articles: Vec<Article>,
    /// Total matches as reported by the remote service, passed through verbatim
    pub total_found: usize,
    /// Detail records dropped because they carried no usable id
    pub dropped_records: usize,
    pub performance: PerformanceMetrics,
}

impl SearchResult {
    pub fn returned(&self) -> usize {
        self.articles.len()
    }
}
