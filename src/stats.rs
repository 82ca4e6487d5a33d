//! Per-researcher publication statistics

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Serialize, Serializer};

use crate::pubmed::models::Article;

const DEFAULT_TOP_JOURNALS: usize = 5;
const SAMPLE_TITLES: usize = 5;

/// Publication year grouping key; unknown years sort after every known year
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum YearBucket {
    Year(u16),
    Unknown,
}

impl fmt::Display for YearBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearBucket::Year(year) => write!(f, "{year}"),
            YearBucket::Unknown => f.write_str("unknown"),
        }
    }
}

impl Serialize for YearBucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JournalCount {
    pub journal: String,
    pub count: usize,
}

/// Aggregated view of one researcher's publications
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResearcherStatistics {
    pub researcher: String,
    /// Distinct articles that went into the aggregate
    pub total_publications: usize,
    /// Total matches reported by the search service, when known
    pub total_found: Option<usize>,
    /// Most frequent journals, descending by count, ties in first-seen order
    pub top_journals: Vec<JournalCount>,
    pub publication_years: BTreeMap<YearBucket, usize>,
    /// First few titles in rank order
    pub sample_titles: Vec<String>,
}

/// Folds a list of articles into [`ResearcherStatistics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatisticsAggregator {
    top_n: usize,
}

impl Default for StatisticsAggregator {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_JOURNALS,
        }
    }
}

impl StatisticsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only the `n` most frequent journals
    pub fn top_n(mut self, n: usize) -> Self {
        self.top_n = n;
        self
    }

    /// Aggregate `articles`, counting each id once (first occurrence wins)
    ///
    /// # Example
    ///
    /// ```
    /// use pubmed_literature::{Article, StatisticsAggregator};
    ///
    /// let mut article = Article::new("1", "Title");
    /// article.journal = "Lancet".to_string();
    ///
    /// let stats = StatisticsAggregator::new().aggregate("Jane Doe", &[article.clone(), article]);
    /// assert_eq!(stats.total_publications, 1);
    /// assert_eq!(stats.top_journals[0].count, 1);
    /// ```
    pub fn aggregate(&self, researcher: &str, articles: &[Article]) -> ResearcherStatistics {
        let mut seen = HashSet::new();
        let mut unique: Vec<&Article> = Vec::with_capacity(articles.len());
        for article in articles {
            if seen.insert(article.id.as_str()) {
                unique.push(article);
            }
        }

        // (lowercased key, first-seen spelling, count) in first-seen order
        let mut journals: Vec<(String, String, usize)> = Vec::new();
        let mut publication_years = BTreeMap::new();

        for article in &unique {
            let journal = article.journal.trim();
            if !journal.is_empty() {
                let key = journal.to_lowercase();
                match journals.iter_mut().find(|(k, _, _)| *k == key) {
                    Some((_, _, count)) => *count += 1,
                    None => journals.push((key, journal.to_string(), 1)),
                }
            }

            let bucket = article
                .publication_date
                .year
                .map_or(YearBucket::Unknown, YearBucket::Year);
            *publication_years.entry(bucket).or_insert(0) += 1;
        }

        // Stable sort keeps first-seen order among equal counts
        journals.sort_by(|a, b| b.2.cmp(&a.2));
        let top_journals = journals
            .into_iter()
            .take(self.top_n)
            .map(|(_, journal, count)| JournalCount { journal, count })
            .collect();

        let sample_titles = unique
            .iter()
            .map(|article| article.title.trim())
            .filter(|title| !title.is_empty())
            .take(SAMPLE_TITLES)
            .map(str::to_string)
            .collect();

        ResearcherStatistics {
            researcher: researcher.to_string(),
            total_publications: unique.len(),
            total_found: None,
            top_journals,
            publication_years,
            sample_titles,
        }
    }
}
