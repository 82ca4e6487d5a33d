//! Topic/author query construction for ESearch
//!
//! Topics are matched against `[Title/Abstract]`, researchers against
//! `[Author]`. Terms inside a group are OR-ed, the two groups are AND-ed, and
//! every term is quoted so multi-word terms are searched as phrases.

use crate::error::{LiteratureError, Result};

const TOPIC_FIELD: &str = "Title/Abstract";
const AUTHOR_FIELD: &str = "Author";

/// Largest `retmax` ESearch accepts for a single request
pub const MAX_RESULT_LIMIT: usize = 10_000;

/// Immutable, validated search over topics and researchers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    topics: Vec<String>,
    researchers: Vec<String>,
    result_limit: usize,
    expression: String,
}

impl SearchQuery {
    pub const DEFAULT_LIMIT: usize = 15;

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    pub fn researchers(&self) -> &[String] {
        &self.researchers
    }

    pub fn result_limit(&self) -> usize {
        self.result_limit
    }

    /// The ESearch `term` expression
    pub fn expression(&self) -> &str {
        &self.expression
    }
}

/// Builds [`SearchQuery`] values from caller-supplied term lists
pub struct QueryBuilder;

impl QueryBuilder {
    /// Build a search query from topic and researcher terms
    ///
    /// Terms are trimmed, inner whitespace is collapsed, blank terms are
    /// discarded, and duplicates are removed case-insensitively keeping the
    /// first spelling.
    ///
    /// # Errors
    ///
    /// * `LiteratureError::InvalidQuery` - if both groups are empty, or
    ///   `result_limit` is zero or above [`MAX_RESULT_LIMIT`]
    ///
    /// # Example
    ///
    /// ```
    /// use pubmed_literature::QueryBuilder;
    ///
    /// let query = QueryBuilder::build(&["heart failure"], &["Jane Doe"], 10)?;
    /// assert_eq!(
    ///     query.expression(),
    ///     r#"("heart failure"[Title/Abstract]) AND ("Jane Doe"[Author])"#
    /// );
    /// # Ok::<(), pubmed_literature::LiteratureError>(())
    /// ```
    pub fn build<S: AsRef<str>>(
        topics: &[S],
        researchers: &[S],
        result_limit: usize,
    ) -> Result<SearchQuery> {
        if result_limit == 0 {
            return Err(LiteratureError::InvalidQuery(
                "result_limit must be a positive integer".to_string(),
            ));
        }
        if result_limit > MAX_RESULT_LIMIT {
            return Err(LiteratureError::InvalidQuery(format!(
                "result_limit {result_limit} exceeds the maximum of {MAX_RESULT_LIMIT}"
            )));
        }

        let topics = normalize_terms(topics);
        let researchers = normalize_terms(researchers);

        if topics.is_empty() && researchers.is_empty() {
            return Err(LiteratureError::InvalidQuery(
                "search requires at least one topic or researcher name".to_string(),
            ));
        }

        let expression = [
            field_clause(&topics, TOPIC_FIELD),
            field_clause(&researchers, AUTHOR_FIELD),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" AND ");

        Ok(SearchQuery {
            topics,
            researchers,
            result_limit,
            expression,
        })
    }
}

/// Trim, collapse whitespace, drop blanks and case-insensitive duplicates
fn normalize_terms<S: AsRef<str>>(terms: &[S]) -> Vec<String> {
    let mut seen = Vec::<String>::new();
    let mut normalized = Vec::new();

    for term in terms {
        let cleaned = term.as_ref().split_whitespace().collect::<Vec<_>>().join(" ");
        if cleaned.is_empty() {
            continue;
        }

        let key = cleaned.to_lowercase();
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        normalized.push(cleaned);
    }

    normalized
}

/// `("a"[Field] OR "b"[Field])`, or `None` for an empty group
fn field_clause(terms: &[String], field: &str) -> Option<String> {
    if terms.is_empty() {
        return None;
    }

    let parts: Vec<String> = terms
        .iter()
        .map(|term| format!("\"{}\"[{}]", quote_safe(term), field))
        .collect();

    Some(format!("({})", parts.join(" OR ")))
}

/// PubMed has no escape for `"` inside a phrase, so quotes are removed
fn quote_safe(term: &str) -> String {
    term.replace('"', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
