//! Vancouver/NLM style citation rendering
//!
//! ```text
//! Zhou P, Yang XL. A pneumonia outbreak. Nature. 2020 Mar;579(7798):270-273. doi: 10.1038/s41586-020-2012-7
//! ```
//!
//! Parts an article does not have are left out together with their
//! punctuation.

use crate::pubmed::models::Article;

const DEFAULT_MAX_AUTHORS: usize = 6;

/// Renders [`Article`] values as citation strings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CitationFormatter {
    max_authors: usize,
}

impl Default for CitationFormatter {
    fn default() -> Self {
        Self {
            max_authors: DEFAULT_MAX_AUTHORS,
        }
    }
}

impl CitationFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of authors listed before `et al.` is used (at least one)
    pub fn max_authors(mut self, max_authors: usize) -> Self {
        self.max_authors = max_authors.max(1);
        self
    }

    /// Format an article with the default settings
    ///
    /// # Example
    ///
    /// ```
    /// use pubmed_literature::{Article, CitationFormatter, PublicationDate};
    ///
    /// let mut article = Article::new("1", "Gene therapy outcomes");
    /// article.authors = vec!["Smith J".to_string()];
    /// article.journal = "Lancet".to_string();
    /// article.publication_date = PublicationDate::from_year(2021);
    ///
    /// assert_eq!(
    ///     CitationFormatter::format(&article),
    ///     "Smith J. Gene therapy outcomes. Lancet. 2021."
    /// );
    /// ```
    pub fn format(article: &Article) -> String {
        Self::default().render(article)
    }

    /// Format an article with this formatter's settings
    pub fn render(&self, article: &Article) -> String {
        let segments = [
            self.authors_segment(&article.authors),
            sentence(&article.title),
            sentence(&article.journal),
            source_segment(article),
            article
                .doi
                .as_deref()
                .map(str::trim)
                .filter(|doi| !doi.is_empty())
                .map(|doi| format!("doi: {doi}")),
        ];

        segments.into_iter().flatten().collect::<Vec<_>>().join(" ")
    }

    fn authors_segment(&self, authors: &[String]) -> Option<String> {
        let names: Vec<&str> = authors
            .iter()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .collect();

        if names.is_empty() {
            return None;
        }

        let mut listed = names
            .iter()
            .take(self.max_authors)
            .copied()
            .collect::<Vec<_>>()
            .join(", ");
        if names.len() > self.max_authors {
            listed.push_str(", et al");
        }

        sentence(&listed)
    }
}

/// `<Date>;<Volume>(<Issue>):<Pages>.` with absent parts omitted
fn source_segment(article: &Article) -> Option<String> {
    let mut source = article.publication_date.to_string();

    let volume = present(&article.volume);
    let issue = present(&article.issue);
    let pages = present(&article.pages);

    if volume.is_some() || issue.is_some() {
        if !source.is_empty() {
            source.push(';');
        }
        if let Some(volume) = volume {
            source.push_str(volume);
        }
        if let Some(issue) = issue {
            source.push('(');
            source.push_str(issue);
            source.push(')');
        }
    }

    if let Some(pages) = pages {
        if !source.is_empty() {
            source.push(':');
        }
        source.push_str(pages);
    }

    sentence(&source)
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Terminate `text` with a period unless it already ends in `.`, `?` or `!`
fn sentence(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if text.ends_with(['.', '?', '!']) {
        Some(text.to_string())
    } else {
        Some(format!("{text}."))
    }
}
