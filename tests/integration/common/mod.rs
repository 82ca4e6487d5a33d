//! Shared fixtures for the mocked E-utilities tests
#![allow(dead_code)]

use std::time::Duration;

use pubmed_literature::{ClientConfig, LiteratureEngine, ResilientFetcher, RetryConfig};
use wiremock::MockServer;

/// Minimal record description rendered into EFetch XML
pub struct RecordFixture<'a> {
    pub pmid: &'a str,
    pub title: &'a str,
    pub journal: &'a str,
    pub year: Option<u16>,
    pub authors: &'a [(&'a str, &'a str)],
}

impl<'a> RecordFixture<'a> {
    pub fn new(pmid: &'a str, title: &'a str, journal: &'a str, year: Option<u16>) -> Self {
        Self {
            pmid,
            title,
            journal,
            year,
            authors: &[],
        }
    }

    pub fn with_authors(mut self, authors: &'a [(&'a str, &'a str)]) -> Self {
        self.authors = authors;
        self
    }

    fn to_xml(&self) -> String {
        let pub_date = self
            .year
            .map(|year| format!("<PubDate><Year>{year}</Year></PubDate>"))
            .unwrap_or_default();

        let authors: String = self
            .authors
            .iter()
            .map(|(last, initials)| {
                format!(
                    "<Author><LastName>{last}</LastName><Initials>{initials}</Initials></Author>"
                )
            })
            .collect();

        format!(
            r#"<PubmedArticle>
  <MedlineCitation Status="MEDLINE" Owner="NLM">
    <PMID Version="1">{pmid}</PMID>
    <Article>
      <Journal>
        <JournalIssue CitedMedium="Internet">{pub_date}</JournalIssue>
        <Title>{journal}</Title>
      </Journal>
      <ArticleTitle>{title}</ArticleTitle>
      <AuthorList CompleteYN="Y">{authors}</AuthorList>
    </Article>
  </MedlineCitation>
</PubmedArticle>"#,
            pmid = self.pmid,
            journal = self.journal,
            title = self.title,
        )
    }
}

/// Wrap records in a `PubmedArticleSet` document
pub fn efetch_body(records: &[RecordFixture<'_>]) -> String {
    let inner: String = records.iter().map(RecordFixture::to_xml).collect();
    format!(
        "<?xml version=\"1.0\" ?>\n<PubmedArticleSet>\n{inner}\n</PubmedArticleSet>"
    )
}

/// ESearch JSON body with the given ranked ids and reported total
pub fn esearch_body(ids: &[&str], count: usize) -> String {
    serde_json::json!({
        "header": {"type": "esearch", "version": "0.3"},
        "esearchresult": {
            "count": count.to_string(),
            "retmax": ids.len().to_string(),
            "retstart": "0",
            "idlist": ids,
        }
    })
    .to_string()
}

/// Configuration pointing at the mock server with fast retries
pub fn mock_config(server: &MockServer) -> ClientConfig {
    ClientConfig::new()
        .with_base_url(server.uri())
        .with_rate_limit(100.0)
        .with_timeout(Duration::from_secs(2))
        .with_retry_config(
            RetryConfig::new()
                .with_initial_delay(Duration::from_millis(10))
                .with_max_delay(Duration::from_millis(50))
                .without_jitter(),
        )
}

pub fn mock_fetcher(server: &MockServer) -> ResilientFetcher {
    ResilientFetcher::with_config(mock_config(server)).expect("HTTP client should build")
}

pub fn mock_engine(server: &MockServer) -> LiteratureEngine {
    LiteratureEngine::with_config(mock_config(server)).expect("HTTP client should build")
}
