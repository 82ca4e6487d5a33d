//! Tests against the live NCBI E-utilities
//!
//! Run with `--features integration-tests`. Set `NCBI_API_KEY` and
//! `NCBI_EMAIL` to use the higher rate limit.

use pubmed_literature::{ClientConfig, LiteratureEngine, LiteratureError};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn engine() -> LiteratureEngine {
    init_tracing();
    LiteratureEngine::with_config(ClientConfig::from_env()).expect("HTTP client should build")
}

#[tokio::test]
async fn test_find_articles_live() {
    let engine = engine();

    match engine.find_articles(&["CRISPR"], &["Doudna JA"], 5).await {
        Ok(result) => {
            assert!(result.returned() <= 5);
            assert!(result.total_found >= result.returned());
            for article in &result.articles {
                assert!(!article.id.is_empty());
                println!("{}: {}", article.id, article.title);
            }
        }
        Err(e) => {
            eprintln!("Warning: live search failed: {}", e);
        }
    }
}

#[tokio::test]
async fn test_get_publication_details_live() {
    let engine = engine();

    // Zhou et al. 2020, Nature
    match engine.get_publication_details("32015507").await {
        Ok(details) => {
            assert_eq!(details.details.article.id, "32015507");
            assert_eq!(details.details.article.publication_date.year, Some(2020));
            assert!(details.citation.contains("Nature"));
            println!("{}", details.citation);
        }
        Err(e) => {
            eprintln!("Warning: live lookup failed: {}", e);
        }
    }
}

#[tokio::test]
async fn test_unknown_pmid_live() {
    let engine = engine();

    match engine.get_publication_details("99999999999").await {
        Err(LiteratureError::NotFound { id }) => assert_eq!(id, "99999999999"),
        Err(e) => eprintln!("Warning: unexpected live error: {}", e),
        Ok(details) => panic!("unexpected record {}", details.details.article.id),
    }
}

#[tokio::test]
async fn test_get_article_statistics_live() {
    let engine = engine();

    match engine.get_article_statistics("Doudna JA").await {
        Ok(stats) => {
            assert!(stats.total_publications > 0);
            assert!(stats.top_journals.len() <= 5);
            let year_total: usize = stats.publication_years.values().sum();
            assert_eq!(year_total, stats.total_publications);
        }
        Err(e) => {
            eprintln!("Warning: live statistics failed: {}", e);
        }
    }
}
