//! Integration tests for LiteratureEngine operations using mocked HTTP responses

mod common;

use pubmed_literature::{LiteratureError, YearBucket};
use tracing_test::traced_test;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{RecordFixture, efetch_body, esearch_body, mock_engine};

async fn mount_search(server: &MockServer, ids: &[&str], count: usize) {
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(esearch_body(ids, count)))
        .mount(server)
        .await;
}

async fn mount_fetch(server: &MockServer, body: String) {
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "application/xml"),
        )
        .mount(server)
        .await;
}

async fn requests_to(server: &MockServer, endpoint: &str) -> Vec<wiremock::Request> {
    server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|request| request.url.path() == endpoint)
        .collect()
}

#[tokio::test]
#[traced_test]
async fn test_find_articles_keeps_search_rank_order() {
    let server = MockServer::start().await;
    mount_search(&server, &["1", "2", "3"], 1234).await;
    // EFetch returns the records in a different order than the search ranked them
    mount_fetch(
        &server,
        efetch_body(&[
            RecordFixture::new("3", "Third", "Cell", Some(2019)),
            RecordFixture::new("1", "First", "Nature", Some(2021)),
            RecordFixture::new("2", "Second", "Science", Some(2020)),
        ]),
    )
    .await;

    let result = mock_engine(&server)
        .find_articles(&["diabetes"], &["Jane Doe"], 3)
        .await
        .unwrap();

    let ids: Vec<&str> = result.articles.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
    assert_eq!(result.total_found, 1234);
    assert_eq!(result.returned(), 3);
    assert_eq!(result.dropped_records, 0);
    assert_eq!(
        result.query,
        r#"("diabetes"[Title/Abstract]) AND ("Jane Doe"[Author])"#
    );
    assert_eq!(result.performance.total_retries(), 0);
}

#[tokio::test]
#[traced_test]
async fn test_find_articles_empty_search_skips_detail_phase() {
    let server = MockServer::start().await;
    mount_search(&server, &[], 0).await;
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = mock_engine(&server)
        .find_articles(&["an unmatched topic"], &[], 10)
        .await
        .unwrap();

    assert!(result.articles.is_empty());
    assert_eq!(result.total_found, 0);
}

#[tokio::test]
#[traced_test]
async fn test_find_articles_omits_missing_and_counts_dropped() {
    let server = MockServer::start().await;
    mount_search(&server, &["10", "20", "30"], 3).await;
    mount_fetch(
        &server,
        format!(
            "<PubmedArticleSet>{}<PubmedArticle><MedlineCitation><Article><ArticleTitle>No id</ArticleTitle></Article></MedlineCitation></PubmedArticle>{}</PubmedArticleSet>",
            "<PubmedArticle><MedlineCitation><PMID>30</PMID><Article><ArticleTitle>Thirty</ArticleTitle></Article></MedlineCitation></PubmedArticle>",
            "<PubmedArticle><MedlineCitation><PMID>10</PMID><Article><ArticleTitle>Ten</ArticleTitle></Article></MedlineCitation></PubmedArticle>",
        ),
    )
    .await;

    let result = mock_engine(&server)
        .find_articles(&["topic"], &[], 3)
        .await
        .unwrap();

    let ids: Vec<&str> = result.articles.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["10", "30"]);
    assert_eq!(result.dropped_records, 1);
    assert!(logs_contain("Some searched ids had no detail record"));
}

#[tokio::test]
#[traced_test]
async fn test_find_articles_survives_undecodable_record() {
    let server = MockServer::start().await;
    mount_search(&server, &["40", "41"], 2).await;
    mount_fetch(
        &server,
        format!(
            "<PubmedArticleSet>{}{}</PubmedArticleSet>",
            "<PubmedArticle><MedlineCitation><PMID>40</PMID><Article><ArticleTitle>Forty</ArticleTitle></Article></MedlineCitation></PubmedArticle>",
            "<PubmedArticle><MedlineCitation><PMID>41</PMID><Article><ArticleTitle>Forty-one</ArticleTitle><Abstract><AbstractText>Value of <span>x</span> here</AbstractText></Abstract></Article></MedlineCitation></PubmedArticle>",
        ),
    )
    .await;

    let result = mock_engine(&server)
        .find_articles(&["topic"], &[], 2)
        .await
        .unwrap();

    assert_eq!(result.returned(), 1);
    assert_eq!(result.articles[0].id, "40");
    assert_eq!(result.dropped_records, 1);
}

#[tokio::test]
#[traced_test]
async fn test_find_articles_maintenance_page_is_parse_error() {
    let server = MockServer::start().await;
    mount_search(&server, &["1"], 1).await;
    mount_fetch(
        &server,
        "<html><body><h1>Service maintenance</h1></body></html>".to_string(),
    )
    .await;

    let err = mock_engine(&server)
        .find_articles(&["topic"], &[], 1)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "parse_error");
}

#[tokio::test]
#[traced_test]
async fn test_find_articles_fetches_in_batches() {
    let server = MockServer::start().await;
    let ids: Vec<String> = (1..=250).map(|i| i.to_string()).collect();
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    mount_search(&server, &id_refs, 5000).await;
    mount_fetch(&server, "<PubmedArticleSet></PubmedArticleSet>".to_string()).await;

    let result = mock_engine(&server)
        .find_articles(&["cancer"], &[], 250)
        .await
        .unwrap();
    assert_eq!(result.total_found, 5000);

    let fetches = requests_to(&server, "/efetch.fcgi").await;
    assert_eq!(fetches.len(), 2);

    let batch_sizes: Vec<usize> = fetches
        .iter()
        .map(|request| {
            request
                .url
                .query_pairs()
                .find(|(key, _)| key == "id")
                .map(|(_, value)| value.split(',').count())
                .unwrap_or(0)
        })
        .collect();
    assert_eq!(batch_sizes, vec![200, 50]);
}

#[tokio::test]
#[traced_test]
async fn test_find_articles_invalid_query_makes_no_request() {
    let server = MockServer::start().await;
    let engine = mock_engine(&server);

    let empty: [&str; 0] = [];
    let err = engine.find_articles(&empty, &empty, 10).await.unwrap_err();
    assert!(matches!(err, LiteratureError::InvalidQuery(_)));

    let err = engine.find_articles(&["topic"], &[], 0).await.unwrap_err();
    assert!(matches!(err, LiteratureError::InvalidQuery(_)));

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
#[traced_test]
async fn test_find_articles_search_failure_surfaces_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = mock_engine(&server)
        .find_articles(&["topic"], &[], 5)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        LiteratureError::Fetch {
            status: Some(500),
            retries: 2,
            ..
        }
    ));
    assert!(requests_to(&server, "/efetch.fcgi").await.is_empty());
}

#[tokio::test]
#[traced_test]
async fn test_find_articles_malformed_search_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = mock_engine(&server)
        .find_articles(&["topic"], &[], 5)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "parse_error");
}

#[tokio::test]
#[traced_test]
async fn test_get_publication_details() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .and(query_param("id", "32015507"))
        .respond_with(ResponseTemplate::new(200).set_body_string(efetch_body(&[
            RecordFixture::new("32015507", "A pneumonia outbreak", "Nature", Some(2020))
                .with_authors(&[("Zhou", "P"), ("Yang", "XL")]),
        ])))
        .mount(&server)
        .await;

    let details = mock_engine(&server)
        .get_publication_details(" 32015507 ")
        .await
        .unwrap();

    assert_eq!(details.details.article.id, "32015507");
    assert_eq!(details.details.article.authors, vec!["Zhou P", "Yang XL"]);
    assert_eq!(details.details.url, "https://pubmed.ncbi.nlm.nih.gov/32015507/");
    assert_eq!(
        details.citation,
        "Zhou P, Yang XL. A pneumonia outbreak. Nature. 2020."
    );

    let value = serde_json::to_value(&details).unwrap();
    assert_eq!(value["details"]["id"], "32015507");
    assert_eq!(value["details"]["url"], "https://pubmed.ncbi.nlm.nih.gov/32015507/");
}

#[tokio::test]
#[traced_test]
async fn test_get_publication_details_not_found() {
    let server = MockServer::start().await;
    mount_fetch(&server, "<PubmedArticleSet></PubmedArticleSet>".to_string()).await;

    let err = mock_engine(&server)
        .get_publication_details("99999999")
        .await
        .unwrap_err();

    assert_eq!(
        err,
        LiteratureError::NotFound {
            id: "99999999".to_string()
        }
    );
}

#[tokio::test]
#[traced_test]
async fn test_get_publication_details_error_report_is_parse_error() {
    let server = MockServer::start().await;
    mount_fetch(
        &server,
        "<eFetchResult><ERROR>Cannot retrieve history data</ERROR></eFetchResult>".to_string(),
    )
    .await;

    let err = mock_engine(&server)
        .get_publication_details("12345")
        .await
        .unwrap_err();

    assert!(
        matches!(&err, LiteratureError::Parse(msg) if msg.contains("Cannot retrieve history data")),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
#[traced_test]
async fn test_get_publication_details_rejects_non_numeric_ids() {
    let server = MockServer::start().await;
    let engine = mock_engine(&server);

    for id in ["", "   ", "abc", "123abc", "12 34"] {
        let err = engine.get_publication_details(id).await.unwrap_err();
        assert!(
            matches!(err, LiteratureError::InvalidQuery(_)),
            "id {id:?} should be rejected"
        );
    }

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
#[traced_test]
async fn test_get_article_statistics() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .and(query_param("term", r#"("Jane Doe"[Author])"#))
        .and(query_param("retmax", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_string(esearch_body(&["1", "2", "3"], 42)))
        .mount(&server)
        .await;
    mount_fetch(
        &server,
        efetch_body(&[
            RecordFixture::new("1", "One", "NEJM", Some(2020)),
            RecordFixture::new("2", "Two", "NEJM", Some(2020)),
            RecordFixture::new("3", "Three", "Lancet", Some(2021)),
        ]),
    )
    .await;

    let stats = mock_engine(&server)
        .get_article_statistics("Jane Doe")
        .await
        .unwrap();

    assert_eq!(stats.researcher, "Jane Doe");
    assert_eq!(stats.total_publications, 3);
    assert_eq!(stats.total_found, Some(42));
    assert_eq!(stats.top_journals[0].journal, "NEJM");
    assert_eq!(stats.top_journals[0].count, 2);
    assert_eq!(stats.top_journals[1].journal, "Lancet");
    assert_eq!(stats.top_journals[1].count, 1);
    assert_eq!(stats.publication_years[&YearBucket::Year(2020)], 2);
    assert_eq!(stats.publication_years[&YearBucket::Year(2021)], 1);
    assert_eq!(stats.sample_titles, vec!["One", "Two", "Three"]);
}

#[tokio::test]
#[traced_test]
async fn test_get_article_statistics_blank_name() {
    let server = MockServer::start().await;
    let err = mock_engine(&server)
        .get_article_statistics("  ")
        .await
        .unwrap_err();

    assert!(matches!(err, LiteratureError::InvalidQuery(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
#[traced_test]
async fn test_concurrent_operations_on_clones() {
    let server = MockServer::start().await;
    mount_search(&server, &["1"], 1).await;
    mount_fetch(
        &server,
        efetch_body(&[RecordFixture::new("1", "Only", "Cell", Some(2022))]),
    )
    .await;

    let engine = mock_engine(&server);
    let other = engine.clone();

    let (search, details) = tokio::join!(
        engine.find_articles(&["topic"], &[], 1),
        other.get_publication_details("1"),
    );

    assert_eq!(search.unwrap().articles[0].id, "1");
    assert_eq!(details.unwrap().details.article.title, "Only");
}
