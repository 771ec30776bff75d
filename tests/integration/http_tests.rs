//! End-to-end tests over HTTP
//!
//! These tests use wiremock to serve result pages and run the full
//! coordinator: HTTP fetch, parsing, pagination and merge.

use crate::support::{concept_html, result_page_html, surfaces};
use kanji_vocab::config::{Config, OutputConfig, PaginationConfig, ScraperConfig, VocabularyConfig};
use kanji_vocab::crawler::{Coordinator, Strategy};
use kanji_vocab::VocabError;
use wiremock::matchers::{header, method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_uri: &str, strategy: Strategy, page_budget: u32) -> Config {
    Config {
        scraper: ScraperConfig {
            base_url: format!("{}/search/{{kanji}}", base_uri),
            user_agent: "kanji-vocab/test".to_string(),
            request_timeout_secs: 5,
            connect_timeout_secs: 2,
        },
        pagination: PaginationConfig {
            page_budget,
            strategy,
            concurrency: 4,
            max_attempts: 3,
            base_delay_ms: 1,
        },
        vocabulary: VocabularyConfig {
            known_characters: "間大口".to_string(),
            allow_kana: true,
            shorten_tags: true,
            shorten_glosses: true,
            annotate_readings: false,
        },
        output: OutputConfig::default(),
    }
}

fn html_response(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}

/// Serves three result pages; anything else is a "no matches" page
async fn mount_three_pages(server: &MockServer) {
    let pages = [
        (
            "1",
            result_page_html(
                &[
                    concept_html("人", "ひと", "person"),
                    concept_html("人間", "にんげん", "human being; person"),
                    concept_html("人参", "にんじん", "carrot"),
                ],
                true,
                true,
            ),
        ),
        (
            "2",
            result_page_html(
                &[
                    concept_html("大人", "おとな", "adult"),
                    concept_html("人間", "じんかん", "the world"),
                ],
                true,
                false,
            ),
        ),
        (
            "3",
            result_page_html(&[concept_html("人口", "じんこう", "population")], false, false),
        ),
    ];

    for (page, body) in pages {
        Mock::given(method("GET"))
            .and(query_param("page", page))
            .respond_with(html_response(body))
            .mount(server)
            .await;
    }

    Mock::given(method("GET"))
        .respond_with(html_response(
            r#"<html><body><div id="no-matches">Sorry, couldn't find anything</div></body></html>"#
                .to_string(),
        ))
        .mount(server)
        .await;
}

/// Number of requests the server saw for the given page
async fn requests_for_page(server: &MockServer, page: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| {
            request
                .url
                .query_pairs()
                .any(|(key, value)| key == "page" && value == page)
        })
        .count()
}

#[tokio::test]
async fn test_sequential_scrape_over_http() {
    let server = MockServer::start().await;
    mount_three_pages(&server).await;

    let config = create_test_config(&server.uri(), Strategy::Sequential, 10);
    let session = Coordinator::new(config).unwrap().run('人').await.unwrap();

    assert_eq!(
        surfaces(&session.merged_entries),
        vec!["人", "人間", "大人", "人口"]
    );
    assert_eq!(session.last_valid_page, Some(3));
    assert_eq!(requests_for_page(&server, "4").await, 0);

    let info = session.character_info.as_ref().unwrap();
    assert_eq!(info.onyomi, vec!["ジン", "ニン"]);
    assert_eq!(info.meaning, "person");
}

#[tokio::test]
async fn test_concurrent_scrape_over_http() {
    let server = MockServer::start().await;
    mount_three_pages(&server).await;

    let config = create_test_config(&server.uri(), Strategy::Concurrent, 8);
    let session = Coordinator::new(config).unwrap().run('人').await.unwrap();

    assert_eq!(
        surfaces(&session.merged_entries),
        vec!["人", "人間", "大人", "人口"]
    );
    assert_eq!(session.pages.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    assert_eq!(session.merged_entries[1].reading, "にんげん");
    assert_eq!(session.merged_entries[1].glosses, vec!["human being, person (n)"]);
    assert_eq!(session.merged_entries[1].tags, vec!["CMN"]);
    assert_eq!(session.total_scanned(), 6);
    assert_eq!(requests_for_page(&server, "9").await, 0);
}

#[tokio::test]
async fn test_readings_are_annotated() {
    let server = MockServer::start().await;
    mount_three_pages(&server).await;

    let mut config = create_test_config(&server.uri(), Strategy::Sequential, 3);
    config.vocabulary.annotate_readings = true;
    let session = Coordinator::new(config).unwrap().run('人').await.unwrap();

    let readings: Vec<&str> = session
        .merged_entries
        .iter()
        .map(|e| e.reading.as_str())
        .collect();
    assert_eq!(readings, vec!["ひと", "ニンげん", "おとな", "ジンこう"]);
}

#[tokio::test]
async fn test_transient_errors_are_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(query_param("page", "1"))
        .respond_with(html_response(result_page_html(
            &[concept_html("人", "ひと", "person")],
            false,
            true,
        )))
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), Strategy::Concurrent, 1);
    let session = Coordinator::new(config).unwrap().run('人').await.unwrap();

    assert_eq!(requests_for_page(&server, "1").await, 3);
    assert_eq!(surfaces(&session.merged_entries), vec!["人"]);
    assert!(!session.is_partial());
}

#[tokio::test]
async fn test_unrecognized_page_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("page", "2"))
        .respond_with(html_response(
            "<html><body><h1>Down for maintenance</h1></body></html>".to_string(),
        ))
        .mount(&server)
        .await;
    mount_three_pages(&server).await;

    let config = create_test_config(&server.uri(), Strategy::Concurrent, 3);
    let session = Coordinator::new(config).unwrap().run('人').await.unwrap();

    assert_eq!(requests_for_page(&server, "2").await, 1);
    assert_eq!(session.failed_pages(), vec![2]);
    assert_eq!(surfaces(&session.merged_entries), vec!["人", "人間", "人口"]);
}

#[tokio::test]
async fn test_first_page_outage_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), Strategy::Concurrent, 2);
    let result = Coordinator::new(config).unwrap().run('人').await;

    assert!(matches!(
        result,
        Err(VocabError::FatalScrape { target: '人', .. })
    ));
    assert_eq!(requests_for_page(&server, "1").await, 3);
}

#[tokio::test]
async fn test_configured_user_agent_is_sent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("user-agent", "kanji-vocab/test"))
        .respond_with(html_response(result_page_html(&[], false, true)))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), Strategy::Sequential, 5);
    let session = Coordinator::new(config).unwrap().run('人').await.unwrap();

    assert!(session.merged_entries.is_empty());
    server.verify().await;
}
