//! Integration tests for the scraper
//!
//! These tests use wiremock to serve a fake result listing and run the full
//! scrape cycle end-to-end, from the first request to the CSV file.

use scholar_scrape::config::{Config, DocumentType, LimitConfig, OutputConfig, SearchOptions};
use scholar_scrape::crawler::{Coordinator, HttpFetcher};
use scholar_scrape::extract::CSV_HEADERS;
use scholar_scrape::{CrawlReport, ScrapeError};
use std::path::Path;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server, with no delays
fn create_test_config(base_url: &str, output_dir: &Path, max_pages: u32) -> Config {
    let mut config = Config::default();
    config.scraper.base_url = format!("{}/scholar", base_url);
    config.scraper.allowed_domains = vec!["127.0.0.1".to_string()];
    config.scraper.max_pages = max_pages;
    config.user_agent.crawler_name = "TestBot".to_string();
    config.output = OutputConfig {
        directory: output_dir.display().to_string(),
        relative_to_executable: false,
    };
    config.limits = LimitConfig {
        domain_glob: "*127.0.0.1*".to_string(),
        delay_min_ms: 0,
        delay_max_ms: 0,
        ..LimitConfig::default()
    };
    config
}

fn result_block(title: &str, authors: &str, link: &str, actions: &[&str]) -> String {
    let actions: String = actions.iter().map(|a| format!("<a href=\"#\">{}</a>", a)).collect();
    format!(
        r#"<div class="gs_r gs_or gs_scl">
            <div class="gs_ri">
                <h3 class="gs_rt"><a href="{link}">{title}</a></h3>
                <div class="gs_a">{authors}</div>
                <div class="gs_rs">A study of {title}.</div>
                <div class="gs_fl">{actions}</div>
            </div>
        </div>"#
    )
}

fn simple_block(title: &str) -> String {
    result_block(title, "A Author - Some Journal, 2020 - example.org", "https://example.org/x", &[])
}

fn nav(label: &str, start: u32) -> String {
    format!(
        r#"<div id="gs_n"><table><tr>
            <td><a href="/scholar?start={start}&amp;q=graphene&amp;hl=en&amp;as_sdt=0,5">{label}</a></td>
        </tr></table></div>"#
    )
}

fn listing(blocks: &[String], nav: &str) -> String {
    format!(
        "<html><head><title>Results</title></head><body><div id=\"gs_res_ccl\">{}</div>{}</body></html>",
        blocks.concat(),
        nav
    )
}

async fn mount_page(server: &MockServer, start: u32, body: String, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/scholar"))
        .and(query_param("start", start.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn run(config: Config, term: &str) -> Result<CrawlReport, ScrapeError> {
    let coordinator = Coordinator::new(config, SearchOptions::new(term))?;
    let fetcher = HttpFetcher::new(&Default::default())?;
    coordinator.run_with(fetcher).await
}

fn read_rows(report: &CrawlReport) -> Vec<csv::StringRecord> {
    let path = report.output_path.as_ref().expect("Report has no output path");
    let mut reader = csv::Reader::from_path(path).expect("Failed to open CSV");
    reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .expect("Failed to read CSV rows")
}

#[tokio::test]
async fn test_follows_next_chain_to_the_end() {
    let mock_server = MockServer::start().await;
    let output = tempfile::tempdir().unwrap();

    mount_page(
        &mock_server,
        0,
        listing(&[simple_block("Graphene A"), simple_block("Graphene B")], &nav("Next", 10)),
        1,
    )
    .await;
    mount_page(
        &mock_server,
        10,
        listing(&[simple_block("Graphene C")], &nav("Next", 20)),
        1,
    )
    .await;
    mount_page(&mock_server, 20, listing(&[simple_block("Graphene D")], ""), 1).await;

    let config = create_test_config(&mock_server.uri(), output.path(), 100);
    let report = run(config, "graphene").await.expect("Scrape failed");

    assert_eq!(report.total_matches, 4);
    assert_eq!(report.pages_visited, 3);
    assert_eq!(report.failed_pages, 0);

    let rows = read_rows(&report);
    let titles_and_pages: Vec<(&str, &str)> = rows.iter().map(|r| (&r[0], &r[9])).collect();
    assert_eq!(
        titles_and_pages,
        vec![
            ("Graphene A", "1"),
            ("Graphene B", "1"),
            ("Graphene C", "2"),
            ("Graphene D", "3"),
        ]
    );
}

#[tokio::test]
async fn test_page_cap_stops_the_chain() {
    let mock_server = MockServer::start().await;
    let output = tempfile::tempdir().unwrap();

    mount_page(&mock_server, 0, listing(&[simple_block("Graphene A")], &nav("Next", 10)), 1).await;
    mount_page(&mock_server, 10, listing(&[simple_block("Graphene B")], &nav("Next", 20)), 1).await;
    // Should never be requested with max_pages = 2
    mount_page(&mock_server, 20, listing(&[simple_block("Graphene C")], ""), 0).await;

    let config = create_test_config(&mock_server.uri(), output.path(), 2);
    let report = run(config, "graphene").await.expect("Scrape failed");

    assert_eq!(report.pages_visited, 2);
    assert_eq!(report.total_matches, 2);
    // Wiremock verifies expect(0) when the mock server drops
}

#[tokio::test]
async fn test_previous_link_is_not_followed() {
    let mock_server = MockServer::start().await;
    let output = tempfile::tempdir().unwrap();

    mount_page(
        &mock_server,
        0,
        listing(&[simple_block("Graphene A")], &nav("Previous", 0)),
        1,
    )
    .await;

    let config = create_test_config(&mock_server.uri(), output.path(), 10);
    let report = run(config, "graphene").await.expect("Scrape failed");

    assert_eq!(report.pages_visited, 1);
    assert_eq!(report.total_matches, 1);
}

#[tokio::test]
async fn test_record_fields_end_to_end() {
    let mock_server = MockServer::start().await;
    let output = tempfile::tempdir().unwrap();

    let blocks = vec![
        result_block(
            "Graphene synthesis",
            "A Smith - Nature - 2019 - nature.com",
            "https://doi.org/10.1000/xyz",
            &["Save", "Cite", "Cited by 123", "Related articles", "All 4 versions"],
        ),
        result_block(
            "Silicon wafers",
            "B Jones - Science, 2001 - science.org",
            "https://science.org/x",
            &["Cited by 9"],
        ),
    ];
    mount_page(&mock_server, 0, listing(&blocks, ""), 1).await;

    let config = create_test_config(&mock_server.uri(), output.path(), 10);
    let report = run(config, "GRAPHENE").await.expect("Scrape failed");

    assert_eq!(report.total_matches, 1);

    let path = report.output_path.as_ref().unwrap();
    let mut reader = csv::Reader::from_path(path).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers, CSV_HEADERS.to_vec());

    let rows = read_rows(&report);
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0].iter().collect::<Vec<_>>(),
        vec![
            "Graphene synthesis",
            "A study of Graphene synthesis.",
            "https://doi.org/10.1000/xyz",
            "A Smith - Nature - 2019 - nature.com",
            "2019",
            "https://doi.org/10.1000/xyz",
            "A Smith",
            "123",
            "4",
            "1"
        ]
    );
}

#[tokio::test]
async fn test_search_parameters_reach_the_server() {
    let mock_server = MockServer::start().await;
    let output = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/scholar"))
        .and(query_param("start", "0"))
        .and(query_param("q", "graphene oxide"))
        .and(query_param("hl", "de"))
        .and(query_param("as_sdt", "0,33"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(listing(&[simple_block("Graphene oxide")], ""), "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), output.path(), 10);
    let mut search = SearchOptions::new("graphene oxide");
    search.lang = "de".to_string();
    search.document_type = DocumentType::Articles;

    let coordinator = Coordinator::new(config, search).unwrap();
    let report = coordinator
        .run_with(HttpFetcher::new(&Default::default()).unwrap())
        .await
        .expect("Scrape failed");

    assert_eq!(report.total_matches, 1);
    let file_name = report
        .output_path
        .as_ref()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .unwrap()
        .to_string();
    assert!(file_name.starts_with("scrape-graphene_oxide-"));
    assert!(file_name.ends_with(".csv"));
}

#[tokio::test]
async fn test_initial_fetch_failure_is_fatal() {
    let mock_server = MockServer::start().await;
    let output = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/scholar"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), output.path(), 10);
    let result = run(config, "graphene").await;

    match result {
        Err(ScrapeError::Fetch { url, .. }) => assert!(url.contains("start=0")),
        other => panic!("Expected a fetch error, got {:?}", other),
    }

    // The output file was created with its header before the request
    let files: Vec<_> = std::fs::read_dir(output.path()).unwrap().collect();
    assert_eq!(files.len(), 1);
}

#[tokio::test]
async fn test_later_page_failure_is_not_fatal() {
    let mock_server = MockServer::start().await;
    let output = tempfile::tempdir().unwrap();

    mount_page(
        &mock_server,
        0,
        listing(&[simple_block("Graphene A"), simple_block("Graphene B")], &nav("Next", 10)),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/scholar"))
        .and(query_param("start", "10"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), output.path(), 10);
    let report = run(config, "graphene").await.expect("Scrape failed");

    assert_eq!(report.total_matches, 2);
    assert_eq!(report.pages_visited, 1);
    assert_eq!(report.failed_pages, 1);
    assert_eq!(read_rows(&report).len(), 2);
}

#[tokio::test]
async fn test_non_html_response_yields_nothing() {
    let mock_server = MockServer::start().await;
    let output = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/scholar"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(listing(&[simple_block("Graphene A")], ""), "application/json"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), output.path(), 10);
    let report = run(config, "graphene").await.expect("Scrape failed");

    assert_eq!(report.total_matches, 0);
    assert_eq!(report.pages_visited, 1);
    assert!(read_rows(&report).is_empty());
}
