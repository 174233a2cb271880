//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end over real HTTP.

use catalog_crawler::config::{Config, PolicyVariant, StatusPolicy, UserAgentConfig};
use catalog_crawler::crawler::{crawl, CrawlEngine, FetchError, HttpTransport};
use catalog_crawler::output::{read_records, JsonLinesSink, Record, RecordSink};
use catalog_crawler::CrawlError;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration scoped to the mock server
fn create_test_config(base_url: &str, policy: PolicyVariant, max_visits: u32) -> Config {
    let mut config = Config::default();
    config.crawler.seed_url = format!("{}/products", base_url);
    config.crawler.site_scope = format!("{}/", base_url);
    config.crawler.item_pattern = format!(r"{}/product/\d+", regex::escape(base_url));
    config.crawler.max_visits = max_visits;
    config.crawler.politeness_delay_ms = 0;
    config.crawler.policy = policy;
    config.fetch.max_retries = 3;
    config.fetch.retry_delay_ms = 0;
    config.fetch.timeout_secs = 5;
    config.user_agent = UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_email: "test@example.com".to_string(),
    };
    config
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}

fn item_page(id: u32) -> String {
    format!(
        r#"<html><head><title>Item {id}</title></head><body>
            <h1 class="product-title">Item {id}</h1>
            <div class="woocommerce-product-details__short-description">
                Hand made   item number {id}
            </div>
            <img class="attachment-woocommerce_thumbnail" src="/assets/{id}.webp">
            <div class="product-description">Long description of item {id}</div>
            <table class="product-features">
                <tr><th>Material</th><td>Oak</td></tr>
            </table>
            <a href="/products">All products</a>
        </body></html>"#
    )
}

/// Mounts a listing page linking to three items and one external page
async fn mount_catalog(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(html(
            r#"<html><body><h1>Products</h1>
                <a href="/product/1">One</a>
                <a href="/product/2">Two</a>
                <a href="/product/3#reviews">Three</a>
                <a href="https://elsewhere.example.org/product/4">Partner</a>
                <a href="mailto:shop@example.com">Mail</a>
            </body></html>"#
                .to_string(),
        ))
        .mount(server)
        .await;

    for id in 1..=3 {
        Mock::given(method("GET"))
            .and(path(format!("/product/{}", id)))
            .respond_with(html(item_page(id)))
            .mount(server)
            .await;
    }
}

async fn requested_paths(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| request.url.path().to_string())
        .collect()
}

#[tokio::test]
async fn test_extended_crawl_records_every_page() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_catalog(&mock_server).await;

    let config = create_test_config(&base_url, PolicyVariant::Extended, 10);
    let report = crawl(&config, CancellationToken::new())
        .await
        .expect("crawl should succeed");

    assert_eq!(report.visits(), 4);
    assert_eq!(report.records.len(), 4);
    assert!(report.failures.is_empty());

    let Record::Page(listing) = &report.records[0] else {
        panic!("extended policy should produce page records");
    };
    assert_eq!(listing.url, format!("{}/products", base_url));
    assert_eq!(listing.title, "Products");
    assert_eq!(
        listing.links,
        vec![
            format!("{}/product/1", base_url),
            format!("{}/product/2", base_url),
            format!("{}/product/3", base_url),
        ]
    );

    let Record::Page(item) = &report.records[1] else {
        panic!("extended policy should produce page records");
    };
    assert_eq!(item.description, "Long description of item 1");
    assert_eq!(item.features.get("material").map(String::as_str), Some("Oak"));

    let paths = requested_paths(&mock_server).await;
    assert_eq!(paths.len(), 4);
    assert!(paths.iter().all(|p| p == "/products" || p.starts_with("/product/")));
}

#[tokio::test]
async fn test_minimal_crawl_records_items_only() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_catalog(&mock_server).await;

    let config = create_test_config(&base_url, PolicyVariant::Minimal, 10);
    let report = crawl(&config, CancellationToken::new()).await.unwrap();

    assert_eq!(report.records.len(), 3);
    match &report.records[0] {
        Record::Item(item) => {
            assert_eq!(item.url, format!("{}/product/1", base_url));
            assert_eq!(item.name, "Item 1");
            assert_eq!(item.paragraph, "Hand made item number 1");
            assert_eq!(item.image_src, "/assets/1.webp");
        }
        other => panic!("expected an item record, got {:?}", other),
    }
}

#[tokio::test]
async fn test_visit_budget_is_respected() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_catalog(&mock_server).await;

    let config = create_test_config(&base_url, PolicyVariant::Extended, 2);
    let report = crawl(&config, CancellationToken::new()).await.unwrap();

    assert_eq!(report.visits(), 2);
    assert_eq!(requested_paths(&mock_server).await.len(), 2);
}

#[tokio::test]
async fn test_server_error_is_retried() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // Mounted first, so it answers until exhausted
    Mock::given(method("GET"))
        .and(path("/product/1"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;
    mount_catalog(&mock_server).await;

    let config = create_test_config(&base_url, PolicyVariant::Minimal, 10);
    let report = crawl(&config, CancellationToken::new()).await.unwrap();

    assert_eq!(report.records.len(), 3);
    let attempts = requested_paths(&mock_server)
        .await
        .iter()
        .filter(|p| p.as_str() == "/product/1")
        .count();
    assert_eq!(attempts, 3);
}

#[tokio::test]
async fn test_minimal_aborts_on_exhausted_fetch() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/product/2"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;
    mount_catalog(&mock_server).await;

    let config = create_test_config(&base_url, PolicyVariant::Minimal, 10);
    let err = crawl(&config, CancellationToken::new()).await.unwrap_err();

    match err {
        CrawlError::Fetch(FetchError::Exhausted { url, attempts, .. }) => {
            assert_eq!(url, format!("{}/product/2", base_url));
            assert_eq!(attempts, 3);
        }
        other => panic!("expected an exhausted fetch, got {:?}", other),
    }
    // Product 3 is never reached
    assert!(!requested_paths(&mock_server)
        .await
        .contains(&"/product/3".to_string()));
}

#[tokio::test]
async fn test_extended_continues_after_failure() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/product/2"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;
    mount_catalog(&mock_server).await;

    let config = create_test_config(&base_url, PolicyVariant::Extended, 10);
    let report = crawl(&config, CancellationToken::new()).await.unwrap();

    assert_eq!(report.visits(), 4);
    assert_eq!(report.records.len(), 3);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].url, format!("{}/product/2", base_url));
    assert!(report.failures[0].message.contains("503"));
}

#[tokio::test]
async fn test_accept_status_policy_parses_error_pages() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/product/2"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_string("<html><body><h1>Not here</h1></body></html>"),
        )
        .mount(&mock_server)
        .await;
    mount_catalog(&mock_server).await;

    let mut config = create_test_config(&base_url, PolicyVariant::Extended, 10);
    config.fetch.status_policy = StatusPolicy::Accept;
    let report = crawl(&config, CancellationToken::new()).await.unwrap();

    assert!(report.failures.is_empty());
    let not_found = report
        .records
        .iter()
        .find(|r| r.url().ends_with("/product/2"))
        .expect("404 page should still produce a record");
    let Record::Page(page) = not_found else {
        panic!("expected a page record");
    };
    assert_eq!(page.title, "Not here");
}

#[tokio::test]
async fn test_requests_carry_user_agent() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/products"))
        .and(header("user-agent", "TestBot/1.0.0 (test@example.com)"))
        .respond_with(html("<html><body><h1>Products</h1></body></html>".to_string()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, PolicyVariant::Extended, 10);
    let report = crawl(&config, CancellationToken::new()).await.unwrap();
    assert_eq!(report.records.len(), 1);
}

#[tokio::test]
async fn test_worker_pool_over_http() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_catalog(&mock_server).await;

    let mut config = create_test_config(&base_url, PolicyVariant::Extended, 10);
    config.crawler.workers = 3;
    let transport = HttpTransport::from_config(&config.user_agent, &config.fetch).unwrap();
    let report = CrawlEngine::new(&config, transport, CancellationToken::new())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.visits(), 4);
    let mut paths = requested_paths(&mock_server).await;
    paths.sort();
    paths.dedup();
    assert_eq!(paths.len(), 4);
}

#[tokio::test]
async fn test_records_written_as_json_lines() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_catalog(&mock_server).await;

    let dir = TempDir::new().unwrap();
    let out_path = dir.path().join("out").join("records.jsonl");

    let config = create_test_config(&base_url, PolicyVariant::Extended, 10);
    let report = crawl(&config, CancellationToken::new()).await.unwrap();

    let mut sink = JsonLinesSink::new(&out_path);
    assert_eq!(sink.write_records(&report.records).unwrap(), 4);

    let content = std::fs::read_to_string(&out_path).unwrap();
    let first: serde_json::Value = serde_json::from_str(content.lines().next().unwrap()).unwrap();
    let keys: Vec<&str> = first
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys.len(), 5);
    for key in ["url", "title", "description", "features", "links"] {
        assert!(keys.contains(&key), "missing key {}", key);
    }

    assert_eq!(read_records(&out_path).unwrap(), report.records);
}

#[tokio::test]
async fn test_cancelled_crawl_returns_partial_report() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_catalog(&mock_server).await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let config = create_test_config(&base_url, PolicyVariant::Extended, 10);
    let report = crawl(&config, cancel).await.unwrap();

    assert!(report.cancelled);
    assert!(report.records.is_empty());
    assert!(requested_paths(&mock_server).await.is_empty());
}
