//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small site and drive full crawls
//! through the HTTP-backed browser.

use page_trawler::browser::HttpBrowser;
use page_trawler::config::UserAgentConfig;
use page_trawler::crawler::{Coordinator, CrawlOptions, CrawlProgress, CrawlResult};
use page_trawler::output::{self, OutputFormat};
use page_trawler::registry::FilterSnapshot;
use page_trawler::storage::SqliteStore;
use page_trawler::{CrawlPhase, SelectorOutcome, TrawlerError};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn user_agent() -> UserAgentConfig {
    UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
        contact_email: "test@example.com".to_string(),
    }
}

fn coordinator(server: &MockServer, start: &str, options: CrawlOptions) -> Coordinator<HttpBrowser> {
    let start_url = Url::parse(&format!("{}{}", server.uri(), start)).expect("Failed to parse start URL");
    let browser = HttpBrowser::from_config(&user_agent(), start_url).expect("Failed to build browser");
    Coordinator::new(Arc::new(browser), options)
}

fn fast_options() -> CrawlOptions {
    CrawlOptions {
        navigation_timeout: Duration::from_secs(5),
        ..CrawlOptions::default()
    }
}

async fn serve_html(server: &MockServer, route: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html.to_string(), "text/html"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_same_origin() {
    let server = MockServer::start().await;
    let base = server.uri();

    serve_html(
        &server,
        "/",
        r#"<html><head><title>Home</title></head><body>
        <h1>Welcome</h1>
        <a href="/a">A</a>
        <a href="b">B</a>
        <a href="https://elsewhere.example/">Elsewhere</a>
        </body></html>"#,
    )
    .await;
    serve_html(
        &server,
        "/a",
        r#"<html><head><title>Page A</title></head><body>
        <h2>Section</h2>
        <a href="/">Home</a><a href="/b">B</a>
        </body></html>"#,
    )
    .await;
    serve_html(&server, "/b", "<html><head><title>Page B</title></head><body><p>B</p></body></html>").await;

    let mut crawler = coordinator(&server, "/", fast_options());
    let events = Arc::new(Mutex::new(Vec::<CrawlProgress>::new()));
    let sink = events.clone();
    crawler.on_progress(move |p| sink.lock().unwrap().push(p.clone()));

    let outcome = crawler.start().await.expect("Crawl failed");

    assert_eq!(outcome.status, CrawlPhase::Completed);
    let keys: Vec<&String> = outcome.result.keys().collect();
    assert_eq!(
        keys,
        vec![&format!("{}/", base), &format!("{}/a", base), &format!("{}/b", base)]
    );
    assert_eq!(outcome.result[&format!("{}/a", base)].title, "Page A");
    assert!(outcome.result[&format!("{}/", base)]
        .links
        .iter()
        .all(|l| l.starts_with(&base)));
    assert!(outcome.result[&format!("{}/a", base)].load_time.is_some());

    assert_eq!(outcome.stats.processed, 3);
    assert_eq!(outcome.stats.failed, 0);
    assert_eq!(outcome.stats.tabs_opened, outcome.stats.tabs_closed);

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events.last().unwrap().processed, 3);
    assert_eq!(events.last().unwrap().pending, 0);
}

#[tokio::test]
async fn test_path_filters_limit_crawl() {
    let server = MockServer::start().await;
    let base = server.uri();

    serve_html(
        &server,
        "/",
        r#"<body><a href="/docs/intro">Intro</a><a href="/shop/cart">Cart</a></body>"#,
    )
    .await;
    serve_html(&server, "/docs/intro", "<body><h1>Intro</h1></body>").await;
    Mock::given(method("GET"))
        .and(path("/shop/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<body></body>", "text/html"))
        .expect(0)
        .mount(&server)
        .await;

    let mut crawler =
        coordinator(&server, "/", fast_options()).with_filters(FilterSnapshot::new(["DOCS"]));
    let outcome = crawler.start().await.expect("Crawl failed");

    assert_eq!(outcome.result.len(), 2);
    assert!(outcome.result.contains_key(&format!("{}/docs/intro", base)));
    assert!(!outcome.result.contains_key(&format!("{}/shop/cart", base)));
}

#[tokio::test]
async fn test_redirect_marks_both_urls_visited() {
    let server = MockServer::start().await;
    let base = server.uri();

    serve_html(
        &server,
        "/",
        r#"<body><a href="/old">Old</a><a href="/new">New</a></body>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<title>New</title>", "text/html"))
        .expect(1)
        .mount(&server)
        .await;

    let mut crawler = coordinator(&server, "/", fast_options());
    let outcome = crawler.start().await.expect("Crawl failed");

    let old = &outcome.result[&format!("{}/old", base)];
    assert_eq!(old.url, format!("{}/new", base));
    assert_eq!(old.title, "New");
    assert!(!outcome.result.contains_key(&format!("{}/new", base)));
    assert!(crawler.frontier().is_visited(&format!("{}/new", base)));
}

#[tokio::test]
async fn test_redirected_seed_is_keyed_by_final_url() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/start"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/home"))
        .mount(&server)
        .await;
    serve_html(&server, "/home", r#"<body><a href="/start">Again</a></body>"#).await;

    let mut crawler = coordinator(&server, "/start", fast_options());
    let outcome = crawler.start().await.expect("Crawl failed");

    let keys: Vec<&String> = outcome.result.keys().collect();
    assert_eq!(keys, vec![&format!("{}/home", base)]);
    assert_eq!(outcome.stats.tabs_opened, 0);
}

#[tokio::test]
async fn test_slow_page_times_out_and_crawl_continues() {
    let server = MockServer::start().await;
    let base = server.uri();

    serve_html(
        &server,
        "/",
        r#"<body><a href="/slow">Slow</a><a href="/fast">Fast</a></body>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<p>late</p>", "text/html")
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;
    serve_html(&server, "/fast", "<p>fast</p>").await;

    let options = CrawlOptions {
        navigation_timeout: Duration::from_millis(300),
        ..CrawlOptions::default()
    };
    let mut crawler = coordinator(&server, "/", options);
    let events = Arc::new(Mutex::new(Vec::<CrawlProgress>::new()));
    let sink = events.clone();
    crawler.on_progress(move |p| sink.lock().unwrap().push(p.clone()));

    let outcome = crawler.start().await.expect("Crawl failed");

    assert_eq!(outcome.status, CrawlPhase::Completed);
    assert!(!outcome.result.contains_key(&format!("{}/slow", base)));
    assert!(outcome.result.contains_key(&format!("{}/fast", base)));
    assert_eq!(outcome.stats.failed, 1);
    assert_eq!(outcome.stats.tabs_opened, outcome.stats.tabs_closed);

    let events = events.lock().unwrap();
    let failure = events.iter().find(|e| e.is_error()).expect("No failure event");
    assert_eq!(failure.current_url, format!("{}/slow", base));
}

#[tokio::test]
async fn test_http_error_page_is_skipped() {
    let server = MockServer::start().await;
    let base = server.uri();

    serve_html(
        &server,
        "/",
        r#"<body><a href="/missing">Missing</a><a href="/ok">Ok</a></body>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    serve_html(&server, "/ok", r#"<body><a href="/missing">Missing again</a></body>"#).await;

    let mut crawler = coordinator(&server, "/", fast_options());
    let outcome = crawler.start().await.expect("Crawl failed");

    assert_eq!(outcome.result.len(), 2);
    assert!(outcome.result.contains_key(&format!("{}/ok", base)));
    assert_eq!(outcome.stats.failed, 1);
}

#[tokio::test]
async fn test_unreadable_seed_fails_the_crawl() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut crawler = coordinator(&server, "/", fast_options());
    let result = crawler.start().await;

    assert!(matches!(result, Err(TrawlerError::SeedExtraction { .. })));
    assert_eq!(crawler.phase(), CrawlPhase::Failed);
}

#[tokio::test]
async fn test_slow_seed_fails_within_navigation_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<title>Late</title>", "text/html")
                .set_delay(Duration::from_secs(4)),
        )
        .mount(&server)
        .await;

    let options = CrawlOptions {
        navigation_timeout: Duration::from_millis(300),
        ..CrawlOptions::default()
    };
    let mut crawler = coordinator(&server, "/", options);

    let result = tokio::time::timeout(Duration::from_secs(2), crawler.start())
        .await
        .expect("Seed extraction was not bounded by the navigation timeout");

    assert!(matches!(result, Err(TrawlerError::SeedExtraction { .. })));
    assert_eq!(crawler.phase(), CrawlPhase::Failed);
}

#[tokio::test]
async fn test_custom_selectors_extracted() {
    let server = MockServer::start().await;
    let base = server.uri();

    serve_html(
        &server,
        "/",
        r#"<body><div class="price">10 EUR</div><div class="price">12 EUR</div></body>"#,
    )
    .await;

    let mut crawler = coordinator(&server, "/", fast_options())
        .with_selectors(vec![".price".to_string(), "div[".to_string(), ".none".to_string()]);
    let outcome = crawler.start().await.expect("Crawl failed");

    let page = &outcome.result[&format!("{}/", base)];
    match &page.custom_selector_results[".price"] {
        SelectorOutcome::Matches(items) => {
            assert_eq!(items.len(), 2);
            assert_eq!(items[0].text, "10 EUR");
        }
        other => panic!("Unexpected outcome: {:?}", other),
    }
    assert!(page.custom_selector_results["div["].is_error());
    assert!(!page.custom_selector_results.contains_key(".none"));
}

#[tokio::test]
async fn test_saved_result_round_trips() {
    let server = MockServer::start().await;

    serve_html(
        &server,
        "/",
        r#"<head><title>Home</title><meta name="description" content="Front page"></head>
        <body><h1>Home</h1><a href="/a">A</a></body>"#,
    )
    .await;
    serve_html(&server, "/a", "<head><title>A</title></head><body><h2>A</h2></body>").await;

    let mut crawler = coordinator(&server, "/", fast_options());
    let outcome = crawler.start().await.expect("Crawl failed");

    let json = output::render(&outcome.result, OutputFormat::Json).expect("Render failed");
    let parsed: CrawlResult = serde_json::from_str(&json).expect("Parse failed");
    assert_eq!(parsed, outcome.result);

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("trawler.db");
    {
        let mut store = SqliteStore::new(&db_path).expect("Failed to open store");
        output::save_result(&mut store, &outcome.result).expect("Save failed");
        output::save_format(&mut store, OutputFormat::Headings).expect("Save failed");
    }

    let store = SqliteStore::new(&db_path).expect("Failed to reopen store");
    let restored = output::load_result(&store).expect("Load failed");
    assert_eq!(restored, Some(outcome.result.clone()));
    assert_eq!(
        output::load_format(&store).expect("Load failed"),
        Some(OutputFormat::Headings)
    );

    let csv = output::render(&outcome.result, OutputFormat::Headings).expect("Render failed");
    assert!(csv.contains("\"h1\""));
    assert!(csv.contains("\"h2\""));
}
