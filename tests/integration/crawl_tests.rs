//! Single-page crawl behaviour against a mock site

use crawlq::crawler::{CrawlOutcome, CrawlerSettings, ErrorKind, VisitedSet, WebCrawler};
use crawlq::robots::RobotsCache;
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a crawler rooted at `start_url` that writes media into `media_dir`
fn create_test_crawler(start_url: &str, media_dir: PathBuf, fail_closed: bool) -> WebCrawler {
    let client = Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("Failed to build client");
    let robots = Arc::new(RobotsCache::new(
        client.clone(),
        Duration::from_secs(2),
        fail_closed,
    ));
    let settings = CrawlerSettings {
        request_timeout: Duration::from_secs(5),
        media_dir,
        ..CrawlerSettings::default()
    };
    WebCrawler::new(start_url, Arc::new(settings), client, robots)
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html")
}

async fn mount_robots(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_extracts_title_and_text() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            "<html><head><title>Hi</title></head><body><p>Hello</p></body></html>",
        ))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let url = format!("{}/", server.uri());
    let crawler = create_test_crawler(&url, dir.path().join("media"), false);

    let outcome = crawler.crawl(&url).await.expect("page should be crawled");
    let page = outcome.as_page().expect("expected a page");

    assert_eq!(page.url, url);
    assert_eq!(page.title, "Hi");
    assert!(page.content.contains("Hello"));
    assert!(page.content_type.starts_with("text/html"));
    assert!(page.media_file_path.is_none());
}

#[tokio::test]
async fn test_declared_charset_is_decoded() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;
    let body = b"<html><head><title>Caf\xe9</title></head><body><p>Cr\xe8me br\xfbl\xe9e</p></body></html>";
    Mock::given(method("GET"))
        .and(path("/latin"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(body.to_vec(), "text/html; charset=iso-8859-1"),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let url = format!("{}/latin", server.uri());
    let crawler = create_test_crawler(&url, dir.path().join("media"), false);

    let outcome = crawler.crawl(&url).await.unwrap();
    let page = outcome.as_page().expect("expected a page");
    assert_eq!(page.title, "Caf\u{e9}");
    assert!(page.content.contains("Cr\u{e8}me br\u{fb}l\u{e9}e"));
}

#[tokio::test]
async fn test_robots_disallow_prevents_fetch() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nDisallow: /private/").await;
    Mock::given(method("GET"))
        .and(path("/private/page"))
        .respond_with(html("<title>Secret</title>"))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let url = format!("{}/private/page", server.uri());
    let crawler = create_test_crawler(&server.uri(), dir.path().to_path_buf(), false);

    assert!(crawler.crawl(&url).await.is_none());
    server.verify().await;
}

#[tokio::test]
async fn test_missing_robots_allows_crawl() {
    let server = MockServer::start().await;
    // No robots.txt mock: wiremock answers 404
    Mock::given(method("GET"))
        .and(path("/open"))
        .respond_with(html("<title>Open</title>"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let url = format!("{}/open", server.uri());
    let crawler = create_test_crawler(&url, dir.path().to_path_buf(), false);

    let outcome = crawler.crawl(&url).await.unwrap();
    assert_eq!(outcome.as_page().unwrap().title, "Open");
}

#[tokio::test]
async fn test_unavailable_robots_respects_fail_closed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(html("<title>Page</title>"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let url = format!("{}/page", server.uri());

    let closed = create_test_crawler(&url, dir.path().to_path_buf(), true);
    assert!(closed.crawl(&url).await.is_none());

    let open = create_test_crawler(&url, dir.path().to_path_buf(), false);
    assert!(open.crawl(&url).await.unwrap().as_page().is_some());
}

#[tokio::test]
async fn test_not_found_is_http_status_error() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let url = format!("{}/missing", server.uri());
    let crawler = create_test_crawler(&url, dir.path().to_path_buf(), false);

    let outcome = crawler.crawl(&url).await.unwrap();
    let error = outcome.as_error().expect("expected an error result");

    assert_eq!(error.kind, ErrorKind::HttpStatus);
    assert_eq!(error.status_code, Some(404));
    assert_eq!(error.detail, "HTTP Error 404");
    assert_eq!(error.url, url);
}

#[tokio::test]
async fn test_connection_failure_is_network_error() {
    let dir = TempDir::new().unwrap();
    // Nothing listens on the discard port
    let url = "http://127.0.0.1:9/page";
    let crawler = create_test_crawler(url, dir.path().to_path_buf(), false);

    let outcome = crawler.crawl(url).await.unwrap();
    assert_eq!(outcome.as_error().unwrap().kind, ErrorKind::NetworkError);
}

#[tokio::test]
async fn test_image_is_saved_to_media_dir() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;
    let png = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
    Mock::given(method("GET"))
        .and(path("/img/logo.png"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(png.clone(), "image/png"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let media_dir = dir.path().join("downloaded_media");
    let url = format!("{}/img/logo.png", server.uri());
    let crawler = create_test_crawler(&url, media_dir.clone(), false);

    let outcome = crawler.crawl(&url).await.unwrap();
    let page = outcome.as_page().unwrap();

    assert_eq!(page.content_type, "image/png");
    assert_eq!(page.title, "No title");
    let saved = page.media_file_path.as_ref().expect("media path recorded");
    assert_eq!(PathBuf::from(saved), media_dir.join("logo.png"));
    assert_eq!(std::fs::read(saved).unwrap(), png);
}

#[tokio::test]
async fn test_links_include_resolved_internal_links() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><body>
            <a href="/about">About</a>
            <a href="https://elsewhere.test/x">Elsewhere</a>
            <img src="/logo.png">
            </body></html>"#,
        ))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let url = format!("{}/", server.uri());
    let crawler = create_test_crawler(&url, dir.path().to_path_buf(), false);

    let outcome = crawler.crawl(&url).await.unwrap();
    let links = &outcome.as_page().unwrap().links;

    assert_eq!(&links[0], "/about");
    assert_eq!(&links[1], "https://elsewhere.test/x");
    assert_eq!(&links[2], "/logo.png");
    assert!(links.contains(&format!("{}/about", server.uri())));
    assert!(!links.iter().any(|l| l == &format!("{}/", server.uri())));
}

#[tokio::test]
async fn test_second_crawl_of_same_url_is_skipped() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;
    Mock::given(method("GET"))
        .and(path("/once"))
        .respond_with(html("<title>Once</title>"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let url = format!("{}/once", server.uri());
    let crawler = create_test_crawler(&url, dir.path().to_path_buf(), false);

    assert!(crawler.crawl(&url).await.is_some());
    assert!(crawler.crawl(&url).await.is_none());
    server.verify().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_crawls_share_one_claim() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;
    Mock::given(method("GET"))
        .and(path("/race"))
        .respond_with(html("<title>Race</title>"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let url = format!("{}/race", server.uri());
    let visited = Arc::new(VisitedSet::new());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let crawler = create_test_crawler(&url, dir.path().to_path_buf(), false)
                .with_visited(Arc::clone(&visited));
            let url = url.clone();
            tokio::spawn(async move { crawler.crawl(&url).await })
        })
        .collect();

    let mut pages = 0;
    for handle in handles {
        if let Some(CrawlOutcome::Page(_)) = handle.await.unwrap() {
            pages += 1;
        }
    }

    assert_eq!(pages, 1);
    assert_eq!(visited.len(), 1);
}
