//! Worker pool draining a real queue into a real result store

use crawlq::config::{load_config, Config};
use crawlq::queue::{OwnerId, QueueBackend, RequestQueue, SqliteQueue};
use crawlq::worker::{CrawlService, PoolStatus};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Writes a config file under `dir` and loads it back
fn create_test_config(dir: &Path, workers: u32, visited_scope: &str) -> Config {
    let config_path = dir.join("crawlq.toml");
    let contents = format!(
        r#"
[crawler]
request-timeout = 5
media-dir = "{media}"
visited-scope = "{scope}"

[robots]
timeout = 2

[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0.0"
contact-url = "https://example.com/contact"
contact-email = "test@example.com"

[queue]
backend = "sqlite"
database-path = "{queue}"

[workers]
count = {workers}
poll-interval-ms = 20

[output]
database-path = "{results}"
"#,
        media = dir.join("media").display(),
        scope = visited_scope,
        queue = dir.join("queue.db").display(),
        workers = workers,
        results = dir.join("results.db").display(),
    );
    std::fs::write(&config_path, contents).expect("Failed to write config");
    load_config(&config_path).expect("Failed to load config")
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html")
}

async fn mount_page(server: &MockServer, route: &str, title: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(&format!(
            "<html><head><title>{}</title></head><body><p>Body of {}</p></body></html>",
            title, route
        )))
        .mount(server)
        .await;
}

/// Polls until the queue has drained and `expected` pages are stored
async fn wait_for_results(service: &CrawlService, owner: &OwnerId, expected: usize) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(15);
    loop {
        let drained = service.queue().is_empty().await.unwrap();
        let stored = service.results(owner, None).unwrap().len();
        if drained && stored >= expected {
            return;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out with {} of {} results stored",
            stored,
            expected
        );
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_pool_crawls_queued_urls() {
    let server = MockServer::start().await;
    mount_page(&server, "/a", "Page A").await;
    mount_page(&server, "/b", "Page B").await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path(), 3, "task");
    let service = CrawlService::start(&config).await.unwrap();
    assert_eq!(service.status(), PoolStatus::Running);

    let owner = OwnerId::from(1_i64);
    for route in ["/a", "/b", "/gone"] {
        let url = format!("{}{}", server.uri(), route);
        assert!(service
            .enqueue(owner.clone(), &url, Some("html"))
            .await
            .unwrap());
    }

    wait_for_results(&service, &owner, 2).await;
    // The 404 may still be in flight once the queue has drained
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    while service.failures(&owner).unwrap().is_empty() {
        assert!(tokio::time::Instant::now() < deadline, "failure never recorded");
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    service.stop().await;
    assert_eq!(service.status(), PoolStatus::Stopped);

    let mut titles: Vec<String> = service
        .results(&owner, None)
        .unwrap()
        .into_iter()
        .map(|stored| stored.result.title)
        .collect();
    titles.sort();
    assert_eq!(titles, vec!["Page A".to_string(), "Page B".to_string()]);

    let searched = service.results(&owner, Some("page b")).unwrap();
    assert_eq!(searched.len(), 1);

    let failures = service.failures(&owner).unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].error.status_code, Some(404));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_single_worker_follows_priority_order() {
    let server = MockServer::start().await;
    for route in ["/video", "/other", "/image", "/html"] {
        mount_page(&server, route, route).await;
    }

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path(), 1, "task");

    // Fill the queue before any worker runs
    let queue = RequestQueue::open(&config.queue).await.unwrap();
    for (route, hint) in [
        ("/video", "video"),
        ("/other", "other"),
        ("/image", "image"),
        ("/html", "html"),
    ] {
        queue
            .add("u", &format!("{}{}", server.uri(), route), hint)
            .await
            .unwrap();
    }

    let service = CrawlService::start(&config).await.unwrap();
    wait_for_results(&service, &OwnerId::from("u"), 4).await;
    service.stop().await;

    let order: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .map(|request| request.url.path().to_string())
        .filter(|p| p != "/robots.txt")
        .collect();
    assert_eq!(order, vec!["/html", "/image", "/other", "/video"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_malformed_payload_is_skipped() {
    let server = MockServer::start().await;
    mount_page(&server, "/ok", "Fine").await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path(), 1, "task");

    // A foreign producer left garbage at the head of the queue
    let raw = SqliteQueue::open(Path::new(&config.queue.database_path), &config.queue.queue_name)
        .unwrap();
    raw.insert("{\"user_id\": 1", -1.0e12).await.unwrap();

    let service = CrawlService::start(&config).await.unwrap();
    let owner = OwnerId::from("1");
    service
        .enqueue(owner.clone(), &format!("{}/ok", server.uri()), None)
        .await
        .unwrap();

    wait_for_results(&service, &owner, 1).await;
    service.stop().await;

    assert_eq!(service.results(&owner, None).unwrap()[0].result.title, "Fine");
    assert!(service.failures(&owner).unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_pool_scope_deduplicates_across_tasks() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/shared"))
        .respond_with(html("<title>Shared</title>"))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/marker", "Marker").await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path(), 2, "pool");

    let queue = RequestQueue::open(&config.queue).await.unwrap();
    let url = format!("{}/shared", server.uri());
    // Distinct payloads for the same URL
    queue.add("1", &url, "html").await.unwrap();
    queue.add("1", &url, "image").await.unwrap();
    queue
        .add("1", &format!("{}/marker", server.uri()), "video")
        .await
        .unwrap();

    let service = CrawlService::start(&config).await.unwrap();
    wait_for_results(&service, &OwnerId::from("1"), 2).await;
    service.stop().await;

    server.verify().await;
}
