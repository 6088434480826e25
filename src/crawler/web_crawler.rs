//! Single-page crawl routine
//!
//! `WebCrawler::crawl` fetches exactly one URL: it validates it, claims it
//! in the session's visited set, consults robots.txt, performs the GET,
//! stores media payloads and extracts text and links from the body.

use crate::config::Config;
use crate::crawler::fetcher::{fetch_page, FetchResult};
use crate::crawler::media::{save_media, ContentKind};
use crate::crawler::parser::parse_html;
use crate::crawler::result::{CrawlOutcome, CrawlResult, ErrorResult};
use crate::crawler::visited::VisitedSet;
use crate::robots::{RobotsCache, DEFAULT_AGENT};
use crate::url::is_valid_url;
use chrono::Utc;
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Knobs shared by every crawler built from one configuration
#[derive(Debug, Clone)]
pub struct CrawlerSettings {
    /// Advisory; enforced by whoever drives repeated crawls
    pub max_depth: u32,
    /// Advisory; enforced by whoever drives repeated crawls
    pub max_pages: u32,
    /// Advisory inter-request delay
    pub delay: Duration,
    pub request_timeout: Duration,
    pub media_dir: PathBuf,
    /// Token robots.txt groups are matched against
    pub agent_token: String,
}

impl CrawlerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_depth: config.crawler.max_depth,
            max_pages: config.crawler.max_pages,
            delay: Duration::from_secs(config.crawler.delay),
            request_timeout: Duration::from_secs(config.crawler.request_timeout),
            media_dir: PathBuf::from(&config.crawler.media_dir),
            agent_token: config.robots.user_agent_token.clone(),
        }
    }
}

impl Default for CrawlerSettings {
    fn default() -> Self {
        Self {
            max_depth: 5,
            max_pages: 100,
            delay: Duration::from_secs(2),
            request_timeout: Duration::from_secs(10),
            media_dir: PathBuf::from("downloaded_media"),
            agent_token: DEFAULT_AGENT.to_string(),
        }
    }
}

/// A crawl session rooted at a starting URL
///
/// Each session owns its visited set unless one is shared in with
/// [`WebCrawler::with_visited`]. The robots.txt cache is always passed in so
/// a worker pool can reuse fetched rules across sessions.
pub struct WebCrawler {
    start_url: String,
    settings: Arc<CrawlerSettings>,
    client: Client,
    robots: Arc<RobotsCache>,
    visited: Arc<VisitedSet>,
}

impl WebCrawler {
    pub fn new(
        start_url: impl Into<String>,
        settings: Arc<CrawlerSettings>,
        client: Client,
        robots: Arc<RobotsCache>,
    ) -> Self {
        Self {
            start_url: start_url.into(),
            settings,
            client,
            robots,
            visited: Arc::new(VisitedSet::new()),
        }
    }

    /// Replaces the session's visited set with a shared one
    pub fn with_visited(mut self, visited: Arc<VisitedSet>) -> Self {
        self.visited = visited;
        self
    }

    pub fn start_url(&self) -> &str {
        &self.start_url
    }

    pub fn max_depth(&self) -> u32 {
        self.settings.max_depth
    }

    pub fn max_pages(&self) -> u32 {
        self.settings.max_pages
    }

    pub fn delay(&self) -> Duration {
        self.settings.delay
    }

    pub fn visited(&self) -> &Arc<VisitedSet> {
        &self.visited
    }

    /// Crawls one URL
    ///
    /// # Returns
    ///
    /// * `Some(CrawlOutcome::Page(_))` - The page was fetched and parsed
    /// * `Some(CrawlOutcome::Failed(_))` - Invalid URL, network failure or a
    ///   non-200 status
    /// * `None` - The URL was already claimed in this session, or robots.txt
    ///   forbids fetching it
    pub async fn crawl(&self, url: &str) -> Option<CrawlOutcome> {
        if !is_valid_url(url) {
            tracing::warn!("Invalid URL: {}", url);
            return Some(CrawlOutcome::Failed(ErrorResult::invalid_url(url)));
        }

        if !self.visited.claim(url) {
            tracing::debug!("Already visited: {}", url);
            return None;
        }

        let parsed_url = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(_) => return Some(CrawlOutcome::Failed(ErrorResult::invalid_url(url))),
        };

        let robots = self.robots.checker_for(&parsed_url).await;
        if !robots.can_fetch(url, &self.settings.agent_token) {
            tracing::info!("Cannot fetch {} due to robots.txt restriction", url);
            return None;
        }

        let (content_type, body) =
            match fetch_page(&self.client, &parsed_url, self.settings.request_timeout).await {
                FetchResult::Success {
                    final_url,
                    content_type,
                    body,
                } => {
                    if final_url != url {
                        tracing::debug!("{} redirected to {}", url, final_url);
                    }
                    (content_type, body)
                }
                FetchResult::HttpError { status_code } => {
                    tracing::warn!("Failed to fetch {} - Status Code: {}", url, status_code);
                    return Some(CrawlOutcome::Failed(ErrorResult::http_status(
                        url,
                        status_code,
                    )));
                }
                FetchResult::NetworkError { error } => {
                    tracing::warn!("Error while fetching {}: {}", url, error);
                    return Some(CrawlOutcome::Failed(ErrorResult::network(url, error)));
                }
            };

        let media_file_path = match ContentKind::from_header(&content_type) {
            ContentKind::Media => {
                match save_media(&self.settings.media_dir, &parsed_url, body.as_bytes()).await {
                    Ok(path) => {
                        tracing::debug!("Saved media from {} to {}", url, path.display());
                        Some(path.to_string_lossy().into_owned())
                    }
                    Err(e) => {
                        tracing::warn!("Failed to save media from {}: {}", url, e);
                        None
                    }
                }
            }
            ContentKind::Html | ContentKind::Unknown => None,
        };

        // Parse every body: servers mislabel HTML as application/* often enough
        let page = parse_html(&body.as_text(), &parsed_url);

        let internal_links = page
            .internal_links
            .into_iter()
            .filter(|link| !self.visited.contains(link));

        let mut links = page.hrefs;
        links.extend(page.image_srcs);
        links.extend(internal_links);

        Some(CrawlOutcome::Page(CrawlResult {
            url: url.to_string(),
            title: page.title,
            content_type,
            content: page.text,
            media_file_path,
            links,
            crawled_at: Utc::now(),
        }))
    }
}
