//! Crawler module for web page fetching and processing
//!
//! This module contains the page fetch and extraction unit:
//! - HTTP fetching with a bounded timeout
//! - Content-type branching and media persistence
//! - HTML parsing for title, text and link extraction
//! - Per-session URL deduplication

mod fetcher;
mod media;
mod parser;
mod result;
mod visited;
mod web_crawler;

pub use fetcher::{build_http_client, fetch_page, FetchResult, PageBody};
pub use media::{save_media, ContentKind};
pub use parser::{parse_html, ParsedPage, NO_TITLE};
pub use result::{CrawlOutcome, CrawlResult, ErrorKind, ErrorResult};
pub use visited::VisitedSet;
pub use web_crawler::{CrawlerSettings, WebCrawler};
