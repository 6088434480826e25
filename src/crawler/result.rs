//! Values produced by a single crawl

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Data extracted from one successfully fetched page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlResult {
    pub url: String,
    pub title: String,
    /// Declared `Content-Type` of the response, empty when absent
    pub content_type: String,
    /// Heading text followed by paragraph text
    pub content: String,
    /// Where a media payload was written, if one was
    pub media_file_path: Option<String>,
    /// Anchor hrefs, then image srcs, then resolved internal links
    pub links: Vec<String>,
    pub crawled_at: DateTime<Utc>,
}

/// Why a crawl produced no page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidUrl,
    NetworkError,
    HttpStatus,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidUrl => "invalid_url",
            Self::NetworkError => "network_error",
            Self::HttpStatus => "http_status",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "invalid_url" => Some(Self::InvalidUrl),
            "network_error" => Some(Self::NetworkError),
            "http_status" => Some(Self::HttpStatus),
            _ => None,
        }
    }
}

/// A failed crawl, reported as a value rather than an `Err`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResult {
    pub url: String,
    pub kind: ErrorKind,
    pub detail: String,
    /// Set for [`ErrorKind::HttpStatus`]
    pub status_code: Option<u16>,
}

impl ErrorResult {
    pub fn invalid_url(url: &str) -> Self {
        Self {
            url: url.to_string(),
            kind: ErrorKind::InvalidUrl,
            detail: "Invalid URL".to_string(),
            status_code: None,
        }
    }

    pub fn network(url: &str, detail: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            kind: ErrorKind::NetworkError,
            detail: detail.into(),
            status_code: None,
        }
    }

    pub fn http_status(url: &str, status_code: u16) -> Self {
        Self {
            url: url.to_string(),
            kind: ErrorKind::HttpStatus,
            detail: format!("HTTP Error {}", status_code),
            status_code: Some(status_code),
        }
    }
}

/// Result of [`crate::crawler::WebCrawler::crawl`] when it did any work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CrawlOutcome {
    Page(CrawlResult),
    Failed(ErrorResult),
}

impl CrawlOutcome {
    /// URL the outcome is about
    pub fn url(&self) -> &str {
        match self {
            Self::Page(page) => &page.url,
            Self::Failed(error) => &error.url,
        }
    }

    pub fn as_page(&self) -> Option<&CrawlResult> {
        match self {
            Self::Page(page) => Some(page),
            Self::Failed(_) => None,
        }
    }

    pub fn as_error(&self) -> Option<&ErrorResult> {
        match self {
            Self::Page(_) => None,
            Self::Failed(error) => Some(error),
        }
    }
}
