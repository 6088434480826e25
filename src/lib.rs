//! crawlq: a priority-ordered, polite web crawling engine
//!
//! This crate implements a durable crawl queue ordered by content-type
//! priority, a pool of concurrent fetch workers draining it, and a per-page
//! crawl routine that honours robots.txt, deduplicates URLs, captures media
//! and extracts text and links.

pub mod config;
pub mod crawler;
pub mod output;
pub mod queue;
pub mod robots;
pub mod storage;
pub mod url;
pub mod worker;

use thiserror::Error;

/// Main error type for crawlq operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Queue error: {0}")]
    Queue(#[from] queue::QueueError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for crawlq operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlOutcome, CrawlResult, ErrorKind, ErrorResult, WebCrawler};
pub use queue::{priority_weight, CrawlTask, OwnerId, RequestQueue};
pub use crate::url::{is_internal, is_valid_url};
pub use worker::{CrawlService, PoolStatus, WorkerPool};
