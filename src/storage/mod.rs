//! Storage module for persisting crawl outcomes
//!
//! This module handles all result database operations, including:
//! - SQLite database initialization and schema management
//! - Per-owner page results, unique by URL
//! - A log of failed crawl attempts

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteResultStore;
pub use traits::{ResultStore, StorageError, StorageResult};

use crate::crawler::{CrawlResult, ErrorResult};
use chrono::{DateTime, Utc};
use std::path::Path;

/// Initializes or opens a result database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteResultStore)` - Successfully initialized storage
/// * `Err(StorageError)` - Failed to initialize storage
pub fn open_result_store(path: &Path) -> StorageResult<SqliteResultStore> {
    SqliteResultStore::new(path)
}

/// A stored page together with the owner it was crawled for
#[derive(Debug, Clone, PartialEq)]
pub struct StoredResult {
    pub owner: String,
    pub result: CrawlResult,
}

/// A recorded failed crawl
#[derive(Debug, Clone, PartialEq)]
pub struct FailureRecord {
    pub owner: String,
    pub error: ErrorResult,
    pub recorded_at: DateTime<Utc>,
}

/// Strips NUL bytes and non-printable characters from stored text before it
/// is shown or exported
pub fn sanitize_text(text: &str) -> String {
    text.chars()
        .filter(|c| *c == ' ' || !(c.is_control() || c.is_whitespace()))
        .collect()
}
