//! Storage traits and error types
//!
//! This module defines the trait interface for result stores and the
//! associated error types.

use crate::crawler::{CrawlResult, ErrorResult};
use crate::queue::OwnerId;
use crate::storage::{FailureRecord, StoredResult};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid stored record: {0}")]
    InvalidRecord(String),

    #[error("Store lock poisoned: {0}")]
    Lock(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence for crawl outcomes
///
/// Writers take `&mut self`; share a store between workers behind a mutex.
pub trait ResultStore {
    /// Saves a crawled page for `owner`
    ///
    /// A page is stored once per URL: storing the same URL again replaces
    /// the earlier row, including its owner.
    fn store(&mut self, owner: &OwnerId, result: &CrawlResult) -> StorageResult<()>;

    /// Records a failed crawl attempt
    fn record_failure(&mut self, owner: &OwnerId, error: &ErrorResult) -> StorageResult<()>;

    /// Lists `owner`'s pages, newest first
    ///
    /// With a search term, only pages whose title or content type contains
    /// it (ignoring ASCII case) are returned.
    fn query(&self, owner: &OwnerId, search: Option<&str>) -> StorageResult<Vec<StoredResult>>;

    /// Lists `owner`'s recorded failures, newest first
    fn failures(&self, owner: &OwnerId) -> StorageResult<Vec<FailureRecord>>;

    /// Total number of stored pages across all owners
    fn count_results(&self) -> StorageResult<usize>;
}
