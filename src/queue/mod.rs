//! Priority dispatch queue
//!
//! This module contains the durable, shared queue of crawl tasks:
//! - Content-type priority weights and score computation
//! - The JSON task payload stored as each sorted-set member
//! - A backend trait with SQLite and Redis implementations
//!
//! Lower scores are dequeued first. A task's score is
//! `-(weight * 100000) + enqueue_time`, so a heavier content type always
//! wins over a lighter one enqueued within roughly a day of it, and tasks
//! of equal weight come out oldest first.

mod backend;
mod redis;
mod sqlite;
mod task;

pub use self::redis::RedisQueue;
pub use backend::QueueBackend;
pub use sqlite::SqliteQueue;
pub use task::{ContentCategory, CrawlTask, OwnerId};

use crate::config::{QueueBackendKind, QueueConfig};
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Multiplier applied to a priority weight before the timestamp is added
pub const PRIORITY_SCALE: f64 = 100_000.0;

/// Errors raised by queue operations
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    #[error("Failed to serialize task: {0}")]
    Serialization(serde_json::Error),

    #[error("Malformed task payload {payload:?}: {source}")]
    Deserialization {
        payload: String,
        source: serde_json::Error,
    },

    #[error("Payload encoding error: {0}")]
    Encoding(String),

    #[error("Queue lock poisoned: {0}")]
    Lock(String),
}

/// Result type for queue operations
pub type QueueResult<T> = Result<T, QueueError>;

/// Priority weight of a content-type hint
///
/// `html` is 10, `image` 5, `video` 1; any other hint is 3. Matching is
/// exact and case-sensitive.
pub fn priority_weight(content_type: &str) -> u32 {
    ContentCategory::from_hint(content_type).weight()
}

/// Score of a task with the given hint enqueued at `timestamp`
pub fn score_for(content_type: &str, timestamp: f64) -> f64 {
    -(priority_weight(content_type) as f64) * PRIORITY_SCALE + timestamp
}

/// Current wall-clock time in fractional seconds since the epoch
pub fn unix_timestamp() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// A queued member together with its score
#[derive(Debug, Clone, PartialEq)]
pub struct QueueEntry {
    pub payload: String,
    pub score: f64,
}

impl QueueEntry {
    /// Parses the payload; `None` for members that are not valid tasks
    pub fn task(&self) -> Option<CrawlTask> {
        CrawlTask::from_payload(&self.payload).ok()
    }
}

/// Handle to the shared request queue
///
/// Cloning is cheap; every clone talks to the same backend.
#[derive(Clone)]
pub struct RequestQueue {
    backend: Arc<dyn QueueBackend>,
}

impl RequestQueue {
    pub fn new(backend: Arc<dyn QueueBackend>) -> Self {
        Self { backend }
    }

    /// Opens the backend selected by `[queue]`
    pub async fn open(config: &QueueConfig) -> QueueResult<Self> {
        let backend: Arc<dyn QueueBackend> = match config.backend {
            QueueBackendKind::Sqlite => Arc::new(SqliteQueue::open(
                Path::new(&config.database_path),
                &config.queue_name,
            )?),
            QueueBackendKind::Redis => {
                Arc::new(RedisQueue::connect(&config.redis_url, &config.queue_name).await?)
            }
        };
        tracing::info!(
            "Opened {} request queue '{}'",
            backend.name(),
            config.queue_name
        );
        Ok(Self::new(backend))
    }

    /// Enqueues a crawl of `url` on behalf of `owner`, scored at the current
    /// time
    ///
    /// Returns `false` if an identical task was already queued; that task
    /// keeps its original score.
    pub async fn add(
        &self,
        owner: impl Into<OwnerId>,
        url: &str,
        content_type: &str,
    ) -> QueueResult<bool> {
        let task = CrawlTask::new(owner, url, content_type);
        self.add_at(&task, unix_timestamp()).await
    }

    /// Enqueues `task` as though it were submitted at `timestamp`
    pub async fn add_at(&self, task: &CrawlTask, timestamp: f64) -> QueueResult<bool> {
        let payload = task.to_payload()?;
        let score = score_for(&task.content_type, timestamp);
        let added = self.backend.insert(&payload, score).await?;
        if added {
            tracing::debug!(
                "Queued {} ({}, weight {}) with score {}",
                task.url,
                task.category().as_str(),
                task.category().weight(),
                score
            );
        } else {
            tracing::debug!("Task for {} already queued", task.url);
        }
        Ok(added)
    }

    /// Atomically removes and returns the lowest-scored payload
    ///
    /// The payload is returned as stored; decoding it is left to the caller
    /// so a malformed member is consumed rather than blocking the queue.
    pub async fn pop_lowest_score(&self) -> QueueResult<Option<String>> {
        Ok(self.backend.pop_min().await?.map(|(payload, _)| payload))
    }

    pub async fn is_empty(&self) -> QueueResult<bool> {
        Ok(self.backend.len().await? == 0)
    }

    pub async fn len(&self) -> QueueResult<usize> {
        self.backend.len().await
    }

    /// Lists queued entries in dispatch order without removing them
    pub async fn snapshot(&self) -> QueueResult<Vec<QueueEntry>> {
        Ok(self
            .backend
            .entries()
            .await?
            .into_iter()
            .map(|(payload, score)| QueueEntry { payload, score })
            .collect())
    }
}
