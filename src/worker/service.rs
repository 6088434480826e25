//! Control surface over the queue, the worker pool and the result store

use crate::config::Config;
use crate::crawler::build_http_client;
use crate::queue::{OwnerId, RequestQueue};
use crate::storage::{open_result_store, FailureRecord, StorageError, StoredResult};
use crate::worker::pool::{PoolStatus, SharedResultStore, WorkerPool};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Content-type hint used when a caller gives none
pub const DEFAULT_CONTENT_TYPE: &str = "other";

/// A running crawl service
///
/// Owns the worker pool for its lifetime; `stop` must be awaited before
/// dropping to let in-flight crawls finish.
pub struct CrawlService {
    queue: RequestQueue,
    store: SharedResultStore,
    pool: WorkerPool,
}

impl CrawlService {
    /// Opens the configured queue and result database, then starts workers
    pub async fn start(config: &Config) -> crate::Result<Self> {
        let queue = RequestQueue::open(&config.queue).await?;
        let store: SharedResultStore = Arc::new(Mutex::new(open_result_store(Path::new(
            &config.output.database_path,
        ))?));
        let client = build_http_client(
            &config.user_agent,
            Duration::from_secs(config.crawler.request_timeout),
        )?;

        Ok(Self::with_parts(config, queue, store, client))
    }

    /// Starts workers over an already opened queue and store
    pub fn with_parts(
        config: &Config,
        queue: RequestQueue,
        store: SharedResultStore,
        client: reqwest::Client,
    ) -> Self {
        let pool = WorkerPool::start(config, queue.clone(), Arc::clone(&store), client);
        Self { queue, store, pool }
    }

    /// Queues `url` for `owner`
    ///
    /// A missing content type is queued as `other`. Returns `false` when an
    /// identical task is already waiting.
    pub async fn enqueue(
        &self,
        owner: impl Into<OwnerId>,
        url: &str,
        content_type: Option<&str>,
    ) -> crate::Result<bool> {
        let content_type = content_type.unwrap_or(DEFAULT_CONTENT_TYPE);
        let accepted = self.queue.add(owner, url, content_type).await?;
        tracing::info!("Enqueued {} as {} (new: {})", url, content_type, accepted);
        Ok(accepted)
    }

    /// Stops every worker, returning once all have terminated
    pub async fn stop(&self) {
        self.pool.stop().await;
        tracing::warn!("Crawler has been stopped");
    }

    pub fn status(&self) -> PoolStatus {
        self.pool.status()
    }

    /// Stored pages for `owner`, optionally filtered by title or content type
    pub fn results(&self, owner: &OwnerId, search: Option<&str>) -> crate::Result<Vec<StoredResult>> {
        let store = self
            .store
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        Ok(store.query(owner, search)?)
    }

    /// Recorded failures for `owner`
    pub fn failures(&self, owner: &OwnerId) -> crate::Result<Vec<FailureRecord>> {
        let store = self
            .store
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        Ok(store.failures(owner)?)
    }

    pub fn queue(&self) -> &RequestQueue {
        &self.queue
    }
}
