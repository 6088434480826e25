//! Worker pool draining the request queue
//!
//! Each worker is a tokio task that repeatedly pops the lowest-scored
//! payload, crawls the task's URL and hands the outcome to the result
//! store. Workers share a stop flag; stopping waits for every worker to
//! finish the task it holds.

use crate::config::{Config, VisitedScope};
use crate::crawler::{CrawlOutcome, CrawlerSettings, VisitedSet, WebCrawler};
use crate::queue::{CrawlTask, OwnerId, RequestQueue};
use crate::robots::RobotsCache;
use crate::storage::ResultStore;
use reqwest::Client;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Result store shared by every worker
pub type SharedResultStore = Arc<Mutex<dyn ResultStore + Send>>;

/// Pause after a queue or store error before the worker tries again
const ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Whether a pool's workers are active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolStatus {
    Running,
    Stopped,
}

impl PoolStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for PoolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State every worker of one pool shares
struct WorkerShared {
    queue: RequestQueue,
    store: SharedResultStore,
    settings: Arc<CrawlerSettings>,
    client: Client,
    robots: Arc<RobotsCache>,
    /// Present when deduplication spans the whole pool
    pool_visited: Option<Arc<VisitedSet>>,
    poll_interval: Duration,
    running: AtomicBool,
    shutdown: Notify,
}

impl WorkerShared {
    fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Sleeps for `duration` or until the pool is stopped
    async fn pause(&self, duration: Duration) {
        let notified = self.shutdown.notified();
        tokio::pin!(notified);
        // Register before re-checking the flag so a concurrent stop is not missed
        notified.as_mut().enable();
        if !self.is_running() {
            return;
        }
        tokio::select! {
            _ = tokio::time::sleep(duration) => {}
            _ = notified => {}
        }
    }
}

/// A fixed-size pool of crawl workers
pub struct WorkerPool {
    shared: Arc<WorkerShared>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    /// Spawns `config.workers.count` workers on the current runtime
    ///
    /// `client` is used for page and robots.txt requests alike.
    pub fn start(
        config: &Config,
        queue: RequestQueue,
        store: SharedResultStore,
        client: Client,
    ) -> Self {
        let robots = Arc::new(RobotsCache::new(
            client.clone(),
            Duration::from_secs(config.robots.timeout),
            config.robots.fail_closed,
        ));
        let pool_visited = match config.crawler.visited_scope {
            VisitedScope::Task => None,
            VisitedScope::Pool => Some(Arc::new(VisitedSet::new())),
        };

        let shared = Arc::new(WorkerShared {
            queue,
            store,
            settings: Arc::new(CrawlerSettings::from_config(config)),
            client,
            robots,
            pool_visited,
            poll_interval: Duration::from_millis(config.workers.poll_interval_ms),
            running: AtomicBool::new(true),
            shutdown: Notify::new(),
        });

        let worker_count = config.workers.count as usize;
        tracing::info!(
            "Starting {} crawl workers (visited scope: {:?})",
            worker_count,
            config.crawler.visited_scope
        );

        let handles = (0..worker_count)
            .map(|id| {
                let shared = Arc::clone(&shared);
                tokio::spawn(async move { run_worker(id, shared).await })
            })
            .collect();

        Self {
            shared,
            handles: Mutex::new(handles),
        }
    }

    /// Signals every worker to stop and waits until all have exited
    ///
    /// Calling this on a stopped pool is a no-op.
    pub async fn stop(&self) {
        self.shared.running.store(false, Ordering::Relaxed);
        self.shared.shutdown.notify_waiters();

        let handles = match self.handles.lock() {
            Ok(mut handles) => std::mem::take(&mut *handles),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };
        if handles.is_empty() {
            return;
        }

        tracing::info!("Stopping {} crawl workers", handles.len());
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::error!("Crawl worker exited abnormally: {}", e);
            }
        }
        tracing::info!("All crawl workers stopped");
    }

    pub fn status(&self) -> PoolStatus {
        if self.shared.is_running() {
            PoolStatus::Running
        } else {
            PoolStatus::Stopped
        }
    }
}

async fn run_worker(id: usize, shared: Arc<WorkerShared>) {
    tracing::debug!("Worker {} started", id);

    while shared.is_running() {
        match shared.queue.is_empty().await {
            Ok(true) => {
                shared.pause(shared.poll_interval).await;
                continue;
            }
            Ok(false) => {}
            Err(e) => {
                tracing::error!("Worker {}: queue unavailable: {}", id, e);
                shared.pause(ERROR_BACKOFF).await;
                continue;
            }
        }

        let payload = match shared.queue.pop_lowest_score().await {
            // Another worker won the race for the last entry
            Ok(None) => continue,
            Ok(Some(payload)) => payload,
            Err(e) => {
                tracing::error!("Worker {}: failed to pop from queue: {}", id, e);
                shared.pause(ERROR_BACKOFF).await;
                continue;
            }
        };

        let task = match CrawlTask::from_payload(&payload) {
            Ok(task) => task,
            Err(e) => {
                tracing::warn!("Worker {}: skipping task: {}", id, e);
                continue;
            }
        };

        tracing::debug!("Worker {} crawling {} for {}", id, task.url, task.user_id);
        let outcome = match crawl_isolated(&shared, &task).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("Worker {}: crawl of {} panicked: {}", id, task.url, e);
                continue;
            }
        };

        if let Some(outcome) = outcome {
            if let Err(e) = persist(&shared.store, &task.user_id, &outcome) {
                tracing::error!("Worker {}: failed to store {}: {}", id, outcome.url(), e);
                shared.pause(ERROR_BACKOFF).await;
            }
        }
    }

    tracing::debug!("Worker {} stopped", id);
}

/// Runs one crawl in its own task so a panic is contained there
async fn crawl_isolated(
    shared: &WorkerShared,
    task: &CrawlTask,
) -> Result<Option<CrawlOutcome>, tokio::task::JoinError> {
    let mut crawler = WebCrawler::new(
        task.url.clone(),
        Arc::clone(&shared.settings),
        shared.client.clone(),
        Arc::clone(&shared.robots),
    );
    if let Some(visited) = &shared.pool_visited {
        crawler = crawler.with_visited(Arc::clone(visited));
    }

    let url = task.url.clone();
    tokio::spawn(async move { crawler.crawl(&url).await }).await
}

fn persist(
    store: &SharedResultStore,
    owner: &OwnerId,
    outcome: &CrawlOutcome,
) -> crate::Result<()> {
    let mut store = store
        .lock()
        .map_err(|e| crate::storage::StorageError::Lock(e.to_string()))?;
    match outcome {
        CrawlOutcome::Page(result) => {
            store.store(owner, result)?;
            tracing::info!("Stored {} ({})", result.url, result.title);
        }
        CrawlOutcome::Failed(error) => {
            store.record_failure(owner, error)?;
        }
    }
    Ok(())
}
