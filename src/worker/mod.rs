//! Worker pool and service control surface
//!
//! `WorkerPool` runs a fixed number of crawl workers over the shared
//! request queue; `CrawlService` bundles the pool with the queue and result
//! store behind enqueue, stop, status and query operations.

mod pool;
mod service;

pub use pool::{PoolStatus, SharedResultStore, WorkerPool};
pub use service::{CrawlService, DEFAULT_CONTENT_TYPE};
