//! Robots.txt caching implementation
//!
//! Checkers are cached per site origin and expire after 24 hours.

use crate::robots::RobotsChecker;
use crate::url::robots_url;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use url::Url;

/// Cached robots.txt checker for one site
#[derive(Debug, Clone)]
pub struct CachedRobots {
    /// The checker built from the site's robots.txt
    pub checker: Arc<RobotsChecker>,

    /// When the robots.txt was fetched
    pub fetched_at: DateTime<Utc>,
}

impl CachedRobots {
    /// Creates a new CachedRobots stamped with the current time
    pub fn new(checker: RobotsChecker) -> Self {
        Self {
            checker: Arc::new(checker),
            fetched_at: Utc::now(),
        }
    }

    /// Checks if the cached robots.txt is older than 24 hours
    pub fn is_stale(&self) -> bool {
        self.age() > Duration::hours(24)
    }

    /// Returns the age of the cached robots.txt
    pub fn age(&self) -> Duration {
        Utc::now() - self.fetched_at
    }
}

/// Lazily populated robots.txt cache keyed by site origin
///
/// The first query for a site fetches its robots.txt; later queries reuse
/// the checker until it goes stale. Concurrent first queries for the same
/// site may each fetch; the last one wins, which is harmless.
pub struct RobotsCache {
    client: Client,
    timeout: std::time::Duration,
    fail_closed: bool,
    entries: Mutex<HashMap<String, CachedRobots>>,
}

impl RobotsCache {
    /// Creates an empty cache
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client used for robots.txt requests
    /// * `timeout` - Timeout for each robots.txt request
    /// * `fail_closed` - Passed to every checker, see [`RobotsChecker::fetch`]
    pub fn new(client: Client, timeout: std::time::Duration, fail_closed: bool) -> Self {
        Self {
            client,
            timeout,
            fail_closed,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the checker for the site hosting `url`, fetching it if needed
    pub async fn checker_for(&self, url: &Url) -> Arc<RobotsChecker> {
        // Scheme is part of the key: http and https may serve different rules
        let key = robots_url(url)
            .map(|robots| robots.to_string())
            .unwrap_or_default();

        {
            let entries = self.entries.lock().await;
            if let Some(cached) = entries.get(&key) {
                if !cached.is_stale() {
                    tracing::debug!("Using cached robots.txt for {}", key);
                    return Arc::clone(&cached.checker);
                }
            }
        }

        let checker = RobotsChecker::fetch(&self.client, url, self.timeout, self.fail_closed).await;
        let cached = CachedRobots::new(checker);
        let checker = Arc::clone(&cached.checker);
        self.entries.lock().await.insert(key, cached);
        checker
    }

    /// Number of sites currently cached
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether nothing has been cached yet
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}
