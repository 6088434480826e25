use std::collections::HashSet;
use std::sync::Mutex;

/// URLs already claimed by a crawl session
///
/// The set is guarded by one mutex; [`VisitedSet::claim`] performs the
/// check and the insert under a single lock acquisition, so two concurrent
/// claims of the same URL cannot both succeed.
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: Mutex<HashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `url` for processing
    ///
    /// Returns `true` if the URL was not yet in the set (and now is),
    /// `false` if another caller already claimed it.
    pub fn claim(&self, url: &str) -> bool {
        let mut urls = self.urls.lock().unwrap_or_else(|e| e.into_inner());
        urls.insert(url.to_string())
    }

    pub fn contains(&self, url: &str) -> bool {
        let urls = self.urls.lock().unwrap_or_else(|e| e.into_inner());
        urls.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
