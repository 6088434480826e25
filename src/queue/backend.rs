//! Sorted-set storage behind the request queue

use crate::queue::QueueResult;
use async_trait::async_trait;

/// A durable set of unique members, each with a floating-point score
///
/// Implementations must be safe to share between worker tasks and, for the
/// persistent backends, between processes: removing the minimum member has
/// to be atomic so that no two callers ever receive the same member.
#[async_trait]
pub trait QueueBackend: Send + Sync {
    /// Inserts `member` with `score` unless it is already present
    ///
    /// Returns `true` if the member was new. An existing member keeps its
    /// original score.
    async fn insert(&self, member: &str, score: f64) -> QueueResult<bool>;

    /// Atomically removes and returns the member with the lowest score
    ///
    /// Members with equal scores come out in insertion order where the
    /// backend can tell.
    async fn pop_min(&self) -> QueueResult<Option<(String, f64)>>;

    /// Number of members currently held
    async fn len(&self) -> QueueResult<usize>;

    /// All members in ascending score order, without removing them
    async fn entries(&self) -> QueueResult<Vec<(String, f64)>>;

    /// Short backend name for logs
    fn name(&self) -> &'static str;
}
