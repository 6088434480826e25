//! Redis sorted-set backend
//!
//! Uses `ZADD NX`, `ZPOPMIN`, `ZCARD` and `ZRANGE … WITHSCORES` on a single
//! key, the same layout existing producers write to.

use crate::queue::backend::QueueBackend;
use crate::queue::QueueResult;
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::Client;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Queue backend stored in a Redis sorted set
pub struct RedisQueue {
    conn: Arc<Mutex<MultiplexedConnection>>,
    key: String,
}

impl RedisQueue {
    /// Connects to `redis_url` and binds to the sorted set named `key`
    pub async fn connect(redis_url: &str, key: &str) -> QueueResult<Self> {
        let client = Client::open(redis_url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        tracing::debug!("Connected to Redis queue '{}' at {}", key, redis_url);

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            key: key.to_string(),
        })
    }
}

#[async_trait]
impl QueueBackend for RedisQueue {
    async fn insert(&self, member: &str, score: f64) -> QueueResult<bool> {
        let mut conn = self.conn.lock().await;
        let added: i64 = redis::cmd("ZADD")
            .arg(&self.key)
            .arg("NX")
            .arg(score)
            .arg(member)
            .query_async(&mut *conn)
            .await?;
        Ok(added > 0)
    }

    async fn pop_min(&self) -> QueueResult<Option<(String, f64)>> {
        let mut conn = self.conn.lock().await;
        let popped: Vec<(String, f64)> = redis::cmd("ZPOPMIN")
            .arg(&self.key)
            .query_async(&mut *conn)
            .await?;
        Ok(popped.into_iter().next())
    }

    async fn len(&self) -> QueueResult<usize> {
        let mut conn = self.conn.lock().await;
        let count: usize = redis::cmd("ZCARD")
            .arg(&self.key)
            .query_async(&mut *conn)
            .await?;
        Ok(count)
    }

    async fn entries(&self) -> QueueResult<Vec<(String, f64)>> {
        let mut conn = self.conn.lock().await;
        let entries: Vec<(String, f64)> = redis::cmd("ZRANGE")
            .arg(&self.key)
            .arg(0)
            .arg(-1)
            .arg("WITHSCORES")
            .query_async(&mut *conn)
            .await?;
        Ok(entries)
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
