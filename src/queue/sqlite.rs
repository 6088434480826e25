//! SQLite sorted-set backend
//!
//! Members live in one table keyed by queue name and member text. Popping
//! is a single `DELETE … RETURNING` statement, which SQLite executes under
//! its write lock, so concurrent poppers on the same database file never
//! see the same row.

use crate::queue::backend::QueueBackend;
use crate::queue::{QueueError, QueueResult};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

const QUEUE_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS request_queue (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    queue TEXT NOT NULL,
    member TEXT NOT NULL,
    score REAL NOT NULL,
    UNIQUE(queue, member)
);

CREATE INDEX IF NOT EXISTS idx_request_queue_score ON request_queue(queue, score, seq);
"#;

/// Queue backend stored in a SQLite database file
pub struct SqliteQueue {
    conn: Mutex<Connection>,
    queue_name: String,
}

impl SqliteQueue {
    /// Opens (or creates) the queue database at `path`
    pub fn open(path: &Path, queue_name: &str) -> QueueResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
        ",
        )?;
        // Other processes may hold the write lock briefly
        conn.busy_timeout(Duration::from_secs(5))?;

        Self::with_connection(conn, queue_name)
    }

    /// Creates a queue in a private in-memory database
    pub fn open_in_memory(queue_name: &str) -> QueueResult<Self> {
        Self::with_connection(Connection::open_in_memory()?, queue_name)
    }

    fn with_connection(conn: Connection, queue_name: &str) -> QueueResult<Self> {
        conn.execute_batch(QUEUE_SCHEMA_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
            queue_name: queue_name.to_string(),
        })
    }

    fn lock(&self) -> QueueResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| QueueError::Lock(e.to_string()))
    }
}

#[async_trait]
impl QueueBackend for SqliteQueue {
    async fn insert(&self, member: &str, score: f64) -> QueueResult<bool> {
        let conn = self.lock()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO request_queue (queue, member, score) VALUES (?1, ?2, ?3)",
            params![self.queue_name, member, score],
        )?;
        Ok(inserted > 0)
    }

    async fn pop_min(&self) -> QueueResult<Option<(String, f64)>> {
        let conn = self.lock()?;
        let popped = conn
            .query_row(
                "DELETE FROM request_queue
                 WHERE seq = (
                     SELECT seq FROM request_queue
                     WHERE queue = ?1
                     ORDER BY score ASC, seq ASC
                     LIMIT 1
                 )
                 RETURNING member, score",
                params![self.queue_name],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?)),
            )
            .optional()?;
        Ok(popped)
    }

    async fn len(&self) -> QueueResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM request_queue WHERE queue = ?1",
            params![self.queue_name],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    async fn entries(&self) -> QueueResult<Vec<(String, f64)>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT member, score FROM request_queue
             WHERE queue = ?1
             ORDER BY score ASC, seq ASC",
        )?;
        let rows = stmt
            .query_map(params![self.queue_name], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }
}
