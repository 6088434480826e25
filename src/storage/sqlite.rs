//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the ResultStore
//! trait.

use crate::crawler::{CrawlResult, ErrorKind, ErrorResult};
use crate::queue::OwnerId;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ResultStore, StorageError, StorageResult};
use crate::storage::{FailureRecord, StoredResult};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::time::Duration;

const RESULT_COLUMNS: &str =
    "owner, url, title, content_type, content, media_file_path, links, crawled_at";

/// SQLite result store
pub struct SqliteResultStore {
    conn: Connection,
}

impl SqliteResultStore {
    /// Opens or creates the result database at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteResultStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;
        conn.busy_timeout(Duration::from_secs(5))?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

/// Fixed-width timestamps so text ordering matches time ordering
fn db_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> StorageResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::InvalidRecord(format!("bad timestamp {:?}: {}", raw, e)))
}

/// Escapes `LIKE` wildcards so the term matches literally
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

type RawResultRow = (
    String,
    String,
    String,
    String,
    String,
    Option<String>,
    String,
    String,
);

fn read_result_row(row: &Row<'_>) -> rusqlite::Result<RawResultRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn into_stored_result(raw: RawResultRow) -> StorageResult<StoredResult> {
    let (owner, url, title, content_type, content, media_file_path, links, crawled_at) = raw;
    Ok(StoredResult {
        owner,
        result: CrawlResult {
            url,
            title,
            content_type,
            content,
            media_file_path,
            links: serde_json::from_str(&links)?,
            crawled_at: parse_timestamp(&crawled_at)?,
        },
    })
}

impl ResultStore for SqliteResultStore {
    fn store(&mut self, owner: &OwnerId, result: &CrawlResult) -> StorageResult<()> {
        let links = serde_json::to_string(&result.links)?;
        self.conn.execute(
            "INSERT INTO crawled_data
                 (owner, url, title, content_type, content, media_file_path, links, crawled_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(url) DO UPDATE SET
                 owner = excluded.owner,
                 title = excluded.title,
                 content_type = excluded.content_type,
                 content = excluded.content,
                 media_file_path = excluded.media_file_path,
                 links = excluded.links,
                 crawled_at = excluded.crawled_at",
            params![
                owner.to_string(),
                result.url,
                result.title,
                result.content_type,
                result.content,
                result.media_file_path,
                links,
                db_timestamp(&result.crawled_at),
            ],
        )?;
        Ok(())
    }

    fn record_failure(&mut self, owner: &OwnerId, error: &ErrorResult) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO crawl_errors (owner, url, kind, detail, status_code, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                owner.to_string(),
                error.url,
                error.kind.as_str(),
                error.detail,
                error.status_code,
                db_timestamp(&Utc::now()),
            ],
        )?;
        Ok(())
    }

    fn query(&self, owner: &OwnerId, search: Option<&str>) -> StorageResult<Vec<StoredResult>> {
        let owner = owner.to_string();
        let rows = match search.filter(|term| !term.is_empty()) {
            Some(term) => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {} FROM crawled_data
                     WHERE owner = ?1
                       AND (title LIKE ?2 ESCAPE '\\' OR content_type LIKE ?2 ESCAPE '\\')
                     ORDER BY crawled_at DESC, id DESC",
                    RESULT_COLUMNS
                ))?;
                let rows = stmt
                    .query_map(params![owner, like_pattern(term)], read_result_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {} FROM crawled_data
                     WHERE owner = ?1
                     ORDER BY crawled_at DESC, id DESC",
                    RESULT_COLUMNS
                ))?;
                let rows = stmt
                    .query_map(params![owner], read_result_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };

        rows.into_iter().map(into_stored_result).collect()
    }

    fn failures(&self, owner: &OwnerId) -> StorageResult<Vec<FailureRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT owner, url, kind, detail, status_code, recorded_at
             FROM crawl_errors
             WHERE owner = ?1
             ORDER BY recorded_at DESC, id DESC",
        )?;

        let rows = stmt
            .query_map(params![owner.to_string()], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<u16>>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(owner, url, kind, detail, status_code, recorded_at)| {
                let kind = ErrorKind::from_db_string(&kind)
                    .ok_or_else(|| StorageError::InvalidRecord(format!("unknown kind {:?}", kind)))?;
                Ok(FailureRecord {
                    owner,
                    error: ErrorResult {
                        url,
                        kind,
                        detail,
                        status_code,
                    },
                    recorded_at: parse_timestamp(&recorded_at)?,
                })
            })
            .collect()
    }

    fn count_results(&self) -> StorageResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM crawled_data", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
