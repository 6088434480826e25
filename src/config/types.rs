use serde::Deserialize;

/// Main configuration structure for crawlq
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub robots: RobotsConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub workers: WorkerConfig,
    pub output: OutputConfig,
}

/// Per-crawler behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Advisory maximum crawl depth for callers driving repeated crawls
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Advisory maximum number of pages per crawl session
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    /// Advisory delay between requests (seconds)
    #[serde(default = "default_delay")]
    pub delay: u64,

    /// Timeout for a page fetch (seconds)
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Directory where image and application payloads are written
    #[serde(rename = "media-dir", default = "default_media_dir")]
    pub media_dir: String,

    /// Whether the visited set is owned by each task or shared by the pool
    #[serde(rename = "visited-scope", default)]
    pub visited_scope: VisitedScope,
}

/// Scope of URL deduplication
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisitedScope {
    /// Every dequeued task gets a fresh crawler and visited set
    #[default]
    Task,
    /// All workers of a pool share one visited set
    Pool,
}

/// Robots.txt handling
#[derive(Debug, Clone, Deserialize)]
pub struct RobotsConfig {
    /// Timeout for fetching robots.txt (seconds)
    #[serde(default = "default_robots_timeout")]
    pub timeout: u64,

    /// Disallow everything when robots.txt could not be retrieved for a
    /// reason other than a 4xx response
    #[serde(rename = "fail-closed", default)]
    pub fail_closed: bool,

    /// User-agent token matched against robots.txt groups
    #[serde(rename = "user-agent-token", default = "default_agent_token")]
    pub user_agent_token: String,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Which sorted-set store backs the request queue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueBackendKind {
    #[default]
    Sqlite,
    Redis,
}

/// Request queue configuration
#[derive(Debug, Clone, Deserialize)]
pub struct QueueConfig {
    #[serde(default)]
    pub backend: QueueBackendKind,

    /// SQLite file holding the queue (sqlite backend)
    #[serde(rename = "database-path", default = "default_queue_path")]
    pub database_path: String,

    /// Connection URL (redis backend)
    #[serde(rename = "redis-url", default = "default_redis_url")]
    pub redis_url: String,

    /// Sorted-set key / table discriminator
    #[serde(rename = "queue-name", default = "default_queue_name")]
    pub queue_name: String,
}

/// Worker pool configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    /// Number of concurrent workers
    #[serde(default = "default_worker_count")]
    pub count: u32,

    /// Sleep between polls of an empty queue (milliseconds)
    #[serde(rename = "poll-interval-ms", default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database holding crawl results
    #[serde(rename = "database-path")]
    pub database_path: String,
}

fn default_max_depth() -> u32 {
    5
}

fn default_max_pages() -> u32 {
    100
}

fn default_delay() -> u64 {
    2
}

fn default_request_timeout() -> u64 {
    10
}

fn default_media_dir() -> String {
    "downloaded_media".to_string()
}

fn default_robots_timeout() -> u64 {
    10
}

fn default_agent_token() -> String {
    "*".to_string()
}

fn default_queue_path() -> String {
    "./queue.db".to_string()
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379/1".to_string()
}

fn default_queue_name() -> String {
    "request_queue".to_string()
}

fn default_worker_count() -> u32 {
    5
}

fn default_poll_interval() -> u64 {
    250
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_pages: default_max_pages(),
            delay: default_delay(),
            request_timeout: default_request_timeout(),
            media_dir: default_media_dir(),
            visited_scope: VisitedScope::default(),
        }
    }
}

impl Default for RobotsConfig {
    fn default() -> Self {
        Self {
            timeout: default_robots_timeout(),
            fail_closed: false,
            user_agent_token: default_agent_token(),
        }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            backend: QueueBackendKind::default(),
            database_path: default_queue_path(),
            redis_url: default_redis_url(),
            queue_name: default_queue_name(),
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            count: default_worker_count(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}
