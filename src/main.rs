//! crawlq main entry point
//!
//! This is the command-line interface for the crawlq crawling engine.

use anyhow::Context;
use clap::{Parser, Subcommand};
use crawlq::config::{load_config_with_hash, Config};
use crawlq::crawler::{build_http_client, CrawlerSettings, WebCrawler};
use crawlq::output::export_owner_data;
use crawlq::queue::{OwnerId, RequestQueue};
use crawlq::robots::RobotsCache;
use crawlq::storage::{open_result_store, sanitize_text, ResultStore};
use crawlq::worker::{CrawlService, DEFAULT_CONTENT_TYPE};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// crawlq: a priority-ordered, polite web crawler
///
/// URLs are queued with a content-type hint and drained by a pool of
/// workers, HTML first. Every fetch honours robots.txt; extracted text,
/// links and media land in a SQLite result database.
#[derive(Parser, Debug)]
#[command(name = "crawlq")]
#[command(version = "1.0.0")]
#[command(about = "A priority-ordered, polite web crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the worker pool and crawl until interrupted
    Run,

    /// Add a URL to the request queue
    Enqueue {
        url: String,

        /// Owner the results are stored for
        #[arg(long)]
        owner: String,

        /// Priority hint: html, image, video or other
        #[arg(long, default_value = DEFAULT_CONTENT_TYPE)]
        content_type: String,
    },

    /// List queued tasks in dispatch order
    Queue,

    /// Show stored results for an owner
    Results {
        #[arg(long)]
        owner: String,

        /// Only pages whose title or content type contains this term
        #[arg(long)]
        search: Option<String>,

        /// Print failed attempts instead of pages
        #[arg(long)]
        failures: bool,
    },

    /// Write an owner's stored data to a markdown file
    Export {
        #[arg(long)]
        owner: String,

        /// Destination file
        #[arg(long, short)]
        output: PathBuf,
    },

    /// Crawl a single URL immediately and print the outcome as JSON
    Crawl { url: String },

    /// Validate the configuration and print the effective settings
    Check,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let outcome = match cli.command {
        Command::Run => handle_run(&config).await,
        Command::Enqueue {
            url,
            owner,
            content_type,
        } => handle_enqueue(&config, &url, &owner, &content_type).await,
        Command::Queue => handle_queue(&config).await,
        Command::Results {
            owner,
            search,
            failures,
        } => handle_results(&config, &owner, search.as_deref(), failures),
        Command::Export { owner, output } => handle_export(&config, &owner, &output),
        Command::Crawl { url } => handle_crawl(&config, &url).await,
        Command::Check => {
            handle_check(&config);
            Ok(())
        }
    };

    if let Err(e) = outcome {
        tracing::error!("{:#}", e);
        return Err(e.into());
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("crawlq=info,warn"),
            1 => EnvFilter::new("crawlq=debug,info"),
            2 => EnvFilter::new("crawlq=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Parses an owner argument, keeping numeric ids numeric on the wire
fn parse_owner(raw: &str) -> OwnerId {
    raw.parse::<i64>()
        .map(OwnerId::Numeric)
        .unwrap_or_else(|_| OwnerId::Text(raw.to_string()))
}

/// Handles `run`: drains the queue until Ctrl-C
async fn handle_run(config: &Config) -> anyhow::Result<()> {
    let service = CrawlService::start(config)
        .await
        .context("Failed to start crawl service")?;
    tracing::info!(
        "Crawler {} with {} workers; press Ctrl-C to stop",
        service.status(),
        config.workers.count
    );

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    tracing::info!("Received Ctrl+C, shutting down");

    service.stop().await;
    Ok(())
}

/// Handles `enqueue`: adds one task without starting workers
async fn handle_enqueue(
    config: &Config,
    url: &str,
    owner: &str,
    content_type: &str,
) -> anyhow::Result<()> {
    let queue = RequestQueue::open(&config.queue)
        .await
        .context("Failed to open request queue")?;

    if queue.add(parse_owner(owner), url, content_type).await? {
        println!("URL added to queue: {}", url);
    } else {
        println!("URL already queued: {}", url);
    }
    Ok(())
}

/// Handles `queue`: prints pending tasks
async fn handle_queue(config: &Config) -> anyhow::Result<()> {
    let queue = RequestQueue::open(&config.queue)
        .await
        .context("Failed to open request queue")?;
    let entries = queue.snapshot().await?;

    println!("{} queued task(s)\n", entries.len());
    for entry in entries {
        match entry.task() {
            Some(task) => println!(
                "{:>18.3}  {:<6} {:<8} {}",
                entry.score, task.user_id, task.content_type, task.url
            ),
            None => println!("{:>18.3}  (malformed) {}", entry.score, entry.payload),
        }
    }
    Ok(())
}

/// Handles `results`: prints stored pages or failures for one owner
fn handle_results(
    config: &Config,
    owner: &str,
    search: Option<&str>,
    failures: bool,
) -> anyhow::Result<()> {
    let store = open_result_store(Path::new(&config.output.database_path))
        .context("Failed to open result database")?;
    let owner = parse_owner(owner);

    if failures {
        let records = store.failures(&owner)?;
        println!("{} failure(s) for {}\n", records.len(), owner);
        for record in records {
            println!(
                "{}  {}  {}  {}",
                record.recorded_at.to_rfc3339(),
                record.error.kind.as_str(),
                sanitize_text(&record.error.url),
                sanitize_text(&record.error.detail)
            );
        }
        return Ok(());
    }

    let results = store.query(&owner, search)?;
    println!("{} result(s) for {}\n", results.len(), owner);
    for stored in results {
        let page = stored.result;
        println!("{}", sanitize_text(&page.url));
        println!("  Title: {}", sanitize_text(&page.title));
        println!("  Content type: {}", sanitize_text(&page.content_type));
        println!("  Crawled: {}", page.crawled_at.to_rfc3339());
        if let Some(path) = &page.media_file_path {
            println!("  Media: {}", sanitize_text(path));
        }
        println!("  Links: {}", page.links.len());
    }
    Ok(())
}

/// Handles `export`: writes an owner's data as markdown
fn handle_export(config: &Config, owner: &str, output: &Path) -> anyhow::Result<()> {
    let store = open_result_store(Path::new(&config.output.database_path))
        .context("Failed to open result database")?;
    let pages = export_owner_data(&store, &parse_owner(owner), output)?;

    println!("✓ Exported {} page(s) to: {}", pages, output.display());
    Ok(())
}

/// Handles `crawl`: one-shot crawl outside the queue
async fn handle_crawl(config: &Config, url: &str) -> anyhow::Result<()> {
    let client = build_http_client(
        &config.user_agent,
        Duration::from_secs(config.crawler.request_timeout),
    )
    .context("Failed to build HTTP client")?;
    let robots = Arc::new(RobotsCache::new(
        client.clone(),
        Duration::from_secs(config.robots.timeout),
        config.robots.fail_closed,
    ));
    let crawler = WebCrawler::new(
        url,
        Arc::new(CrawlerSettings::from_config(config)),
        client,
        robots,
    );

    match crawler.crawl(url).await {
        Some(outcome) => println!("{}", serde_json::to_string_pretty(&outcome)?),
        None => println!("Skipped {}: disallowed by robots.txt", url),
    }
    Ok(())
}

/// Handles `check`: prints the effective configuration
fn handle_check(config: &Config) {
    println!("=== crawlq Configuration ===\n");

    println!("Crawler:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Delay: {}s", config.crawler.delay);
    println!("  Request timeout: {}s", config.crawler.request_timeout);
    println!("  Media directory: {}", config.crawler.media_dir);
    println!("  Visited scope: {:?}", config.crawler.visited_scope);

    println!("\nRobots:");
    println!("  Timeout: {}s", config.robots.timeout);
    println!("  Fail closed: {}", config.robots.fail_closed);
    println!("  User-agent token: {}", config.robots.user_agent_token);

    println!("\nUser Agent:");
    println!("  Header: {}", config.user_agent.header_value());

    println!("\nQueue:");
    println!("  Backend: {:?}", config.queue.backend);
    println!("  Database: {}", config.queue.database_path);
    println!("  Redis URL: {}", config.queue.redis_url);
    println!("  Name: {}", config.queue.queue_name);

    println!("\nWorkers:");
    println!("  Count: {}", config.workers.count);
    println!("  Poll interval: {}ms", config.workers.poll_interval_ms);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\n✓ Configuration is valid");
}
