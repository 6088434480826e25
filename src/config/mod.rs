//! Configuration module for crawlq
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use crawlq::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawlq.toml")).unwrap();
//! println!("Workers: {}", config.workers.count);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, OutputConfig, QueueBackendKind, QueueConfig, RobotsConfig,
    UserAgentConfig, VisitedScope, WorkerConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
