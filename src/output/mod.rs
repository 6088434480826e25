//! Output module for exporting crawl data
//!
//! This module handles generating per-owner markdown reports from the
//! result store.

mod markdown;

pub use markdown::{format_owner_report, generate_owner_report};

use crate::queue::OwnerId;
use crate::storage::{ResultStore, StorageError};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("No data available for {0}")]
    NoData(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Exports everything stored for `owner` to a markdown file
///
/// # Returns
///
/// * `Ok(usize)` - Number of pages written
/// * `Err(OutputError::NoData)` - The owner has no stored pages or failures
pub fn export_owner_data(
    store: &dyn ResultStore,
    owner: &OwnerId,
    output_path: &Path,
) -> OutputResult<usize> {
    let results = store.query(owner, None)?;
    let failures = store.failures(owner)?;

    if results.is_empty() && failures.is_empty() {
        tracing::info!("No data available for {}", owner);
        return Err(OutputError::NoData(owner.to_string()));
    }

    generate_owner_report(&owner.to_string(), &results, &failures, output_path)?;
    tracing::info!(
        "Exported {} pages for {} to {}",
        results.len(),
        owner,
        output_path.display()
    );

    Ok(results.len())
}
