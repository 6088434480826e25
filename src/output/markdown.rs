//! Markdown export of an owner's crawl data
//!
//! Every stored field passes through [`sanitize_text`] so NUL bytes and
//! control characters picked up from crawled pages never reach the report.

use crate::output::OutputResult;
use crate::storage::{sanitize_text, FailureRecord, StoredResult};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes an owner's report to `output_path`
///
/// # Arguments
///
/// * `owner` - The owner the data belongs to
/// * `results` - The owner's stored pages
/// * `failures` - The owner's recorded failures
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(OutputError)` - Failed to write the report
pub fn generate_owner_report(
    owner: &str,
    results: &[StoredResult],
    failures: &[FailureRecord],
    output_path: &Path,
) -> OutputResult<()> {
    let markdown = format_owner_report(owner, results, failures);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats an owner's pages and failures as markdown
pub fn format_owner_report(
    owner: &str,
    results: &[StoredResult],
    failures: &[FailureRecord],
) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Crawl Data for {}\n\n", sanitize_text(owner)));
    md.push_str(&format!("- **Pages**: {}\n", results.len()));
    md.push_str(&format!("- **Failures**: {}\n\n", failures.len()));

    for stored in results {
        let page = &stored.result;
        md.push_str(&format!("## URL: {}\n\n", sanitize_text(&page.url)));
        md.push_str(&format!("- **Title**: {}\n", sanitize_text(&page.title)));
        md.push_str(&format!(
            "- **Content Type**: {}\n",
            sanitize_text(&page.content_type)
        ));
        md.push_str(&format!("- **Crawled**: {}\n", page.crawled_at.to_rfc3339()));
        md.push_str(&format!(
            "- **File Path**: {}\n",
            page.media_file_path
                .as_deref()
                .map(sanitize_text)
                .unwrap_or_else(|| "N/A".to_string())
        ));
        let links: Vec<String> = page.links.iter().map(|l| sanitize_text(l)).collect();
        md.push_str(&format!("- **Links**: {}\n\n", links.join(", ")));
        md.push_str(&format!("{}\n\n", sanitize_text(&page.content)));
    }

    if !failures.is_empty() {
        md.push_str("## Failures\n\n");
        md.push_str("| URL | Kind | Detail |\n");
        md.push_str("|-----|------|--------|\n");

        for failure in failures {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                sanitize_text(&failure.error.url),
                failure.error.kind.as_str(),
                sanitize_text(&failure.error.detail)
            ));
        }
        md.push('\n');
    }

    md
}
