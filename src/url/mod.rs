//! URL handling module for crawlq
//!
//! This module provides URL validation, internal/external link
//! classification, and the small amount of URL surgery the crawler needs
//! (authority extraction, robots.txt location, media file naming).

mod domain;

pub use domain::{authority, media_file_name, robots_url};

use url::Url;

/// Checks whether a string is a usable absolute URL
///
/// A URL is valid when it parses and carries both a scheme and a non-empty
/// host. Malformed input yields `false` rather than an error.
///
/// # Examples
///
/// ```
/// use crawlq::url::is_valid_url;
///
/// assert!(is_valid_url("https://example.com/path"));
/// assert!(!is_valid_url("not a url"));
/// assert!(!is_valid_url("mailto:someone@example.com"));
/// ```
pub fn is_valid_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => {
            !parsed.scheme().is_empty() && parsed.host_str().is_some_and(|h| !h.is_empty())
        }
        Err(_) => false,
    }
}

/// Checks whether a link points inside the given domain
///
/// The comparison is strict: the link's authority (host plus explicit port)
/// must equal `domain` exactly. A `www.` prefix or a different port makes
/// the link external, as does any link that fails to parse.
///
/// # Arguments
///
/// * `link` - An absolute URL
/// * `domain` - The authority to compare against, e.g. `example.com`
///
/// # Examples
///
/// ```
/// use crawlq::url::is_internal;
///
/// assert!(is_internal("https://example.com/x", "example.com"));
/// assert!(!is_internal("https://other.com/x", "example.com"));
/// assert!(!is_internal("https://www.example.com/x", "example.com"));
/// ```
pub fn is_internal(link: &str, domain: &str) -> bool {
    Url::parse(link)
        .ok()
        .and_then(|parsed| authority(&parsed))
        .is_some_and(|found| found == domain)
}
