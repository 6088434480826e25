//! Content-type classification and media persistence

use crate::url::media_file_name;
use std::path::{Path, PathBuf};
use url::Url;

/// Coarse classification of a response's declared MIME type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Html,
    /// Images and `application/*` payloads, written to the media directory
    Media,
    Unknown,
}

impl ContentKind {
    /// Classifies a `Content-Type` header value
    ///
    /// Matching is by substring, so `image/png; charset=binary` and
    /// `application/pdf` are both media. Note that `application/xhtml+xml`
    /// counts as media too; the page is still parsed as HTML afterwards.
    pub fn from_header(content_type: &str) -> Self {
        let lowered = content_type.to_ascii_lowercase();
        if lowered.contains("image") || lowered.contains("application") {
            Self::Media
        } else if lowered.contains("text/html") {
            Self::Html
        } else {
            Self::Unknown
        }
    }
}

/// Writes a media payload under `media_dir`, named after the URL's last
/// path segment
///
/// The directory is created on first use. An existing file with the same
/// name is overwritten.
pub async fn save_media(media_dir: &Path, url: &Url, body: &[u8]) -> std::io::Result<PathBuf> {
    tokio::fs::create_dir_all(media_dir).await?;
    let path = media_dir.join(media_file_name(url));
    tokio::fs::write(&path, body).await?;
    Ok(path)
}
