use url::Url;

/// Returns the authority of a URL: its host, plus the port when one is
/// given explicitly
///
/// This is the "domain" a page belongs to for internal-link checks and
/// robots.txt lookups. Default ports are dropped by the URL parser, so
/// `https://example.com:443/` yields `example.com`.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use crawlq::url::authority;
///
/// let url = Url::parse("https://example.com/path").unwrap();
/// assert_eq!(authority(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(authority(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn authority(url: &Url) -> Option<String> {
    let host = url.host_str().filter(|h| !h.is_empty())?;
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host.to_string()),
    }
}

/// Builds the robots.txt URL for the site hosting `url`
pub fn robots_url(url: &Url) -> Option<Url> {
    let authority = authority(url)?;
    Url::parse(&format!("{}://{}/robots.txt", url.scheme(), authority)).ok()
}

/// Derives a file name for a downloaded media payload
///
/// The name is the URL's final path segment. A path ending in `/` yields
/// `index`. Characters outside `[A-Za-z0-9._-]` are replaced with `_` so the
/// name cannot escape the media directory.
pub fn media_file_name(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or("");

    let cleaned: String = segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "index".to_string()
    } else {
        cleaned
    }
}
