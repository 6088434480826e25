//! HTTP fetcher implementation
//!
//! This module handles all page requests for the crawler:
//! - Building HTTP clients with proper user agent strings
//! - GET requests with a per-request timeout
//! - Error classification into network and status failures

use crate::config::UserAgentConfig;
use crate::crawler::media::ContentKind;
use reqwest::{redirect::Policy, Client, StatusCode};
use std::borrow::Cow;
use std::time::Duration;
use url::Url;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// The server answered 200 OK
    Success {
        /// Final URL after redirects
        final_url: String,
        /// Content-Type header value, empty when absent
        content_type: String,
        /// Response body, decoded unless the content type is media
        body: PageBody,
    },

    /// The server answered with any status other than 200
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, truncated body, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

/// A response body as read from the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageBody {
    /// Text decoded with the charset declared in `Content-Type`, UTF-8 if none
    Text(String),
    /// Raw bytes of a media payload
    Binary(Vec<u8>),
}

impl PageBody {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Binary(bytes) => bytes,
        }
    }

    /// The body as text; binary payloads are decoded lossily as UTF-8
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Text(text) => Cow::Borrowed(text),
            Self::Binary(bytes) => String::from_utf8_lossy(bytes),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Default timeout for every request made with the client
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use crawlq::config::UserAgentConfig;
/// use crawlq::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "crawlq".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(10)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL with a bounded timeout
///
/// | Condition | Result |
/// |-----------|--------|
/// | HTTP 200 | Success |
/// | Any other status | HttpError |
/// | Timeout, connect failure, body read failure | NetworkError |
pub async fn fetch_page(client: &Client, url: &Url, timeout: Duration) -> FetchResult {
    let response = match client.get(url.clone()).timeout(timeout).send().await {
        Ok(response) => response,
        Err(e) => {
            return FetchResult::NetworkError {
                error: describe_error(&e),
            }
        }
    };

    let status = response.status();
    if status != StatusCode::OK {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let body = match ContentKind::from_header(&content_type) {
        ContentKind::Media => response
            .bytes()
            .await
            .map(|bytes| PageBody::Binary(bytes.to_vec())),
        ContentKind::Html | ContentKind::Unknown => {
            response.text_with_charset("utf-8").await.map(PageBody::Text)
        }
    };

    match body {
        Ok(body) => FetchResult::Success {
            final_url,
            content_type,
            body,
        },
        Err(e) => FetchResult::NetworkError {
            error: describe_error(&e),
        },
    }
}

fn describe_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        format!("Request timeout: {}", error)
    } else if error.is_connect() {
        format!("Connection failed: {}", error)
    } else {
        error.to_string()
    }
}
