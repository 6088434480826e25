//! HTML parser for extracting text and references
//!
//! This module handles parsing HTML content to extract:
//! - The page title
//! - Visible text from headings and paragraphs
//! - Raw anchor hrefs and image srcs
//! - Anchor hrefs that resolve to the page's own authority

use crate::url::authority;
use scraper::{Html, Selector};
use url::Url;

/// Title reported for pages without a usable `<title>`
pub const NO_TITLE: &str = "No title";

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedPage {
    /// First `<title>` text, or [`NO_TITLE`]
    pub title: String,

    /// `h1` text, then `h2` text, then `p` text, joined with single spaces
    pub text: String,

    /// Non-empty `href` values of `<a>` elements, as written
    pub hrefs: Vec<String>,

    /// Non-empty `src` values of `<img>` elements, as written
    pub image_srcs: Vec<String>,

    /// Anchor hrefs resolved against the page URL that stay on its authority
    pub internal_links: Vec<String>,
}

/// Parses HTML content and extracts title, text and references
///
/// Parsing is lenient: any byte soup yields a page, possibly empty.
///
/// # Example
///
/// ```
/// use crawlq::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Hi</title></head><body><p>Hello</p><a href="/next">n</a></body></html>"#;
/// let page_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &page_url);
/// assert_eq!(parsed.title, "Hi");
/// assert_eq!(parsed.text, "Hello");
/// assert_eq!(parsed.internal_links, vec!["https://example.com/next".to_string()]);
/// ```
pub fn parse_html(html: &str, page_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    let title = extract_title(&document).unwrap_or_else(|| NO_TITLE.to_string());

    let mut parts = extract_text(&document, "h1");
    parts.extend(extract_text(&document, "h2"));
    parts.extend(extract_text(&document, "p"));
    let text = parts.join(" ");

    let hrefs = extract_attribute(&document, "a[href]", "href");
    let image_srcs = extract_attribute(&document, "img[src]", "src");
    let internal_links = resolve_internal(&hrefs, page_url);

    ParsedPage {
        title,
        text,
        hrefs,
        image_srcs,
        internal_links,
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Trimmed, non-empty text of every element matching `tag`
fn extract_text(document: &Html, tag: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(tag) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn extract_attribute(document: &Html, selector: &str, attribute: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(selector) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr(attribute))
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

/// Resolves hrefs against the page URL and keeps those on the same authority
fn resolve_internal(hrefs: &[String], page_url: &Url) -> Vec<String> {
    let Some(domain) = authority(page_url) else {
        return Vec::new();
    };

    hrefs
        .iter()
        .filter_map(|href| page_url.join(href.trim()).ok())
        .filter(|resolved| authority(resolved).as_deref() == Some(domain.as_str()))
        .map(|resolved| resolved.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_url() -> Url {
        Url::parse("https://example.com/page").unwrap()
    }

    #[test]
    fn test_extract_title() {
        let html = r#"<html><head><title>Test Page</title></head><body></body></html>"#;
        let parsed = parse_html(html, &page_url());
        assert_eq!(parsed.title, "Test Page");
    }

    #[test]
    fn test_extract_title_with_whitespace() {
        let html = r#"<html><head><title>  Test Page  </title></head><body></body></html>"#;
        let parsed = parse_html(html, &page_url());
        assert_eq!(parsed.title, "Test Page");
    }

    #[test]
    fn test_no_title_fallback() {
        let html = r#"<html><head></head><body></body></html>"#;
        let parsed = parse_html(html, &page_url());
        assert_eq!(parsed.title, NO_TITLE);
    }

    #[test]
    fn test_blank_title_fallback() {
        let html = r#"<html><head><title>   </title></head></html>"#;
        let parsed = parse_html(html, &page_url());
        assert_eq!(parsed.title, NO_TITLE);
    }

    #[test]
    fn test_headings_before_paragraphs() {
        let html = r#"<html><body>
            <p> First paragraph </p>
            <h2>Sub</h2>
            <h1>Main</h1>
            <p>Second</p>
        </body></html>"#;
        let parsed = parse_html(html, &page_url());
        assert_eq!(parsed.text, "Main Sub First paragraph Second");
    }

    #[test]
    fn test_single_paragraph() {
        let html = r#"<html><head><title>Hi</title></head><body><p>Hello</p></body></html>"#;
        let parsed = parse_html(html, &page_url());
        assert_eq!(parsed.title, "Hi");
        assert_eq!(parsed.text, "Hello");
    }

    #[test]
    fn test_other_elements_are_not_text() {
        let html = r#"<html><body><div>ignored</div><span>also ignored</span></body></html>"#;
        let parsed = parse_html(html, &page_url());
        assert_eq!(parsed.text, "");
    }

    #[test]
    fn test_hrefs_kept_raw() {
        let html = r#"<html><body>
            <a href="/relative">R</a>
            <a href="https://other.com/page">O</a>
            <a href="mailto:test@example.com">M</a>
            <a href="">empty</a>
            <a>no href</a>
        </body></html>"#;
        let parsed = parse_html(html, &page_url());
        assert_eq!(
            parsed.hrefs,
            vec![
                "/relative".to_string(),
                "https://other.com/page".to_string(),
                "mailto:test@example.com".to_string(),
            ]
        );
    }

    #[test]
    fn test_image_srcs() {
        let html = r#"<html><body><img src="/a.png"><img src="https://cdn.com/b.jpg"><img alt="x"></body></html>"#;
        let parsed = parse_html(html, &page_url());
        assert_eq!(
            parsed.image_srcs,
            vec!["/a.png".to_string(), "https://cdn.com/b.jpg".to_string()]
        );
    }

    #[test]
    fn test_internal_links_resolved() {
        let html = r#"<html><body>
            <a href="/about">A</a>
            <a href="contact">C</a>
            <a href="https://example.com/full">F</a>
            <a href="https://www.example.com/www">W</a>
            <a href="https://other.com/x">X</a>
            <a href="javascript:void(0)">J</a>
        </body></html>"#;
        let parsed = parse_html(html, &page_url());
        assert_eq!(
            parsed.internal_links,
            vec![
                "https://example.com/about".to_string(),
                "https://example.com/contact".to_string(),
                "https://example.com/full".to_string(),
            ]
        );
    }

    #[test]
    fn test_binary_garbage_does_not_panic() {
        let bytes = [0x89u8, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0xff];
        let html = String::from_utf8_lossy(&bytes);
        let parsed = parse_html(&html, &page_url());
        assert_eq!(parsed.title, NO_TITLE);
        assert!(parsed.hrefs.is_empty());
    }
}
