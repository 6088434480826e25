//! Robots.txt rule evaluation
//!
//! This module wraps the robotstxt crate's matcher behind a small type that
//! also represents the two fallback policies (allow all, disallow all) used
//! when no robots.txt could be read.

use robotstxt::DefaultMatcher;

/// Parsed robots.txt data
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    /// Raw robots.txt content
    content: String,
    rule: Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fallback {
    /// Evaluate `content`
    None,
    AllowAll,
    DisallowAll,
}

impl ParsedRobots {
    /// Creates a new ParsedRobots from raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
            rule: Fallback::None,
        }
    }

    /// Creates a permissive ParsedRobots that allows everything
    ///
    /// This is used when robots.txt is absent or could not be fetched.
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
            rule: Fallback::AllowAll,
        }
    }

    /// Creates a ParsedRobots that refuses everything
    pub fn disallow_all() -> Self {
        Self {
            content: String::new(),
            rule: Fallback::DisallowAll,
        }
    }

    /// Returns the raw robots.txt content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Checks if a URL is allowed for the given user agent
    ///
    /// # Arguments
    ///
    /// * `url` - The absolute URL to check
    /// * `user_agent` - The user agent token (`*` matches the global group)
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        match self.rule {
            Fallback::AllowAll => true,
            Fallback::DisallowAll => false,
            Fallback::None => {
                if self.content.trim().is_empty() {
                    return true;
                }
                let mut matcher = DefaultMatcher::default();
                matcher.one_agent_allowed_by_robots(&self.content, user_agent, url)
            }
        }
    }
}
