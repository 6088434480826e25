//! Robots.txt handling module
//!
//! This module fetches, parses and caches robots.txt files and answers
//! "may this URL be fetched" queries. A missing or unreachable robots.txt
//! never blocks crawling unless the caller opts into failing closed.

mod cache;
mod parser;

pub use cache::{CachedRobots, RobotsCache};
pub use parser::ParsedRobots;

use crate::url::robots_url;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// The user agent robots.txt rules are evaluated for when none is given
pub const DEFAULT_AGENT: &str = "*";

/// How a robots.txt fetch ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RobotsFetchOutcome {
    /// robots.txt was retrieved and parsed
    Found,
    /// The server answered with a 4xx status: the site has no rules
    Absent { status: u16 },
    /// Timeout, DNS or connection failure, 5xx, or an unreadable body
    Unavailable { reason: String },
}

/// Exclusion rules for one site
///
/// A checker is bound to the origin of the URL it was built for and fetches
/// that origin's robots.txt once, at construction.
#[derive(Debug, Clone)]
pub struct RobotsChecker {
    robots_url: Option<Url>,
    rules: ParsedRobots,
    outcome: RobotsFetchOutcome,
}

impl RobotsChecker {
    /// Fetches and parses robots.txt for the site hosting `base_url`
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client used for the request
    /// * `base_url` - Any URL on the site
    /// * `timeout` - Upper bound for the robots.txt request
    /// * `fail_closed` - Disallow everything when the outcome is `Unavailable`
    pub async fn fetch(client: &Client, base_url: &Url, timeout: Duration, fail_closed: bool) -> Self {
        let Some(location) = robots_url(base_url) else {
            return Self {
                robots_url: None,
                rules: ParsedRobots::allow_all(),
                outcome: RobotsFetchOutcome::Unavailable {
                    reason: format!("no host in {}", base_url),
                },
            };
        };

        let outcome = fetch_robots(client, &location, timeout).await;
        let rules = match &outcome {
            Ok(content) => ParsedRobots::from_content(content),
            Err(RobotsFetchOutcome::Absent { status }) => {
                tracing::info!("No robots.txt at {} (HTTP {}), allowing all", location, status);
                ParsedRobots::allow_all()
            }
            Err(RobotsFetchOutcome::Unavailable { reason }) if fail_closed => {
                tracing::warn!(
                    "robots.txt at {} unavailable ({}), disallowing all",
                    location,
                    reason
                );
                ParsedRobots::disallow_all()
            }
            Err(other) => {
                tracing::info!("robots.txt at {} unavailable ({:?}), allowing all", location, other);
                ParsedRobots::allow_all()
            }
        };

        Self {
            robots_url: Some(location),
            rules,
            outcome: outcome.err().unwrap_or(RobotsFetchOutcome::Found),
        }
    }

    /// Builds a checker from already known rules
    pub fn from_rules(robots_url: Option<Url>, rules: ParsedRobots) -> Self {
        Self {
            robots_url,
            rules,
            outcome: RobotsFetchOutcome::Found,
        }
    }

    /// Checks whether `url` may be fetched by `agent`
    pub fn can_fetch(&self, url: &str, agent: &str) -> bool {
        self.rules.is_allowed(url, agent)
    }

    /// Where the rules were fetched from
    pub fn robots_url(&self) -> Option<&Url> {
        self.robots_url.as_ref()
    }

    /// How the robots.txt fetch ended
    pub fn outcome(&self) -> &RobotsFetchOutcome {
        &self.outcome
    }
}

/// Fetches the raw robots.txt body
///
/// Returns the body on a 2xx answer. Every other result is classified into
/// `Absent` or `Unavailable`; `Found` is never returned as an error.
pub async fn fetch_robots(
    client: &Client,
    location: &Url,
    timeout: Duration,
) -> Result<String, RobotsFetchOutcome> {
    tracing::debug!("Fetching robots.txt: {}", location);

    let response = client
        .get(location.clone())
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| RobotsFetchOutcome::Unavailable {
            reason: e.to_string(),
        })?;

    let status = response.status();
    if status.is_client_error() {
        return Err(RobotsFetchOutcome::Absent {
            status: status.as_u16(),
        });
    }
    if !status.is_success() {
        return Err(RobotsFetchOutcome::Unavailable {
            reason: format!("HTTP {}", status.as_u16()),
        });
    }

    response
        .text()
        .await
        .map_err(|e| RobotsFetchOutcome::Unavailable {
            reason: e.to_string(),
        })
}
