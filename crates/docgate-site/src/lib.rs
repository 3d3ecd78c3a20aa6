//! Documentation site client for docgate.
//!
//! This crate fetches the landing page of a published documentation site and
//! recovers the version the site reports about itself.
//!
//! # Example
//!
//! ```no_run
//! use docgate_site::{SiteClient, SiteSource, VersionPattern, DEFAULT_PATTERN};
//!
//! let client = SiteClient::new("https://protelis.github.io/wiki").expect("client");
//! let pattern = VersionPattern::new(DEFAULT_PATTERN).expect("pattern");
//!
//! let versions = client
//!     .fetch()
//!     .map(|body| pattern.scan(&body))
//!     .unwrap_or_default();
//! ```

use std::time::Duration;

use anyhow::{Context, Result};
use regex::Regex;

/// Pattern matching the "Currently <version>. Created" footer the site
/// generator renders on every page.
pub const DEFAULT_PATTERN: &str = r".*Currently\s*(.+)\.\s*Created";

/// Default user agent for site requests
pub const USER_AGENT: &str = concat!("docgate/", env!("CARGO_PKG_VERSION"));

/// Anything that can hand back the landing page of a documentation site.
///
/// The gate only ever talks to this trait, so tests and offline runs can
/// swap the network for canned content.
pub trait SiteSource {
    /// URL reported in status lines.
    fn url(&self) -> &str;

    /// Fetch the full page body.
    fn fetch(&self) -> Result<String>;
}

/// Blocking HTTP client for a documentation site.
#[derive(Debug, Clone)]
pub struct SiteClient {
    url: String,
    timeout: Option<Duration>,
    client: reqwest::blocking::Client,
}

impl SiteClient {
    /// Create a client for the given site URL with no request timeout.
    pub fn new(url: &str) -> Result<Self> {
        Self::build(url, None)
    }

    /// Create a client that gives up after `timeout`.
    pub fn with_timeout(url: &str, timeout: Duration) -> Result<Self> {
        Self::build(url, Some(timeout))
    }

    fn build(url: &str, timeout: Option<Duration>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            url: url.to_string(),
            timeout,
            client,
        })
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Fetch the landing page. Any non-success status is an error.
    pub fn fetch_landing_page(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .with_context(|| format!("failed to send request to {}", self.url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow::anyhow!(
                "unexpected status while fetching {}: {status}",
                self.url
            ));
        }

        response
            .text()
            .context("failed to read site response body")
    }
}

impl SiteSource for SiteClient {
    fn url(&self) -> &str {
        &self.url
    }

    fn fetch(&self) -> Result<String> {
        self.fetch_landing_page()
    }
}

/// A site whose content is already known, such as a saved page or a fixture.
#[derive(Debug, Clone)]
pub struct CannedSite {
    url: String,
    body: Option<String>,
}

impl CannedSite {
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: Some(body.into()),
        }
    }

    /// A site that fails every fetch, as an unreachable host would.
    pub fn unreachable(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: None,
        }
    }
}

impl SiteSource for CannedSite {
    fn url(&self) -> &str {
        &self.url
    }

    fn fetch(&self) -> Result<String> {
        self.body
            .clone()
            .ok_or_else(|| anyhow::anyhow!("site unreachable: {}", self.url))
    }
}

/// Errors raised while compiling a version pattern.
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("invalid version pattern: {0}")]
    Invalid(#[from] regex::Error),
    #[error("version pattern '{pattern}' must have exactly one capture group, found {found}")]
    CaptureGroups { pattern: String, found: usize },
}

/// Line-oriented version extractor.
#[derive(Debug, Clone)]
pub struct VersionPattern {
    regex: Regex,
}

impl VersionPattern {
    /// Compile a pattern. It must contain exactly one capture group, which
    /// holds the version.
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        let regex = Regex::new(pattern)?;
        // captures_len counts the implicit whole-match group
        let found = regex.captures_len() - 1;
        if found != 1 {
            return Err(PatternError::CaptureGroups {
                pattern: pattern.to_string(),
                found,
            });
        }
        Ok(Self { regex })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Every version found in `body`, one per matching line, in page order.
    ///
    /// Lines end at `\n`, `\r\n` or a lone `\r`. Only the first match on
    /// each line counts.
    pub fn scan(&self, body: &str) -> Vec<String> {
        body.split(['\r', '\n'])
            .filter_map(|line| self.regex.captures(line))
            .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
            .collect()
    }
}
