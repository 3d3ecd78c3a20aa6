//! Core domain types for docgate.
//!
//! This crate provides the values that flow through the deployment gate:
//! the build version under test, what the live documentation site reports,
//! and the resulting deploy/dry-run decision.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Default landing page of the stable documentation site.
pub const DEFAULT_BASE_URL: &str = "https://protelis.github.io/wiki";

/// Suffix appended to the site URL for non-stable builds.
pub const DEFAULT_BETA_SUFFIX: &str = "-beta";

/// Version string computed for the current build.
///
/// Immutable once computed; the gate receives it explicitly instead of
/// reading any process-wide version state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildVersion(String);

impl BuildVersion {
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A build is stable when its version is a bare `MAJOR.MINOR.PATCH`
    /// triple of ASCII digits, with no pre-release or build metadata.
    pub fn is_stable(&self) -> bool {
        static STABLE_RE: OnceLock<Option<Regex>> = OnceLock::new();
        STABLE_RE
            .get_or_init(|| Regex::new(r"^[0-9]+(\.[0-9]+){2}$").ok())
            .as_ref()
            .is_some_and(|re| re.is_match(&self.0))
    }
}

impl fmt::Display for BuildVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BuildVersion {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for BuildVersion {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// What the live site reported about its own version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "versions", rename_all = "snake_case")]
pub enum SiteVersion {
    /// Nothing matched, or the page could not be fetched.
    Unknown,
    /// Exactly one version was found.
    Single(String),
    /// More than one version was found; the gate refuses to guess.
    Ambiguous(Vec<String>),
}

impl SiteVersion {
    /// Classify the ordered list of versions scraped from the site.
    pub fn from_matches(mut matches: Vec<String>) -> Self {
        match matches.len() {
            0 => SiteVersion::Unknown,
            1 => SiteVersion::Single(matches.remove(0)),
            _ => SiteVersion::Ambiguous(matches),
        }
    }

    /// All versions that were scraped, in page order.
    pub fn versions(&self) -> Vec<&str> {
        match self {
            SiteVersion::Unknown => Vec::new(),
            SiteVersion::Single(v) => vec![v.as_str()],
            SiteVersion::Ambiguous(vs) => vs.iter().map(String::as_str).collect(),
        }
    }

    pub fn single(&self) -> Option<&str> {
        match self {
            SiteVersion::Single(v) => Some(v),
            _ => None,
        }
    }
}

/// How a build version is compared against the published one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareMode {
    /// Plain byte-wise string comparison (`"10.0.0" < "9.0.0"`).
    #[default]
    Lexicographic,
    /// Numeric `MAJOR.MINOR.PATCH` comparison, falling back to
    /// lexicographic when either side does not parse.
    Semantic,
}

impl fmt::Display for CompareMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareMode::Lexicographic => write!(f, "lexicographic"),
            CompareMode::Semantic => write!(f, "semantic"),
        }
    }
}

impl std::str::FromStr for CompareMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lexicographic" | "string" => Ok(CompareMode::Lexicographic),
            "semantic" | "semver" => Ok(CompareMode::Semantic),
            other => Err(format!(
                "unknown compare mode '{other}' (expected 'lexicographic' or 'semantic')"
            )),
        }
    }
}

/// Location of the documentation site, split into the stable base URL and
/// the suffix used for pre-release builds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocsSite {
    pub base_url: String,
    pub beta_suffix: String,
}

impl DocsSite {
    pub fn new(base_url: impl Into<String>, beta_suffix: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            beta_suffix: beta_suffix.into(),
        }
    }

    /// URL of the site the given build would deploy to.
    pub fn url_for(&self, version: &BuildVersion) -> String {
        self.url(version.is_stable())
    }

    /// URL of the stable site, or of the beta site when `stable` is false.
    pub fn url(&self, stable: bool) -> String {
        if stable {
            self.base_url.clone()
        } else {
            format!("{}{}", self.base_url, self.beta_suffix)
        }
    }
}

impl Default for DocsSite {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, DEFAULT_BETA_SUFFIX)
    }
}

/// Outcome of one gate evaluation. Never persisted by the gate itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentDecision {
    /// URL that was probed.
    pub site_url: String,
    pub build_version: BuildVersion,
    pub site_version: SiteVersion,
    pub compare: CompareMode,
    /// True when the site should actually be pushed.
    pub deploy: bool,
    /// Human-readable status line for the build log.
    pub message: String,
}

impl DeploymentDecision {
    pub fn is_dry_run(&self) -> bool {
        !self.deploy
    }

    /// `deploy` serialized the way downstream tasks read it.
    pub fn deploy_flag(&self) -> &'static str {
        bool_flag(self.deploy)
    }

    /// `dry_deploy` serialized the way downstream tasks read it.
    pub fn dry_deploy_flag(&self) -> &'static str {
        bool_flag(!self.deploy)
    }
}

fn bool_flag(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}
