//! Configuration file handling for docgate.
//!
//! This crate provides configuration loading from `.docgate.toml` files
//! with support for merging with CLI arguments and defaults.
//!
//! # Example
//!
//! ```
//! use docgate_config::load_config;
//! use std::path::Path;
//!
//! // Load config from a directory (looks for .docgate.toml)
//! let config = load_config(Path::new(".")).expect("load config");
//!
//! println!("site: {}", config.docs_site().base_url);
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use docgate_site::DEFAULT_PATTERN;
use docgate_types::{CompareMode, DEFAULT_BASE_URL, DEFAULT_BETA_SUFFIX, DocsSite};
use serde::{Deserialize, Serialize};

/// Default configuration file name
pub const CONFIG_FILE: &str = ".docgate.toml";

/// Key written to the output file when none is configured
pub const DEFAULT_OUTPUT_KEY: &str = "dry_deploy";

/// Get the config file path for a directory
pub fn config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE)
}

/// Complete docgate configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub gate: GateConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Site location with defaults filled in
    pub fn docs_site(&self) -> DocsSite {
        DocsSite::new(
            self.site.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL),
            self.site.beta_suffix.as_deref().unwrap_or(DEFAULT_BETA_SUFFIX),
        )
    }

    /// Version pattern source
    pub fn pattern(&self) -> &str {
        self.site.pattern.as_deref().unwrap_or(DEFAULT_PATTERN)
    }

    /// Request timeout; `None` leaves the fetch unbounded
    pub fn timeout(&self) -> Option<Duration> {
        self.site.timeout
    }

    pub fn compare_mode(&self) -> CompareMode {
        self.gate.compare.unwrap_or_default()
    }

    pub fn output_key(&self) -> &str {
        self.output.key.as_deref().unwrap_or(DEFAULT_OUTPUT_KEY)
    }

    pub fn output_file(&self) -> Option<&Path> {
        self.output.file.as_deref()
    }

    /// Anchor a relative `[output] file` at `base`, the directory holding
    /// the config file it was read from.
    pub fn resolve_paths(&mut self, base: &Path) {
        if let Some(file) = self.output.file.as_mut().filter(|f| f.is_relative()) {
            *file = base.join(&*file);
        }
    }

    /// Merge this config with another (other takes precedence)
    pub fn merge(&self, other: &Config) -> Config {
        Config {
            site: SiteConfig {
                base_url: other.site.base_url.clone().or_else(|| self.site.base_url.clone()),
                beta_suffix: other
                    .site
                    .beta_suffix
                    .clone()
                    .or_else(|| self.site.beta_suffix.clone()),
                pattern: other.site.pattern.clone().or_else(|| self.site.pattern.clone()),
                timeout: other.site.timeout.or(self.site.timeout),
            },
            gate: GateConfig {
                compare: other.gate.compare.or(self.gate.compare),
            },
            output: OutputConfig {
                key: other.output.key.clone().or_else(|| self.output.key.clone()),
                file: other.output.file.clone().or_else(|| self.output.file.clone()),
            },
        }
    }
}

/// Where the documentation site lives and how its version is read
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Stable site URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Appended to `base_url` for non-stable builds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beta_suffix: Option<String>,
    /// Regex with exactly one capture group holding the version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Request timeout (e.g. "30s")
    #[serde(
        default,
        with = "humantime_serde",
        skip_serializing_if = "Option::is_none"
    )]
    pub timeout: Option<Duration>,
}

/// Decision behavior
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GateConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compare: Option<CompareMode>,
}

/// Where the decision flag is written for downstream tasks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

/// Parse configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config> {
    toml::from_str(content).context("failed to parse config TOML")
}

/// Load configuration from a directory
pub fn load_config(dir: &Path) -> Result<Config> {
    load_config_from_file(&config_path(dir))
}

/// Load configuration from a specific file path
pub fn load_config_from_file(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    if let Some(dir) = path.parent() {
        config.resolve_paths(dir);
    }

    Ok(config)
}

/// Find configuration file by walking up the directory tree
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir;

    loop {
        let config_file = current.join(CONFIG_FILE);
        if config_file.exists() {
            return Some(config_file);
        }

        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}
