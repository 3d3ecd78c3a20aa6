//! Git-derived build versions for docgate.
//!
//! The build version is computed from the nearest reachable tag, the number
//! of commits since that tag, and the current commit:
//!
//! - exactly on a tag with a clean tree: the tag itself (`2.4.0`)
//! - past a tag: `<tag>-dev<distance>+<hash>` (`2.4.0-dev3+0a1b2c3`)
//! - no tag at all: `0.1.0-archeo+<hash>`
//!
//! A dirty working tree appends `.dirty` to the build metadata.
//!
//! # Example
//!
//! ```no_run
//! use docgate_git::compute_build_version;
//! use std::path::Path;
//!
//! let version = compute_build_version(Path::new(".")).expect("version");
//! println!("building {version}");
//! ```

use std::env;
use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, bail};
use docgate_types::BuildVersion;

/// Overrides the git executable.
pub const GIT_BIN_ENV: &str = "DOCGATE_GIT_BIN";

/// Version used when no tag is reachable from HEAD.
pub const ARCHEO_VERSION: &str = "0.1.0";

/// Source-control facts a build version is derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitVersionInfo {
    /// Nearest tag, without a leading `v`
    pub tag: Option<String>,
    /// Commits between the tag and HEAD
    pub distance: u64,
    /// Abbreviated HEAD commit
    pub commit: String,
    pub dirty: bool,
}

impl GitVersionInfo {
    /// Render the build version for these facts.
    pub fn build_version(&self) -> BuildVersion {
        let mut metadata = self.commit.clone();
        if self.dirty {
            metadata.push_str(".dirty");
        }

        let version = match &self.tag {
            Some(tag) if self.distance == 0 && !self.dirty => tag.clone(),
            Some(tag) => format!("{tag}-dev{}+{metadata}", self.distance),
            None => format!("{ARCHEO_VERSION}-archeo+{metadata}"),
        };
        BuildVersion::new(version)
    }
}

/// Output of `git describe --tags --long`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Describe {
    pub tag: String,
    pub distance: u64,
    pub commit: String,
}

/// Parse `<tag>-<distance>-g<hash>`. Tags may themselves contain dashes.
pub fn parse_describe(raw: &str) -> Option<Describe> {
    let mut parts = raw.trim().rsplitn(3, '-');
    let hash = parts.next()?.strip_prefix('g')?;
    let distance = parts.next()?.parse::<u64>().ok()?;
    let tag = parts.next()?;
    if tag.is_empty() || hash.is_empty() {
        return None;
    }

    Some(Describe {
        tag: tag.to_string(),
        distance,
        commit: hash.to_string(),
    })
}

/// Strip a conventional `v` prefix from a release tag.
pub fn normalize_tag(tag: &str) -> &str {
    match tag.strip_prefix('v') {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => rest,
        _ => tag,
    }
}

/// Check if we're inside a git repository
pub fn is_git_repo(path: &Path) -> bool {
    Command::new(git_program())
        .args(["rev-parse", "--is-inside-work-tree"])
        .current_dir(path)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Check if the git working tree is clean (untracked files count as dirty)
pub fn is_git_clean(path: &Path) -> Result<bool> {
    let output = Command::new(git_program())
        .args(["status", "--porcelain"])
        .current_dir(path)
        .output()
        .context("failed to run git status")?;

    if !output.status.success() {
        bail!(
            "git status failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(output.stdout.is_empty())
}

/// Abbreviated hash of HEAD
pub fn short_commit(path: &Path) -> Result<String> {
    let output = Command::new(git_program())
        .args(["rev-parse", "--short=7", "HEAD"])
        .current_dir(path)
        .output()
        .context("failed to run git rev-parse")?;

    if !output.status.success() {
        bail!(
            "git rev-parse failed (does the repository have any commits?): {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Describe HEAD relative to the nearest tag, or `None` when no tag is
/// reachable.
pub fn describe(path: &Path) -> Result<Option<Describe>> {
    let output = Command::new(git_program())
        .args(["describe", "--tags", "--long", "--abbrev=7"])
        .current_dir(path)
        .output()
        .context("failed to run git describe")?;

    if !output.status.success() {
        return Ok(None);
    }

    let raw = String::from_utf8_lossy(&output.stdout);
    Ok(parse_describe(&raw))
}

/// Collect everything needed to version the build at `path`.
pub fn version_info(path: &Path) -> Result<GitVersionInfo> {
    if !is_git_repo(path) {
        bail!("not a git repository: {}", path.display());
    }

    let commit = short_commit(path)?;
    let dirty = !is_git_clean(path)?;
    let info = match describe(path)? {
        Some(d) => GitVersionInfo {
            tag: Some(normalize_tag(&d.tag).to_string()),
            distance: d.distance,
            commit,
            dirty,
        },
        None => GitVersionInfo {
            tag: None,
            distance: 0,
            commit,
            dirty,
        },
    };
    Ok(info)
}

/// Compute the build version for the repository at `path`.
pub fn compute_build_version(path: &Path) -> Result<BuildVersion> {
    Ok(version_info(path)?.build_version())
}

fn git_program() -> String {
    env::var(GIT_BIN_ENV).unwrap_or_else(|_| "git".to_string())
}
