use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use docgate_types::DeploymentDecision;
use serde::Serialize;

/// Lines handed to the downstream publishing task, in `KEY=value` form.
///
/// `key` carries the dry-run flag; `deploy` and `site_version` are always
/// written alongside it.
pub fn output_lines(key: &str, decision: &DeploymentDecision) -> Vec<String> {
    vec![
        format!("{key}={}", decision.dry_deploy_flag()),
        format!("deploy={}", decision.deploy_flag()),
        format!(
            "site_version={}",
            decision.site_version.single().unwrap_or_default()
        ),
    ]
}

/// Append the decision to an env-style output file, creating it (and its
/// parent directories) when missing.
pub fn append_output_file(path: &Path, key: &str, decision: &DeploymentDecision) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory: {}", parent.display()))?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open output file: {}", path.display()))?;

    for line in output_lines(key, decision) {
        writeln!(file, "{line}")
            .with_context(|| format!("failed to write output file: {}", path.display()))?;
    }

    Ok(())
}

/// Machine-readable form of a decision.
#[derive(Debug, Serialize)]
pub struct DecisionReport<'a> {
    #[serde(flatten)]
    pub decision: &'a DeploymentDecision,
    pub dry_deploy: bool,
    pub evaluated_at: DateTime<Utc>,
}

impl<'a> DecisionReport<'a> {
    pub fn new(decision: &'a DeploymentDecision) -> Self {
        Self {
            decision,
            dry_deploy: decision.is_dry_run(),
            evaluated_at: Utc::now(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize decision report")
    }
}
