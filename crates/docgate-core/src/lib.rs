//! # docgate-core
//!
//! Decides whether a freshly generated documentation site should be deployed
//! or treated as a dry run.
//!
//! The gate fetches the landing page of the currently published site, pulls
//! the version it advertises out of its "Currently `<version>`. Created"
//! footer, and compares that against the version of the current build.
//! Deployment is enabled only when exactly one published version was found
//! and the build is newer than it.
//!
//! ## Pipeline
//!
//! 1. A [`docgate_site::SiteSource`] fetches the landing page (the network
//!    client in production, canned content in tests).
//! 2. A [`docgate_site::VersionPattern`] scans the body line by line.
//! 3. [`gate::decide`] classifies the matches and compares versions.
//! 4. [`output`] hands the flag to downstream tasks and renders reports.
//!
//! ## Example
//!
//! ```no_run
//! use docgate_core::gate::{DeploymentGate, Reporter};
//! use docgate_site::{SiteClient, VersionPattern, DEFAULT_PATTERN};
//! use docgate_types::BuildVersion;
//!
//! struct Stderr;
//!
//! impl Reporter for Stderr {
//!     fn info(&mut self, msg: &str) { eprintln!("{msg}"); }
//!     fn warn(&mut self, msg: &str) { eprintln!("{msg}"); }
//!     fn error(&mut self, msg: &str) { eprintln!("{msg}"); }
//! }
//!
//! let site = SiteClient::new("https://protelis.github.io/wiki")?;
//! let gate = DeploymentGate::new(site, VersionPattern::new(DEFAULT_PATTERN)?);
//! let decision = gate.evaluate(&BuildVersion::new("2.4.0"), &mut Stderr);
//! println!("dry_deploy={}", decision.dry_deploy_flag());
//! # Ok::<(), anyhow::Error>(())
//! ```

/// Build/published version ordering.
pub mod compare;

/// The deployment gate and its reporter seam.
pub mod gate;

/// Output file and JSON report for downstream tasks.
pub mod output;

pub use docgate_site as site;
pub use docgate_types as types;
