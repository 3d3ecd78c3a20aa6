use docgate_site::{SiteSource, VersionPattern};
use docgate_types::{BuildVersion, CompareMode, DeploymentDecision, SiteVersion};

use crate::compare::is_newer;

/// Sink for diagnostics produced while the gate runs.
pub trait Reporter {
    fn info(&mut self, msg: &str);
    fn warn(&mut self, msg: &str);
    fn error(&mut self, msg: &str);
}

/// Decides whether a freshly built documentation site should replace the
/// one that is currently published.
///
/// The gate performs a single best-effort fetch per evaluation. A fetch that
/// fails for any reason counts as "no version found", which always means a
/// dry run.
pub struct DeploymentGate<S> {
    source: S,
    pattern: VersionPattern,
    compare: CompareMode,
}

impl<S: SiteSource> DeploymentGate<S> {
    pub fn new(source: S, pattern: VersionPattern) -> Self {
        Self {
            source,
            pattern,
            compare: CompareMode::default(),
        }
    }

    pub fn with_compare(mut self, compare: CompareMode) -> Self {
        self.compare = compare;
        self
    }

    pub fn url(&self) -> &str {
        self.source.url()
    }

    /// Versions the live site reports, in page order. Empty when the page
    /// could not be fetched.
    pub fn published_versions(&self, reporter: &mut dyn Reporter) -> Vec<String> {
        match self.source.fetch() {
            Ok(body) => self.pattern.scan(&body),
            Err(err) => {
                reporter.warn(&format!("could not fetch {}: {err:#}", self.source.url()));
                Vec::new()
            }
        }
    }

    /// Fetch the live site and decide.
    pub fn evaluate(&self, build: &BuildVersion, reporter: &mut dyn Reporter) -> DeploymentDecision {
        let matches = self.published_versions(reporter);
        let decision = decide(self.source.url(), build, matches, self.compare);
        reporter.info(&decision.message);
        decision
    }
}

/// Pure decision over already-scraped versions.
pub fn decide(
    site_url: &str,
    build: &BuildVersion,
    matches: Vec<String>,
    compare: CompareMode,
) -> DeploymentDecision {
    let site_version = SiteVersion::from_matches(matches);
    let deploy = site_version
        .single()
        .is_some_and(|published| is_newer(build.as_str(), published, compare));
    let message = status_line(site_url, &site_version, deploy);

    DeploymentDecision {
        site_url: site_url.to_string(),
        build_version: build.clone(),
        site_version,
        compare,
        deploy,
        message,
    }
}

/// Build-log line describing a decision.
pub fn status_line(site_url: &str, site_version: &SiteVersion, deploy: bool) -> String {
    let mode = if deploy { "enabled" } else { "set as dry run" };
    match site_version {
        SiteVersion::Unknown => {
            format!("Unable to fetch the current site version from {site_url}")
        }
        SiteVersion::Single(version) => {
            format!("Website {site_url} is at version {version}. Orchid deployment {mode}.")
        }
        SiteVersion::Ambiguous(versions) => format!(
            "Multiple site versions fetched from {site_url}: [{}]. Orchid deployment {mode}.",
            versions.join(", ")
        ),
    }
}
