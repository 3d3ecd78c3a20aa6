use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};

use docgate_config::{Config, find_config, load_config_from_file};
use docgate_core::gate::{DeploymentGate, Reporter};
use docgate_core::output::{self, DecisionReport};
use docgate_site::{CannedSite, SiteClient, SiteSource, VersionPattern};
use docgate_types::{BuildVersion, CompareMode, DeploymentDecision};

#[derive(Parser, Debug)]
#[command(name = "docgate", version)]
#[command(about = "Deploy a documentation site only when the build is newer than what is published")]
struct Cli {
    /// Path to a .docgate.toml (default: nearest one above the working directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stable documentation site URL
    #[arg(long)]
    base_url: Option<String>,

    /// Suffix appended to the site URL for non-stable builds (default: -beta)
    #[arg(long, allow_hyphen_values = true)]
    beta_suffix: Option<String>,

    /// Regex with exactly one capture group holding the published version
    #[arg(long)]
    pattern: Option<String>,

    /// Request timeout (e.g. 30s). No timeout when omitted.
    #[arg(long)]
    timeout: Option<String>,

    /// Version comparison: lexicographic (default) or semantic
    #[arg(long)]
    compare: Option<CompareMode>,

    /// Use this build version instead of deriving one from git
    #[arg(long)]
    build_version: Option<String>,

    /// Repository the build version is derived from
    #[arg(long, default_value = ".")]
    repo: PathBuf,

    /// Target the stable site regardless of the build version
    #[arg(long, conflicts_with = "beta")]
    stable: bool,

    /// Target the beta site regardless of the build version
    #[arg(long)]
    beta: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decide between deployment and dry run.
    Check {
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Append KEY=value lines for downstream tasks to this file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Key carrying the dry-run flag (default: dry_deploy)
        #[arg(long)]
        output_key: Option<String>,

        /// Read the published page from a saved file instead of the network
        #[arg(long)]
        page: Option<PathBuf>,
    },
    /// Print the build version and whether it is stable.
    Version,
    /// Print the site URL this build targets.
    Url,
    /// Print every version the pattern finds in a saved page ("-" for stdin).
    Scan { path: PathBuf },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

struct CliReporter;

impl Reporter for CliReporter {
    fn info(&mut self, msg: &str) {
        eprintln!("[info] {msg}");
    }

    fn warn(&mut self, msg: &str) {
        eprintln!("[warn] {msg}");
    }

    fn error(&mut self, msg: &str) {
        eprintln!("[error] {msg}");
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut reporter = CliReporter;

    match run(&cli, &mut reporter) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            reporter.error(&format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, reporter: &mut dyn Reporter) -> Result<()> {
    let config = load_config(cli)?.merge(&cli_overrides(cli)?);

    match &cli.cmd {
        Commands::Check {
            format,
            output: output_path,
            output_key,
            page,
        } => {
            let build = build_version(cli)?;
            let url = site_url(cli, &config, &build);
            let pattern = VersionPattern::new(config.pattern())?;

            let decision = match page {
                Some(path) => {
                    let body = read_page(path)?;
                    evaluate(CannedSite::new(url, body), pattern, &config, &build, reporter)
                }
                None => {
                    let client = match config.timeout() {
                        Some(timeout) => SiteClient::with_timeout(&url, timeout)?,
                        None => SiteClient::new(&url)?,
                    };
                    evaluate(client, pattern, &config, &build, reporter)
                }
            };

            let key = output_key.as_deref().unwrap_or(config.output_key());
            print_decision(&decision, key, *format)?;

            if let Some(path) = output_path.as_deref().or(config.output_file()) {
                output::append_output_file(path, key, &decision)?;
                reporter.info(&format!("decision written to {}", path.display()));
            }
        }
        Commands::Version => {
            let build = build_version(cli)?;
            println!("version: {build}");
            println!("stable: {}", build.is_stable());
        }
        Commands::Url => {
            let build = build_version(cli)?;
            println!("{}", site_url(cli, &config, &build));
        }
        Commands::Scan { path } => {
            let pattern = VersionPattern::new(config.pattern())?;
            let versions = pattern.scan(&read_page(path)?);
            if versions.is_empty() {
                reporter.warn(&format!("no version found in {}", path.display()));
            }
            for v in versions {
                println!("{v}");
            }
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => {
            if !path.exists() {
                bail!("config file not found: {}", path.display());
            }
            load_config_from_file(path)
        }
        None => {
            let cwd = std::env::current_dir().context("failed to read working directory")?;
            match find_config(&cwd) {
                Some(path) => load_config_from_file(&path),
                None => Ok(Config::default()),
            }
        }
    }
}

fn cli_overrides(cli: &Cli) -> Result<Config> {
    let mut config = Config::new();
    config.site.base_url = cli.base_url.clone();
    config.site.beta_suffix = cli.beta_suffix.clone();
    config.site.pattern = cli.pattern.clone();
    config.site.timeout = cli.timeout.as_deref().map(parse_duration).transpose()?;
    config.gate.compare = cli.compare;
    Ok(config)
}

fn build_version(cli: &Cli) -> Result<BuildVersion> {
    match &cli.build_version {
        Some(v) => Ok(BuildVersion::new(v.trim())),
        None => docgate_git::compute_build_version(&cli.repo)
            .context("failed to derive build version from git; pass --build-version to skip"),
    }
}

fn site_url(cli: &Cli, config: &Config, build: &BuildVersion) -> String {
    let site = config.docs_site();
    if cli.stable {
        site.url(true)
    } else if cli.beta {
        site.url(false)
    } else {
        site.url_for(build)
    }
}

fn evaluate<S: SiteSource>(
    source: S,
    pattern: VersionPattern,
    config: &Config,
    build: &BuildVersion,
    reporter: &mut dyn Reporter,
) -> DeploymentDecision {
    DeploymentGate::new(source, pattern)
        .with_compare(config.compare_mode())
        .evaluate(build, reporter)
}

fn print_decision(decision: &DeploymentDecision, key: &str, format: Format) -> Result<()> {
    match format {
        Format::Text => {
            println!("{}", decision.message);
            for line in output::output_lines(key, decision) {
                println!("{line}");
            }
        }
        Format::Json => println!("{}", DecisionReport::new(decision).to_json()?),
    }
    Ok(())
}

fn read_page(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut body = String::new();
        std::io::stdin()
            .read_to_string(&mut body)
            .context("failed to read page from stdin")?;
        return Ok(body);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read page: {}", path.display()))
}

fn parse_duration(s: &str) -> Result<Duration> {
    humantime::parse_duration(s).with_context(|| format!("invalid duration: {s}"))
}
