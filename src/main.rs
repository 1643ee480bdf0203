mod cache;
mod compare;
mod config;
mod github;
mod pr;
mod report;

use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};
use tracing_subscriber::EnvFilter;

use crate::compare::Comparator;
use crate::config::{Config, Overrides, DEFAULT_CONFIG_PATH};
use crate::github::GitHubClient;
use crate::report::ReportRow;

/// Outdated Branches: lists open GitHub Pull Requests with the number of
/// commits between their base and the current head of their branch.
///
/// The access token is read from GITHUB_OAUTH_TOKEN; REPO_AUTHOR and
/// REPO_NAME select the repository unless overridden on the command line.
#[derive(Parser, Debug)]
#[command(name = "outdated-branches", version, about)]
struct Cli {
    /// Repository owner (overrides REPO_AUTHOR)
    #[arg(long)]
    owner: Option<String>,

    /// Repository name (overrides REPO_NAME)
    #[arg(long)]
    repo: Option<String>,

    /// Branch resolved before any pull request is compared
    #[arg(long)]
    default_branch: Option<String>,

    /// Path to the TOML config file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Optional output file path for the report table
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {}", "error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    info!("started");

    info!(path = %cli.config.display(), "loading configuration");
    let overrides = Overrides {
        owner: cli.owner,
        repo: cli.repo,
        default_branch: cli.default_branch,
    };
    let config = Config::load(&cli.config, overrides)?;
    debug!(?config, "resolved configuration");

    let span = info_span!("outdated_branches", owner = %config.owner, repo = %config.repo);
    let rows = generate_report(&config).instrument(span.clone()).await?;
    span.in_scope(|| report::output(&rows, cli.output.as_deref()))?;
    info!("finished");

    Ok(())
}

/// Compare every open pull request of the configured repository.
///
/// Returns the rows only when every comparison succeeded.
async fn generate_report(config: &Config) -> Result<Vec<ReportRow>, Box<dyn std::error::Error>> {
    let client = GitHubClient::new(&config.api_url, &config.owner, &config.repo, &config.token)?;
    let comparator = Comparator::new(Arc::new(client));

    let run = comparator.run(&config.default_branch).await?;
    let completed = run.rows.len();
    let rows = run.into_result().inspect_err(|_| {
        warn!(completed, "discarding partial report");
    })?;
    info!(rows = rows.len(), "successfully compared all pull requests");
    Ok(rows)
}
