use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn};
use tracing_subscriber::EnvFilter;

use gh_version_compare::compare::{Comparator, Direction};
use gh_version_compare::github::{self, GitHubApi, GitHubClient, RepoRef};
use gh_version_compare::report::{self, OutputFormat, Palette};
use gh_version_compare::store::{LocalStore, StoreError, Theme};
use gh_version_compare::{config, patch};

/// Compare two tags, releases or branches of a GitHub
/// repository: commits, changed files, line diffs and totals.
#[derive(Parser, Debug)]
#[command(name = "gh-version-compare", version, about)]
struct Cli {
    /// GitHub token (overrides the config file, stored token and GITHUB_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Path to a config file (default: ./.gh-version-compare.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Serve data from a built-in fixture instead of the GitHub API
    #[arg(long, global = true)]
    r#mock: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the repository's tags (first 100)
    Versions {
        /// Repository URL or owner/name
        repo: String,
    },

    /// Compare two refs
    Compare {
        /// Repository URL or owner/name
        repo: String,
        from: String,
        to: String,

        /// Write a markdown report to this file instead of the terminal
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the comparison as JSON
        #[arg(long, conflicts_with = "output")]
        json: bool,

        /// Also show each commit's own files (terminal output only)
        #[arg(long, conflicts_with_all = ["output", "json"])]
        details: bool,

        /// Only show totals, the most changed files and the latest commits
        #[arg(long, conflicts_with_all = ["output", "json", "details"])]
        overview: bool,
    },

    /// Show one file's line diff between two refs
    Diff {
        /// Repository URL or owner/name
        repo: String,
        from: String,
        to: String,
        /// Exact path of the file as listed by `compare`
        file: String,
    },

    /// Show a single commit and the files it touched
    Commit {
        /// Repository URL or owner/name
        repo: String,
        sha: String,

        /// Show this file's line diff within the commit
        #[arg(long, value_name = "PATH")]
        file: Option<String>,
    },

    /// Manage the stored access token
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Set the terminal color theme
    Theme { theme: Theme },
}

#[derive(Subcommand, Debug)]
enum TokenAction {
    /// Save a token for later runs (an empty value removes it)
    Set {
        #[arg(value_name = "TOKEN")]
        value: String,
    },
    /// Remove the stored token
    Clear,
    /// Check whether the effective token is accepted by GitHub
    Status,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let store = match LocalStore::open_default() {
        Ok(store) => Some(store),
        Err(e) => {
            warn!(error = %e, "local store unavailable");
            None
        }
    };

    match &cli.command {
        Command::Token {
            action: TokenAction::Set { value },
        } => {
            let store = store.ok_or(StoreError::NoConfigDir)?;
            store.set_token(value)?;
            if value.is_empty() {
                println!("Stored token removed.");
            } else {
                println!("Token saved to {}", store.path().display());
            }
            return Ok(());
        }
        Command::Token {
            action: TokenAction::Clear,
        } => {
            let store = store.ok_or(StoreError::NoConfigDir)?;
            store.clear_token()?;
            println!("Stored token removed.");
            return Ok(());
        }
        Command::Theme { theme } => {
            let store = store.ok_or(StoreError::NoConfigDir)?;
            store.set_theme(*theme)?;
            println!("Theme set to {theme:?}.");
            return Ok(());
        }
        _ => {}
    }

    info!("loading configuration");
    let mut config = match &cli.config {
        Some(path) => config::Config::load_from(path)?,
        None => config::Config::load()?,
    };
    let stored_token = store.as_ref().and_then(|s| s.token().ok().flatten());
    config.resolve_token(cli.token.clone(), stored_token);
    let theme = store
        .as_ref()
        .and_then(|s| s.theme().ok())
        .unwrap_or_default();
    let palette = Palette::new(theme);

    let api: Arc<dyn GitHubApi> = if cli.r#mock {
        info!("using mock GitHub data for demo");
        Arc::new(github::mock::FixtureClient::embedded(
            config.github.token.is_some(),
        )?)
    } else {
        Arc::new(GitHubClient::new(&config)?)
    };
    let comparator = Comparator::new(api, config.compare.strategy);

    match cli.command {
        Command::Versions { repo } => {
            let repo = parse_repo(&repo)?;
            let versions = comparator.list_versions(&repo.owner, &repo.name).await?;
            print!(
                "{}",
                report::terminal::render_versions(
                    &palette,
                    &format!("{}/{}", repo.owner, repo.name),
                    &versions
                )
            );
        }
        Command::Compare {
            repo,
            from,
            to,
            output,
            json,
            details,
            overview,
        } => {
            let repo = parse_repo(&repo)?;
            let _span = info_span!("compare", repo = %repo.url, %from, %to).entered();
            let result = comparator
                .compare_versions(&repo.owner, &repo.name, &from, &to)
                .await?;
            if overview {
                print!("{}", report::terminal::render_overview(&palette, &result));
                return Ok(());
            }
            let format = if json {
                OutputFormat::Json
            } else {
                OutputFormat::Terminal
            };
            report::output(&result, format, output.as_deref(), &palette)?;
            if let Some(path) = output {
                println!("Report written to {}", path.display());
            }
            if details {
                for commit in &result.commits {
                    let (detail, error) = comparator
                        .commit_detail_or_fallback(&repo.owner, &repo.name, commit)
                        .await;
                    let error = error.map(|e| e.to_string());
                    println!();
                    print!(
                        "{}",
                        report::terminal::render_commit_detail(&palette, &detail, error.as_deref())
                    );
                }
            }
        }
        Command::Diff {
            repo,
            from,
            to,
            file,
        } => {
            let repo = parse_repo(&repo)?;
            let (comparison, patch_text) = comparator
                .compared_file_diff(&repo.owner, &repo.name, &from, &to, &file)
                .await?;
            if comparison.direction == Direction::Swapped {
                println!(
                    "{}",
                    palette.muted(&format!(
                        "(no changes in the requested order; showing {}...{})",
                        comparison.from_version, comparison.to_version
                    ))
                );
            }
            let diff = patch::FileDiff::from_patch(file, &patch_text);
            debug!(lines = diff.lines.len(), "parsed patch");
            print!("{}", report::terminal::render_file_diff(&palette, &diff));
        }
        Command::Commit { repo, sha, file } => {
            let repo = parse_repo(&repo)?;
            match file {
                Some(file) => {
                    let (detail, patch_text) = comparator
                        .commit_file_diff(&repo.owner, &repo.name, &sha, &file)
                        .await?;
                    println!("{} {}", palette.accent(&detail.hash), file);
                    let diff = patch::FileDiff::from_patch(file, &patch_text);
                    print!("{}", report::terminal::render_file_diff(&palette, &diff));
                }
                None => {
                    let detail = comparator
                        .commit_detail(&repo.owner, &repo.name, &sha)
                        .await?;
                    print!(
                        "{}",
                        report::terminal::render_commit_detail(&palette, &detail, None)
                    );
                }
            }
        }
        Command::Token {
            action: TokenAction::Status,
        } => {
            if config.github.token.is_none() {
                println!("No token configured. Public repositories work without one, at lower rate limits.");
            } else if comparator.validate_token().await? {
                println!("{}", palette.added("Token is valid."));
            } else {
                println!("{}", palette.removed("Token was rejected by GitHub."));
            }
        }
        Command::Token { .. } | Command::Theme { .. } => {}
    }

    Ok(())
}

fn parse_repo(input: &str) -> Result<RepoRef, github::GitHubError> {
    let repo = github::parse_repo_ref(input)?;
    debug!(owner = %repo.owner, name = %repo.name, "parsed repository");
    Ok(repo)
}
