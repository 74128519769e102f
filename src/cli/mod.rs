//! Command-line interface for hubfs.
//!
//! A thin consumer of the filesystem core: it assembles the credential
//! store, query client, revision tracker, and provider, then maps
//! subcommands onto filesystem operations. The interactive repository
//! picker of a richer host is reduced to the non-interactive `search`
//! command here.

pub mod args;
mod commands;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::client::GitHubClient;
use crate::config::{ConfigError, read_config};
use crate::fs::{FsError, GitHubFileSystem};
use crate::revision::RevisionTracker;
use crate::uri::UriError;

pub use args::GlobalArgs;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during CLI execution.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// Identifier parsing error.
    #[error("{0}")]
    Uri(#[from] UriError),

    /// Filesystem error.
    #[error("{0}")]
    Fs(#[from] FsError),

    /// No token could be found anywhere.
    #[error(
        "no GitHub access token configured; pass --token, set HUBFS_GITHUB_TOKEN, \
         or add `token` to the [github] section of ~/.hubfsconfig"
    )]
    MissingToken,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

// =============================================================================
// CLI Definition
// =============================================================================

/// hubfs - browse GitHub repositories as a read-only filesystem.
#[derive(Parser, Debug)]
#[command(name = "hubfs", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search for repositories by name, owner/, owner/repo, or URL.
    Search {
        /// Search text.
        query: String,
    },

    /// Show metadata for a file or directory.
    Stat {
        /// Path: a hubfs:// identifier or owner/repo[/path].
        path: String,
    },

    /// List a directory.
    Ls {
        /// Path: a hubfs:// identifier or owner/repo[/path].
        path: String,
    },

    /// Print a file's content to stdout.
    Cat {
        /// Path: a hubfs:// identifier or owner/repo/path.
        path: String,
    },

    /// Resolve and print the pinned revision for a repository.
    Pin {
        /// Repository as owner/repo.
        repo: String,
    },
}

// =============================================================================
// CLI Execution
// =============================================================================

/// The assembled filesystem stack the commands run against.
pub struct App {
    pub client: Arc<GitHubClient>,
    pub revisions: Arc<RevisionTracker>,
    pub fs: GitHubFileSystem,
}

impl App {
    /// Build the stack from global arguments: config → credential store →
    /// client → tracker → provider.
    pub fn new(global: &GlobalArgs) -> Result<Self> {
        let config = read_config(&global.to_config_source())?;
        let credentials = Arc::new(crate::config::CredentialStore::new(config.token));

        let client = Arc::new(GitHubClient::new(credentials));
        if !client.has_credential() {
            return Err(CliError::MissingToken);
        }

        let revisions = Arc::new(RevisionTracker::new(client.clone()));
        let fs = GitHubFileSystem::new(client.clone(), revisions.clone());
        Ok(Self {
            client,
            revisions,
            fs,
        })
    }
}

impl Cli {
    /// Parse command-line arguments and return the CLI instance.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Run the CLI command.
    pub async fn run(self) -> Result<()> {
        let app = App::new(&self.global)?;

        match self.command {
            Command::Search { query } => commands::search(&app, &self.global, &query).await,
            Command::Stat { path } => commands::stat(&app, &self.global, &path).await,
            Command::Ls { path } => commands::ls(&app, &self.global, &path).await,
            Command::Cat { path } => commands::cat(&app, &path).await,
            Command::Pin { repo } => commands::pin(&app, &self.global, &repo).await,
        }
    }
}

/// Main entry point for the CLI.
pub async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse_args();
    cli.run().await
}
