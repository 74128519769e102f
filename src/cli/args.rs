//! Command-line argument definitions and helpers.

use std::path::PathBuf;

use clap::Args;

use super::Result;
use crate::config::ConfigSource;
use crate::uri::{FILE_SYSTEM_SCHEME, RepoUri};

// =============================================================================
// Global Arguments
// =============================================================================

/// Global arguments that apply to all commands.
#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Path to the configuration file.
    #[arg(long = "config-file", global = true)]
    pub config_file: Option<PathBuf>,

    /// GitHub personal access token (overrides config and environment).
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Format output as JSON.
    #[arg(long, global = true)]
    pub json: bool,
}

impl GlobalArgs {
    /// Convert to a config source for [`crate::config::read_config`].
    pub fn to_config_source(&self) -> ConfigSource {
        ConfigSource {
            config_file: self.config_file.clone(),
            token: self.token.clone(),
        }
    }
}

// =============================================================================
// Path Arguments
// =============================================================================

/// Accept either a full `hubfs://` identifier or the `owner/repo[/path]`
/// shorthand, which is rooted at github.com.
pub fn parse_path(input: &str) -> Result<RepoUri> {
    if input.starts_with(&format!("{}://", FILE_SYSTEM_SCHEME)) {
        return Ok(RepoUri::parse(input)?);
    }
    let trimmed = input.trim_start_matches('/');
    Ok(RepoUri::parse(&format!(
        "{}://github.com/{}",
        FILE_SYSTEM_SCHEME, trimmed
    ))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_identifier() {
        let uri = parse_path("hubfs://github.com/octo/hello/readme.md").unwrap();
        let path = uri.decompose();
        assert_eq!(path.repo.owner, "octo");
        assert_eq!(path.relative_path(), "readme.md");
    }

    #[test]
    fn parses_shorthand() {
        let uri = parse_path("octo/hello/src/lib.rs").unwrap();
        let path = uri.decompose();
        assert_eq!(path.repo.authority, "github.com");
        assert_eq!(path.repo.name, "hello");
        assert_eq!(path.relative_path(), "src/lib.rs");
    }

    #[test]
    fn parses_shorthand_with_leading_slash() {
        let uri = parse_path("/octo/hello").unwrap();
        assert_eq!(uri.decompose().repo.owner, "octo");
    }
}
