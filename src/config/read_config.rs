//! Configuration file reading and parsing.
//!
//! Configuration is a small INI file holding the GitHub access token and
//! optional endpoint overrides, layered under environment variables and
//! command-line flags.

use std::env;
use std::path::{Path, PathBuf};

use configparser::ini::Ini;
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

const ENV_CONFIG_FILE: &str = "HUBFS_CONFIG_FILE";
const ENV_TOKEN: &str = "HUBFS_GITHUB_TOKEN";
const ENV_TOKEN_FALLBACK: &str = "GITHUB_TOKEN";
const DEFAULT_CONFIG_FILENAME: &str = ".hubfsconfig";

const SECTION_GITHUB: &str = "github";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },
}

/// Result type for config operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// =============================================================================
// ConfigSource
// =============================================================================

/// Specifies how to locate and layer configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigSource {
    /// Explicit config file path from the CLI. If specified and missing,
    /// error. If `None`, fall back to `HUBFS_CONFIG_FILE`, then
    /// `~/.hubfsconfig`.
    pub config_file: Option<PathBuf>,

    /// Token supplied directly on the command line; wins over everything.
    pub token: Option<String>,
}

// =============================================================================
// Config
// =============================================================================

/// Application configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// GitHub personal access token, if one could be found anywhere.
    pub token: Option<String>,
}

/// Read configuration, layering (highest precedence first): the CLI token,
/// `HUBFS_GITHUB_TOKEN`, `GITHUB_TOKEN`, then the config file's
/// `[github] token`.
pub fn read_config(source: &ConfigSource) -> ConfigResult<Config> {
    let file_token = match resolve_config_file(source)? {
        Some(path) => load_ini(&path)?.get(SECTION_GITHUB, "token"),
        None => None,
    };

    let token = source
        .token
        .clone()
        .or_else(|| env_non_empty(ENV_TOKEN))
        .or_else(|| env_non_empty(ENV_TOKEN_FALLBACK))
        .or(file_token);

    Ok(Config { token })
}

fn env_non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Resolve which config file to use, if any.
fn resolve_config_file(source: &ConfigSource) -> ConfigResult<Option<PathBuf>> {
    // An explicit path must exist.
    if let Some(path) = &source.config_file {
        if path.exists() {
            return Ok(Some(path.clone()));
        }
        return Err(ConfigError::FileNotFound(path.clone()));
    }

    if let Ok(env_path) = env::var(ENV_CONFIG_FILE) {
        let path = PathBuf::from(&env_path);
        if path.exists() {
            return Ok(Some(path));
        }
        return Ok(None);
    }

    if let Some(home) = home_dir() {
        let default_path = home.join(DEFAULT_CONFIG_FILENAME);
        if default_path.exists() {
            return Ok(Some(default_path));
        }
    }

    Ok(None)
}

/// Get the user's home directory.
fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME").map(PathBuf::from)
}

/// Load and parse an INI file.
fn load_ini(path: &Path) -> ConfigResult<Ini> {
    let mut ini = Ini::new();
    ini.load(path).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e,
    })?;
    Ok(ini)
}
