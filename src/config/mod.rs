//! Configuration module.

mod credential;
mod read_config;

pub use credential::CredentialStore;
pub use read_config::{Config, ConfigError, ConfigResult, ConfigSource, read_config};
