//! Configuration loading for snipcheck.
//!
//! Settings live in `.snipcheck.toml` (or `snipcheck.toml`) at the top level of
//! the file; see [`crate::snippets::SnippetCheckConfig`] for the keys.

mod loading;

pub use loading::{LoadedConfig, discover_config_upward, find_project_root_from, load_config, load_config_file};

use std::io;
use thiserror::Error;

/// Preferred configuration file name.
pub const CONFIG_FILE: &str = ".snipcheck.toml";

/// Configuration file names in order of precedence.
pub const CONFIG_FILES: &[&str] = &[CONFIG_FILE, "snipcheck.toml"];

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read config file at {path}: {source}")]
    IoError { source: io::Error, path: String },

    /// Failed to parse the configuration content
    #[error("Failed to parse config: {0}")]
    ParseError(String),
}
