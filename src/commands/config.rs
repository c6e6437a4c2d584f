//! Handler for the `config` command.

use anyhow::Context;
use std::path::Path;

use snipcheck_lib::config::load_config;
use snipcheck_lib::exit_codes;
use snipcheck_lib::snippets::SnippetCheckConfig;

/// Print the effective (or default) configuration as TOML.
pub fn handle_config(config_path: Option<&Path>, defaults: bool) -> anyhow::Result<i32> {
    let (config, origin) = if defaults {
        (SnippetCheckConfig::default(), "built-in defaults".to_string())
    } else {
        let loaded = load_config(config_path).context("Failed to load configuration")?;
        let origin = match &loaded.path {
            Some(path) => path.display().to_string(),
            None => "built-in defaults".to_string(),
        };
        (loaded.config, origin)
    };

    let toml = toml::to_string_pretty(&config).context("Failed to serialize configuration")?;
    println!("# Source: {origin}\n{toml}");
    Ok(exit_codes::SUCCESS)
}
