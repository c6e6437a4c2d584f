//! Handler for the `schema` command.

use anyhow::Context;
use schemars::schema_for;

use snipcheck_lib::exit_codes;
use snipcheck_lib::snippets::SnippetCheckConfig;

/// Print the JSON schema for `.snipcheck.toml`.
pub fn handle_schema() -> anyhow::Result<i32> {
    let schema = schema_for!(SnippetCheckConfig);
    let schema_json = serde_json::to_string_pretty(&schema).context("Failed to serialize schema")?;
    println!("{schema_json}");
    Ok(exit_codes::SUCCESS)
}
