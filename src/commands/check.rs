//! Handler for the `check` command.

use anyhow::Context;
use colored::*;
use std::path::Path;
use std::time::Instant;

use snipcheck_lib::config::load_config;
use snipcheck_lib::discovery::find_markdown_files;
use snipcheck_lib::exit_codes;
use snipcheck_lib::output::{OutputFormat, OutputWriter, format_all_diagnostics_as_json};
use snipcheck_lib::snippets::{CheckSummary, CollectingSink, Diagnostic, SnippetChecker};

use crate::CheckArgs;

/// Check every Markdown file under the given paths.
pub fn handle_check(args: &CheckArgs) -> anyhow::Result<i32> {
    let start = Instant::now();

    let mut loaded = load_config(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(command) = &args.compiler {
        loaded.config.compiler.command = command.clone();
    }
    if let Some(dir) = &args.staging_dir {
        loaded.config.staging_dir = Some(dir.clone());
    }
    if let Some(path) = &loaded.path {
        log::debug!("Using config file {}", path.display());
    }

    let files = find_markdown_files(&args.paths, !args.no_respect_gitignore).context("Failed to collect files")?;

    let checker = SnippetChecker::new(loaded.config, &loaded.project_root);
    let writer = OutputWriter::new(false, false);
    let mut sink = CollectingSink::new();
    let mut summary = CheckSummary::default();
    let mut failed_files = 0;

    for file in &files {
        match checker.check_file(file, &mut sink) {
            Ok(file_summary) => summary.merge(&file_summary),
            Err(e) => {
                failed_files += 1;
                writer.write_error(&format!("{}: {e}", "Error".red().bold()))?;
            }
        }
    }

    let cwd = std::env::current_dir().unwrap_or_default();
    let results: Vec<(String, &[Diagnostic])> = sink
        .iter()
        .map(|(document, diagnostics)| (display_path(document, &cwd), diagnostics))
        .collect();

    if args.output_format == OutputFormat::Json {
        let all = results.iter().map(|(path, diagnostics)| (path.as_str(), *diagnostics));
        writer.writeln(&format_all_diagnostics_as_json(all))?;
    } else {
        let formatter = args.output_format.create_formatter();
        for (path, diagnostics) in results.iter().filter(|(_, diagnostics)| !diagnostics.is_empty()) {
            writer.writeln(&formatter.format_diagnostics(diagnostics, path))?;
        }
        if !args.quiet
            && let Some(text) =
                formatter.format_summary(files.len(), summary.diagnostics, start.elapsed().as_millis() as u64)
        {
            writer.writeln(&text)?;
        }
    }

    if summary.compiler_failures > 0 {
        writer.write_error(&format!(
            "{}: the compiler could not be run for {} snippet(s); check `[compiler] command`",
            "Error".red().bold(),
            summary.compiler_failures
        ))?;
    }

    Ok(exit_code(&summary, failed_files))
}

fn exit_code(summary: &CheckSummary, failed_files: usize) -> i32 {
    if failed_files > 0 || summary.compiler_failures > 0 {
        exit_codes::TOOL_ERROR
    } else if summary.diagnostics > 0 {
        exit_codes::DIAGNOSTICS_FOUND
    } else {
        exit_codes::SUCCESS
    }
}

/// Show documents relative to the working directory when they are under it.
fn display_path(document: &str, cwd: &Path) -> String {
    Path::new(document)
        .strip_prefix(cwd)
        .map(|relative| relative.display().to_string())
        .unwrap_or_else(|_| document.to_string())
}
