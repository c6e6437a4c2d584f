//! Output formatting module for snipcheck
//!
//! This module provides different output formats for snippet diagnostics.

use crate::snippets::Diagnostic;
use std::io::{self, Write};
use std::str::FromStr;

pub mod formatters;

// Re-export formatters
pub use formatters::*;

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format the diagnostics of one document
    fn format_diagnostics(&self, diagnostics: &[Diagnostic], file_path: &str) -> String;

    /// Format a summary of results across multiple files
    fn format_summary(&self, _files_processed: usize, _total_diagnostics: usize, _duration_ms: u64) -> Option<String> {
        // Default: no summary
        None
    }

    /// Whether this formatter should use colors
    fn use_colors(&self) -> bool {
        false
    }
}

/// Available output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable format with colors, continuation lines and notes
    #[default]
    Text,
    /// One line per diagnostic: file:line:col: severity: message
    Concise,
    /// A single JSON array covering every checked file
    Json,
    /// GitHub Actions annotation format
    GitHub,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "full" => Ok(OutputFormat::Text),
            "concise" => Ok(OutputFormat::Concise),
            "json" => Ok(OutputFormat::Json),
            "github" => Ok(OutputFormat::GitHub),
            _ => Err(format!("Unknown output format: {s}")),
        }
    }
}

impl OutputFormat {
    /// Create a formatter instance for this format
    pub fn create_formatter(&self) -> Box<dyn OutputFormatter> {
        match self {
            OutputFormat::Text => Box::new(TextFormatter::new()),
            OutputFormat::Concise => Box::new(ConciseFormatter::new()),
            OutputFormat::Json => Box::new(JsonFormatter::new()),
            OutputFormat::GitHub => Box::new(GitHubFormatter::new()),
        }
    }
}

/// Output writer that handles stdout/stderr routing
pub struct OutputWriter {
    use_stderr: bool,
    silent: bool,
}

impl OutputWriter {
    pub fn new(use_stderr: bool, silent: bool) -> Self {
        Self { use_stderr, silent }
    }

    /// Write a line to appropriate stream
    pub fn writeln(&self, content: &str) -> io::Result<()> {
        if self.silent {
            return Ok(());
        }

        if self.use_stderr {
            let mut stderr = io::stderr().lock();
            writeln!(stderr, "{content}")
        } else {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{content}")
        }
    }

    /// Write error output (always to stderr unless silent)
    pub fn write_error(&self, content: &str) -> io::Result<()> {
        if self.silent {
            return Ok(());
        }

        writeln!(io::stderr().lock(), "{content}")
    }
}
