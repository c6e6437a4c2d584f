//! Concise output formatter for easy parsing by editors

use crate::output::OutputFormatter;
use crate::snippets::Diagnostic;

/// Concise formatter: file:line:col: severity: message
///
/// Only the first line of each message is printed.
#[derive(Default)]
pub struct ConciseFormatter;

impl ConciseFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl OutputFormatter for ConciseFormatter {
    fn format_diagnostics(&self, diagnostics: &[Diagnostic], file_path: &str) -> String {
        diagnostics
            .iter()
            .map(|diagnostic| {
                format!(
                    "{}:{}:{}: {}: {}",
                    file_path,
                    diagnostic.line(),
                    diagnostic.column(),
                    diagnostic.severity,
                    diagnostic.message.lines().next().unwrap_or_default()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
