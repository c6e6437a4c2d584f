//! Default text output formatter with colors and context

use crate::output::OutputFormatter;
use crate::snippets::{Diagnostic, Severity};
use colored::*;

/// Default human-readable formatter with colors
pub struct TextFormatter {
    use_colors: bool,
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self { use_colors: true }
    }
}

impl TextFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_colors() -> Self {
        Self { use_colors: false }
    }

    fn paint(&self, text: String, style: impl Fn(&str) -> ColoredString) -> String {
        if self.use_colors { style(&text).to_string() } else { text }
    }

    fn severity_label(&self, severity: Severity) -> String {
        let label = format!("{severity}:");
        if !self.use_colors {
            return label;
        }
        match severity {
            Severity::Error => label.red().bold().to_string(),
            Severity::Warning => label.yellow().bold().to_string(),
            Severity::Information => label.blue().bold().to_string(),
        }
    }

    fn location(&self, file_path: &str, line: usize, column: usize) -> String {
        format!(
            "{}:{}:{}",
            self.paint(file_path.to_string(), |s| s.blue().underline()),
            self.paint(line.to_string(), |s| s.cyan()),
            self.paint(column.to_string(), |s| s.cyan()),
        )
    }
}

impl OutputFormatter for TextFormatter {
    fn format_diagnostics(&self, diagnostics: &[Diagnostic], file_path: &str) -> String {
        let mut output = String::new();

        for diagnostic in diagnostics {
            let mut lines = diagnostic.message.lines();
            let headline = lines.next().unwrap_or_default();

            // Format: file:line:column: severity: message
            output.push_str(&format!(
                "{}: {} {}\n",
                self.location(file_path, diagnostic.line(), diagnostic.column()),
                self.severity_label(diagnostic.severity),
                headline
            ));

            // Continuation lines keep their own indentation so carets line up
            for line in lines {
                output.push_str(&format!("    {line}\n"));
            }

            for related in &diagnostic.related {
                output.push_str(&format!(
                    "  {} {}: {}\n",
                    self.paint("note:".to_string(), |s| s.green()),
                    self.location(file_path, related.position.line + 1, related.position.column + 1),
                    related.message
                ));
            }
        }

        // Remove trailing newline
        if output.ends_with('\n') {
            output.pop();
        }

        output
    }

    fn format_summary(&self, files_processed: usize, total_diagnostics: usize, duration_ms: u64) -> Option<String> {
        let files = if files_processed == 1 { "file" } else { "files" };
        let summary = if total_diagnostics == 0 {
            let text = format!("Success: no snippet diagnostics in {files_processed} {files}");
            self.paint(text, |s| s.green())
        } else {
            let noun = if total_diagnostics == 1 { "diagnostic" } else { "diagnostics" };
            let text = format!("Found {total_diagnostics} snippet {noun} in {files_processed} {files}");
            self.paint(text, |s| s.red().bold())
        };
        Some(format!("\n{summary} ({duration_ms}ms)"))
    }

    fn use_colors(&self) -> bool {
        self.use_colors
    }
}
