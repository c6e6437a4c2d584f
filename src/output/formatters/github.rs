//! GitHub Actions annotation format

use crate::output::OutputFormatter;
use crate::snippets::{Diagnostic, Severity};

/// GitHub Actions formatter
/// Outputs in the format: ::error file=<file>,line=<line>,col=<col>,title=<source>::<message>
#[derive(Default)]
pub struct GitHubFormatter;

impl GitHubFormatter {
    pub fn new() -> Self {
        Self
    }
}

/// Escape a workflow command message; multi-line messages survive as `%0A`.
fn escape_data(text: &str) -> String {
    text.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}

/// Escape a workflow command property value.
fn escape_property(text: &str) -> String {
    escape_data(text).replace(':', "%3A").replace(',', "%2C")
}

impl OutputFormatter for GitHubFormatter {
    fn format_diagnostics(&self, diagnostics: &[Diagnostic], file_path: &str) -> String {
        diagnostics
            .iter()
            .map(|diagnostic| {
                let level = match diagnostic.severity {
                    Severity::Error => "error",
                    Severity::Warning => "warning",
                    Severity::Information => "notice",
                };
                format!(
                    "::{level} file={},line={},col={},title={}::{}",
                    escape_property(file_path),
                    diagnostic.line(),
                    diagnostic.column(),
                    escape_property(&diagnostic.source),
                    escape_data(&diagnostic.message)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::formatters::test_support::diagnostic;

    #[test]
    fn test_github_format() {
        let formatter = GitHubFormatter::new();
        let diags = vec![diagnostic(Severity::Error, 7, 12, "'y': undeclared identifier")];

        let output = formatter.format_diagnostics(&diags, "docs/guide.md");
        assert_eq!(
            output,
            "::error file=docs/guide.md,line=7,col=12,title=markdownsnippetchecker::'y': undeclared identifier"
        );
    }

    #[test]
    fn test_github_levels_and_escaping() {
        let formatter = GitHubFormatter::new();
        let diags = vec![
            diagnostic(Severity::Warning, 1, 1, "100% unused\n    int x;"),
            diagnostic(Severity::Information, 2, 1, "fyi"),
        ];

        let output = formatter.format_diagnostics(&diags, "a,b.md");
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines[0],
            "::warning file=a%2Cb.md,line=1,col=1,title=markdownsnippetchecker::100%25 unused%0A    int x;"
        );
        assert!(lines[1].starts_with("::notice "));
    }
}
