//! JSON output formatter

use crate::output::OutputFormatter;
use crate::snippets::Diagnostic;
use serde_json::{Value, json};

/// JSON formatter for machine-readable output
#[derive(Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }
}

fn diagnostic_to_json(file_path: &str, diagnostic: &Diagnostic) -> Value {
    let related: Vec<Value> = diagnostic
        .related
        .iter()
        .map(|related| {
            json!({
                "line": related.position.line + 1,
                "column": related.position.column + 1,
                "message": related.message,
            })
        })
        .collect();

    json!({
        "file": file_path,
        "line": diagnostic.line(),
        "column": diagnostic.column(),
        "offset": diagnostic.span.start.offset,
        "severity": diagnostic.severity,
        "message": diagnostic.message,
        "source": diagnostic.source,
        "related": related,
    })
}

impl OutputFormatter for JsonFormatter {
    fn format_diagnostics(&self, diagnostics: &[Diagnostic], file_path: &str) -> String {
        let json_diagnostics: Vec<Value> = diagnostics
            .iter()
            .map(|diagnostic| diagnostic_to_json(file_path, diagnostic))
            .collect();

        serde_json::to_string_pretty(&json_diagnostics).unwrap_or_default()
    }
}

/// Helper to format the diagnostics of many files as a single JSON document
pub fn format_all_diagnostics_as_json<'a, I>(all_diagnostics: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a [Diagnostic])>,
{
    let json_diagnostics: Vec<Value> = all_diagnostics
        .into_iter()
        .flat_map(|(file_path, diagnostics)| {
            diagnostics
                .iter()
                .map(move |diagnostic| diagnostic_to_json(file_path, diagnostic))
        })
        .collect();

    serde_json::to_string_pretty(&json_diagnostics).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::formatters::test_support::{diagnostic, related};
    use crate::snippets::Severity;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_diagnostics_empty() {
        let formatter = JsonFormatter::new();
        assert_eq!(formatter.format_diagnostics(&[], "test.md"), "[]");
    }

    #[test]
    fn test_format_single_diagnostic() {
        let formatter = JsonFormatter::new();
        let mut diag = diagnostic(Severity::Error, 10, 6, "already has a body");
        diag.related.push(related(6, 6, "see previous definition"));

        let output = formatter.format_diagnostics(&[diag], "guide.md");
        let parsed: Value = serde_json::from_str(&output).unwrap();

        assert_eq!(
            parsed,
            json!([{
                "file": "guide.md",
                "line": 10,
                "column": 6,
                "offset": 0,
                "severity": "error",
                "message": "already has a body",
                "source": "markdownsnippetchecker",
                "related": [{"line": 6, "column": 6, "message": "see previous definition"}],
            }])
        );
    }

    #[test]
    fn test_format_all_diagnostics() {
        let a = vec![diagnostic(Severity::Warning, 1, 1, "a")];
        let b = vec![diagnostic(Severity::Error, 2, 2, "b1"), diagnostic(Severity::Error, 3, 3, "b2")];
        let all: Vec<(&str, &[Diagnostic])> = vec![("a.md", a.as_slice()), ("b.md", b.as_slice())];

        let output = format_all_diagnostics_as_json(all);
        let parsed: Vec<Value> = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0]["file"], "a.md");
        assert_eq!(parsed[0]["severity"], "warning");
        assert_eq!(parsed[2]["message"], "b2");
    }
}
