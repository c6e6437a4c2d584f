//! Destinations for per-document diagnostics.

use super::diagnostic::Diagnostic;
use indexmap::IndexMap;

/// Receives the diagnostics of a check pass, keyed by document identity.
///
/// A pass always calls [`clear`](Self::clear) before [`set`](Self::set), so a
/// document never shows diagnostics from an earlier pass.
pub trait DiagnosticSink {
    fn clear(&mut self, document: &str);
    fn set(&mut self, document: &str, diagnostics: Vec<Diagnostic>);
}

/// Sink that keeps diagnostics in memory, in the order documents were checked.
#[derive(Debug, Default)]
pub struct CollectingSink {
    documents: IndexMap<String, Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, document: &str) -> Option<&[Diagnostic]> {
        self.documents.get(document).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Diagnostic])> {
        self.documents.iter().map(|(doc, diags)| (doc.as_str(), diags.as_slice()))
    }

    /// Total number of diagnostics across all documents.
    pub fn total(&self) -> usize {
        self.documents.values().map(Vec::len).sum()
    }

    pub fn into_inner(self) -> IndexMap<String, Vec<Diagnostic>> {
        self.documents
    }
}

impl DiagnosticSink for CollectingSink {
    fn clear(&mut self, document: &str) {
        self.documents.shift_remove(document);
    }

    fn set(&mut self, document: &str, diagnostics: Vec<Diagnostic>) {
        self.documents.insert(document.to_string(), diagnostics);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Position;
    use crate::snippets::diagnostic::Severity;

    fn diag(message: &str) -> Diagnostic {
        let position = Position {
            line: 0,
            column: 0,
            offset: 0,
        };
        Diagnostic::new(Severity::Error, position, message)
    }

    #[test]
    fn test_set_replaces_previous_pass() {
        let mut sink = CollectingSink::new();
        sink.set("a.md", vec![diag("one"), diag("two")]);
        sink.clear("a.md");
        sink.set("a.md", vec![diag("three")]);

        assert_eq!(sink.get("a.md").map(<[Diagnostic]>::len), Some(1));
        assert_eq!(sink.total(), 1);
    }

    #[test]
    fn test_documents_keep_check_order() {
        let mut sink = CollectingSink::new();
        sink.set("b.md", vec![]);
        sink.set("a.md", vec![diag("x")]);

        let order: Vec<&str> = sink.iter().map(|(doc, _)| doc).collect();
        assert_eq!(order, vec!["b.md", "a.md"]);
    }

    #[test]
    fn test_clear_unknown_document() {
        let mut sink = CollectingSink::new();
        sink.clear("missing.md");
        assert!(sink.get("missing.md").is_none());
    }
}
