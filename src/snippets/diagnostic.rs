//! Structured diagnostics produced from compiler output.

use crate::document::Position;
use serde::Serialize;
use std::fmt;

/// Tag attached to every diagnostic this crate produces.
pub const SOURCE_TAG: &str = "markdownsnippetchecker";

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Information,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Information => write!(f, "info"),
        }
    }
}

/// A document range. Snippet diagnostics are points, so `start == end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn point(position: Position) -> Self {
        Self {
            start: position,
            end: position,
        }
    }
}

/// A secondary location attached to a diagnostic ("see declaration of ...").
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedLocation {
    pub position: Position,
    pub message: String,
}

/// A compiler diagnostic anchored in the Markdown document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub span: Span,
    /// Message text; continuation lines are joined with `\n`.
    pub message: String,
    pub related: Vec<RelatedLocation>,
    pub source: String,
}

impl Diagnostic {
    pub fn new(severity: Severity, position: Position, message: impl Into<String>) -> Self {
        Self {
            severity,
            span: Span::point(position),
            message: message.into(),
            related: Vec::new(),
            source: SOURCE_TAG.to_string(),
        }
    }

    /// 1-based line in the document, for display.
    pub fn line(&self) -> usize {
        self.span.start.line + 1
    }

    /// 1-based column in the document, for display.
    pub fn column(&self) -> usize {
        self.span.start.column + 1
    }

    /// Append a line to the message.
    pub fn push_message_line(&mut self, line: &str) {
        self.message.push('\n');
        self.message.push_str(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(line: usize, column: usize) -> Position {
        Position {
            line,
            column,
            offset: 0,
        }
    }

    #[test]
    fn test_new_is_zero_width() {
        let diag = Diagnostic::new(Severity::Error, pos(4, 2), "boom");
        assert_eq!(diag.span.start, diag.span.end);
        assert_eq!(diag.source, SOURCE_TAG);
        assert_eq!(diag.line(), 5);
        assert_eq!(diag.column(), 3);
    }

    #[test]
    fn test_push_message_line() {
        let mut diag = Diagnostic::new(Severity::Warning, pos(0, 0), "first");
        diag.push_message_line("second");
        diag.push_message_line("third");
        assert_eq!(diag.message, "first\nsecond\nthird");
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(Severity::Error.to_string(), "error");
        assert_eq!(Severity::Warning.to_string(), "warning");
        assert_eq!(Severity::Information.to_string(), "info");
    }
}
