//! Re-anchoring of compiler line numbers onto the Markdown document.
//!
//! The default strategy writes an MSVC `#line` directive in place of the
//! fragment's opening fence. The compiler then numbers lines as the Markdown
//! file does and names the Markdown file in its output, so reported positions
//! need no arithmetic. Toolchains without line directives can use
//! [`RebaseStrategy::FirstLineOffset`], where the staged file keeps its own
//! numbering and the offset is applied when positions are read back.

use crate::utils::{normalize_separators, same_file};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How fragment line numbers are mapped back onto the document.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RebaseStrategy {
    /// Replace the opening fence with `#line <n> "<document>"`
    #[default]
    LineDirective,
    /// Blank the opening fence and add the fragment's start line to reported lines
    FirstLineOffset,
}

impl RebaseStrategy {
    /// Text substituted for the opening delimiter of a fragment whose fence is on
    /// 1-based `start_line`.
    pub fn marker(self, start_line: usize, identity: &str) -> String {
        match self {
            Self::LineDirective => line_directive(start_line + 1, identity),
            Self::FirstLineOffset => String::new(),
        }
    }
}

/// MSVC line directive. The path uses `/` separators only.
pub fn line_directive(line: usize, identity: &str) -> String {
    format!("#line {line} \"{}\"", normalize_separators(identity))
}

/// Position mapping for one staged fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rebase {
    LineDirective,
    FirstLineOffset { start_line: usize, staged_path: String },
}

impl Rebase {
    pub fn new(strategy: RebaseStrategy, start_line: usize, staged_path: &Path) -> Self {
        match strategy {
            RebaseStrategy::LineDirective => Self::LineDirective,
            RebaseStrategy::FirstLineOffset => Self::FirstLineOffset {
                start_line,
                staged_path: staged_path.display().to_string(),
            },
        }
    }

    /// Map a 1-based `(line, column)` reported by the compiler to a 1-based
    /// `(line, column)` in the document.
    pub fn rebased_position(&self, line: usize, column: usize) -> (usize, usize) {
        match self {
            Self::LineDirective => (line, column),
            Self::FirstLineOffset { start_line, .. } => ((start_line + line).saturating_sub(1), column),
        }
    }

    /// Whether a file named in compiler output refers to the document itself.
    pub fn is_document_file(&self, file: &str, identity: &str) -> bool {
        match self {
            Self::LineDirective => same_file(file, identity),
            Self::FirstLineOffset { staged_path, .. } => same_file(file, staged_path) || same_file(file, identity),
        }
    }
}
