//! Read-only view of the Markdown document being checked.
//!
//! Snippet checking never edits the document; it only needs the full text, a
//! stable identity (the path compilers will echo back) and a way to turn a
//! line/column pair into an addressable position.

use crate::utils::PositionIndex;
use crate::utils::utf8_offsets::char_offset_to_byte_offset;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};

/// A point in a document. `line` and `column` are 0-based, `column` counts characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    /// Absolute byte offset into the document text.
    pub offset: usize,
}

/// The document collaborator.
pub trait Document {
    /// Full text of the document.
    fn text(&self) -> &str;

    /// Stable identity, normally the absolute path.
    fn identity(&self) -> &str;

    /// Number of lines in the document.
    fn line_count(&self) -> usize;

    /// Translate a 1-based `line` and 0-based character `column` into a position.
    ///
    /// Both values are clamped into the document, so the returned position is
    /// always addressable.
    fn position_at(&self, line: usize, column: usize) -> Position;
}

/// A document backed by an in-memory string.
#[derive(Debug, Clone)]
pub struct TextDocument {
    path: PathBuf,
    identity: String,
    text: String,
    index: PositionIndex,
}

impl TextDocument {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let path = path.into();
        let text = text.into();
        let index = PositionIndex::new(&text);
        Self {
            identity: path.display().to_string(),
            path,
            text,
            index,
        }
    }

    /// Read a document from disk. The identity is the absolute form of `path`.
    pub fn open(path: &Path) -> io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        Ok(Self::new(absolute, text))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Document for TextDocument {
    fn text(&self) -> &str {
        &self.text
    }

    fn identity(&self) -> &str {
        &self.identity
    }

    fn line_count(&self) -> usize {
        self.index.line_count()
    }

    fn position_at(&self, line: usize, column: usize) -> Position {
        let line = line.clamp(1, self.line_count());
        let range = self
            .index
            .line_range(&self.text, line)
            .unwrap_or(self.text.len()..self.text.len());
        let line_text = &self.text[range.clone()];
        let column = column.min(line_text.chars().count());

        Position {
            line: line - 1,
            column,
            offset: range.start + char_offset_to_byte_offset(line_text, column),
        }
    }
}
