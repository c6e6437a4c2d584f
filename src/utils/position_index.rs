//! Offset and line conversions for document text.

/// Index of line start offsets for a piece of text.
///
/// Lines are 1-based throughout. A line starts at offset 0 and after every `\n`,
/// so `\r\n` documents index the same way as `\n` documents.
#[derive(Debug, Clone)]
pub struct PositionIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl PositionIndex {
    pub fn new(content: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(content.match_indices('\n').map(|(pos, _)| pos + 1));

        Self {
            line_starts,
            len: content.len(),
        }
    }

    /// Number of lines in the indexed text. Empty text has one (empty) line.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// 1-based line containing the byte `offset`.
    ///
    /// Offsets past the end of the text report the last line.
    pub fn line_of(&self, offset: usize) -> usize {
        let offset = offset.min(self.len);
        self.line_starts.partition_point(|&start| start <= offset)
    }

    /// Byte offset where the 1-based `line` starts.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        if line == 0 {
            return None;
        }
        self.line_starts.get(line - 1).copied()
    }

    /// Byte range of the 1-based `line`, excluding its line terminator.
    pub fn line_range(&self, content: &str, line: usize) -> Option<std::ops::Range<usize>> {
        let start = self.line_start(line)?;
        let end = self
            .line_starts
            .get(line)
            .map(|&next| next - 1)
            .unwrap_or(self.len);
        let end = if end > start && content.as_bytes().get(end - 1) == Some(&b'\r') {
            end - 1
        } else {
            end
        };
        Some(start..end)
    }
}
