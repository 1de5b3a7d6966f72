//! Source positions for diagnostics
//!
//! Every node the parser produces and every error it reports carries a
//! [`Position`]: the byte offset into the source plus the 1-based line and
//! column a person would look for in an editor.

use std::fmt;

/// A location in template source
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    /// Byte offset from the start of the source
    pub offset: usize,
    /// Line number, starting at 1
    pub line: usize,
    /// Column number in characters, starting at 1
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Newline table for offset to line/column lookups
///
/// Built once per parse; each lookup is a binary search over the byte
/// offsets of the newlines in the source.
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    source: &'a str,
    line_breaks: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(source: &'a str) -> Self {
        let line_breaks = source
            .char_indices()
            .filter_map(|(idx, ch)| if ch == '\n' { Some(idx) } else { None })
            .collect();
        Self {
            source,
            line_breaks,
        }
    }

    /// Resolve a byte offset. Offsets past the end clamp to the end of input.
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.source.len());
        // A newline belongs to the line it terminates.
        let row = match self.line_breaks.binary_search(&offset) {
            Ok(idx) | Err(idx) => idx,
        };
        let line_start = if row == 0 {
            0
        } else {
            self.line_breaks[row - 1] + 1
        };
        let column = self
            .source
            .get(line_start..offset)
            .map_or(offset - line_start, |prefix| prefix.chars().count());
        Position {
            offset,
            line: row + 1,
            column: column + 1,
        }
    }
}
