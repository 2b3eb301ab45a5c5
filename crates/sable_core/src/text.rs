//! Text span types for source location tracking.
//!
//! Every syntax node, bound node that can fault at runtime, and diagnostic
//! carries a `TextSpan` pointing back into the original source text.

use std::fmt;

/// A position in source text, measured as a byte offset from the start.
pub type TextPos = u32;

/// A span in source text, defined by a start position and a length.
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct TextSpan {
    /// The byte offset where this span starts.
    pub start: TextPos,
    /// The length of this span in bytes.
    pub length: TextPos,
}

impl TextSpan {
    #[inline]
    pub fn new(start: TextPos, length: TextPos) -> Self {
        Self { start, length }
    }

    /// Create a span from start and end positions.
    #[inline]
    pub fn from_bounds(start: TextPos, end: TextPos) -> Self {
        debug_assert!(end >= start);
        Self {
            start,
            length: end - start,
        }
    }

    /// Create an empty span at a position.
    #[inline]
    pub fn empty(pos: TextPos) -> Self {
        Self {
            start: pos,
            length: 0,
        }
    }

    /// The end position of this span (exclusive).
    #[inline]
    pub fn end(&self) -> TextPos {
        self.start + self.length
    }
}

impl fmt::Debug for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end())
    }
}

impl fmt::Display for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end())
    }
}

/// Line and column information derived from source text.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct LineAndColumn {
    /// 0-based line number.
    pub line: u32,
    /// 0-based column, in bytes.
    pub character: u32,
}

impl fmt::Display for LineAndColumn {
    /// Renders 1-based `line:column`, the way editors and the CLI show positions.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.character + 1)
    }
}

/// A map from byte offsets to line numbers, built from source text.
#[derive(Debug, Clone)]
pub struct LineMap {
    /// Byte offsets of the start of each line.
    line_starts: Vec<TextPos>,
}

impl LineMap {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0u32];
        for (i, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push((i + 1) as u32);
            }
        }
        Self { line_starts }
    }

    /// 0-based line and column of a byte offset.
    pub fn line_and_column_of(&self, pos: TextPos) -> LineAndColumn {
        let line = match self.line_starts.binary_search(&pos) {
            Ok(line) => line,
            Err(line) => line - 1,
        };
        LineAndColumn {
            line: line as u32,
            character: pos - self.line_starts[line],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_span() {
        let span = TextSpan::new(5, 10);
        assert_eq!(span.end(), 15);
        assert_eq!(TextSpan::from_bounds(5, 15), span);
        assert_eq!(TextSpan::empty(7).end(), 7);
        assert_eq!(format!("{:?}", span), "5..15");
    }

    #[test]
    fn test_line_map() {
        let text = "line1\nline2\nline3";
        let map = LineMap::new(text);
        assert_eq!(map.line_and_column_of(0).to_string(), "1:1");
        assert_eq!(map.line_and_column_of(5).to_string(), "1:6");
        assert_eq!(map.line_and_column_of(6).to_string(), "2:1");
        assert_eq!(map.line_and_column_of(12).to_string(), "3:1");

        let lc = map.line_and_column_of(8);
        assert_eq!(lc.line, 1);
        assert_eq!(lc.character, 2);
        assert_eq!(lc.to_string(), "2:3");
    }
}
