//! Line/column and offset reconciliation
//!
//! Positions are 1-based on both axes and count characters. Offsets are byte
//! offsets into the UTF-8 buffer. Every conversion clamps instead of failing.

use serde::{Deserialize, Serialize};

/// A 1-based line/column position
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based, in characters)
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Line table for one text buffer, split on `\r?\n`
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    text: &'a str,
    /// (start, end) byte ranges of each line, terminator excluded
    lines: Vec<(usize, usize)>,
}

impl<'a> LineIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut lines = Vec::new();
        let mut start = 0;
        for (i, _) in text.match_indices('\n') {
            let end = if i > start && text.as_bytes()[i - 1] == b'\r' {
                i - 1
            } else {
                i
            };
            lines.push((start, end));
            start = i + 1;
        }
        lines.push((start, text.len()));
        Self { text, lines }
    }

    /// The underlying text
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Number of lines (an empty buffer has one empty line)
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn clamp_line(&self, line: usize) -> usize {
        line.clamp(1, self.lines.len())
    }

    /// Text of a line, without its terminator. Out-of-range lines are clamped.
    pub fn line(&self, line: usize) -> &'a str {
        let (start, end) = self.lines[self.clamp_line(line) - 1];
        &self.text[start..end]
    }

    /// Text of a line, or `None` when the line does not exist
    pub fn get_line(&self, line: usize) -> Option<&'a str> {
        if line == 0 || line > self.lines.len() {
            return None;
        }
        Some(self.line(line))
    }

    /// Byte offset where a line starts
    pub fn line_start(&self, line: usize) -> usize {
        self.lines[self.clamp_line(line) - 1].0
    }

    /// Clamp a position into the buffer
    pub fn clamp(&self, pos: Position) -> Position {
        let line = self.clamp_line(pos.line);
        let max_column = self.line(line).chars().count() + 1;
        Position::new(line, pos.column.clamp(1, max_column))
    }

    /// Absolute byte offset of a position
    pub fn offset(&self, pos: Position) -> usize {
        let pos = self.clamp(pos);
        let (start, end) = self.lines[pos.line - 1];
        let line = &self.text[start..end];
        start + byte_of_column(line, pos.column)
    }

    /// Position of an absolute byte offset
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.text.len());
        let idx = self
            .lines
            .partition_point(|&(start, _)| start <= offset)
            .saturating_sub(1);
        let (start, end) = self.lines[idx];
        let within = offset.min(end) - start;
        let line = &self.text[start..end];
        let column = line
            .char_indices()
            .take_while(|(i, _)| *i < within)
            .count()
            + 1;
        Position::new(idx + 1, column)
    }
}

/// Byte index of a 1-based character column within a single line
pub fn byte_of_column(line: &str, column: usize) -> usize {
    line.char_indices()
        .nth(column.saturating_sub(1))
        .map(|(i, _)| i)
        .unwrap_or(line.len())
}

/// Convert a position to an absolute byte offset, clamping out-of-range input
pub fn to_offset(text: &str, pos: Position) -> usize {
    LineIndex::new(text).offset(pos)
}

/// Convert an absolute byte offset to a position
pub fn from_offset(text: &str, offset: usize) -> Position {
    LineIndex::new(text).position(offset)
}

/// Text of a 1-based line (clamped)
pub fn line_text_at(text: &str, line: usize) -> &str {
    LineIndex::new(text).line(line)
}

/// Leading whitespace of a line
pub fn indent_of(line: &str) -> &str {
    let trimmed = line.trim_start_matches([' ', '\t']);
    &line[..line.len() - trimmed.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_offset_basic() {
        let text = "abc\ndef\nghi";
        assert_eq!(to_offset(text, Position::new(1, 1)), 0);
        assert_eq!(to_offset(text, Position::new(2, 1)), 4);
        assert_eq!(to_offset(text, Position::new(3, 3)), 10);
    }

    #[test]
    fn test_to_offset_clamps() {
        let text = "abc\ndef";
        assert_eq!(to_offset(text, Position::new(0, 0)), 0);
        assert_eq!(to_offset(text, Position::new(9, 1)), 4);
        assert_eq!(to_offset(text, Position::new(1, 50)), 3);
        assert_eq!(to_offset(text, Position::new(2, 50)), 7);
    }

    #[test]
    fn test_crlf_lines() {
        let text = "ab\r\ncd\r\n";
        let index = LineIndex::new(text);
        assert_eq!(index.line_count(), 3);
        assert_eq!(index.line(1), "ab");
        assert_eq!(index.line(2), "cd");
        assert_eq!(index.offset(Position::new(2, 1)), 4);
        assert_eq!(index.offset(Position::new(1, 9)), 2);
    }

    #[test]
    fn test_multibyte_columns() {
        let text = "é -> ü";
        assert_eq!(to_offset(text, Position::new(1, 3)), 3);
        assert_eq!(from_offset(text, 3), Position::new(1, 3));
    }

    #[test]
    fn test_from_offset() {
        let text = "abc\ndef\n";
        assert_eq!(from_offset(text, 0), Position::new(1, 1));
        assert_eq!(from_offset(text, 5), Position::new(2, 2));
        assert_eq!(from_offset(text, 8), Position::new(3, 1));
        assert_eq!(from_offset(text, 100), Position::new(3, 1));
    }

    #[test]
    fn test_line_helpers() {
        let text = "flowchart TD\n    A --> B";
        assert_eq!(line_text_at(text, 2), "    A --> B");
        assert_eq!(line_text_at(text, 7), "    A --> B");
        assert_eq!(indent_of("    A --> B"), "    ");
        assert_eq!(indent_of("\tx"), "\t");
        assert_eq!(indent_of("x"), "");
    }

    #[test]
    fn test_get_line_out_of_range() {
        let index = LineIndex::new("one");
        assert_eq!(index.get_line(0), None);
        assert_eq!(index.get_line(1), Some("one"));
        assert_eq!(index.get_line(2), None);
    }
}
