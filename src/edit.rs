//! Text edits and their offset-safe application

use crate::position::{LineIndex, Position};
use serde::{Deserialize, Serialize};

/// Replace `[start, end)` with `new_text`. Without `end` the edit is a pure insertion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEdit {
    pub start: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<Position>,
    pub new_text: String,
}

impl TextEdit {
    /// Insert text at a position
    pub fn insert(at: Position, text: impl Into<String>) -> Self {
        Self {
            start: at,
            end: None,
            new_text: text.into(),
        }
    }

    /// Replace the range `[start, end)`
    pub fn replace(start: Position, end: Position, text: impl Into<String>) -> Self {
        Self {
            start,
            end: Some(end),
            new_text: text.into(),
        }
    }

    /// Replace `length` characters starting at `line:column`
    pub fn replace_span(line: usize, column: usize, length: usize, text: impl Into<String>) -> Self {
        Self::replace(
            Position::new(line, column),
            Position::new(line, column + length),
            text,
        )
    }

    /// End position, defaulting to the start
    pub fn end(&self) -> Position {
        self.end.unwrap_or(self.start)
    }

    /// Resolve to byte offsets against `index`; the range is never inverted
    pub fn resolve(&self, index: &LineIndex<'_>) -> (usize, usize) {
        let start = index.offset(self.start);
        let end = index.offset(self.end());
        (start.min(end), start.max(end))
    }
}

/// Apply a batch of edits.
///
/// All offsets are resolved against the original `text` before anything is
/// changed, then edits are applied from the end of the buffer toward the
/// start so pending edits never shift. Overlapping edits are not reconciled;
/// callers must not pass them.
pub fn apply_edits(text: &str, edits: &[TextEdit]) -> String {
    if edits.is_empty() {
        return text.to_string();
    }

    let index = LineIndex::new(text);
    let mut resolved: Vec<(usize, usize, &str)> = edits
        .iter()
        .map(|edit| {
            let (start, end) = edit.resolve(&index);
            (start, end, edit.new_text.as_str())
        })
        .collect();

    // Sort descending by start offset so earlier edits don't shift the later ones.
    resolved.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));

    let mut out = text.to_string();
    for (start, end, new_text) in resolved {
        out.replace_range(start..end, new_text);
    }
    out
}
