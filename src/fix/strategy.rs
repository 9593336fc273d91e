//! Fix archetypes
//!
//! A strategy looks at one diagnostic and the text it was reported against,
//! and either proposes edits or declines. Strategies never fail: anything
//! they cannot make sense of is a decline.

use super::encode::{encode_protected, enclosing_span, Delimiter};
use super::FixLevel;
use crate::diagnostic::Diagnostic;
use crate::edit::TextEdit;
use crate::position::{indent_of, LineIndex, Position};

/// Edits proposed for a single diagnostic
#[derive(Debug, Clone, PartialEq)]
pub struct Proposal {
    pub level: FixLevel,
    pub edits: Vec<TextEdit>,
    /// The edits rewrite a whole delimited span; other fixes on the line wait a pass
    pub whole_line: bool,
}

impl Proposal {
    fn safe(edit: TextEdit) -> Self {
        Self {
            level: FixLevel::Safe,
            edits: vec![edit],
            whole_line: false,
        }
    }

    fn at_level(level: FixLevel, edit: TextEdit) -> Self {
        Self {
            level,
            edits: vec![edit],
            whole_line: false,
        }
    }
}

/// How a block opener is recognised when searching upward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOpener {
    /// First word of the line is one of these keywords
    Keywords(&'static [&'static str]),
    /// Line ends with `{`
    TrailingBrace,
}

/// Where an inserted separator goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// At the diagnostic column
    Caret,
    /// After the last non-blank character of the line
    LineEnd,
}

/// A bracket shape (opening, closing)
pub type Shape = (&'static str, &'static str);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Replace the reported span with a fixed string
    ReplaceToken { replacement: &'static str },
    /// Replace the word at the caret with its nearest keyword
    ReplaceKeyword { keywords: &'static [&'static str] },
    /// Re-encode the enclosing label using (raw, encoded) pairs
    EncodeEntities {
        rules: &'static [(&'static str, &'static str)],
        delimiters: &'static [Delimiter],
    },
    /// Swap a wrong closer, or insert a missing one
    RepairBracket { shapes: &'static [Shape] },
    /// Insert a block closer after the block's last line
    CloseBlock {
        opener: BlockOpener,
        closer: &'static str,
    },
    /// Break trailing tokens onto their own line
    SplitStatement,
    /// Insert a separator at the caret or at the end of the line
    InsertText {
        text: &'static str,
        anchor: Anchor,
        level: FixLevel,
    },
}

impl Strategy {
    /// Propose edits for `diag`, or `None` to decline
    pub fn propose(&self, index: &LineIndex<'_>, diag: &Diagnostic) -> Option<Proposal> {
        match *self {
            Strategy::ReplaceToken { replacement } => replace_token(index, diag, replacement),
            Strategy::ReplaceKeyword { keywords } => replace_keyword(index, diag, keywords),
            Strategy::EncodeEntities { rules, delimiters } => {
                encode_entities(index, diag, rules, delimiters)
            }
            Strategy::RepairBracket { shapes } => repair_bracket(index, diag, shapes),
            Strategy::CloseBlock { opener, closer } => close_block(index, diag, opener, closer),
            Strategy::SplitStatement => split_statement(index, diag),
            Strategy::InsertText {
                text,
                anchor,
                level,
            } => insert_text(index, diag, text, anchor, level),
        }
    }

    /// Short human-readable name of the archetype
    pub fn describe(&self) -> &'static str {
        match self {
            Strategy::ReplaceToken { .. } => "replace token",
            Strategy::ReplaceKeyword { .. } => "replace misspelled keyword",
            Strategy::EncodeEntities { .. } => "encode label entities",
            Strategy::RepairBracket { .. } => "repair bracket",
            Strategy::CloseBlock { .. } => "close block",
            Strategy::SplitStatement => "split statement",
            Strategy::InsertText { .. } => "insert separator",
        }
    }

    /// The level at which this strategy is allowed to act at all
    pub fn min_level(&self) -> FixLevel {
        match self {
            Strategy::CloseBlock { .. } => FixLevel::All,
            Strategy::InsertText { level, .. } => *level,
            _ => FixLevel::Safe,
        }
    }
}

/// Characters of the diagnostic line plus the clamped 0-based caret
fn line_chars(index: &LineIndex<'_>, diag: &Diagnostic) -> Option<(Vec<char>, usize)> {
    let line = index.get_line(diag.line)?;
    let chars: Vec<char> = line.chars().collect();
    let caret = diag.column.saturating_sub(1).min(chars.len());
    Some((chars, caret))
}

fn replace_token(index: &LineIndex<'_>, diag: &Diagnostic, replacement: &str) -> Option<Proposal> {
    let (chars, caret) = line_chars(index, diag)?;
    let end = (caret + diag.span_len()).min(chars.len());
    if end == caret {
        return None;
    }
    let current: String = chars[caret..end].iter().collect();
    if current == replacement {
        return None;
    }
    Some(Proposal::safe(TextEdit::replace_span(
        diag.line,
        caret + 1,
        end - caret,
        replacement,
    )))
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

fn replace_keyword(
    index: &LineIndex<'_>,
    diag: &Diagnostic,
    keywords: &'static [&'static str],
) -> Option<Proposal> {
    let (chars, caret) = line_chars(index, diag)?;
    let mut start = caret;
    while start > 0 && is_word_char(chars[start - 1]) {
        start -= 1;
    }
    let mut end = caret;
    while end < chars.len() && is_word_char(chars[end]) {
        end += 1;
    }
    if start == end {
        return None;
    }

    let word: String = chars[start..end].iter().collect();
    let keyword = match suggested_keyword(diag) {
        Some(keyword) if keyword == word => return None,
        Some(keyword) => keyword,
        None => nearest_keyword(&word, keywords)?,
    };
    Some(Proposal::safe(TextEdit::replace_span(
        diag.line,
        start + 1,
        end - start,
        keyword,
    )))
}

const KEYWORD_HINT_PREFIX: &str = "Replace with '";

/// Hint naming the keyword a misspelled word should become.
///
/// The keyword fix prefers this over guessing from its own keyword list,
/// so each dialect's suggestion is the one written.
pub fn keyword_hint(keyword: &str) -> String {
    format!("{}{}'", KEYWORD_HINT_PREFIX, keyword)
}

/// Keyword carried by a [`keyword_hint`], if the diagnostic has one
fn suggested_keyword(diag: &Diagnostic) -> Option<&str> {
    let keyword = diag
        .hint
        .as_deref()?
        .strip_prefix(KEYWORD_HINT_PREFIX)?
        .strip_suffix('\'')?;
    if keyword.is_empty() || !keyword.chars().all(is_word_char) {
        return None;
    }
    Some(keyword)
}

/// Largest edit distance at which a word is considered a misspelled keyword
pub const MAX_KEYWORD_DISTANCE: usize = 2;

/// Closest keyword to `word` within [`MAX_KEYWORD_DISTANCE`] edits.
///
/// An exact match returns `None`; it is not a misspelling. Words shorter
/// than four characters are never matched.
pub fn nearest_keyword(word: &str, keywords: &[&'static str]) -> Option<&'static str> {
    if word.chars().count() < 4 {
        return None;
    }
    let lowered = word.to_lowercase();
    let mut best: Option<(usize, &'static str)> = None;
    for &keyword in keywords {
        if keyword == word {
            return None;
        }
        let distance = edit_distance(&lowered, &keyword.to_lowercase());
        if distance <= MAX_KEYWORD_DISTANCE && best.map_or(true, |(d, _)| distance < d) {
            best = Some((distance, keyword));
        }
    }
    best.map(|(_, keyword)| keyword)
}

/// Levenshtein distance over characters
pub fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut row = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        row[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            row[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(row[j] + 1);
        }
        std::mem::swap(&mut prev, &mut row);
    }
    prev[b.len()]
}

fn encode_entities(
    index: &LineIndex<'_>,
    diag: &Diagnostic,
    rules: &[(&str, &str)],
    delimiters: &[Delimiter],
) -> Option<Proposal> {
    let (chars, caret) = line_chars(index, diag)?;

    if let Some((open, close)) = enclosing_span(&chars, caret, delimiters) {
        let (mut from, mut to) = (open + 1, close);
        // A quoted label inside brackets keeps its own quotes.
        if to - from >= 2 && chars[from] == '"' && chars[to - 1] == '"' {
            from += 1;
            to -= 1;
        }
        let inner: String = chars[from..to].iter().collect();
        let encoded = encode_protected(&inner, rules);
        if encoded == inner {
            return None;
        }
        return Some(Proposal {
            level: FixLevel::Safe,
            edits: vec![TextEdit::replace_span(
                diag.line,
                from + 1,
                to - from,
                encoded,
            )],
            whole_line: true,
        });
    }

    // No enclosing label found: fall back to the raw form under the caret.
    let rest: String = chars[caret..].iter().collect();
    rules
        .iter()
        .find(|(raw, encoded)| rest.starts_with(raw) && !rest.starts_with(encoded))
        .map(|(raw, encoded)| {
            Proposal::safe(TextEdit::replace_span(
                diag.line,
                caret + 1,
                raw.chars().count(),
                *encoded,
            ))
        })
}

fn is_opener_char(c: char, shapes: &[Shape]) -> bool {
    shapes.iter().any(|(open, _)| open.contains(c))
}

fn is_closer_char(c: char, shapes: &[Shape]) -> bool {
    shapes.iter().any(|(_, close)| close.contains(c))
}

/// Find the unmatched opener before `caret`; returns (end index exclusive, shape)
fn unmatched_shape(chars: &[char], caret: usize, shapes: &'static [Shape]) -> Option<(usize, Shape)> {
    let mut depth = 0usize;
    for i in (0..caret).rev() {
        let c = chars[i];
        if is_closer_char(c, shapes) && !is_opener_char(c, shapes) {
            depth += 1;
        } else if is_opener_char(c, shapes) {
            if depth > 0 {
                depth -= 1;
                continue;
            }
            // Longest shape whose opening text ends at this character.
            return shapes
                .iter()
                .filter(|(open, _)| {
                    let len = open.chars().count();
                    len <= i + 1 && chars[i + 1 - len..=i].iter().copied().eq(open.chars())
                })
                .max_by_key(|(open, _)| open.chars().count())
                .map(|shape| (i + 1, *shape));
        }
    }
    None
}

fn repair_bracket(index: &LineIndex<'_>, diag: &Diagnostic, shapes: &'static [Shape]) -> Option<Proposal> {
    let (chars, caret) = line_chars(index, diag)?;
    let (open_end, (_, expected)) = unmatched_shape(&chars, caret, shapes)?;

    let span_end = (caret + diag.span_len()).min(chars.len());
    let span = &chars[caret..span_end];
    if !span.is_empty() && span.iter().all(|&c| is_closer_char(c, shapes)) {
        if span.iter().copied().eq(expected.chars()) {
            return None;
        }
        return Some(Proposal::safe(TextEdit::replace_span(
            diag.line,
            caret + 1,
            span.len(),
            expected,
        )));
    }

    let mut at = caret;
    while at > open_end && chars[at - 1].is_whitespace() {
        at -= 1;
    }
    Some(Proposal::at_level(
        FixLevel::All,
        TextEdit::insert(Position::new(diag.line, at + 1), expected),
    ))
}

fn first_word(line: &str) -> &str {
    line.split(|c: char| c.is_whitespace() || c == ';')
        .next()
        .unwrap_or("")
}

fn is_block_closer(trimmed: &str, closer: &str) -> bool {
    if closer.chars().all(char::is_alphanumeric) {
        first_word(trimmed) == closer
    } else {
        trimmed.starts_with(closer)
    }
}

fn opens_block(trimmed: &str, opener: BlockOpener) -> bool {
    match opener {
        BlockOpener::Keywords(keywords) => {
            let word = first_word(trimmed);
            keywords.iter().any(|k| *k == word)
        }
        BlockOpener::TrailingBrace => trimmed.ends_with('{'),
    }
}

fn indent_width(indent: &str) -> usize {
    indent.chars().map(|c| if c == '\t' { 4 } else { 1 }).sum()
}

fn close_block(
    index: &LineIndex<'_>,
    diag: &Diagnostic,
    opener: BlockOpener,
    closer: &str,
) -> Option<Proposal> {
    let total = index.line_count();
    let error_line = diag.line.clamp(1, total);

    let mut depth = 0usize;
    let mut open_line = None;
    for ln in (1..=error_line).rev() {
        let trimmed = index.line(ln).trim();
        if is_block_closer(trimmed, closer) {
            depth += 1;
        } else if opens_block(trimmed, opener) {
            if depth == 0 {
                open_line = Some(ln);
                break;
            }
            depth -= 1;
        }
    }
    let open_line = open_line?;

    let indent = indent_of(index.line(open_line));
    let width = indent_width(indent);
    let newline = if index.text().contains("\r\n") { "\r\n" } else { "\n" };

    let boundary = (open_line + 1..=total).find(|&ln| {
        let line = index.line(ln);
        !line.trim().is_empty() && indent_width(indent_of(line)) <= width
    });

    let edit = match boundary {
        Some(ln) => TextEdit::insert(Position::new(ln, 1), format!("{indent}{closer}{newline}")),
        None => {
            let last = index.line(total);
            if last.is_empty() {
                TextEdit::insert(Position::new(total, 1), format!("{indent}{closer}{newline}"))
            } else {
                TextEdit::insert(
                    Position::new(total, last.chars().count() + 1),
                    format!("{newline}{indent}{closer}"),
                )
            }
        }
    };
    Some(Proposal::at_level(FixLevel::All, edit))
}

fn split_statement(index: &LineIndex<'_>, diag: &Diagnostic) -> Option<Proposal> {
    let (chars, mut caret) = line_chars(index, diag)?;
    while caret < chars.len() && chars[caret].is_whitespace() {
        caret += 1;
    }
    if caret >= chars.len() {
        return None;
    }

    let mut cut = caret;
    while cut > 0 && chars[cut - 1].is_whitespace() {
        cut -= 1;
    }
    if cut == 0 {
        return None;
    }

    let line = index.line(diag.line);
    let newline = if index.text().contains("\r\n") { "\r\n" } else { "\n" };
    Some(Proposal::safe(TextEdit::replace(
        Position::new(diag.line, cut + 1),
        Position::new(diag.line, caret + 1),
        format!("{newline}{}", indent_of(line)),
    )))
}

fn insert_text(
    index: &LineIndex<'_>,
    diag: &Diagnostic,
    text: &str,
    anchor: Anchor,
    level: FixLevel,
) -> Option<Proposal> {
    let (chars, caret) = line_chars(index, diag)?;
    let point = match anchor {
        Anchor::Caret => caret,
        Anchor::LineEnd => chars.len() - chars.iter().rev().take_while(|c| c.is_whitespace()).count(),
    };

    // Already separated: nothing to do.
    let ahead: String = chars[point..].iter().collect();
    let wanted = text.trim();
    if !wanted.is_empty() && ahead.trim_start().starts_with(wanted) {
        return None;
    }

    let edit = if point < chars.len() && chars[point].is_whitespace() {
        TextEdit::replace_span(diag.line, point + 1, 1, text)
    } else {
        TextEdit::insert(Position::new(diag.line, point + 1), text)
    };
    Some(Proposal::at_level(level, edit))
}
