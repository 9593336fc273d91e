//! Entity re-encoding of delimited label text

/// A delimiter pair that can enclose a label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// Double quotes; a quote preceded by a backslash does not delimit
    Quote,
    /// Bracket pair such as `[` `]`
    Pair(char, char),
}

/// Encode raw forms using `rules` (raw, encoded).
///
/// Existing encoded forms are copied through untouched, so running the
/// transform on its own output is a no-op.
pub fn encode_protected(input: &str, rules: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    'scan: while let Some(ch) = rest.chars().next() {
        for (_, encoded) in rules {
            if rest.starts_with(encoded) {
                out.push_str(encoded);
                rest = &rest[encoded.len()..];
                continue 'scan;
            }
        }
        for (raw, encoded) in rules {
            if !raw.is_empty() && rest.starts_with(raw) {
                out.push_str(encoded);
                rest = &rest[raw.len()..];
                continue 'scan;
            }
        }
        out.push(ch);
        rest = &rest[ch.len_utf8()..];
    }

    out
}

/// Smallest delimited span around `caret`, as char indexes of the two delimiters
pub fn enclosing_span(chars: &[char], caret: usize, delimiters: &[Delimiter]) -> Option<(usize, usize)> {
    delimiters
        .iter()
        .filter_map(|d| match d {
            Delimiter::Quote => quote_span(chars, caret),
            Delimiter::Pair(open, close) => pair_span(chars, caret, *open, *close),
        })
        .min_by_key(|(open, close)| close - open)
}

fn quote_span(chars: &[char], caret: usize) -> Option<(usize, usize)> {
    let quotes: Vec<usize> = chars
        .iter()
        .enumerate()
        .filter(|&(i, &c)| c == '"' && (i == 0 || chars[i - 1] != '\\'))
        .map(|(i, _)| i)
        .collect();

    quotes
        .chunks_exact(2)
        .map(|pair| (pair[0], pair[1]))
        .find(|&(open, close)| open <= caret && caret <= close)
}

fn pair_span(chars: &[char], caret: usize, open: char, close: char) -> Option<(usize, usize)> {
    let caret = caret.min(chars.len());

    let mut depth = 0usize;
    let mut start = None;
    for i in (0..caret).rev() {
        if chars[i] == close {
            depth += 1;
        } else if chars[i] == open {
            if depth == 0 {
                start = Some(i);
                break;
            }
            depth -= 1;
        }
    }
    let start = start?;

    let mut depth = 0usize;
    for (j, &c) in chars.iter().enumerate().skip(caret) {
        if c == open {
            depth += 1;
        } else if c == close {
            if depth == 0 {
                return Some((start, j));
            }
            depth -= 1;
        }
    }
    None
}
