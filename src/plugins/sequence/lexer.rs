//! Sequence diagram lexer

use crate::pipeline::{LexError, Lexed};
use crate::plugins::scan::{is_ident_char, Scanner, Tok, TokenKind};
use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeqKind {
    Header,
    Keyword,
    Ident,
    Arrow,
    InvalidArrow,
    /// `+` or `-` right after an arrow
    Activation,
    Colon,
    Text,
    Newline,
    Eof,
}

impl TokenKind for SeqKind {
    fn name(&self) -> &'static str {
        match self {
            SeqKind::Header => "Header",
            SeqKind::Keyword => "Keyword",
            SeqKind::Ident => "Identifier",
            SeqKind::Arrow => "Arrow",
            SeqKind::InvalidArrow => "InvalidArrow",
            SeqKind::Activation => "Activation",
            SeqKind::Colon => "Colon",
            SeqKind::Text => "Text",
            SeqKind::Newline => "Newline",
            SeqKind::Eof => "EOF",
        }
    }
}

pub type SeqToken = Tok<SeqKind>;

pub const HEADERS: &[&str] = &["sequenceDiagram"];

/// Keywords recognised at the start of a line
pub const KEYWORDS: &[&str] = &[
    "participant",
    "actor",
    "activate",
    "deactivate",
    "autonumber",
    "note",
    "title",
    "loop",
    "alt",
    "else",
    "opt",
    "par",
    "and",
    "critical",
    "option",
    "break",
    "rect",
    "box",
    "end",
];

/// Keywords followed by an identifier rather than free text
const TARGET_KEYWORDS: &[&str] = &["activate", "deactivate"];

static ARROW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:<<--?>>|--?>>|--?>|--?x|--?\))").unwrap());

static INVALID_ARROW: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:==>|=>>|=>)").unwrap());

pub fn tokenize(text: &str) -> Lexed<SeqToken> {
    let mut s = Scanner::new(text);
    let mut tokens: Vec<SeqToken> = Vec::new();
    let mut errors = Vec::new();
    let mut seen_header = false;

    while let Some(c) = s.peek() {
        let (line, column) = (s.line(), s.column());
        let line_start = tokens.last().map_or(true, |t| t.is(SeqKind::Newline));
        let after_arrow = tokens
            .last()
            .map_or(false, |t| t.is(SeqKind::Arrow) || t.is(SeqKind::InvalidArrow));

        match c {
            ' ' | '\t' | '\r' => {
                s.bump();
            }
            '\n' => {
                s.bump();
                tokens.push(Tok::new(SeqKind::Newline, "\n", line, column));
            }
            '%' if s.starts_with("%%") => {
                s.take_line();
            }
            ':' => {
                s.bump();
                tokens.push(Tok::new(SeqKind::Colon, ":", line, column));
                trailing_text(&mut s, &mut tokens);
            }
            '+' | '-' if after_arrow => {
                let image = s.take(1);
                tokens.push(Tok::new(SeqKind::Activation, image, line, column));
            }
            _ if is_ident_char(c) => {
                let word = s.take_while(is_ident_char);
                if !seen_header && line_start && HEADERS.contains(&word.as_str()) {
                    seen_header = true;
                    tokens.push(Tok::new(SeqKind::Header, word, line, column));
                } else if line_start && KEYWORDS.contains(&word.as_str()) {
                    let takes_text = word != "end" && !TARGET_KEYWORDS.contains(&word.as_str());
                    tokens.push(Tok::new(SeqKind::Keyword, word, line, column));
                    if takes_text {
                        trailing_text(&mut s, &mut tokens);
                    }
                } else {
                    tokens.push(Tok::new(SeqKind::Ident, word, line, column));
                }
            }
            _ => {
                let rest = s.rest_of_line();
                let arrow = [(&*ARROW, SeqKind::Arrow), (&*INVALID_ARROW, SeqKind::InvalidArrow)]
                    .into_iter()
                    .find_map(|(regex, kind)| regex.find(&rest).map(|m| (m.as_str().chars().count(), kind)));
                match arrow {
                    Some((len, kind)) => {
                        let image = s.take(len);
                        tokens.push(Tok::new(kind, image, line, column));
                    }
                    None => {
                        errors.push(LexError::new(
                            line,
                            column,
                            1,
                            format!("Unexpected character '{}'", c),
                        ));
                        s.bump();
                    }
                }
            }
        }
    }

    let (line, column) = (s.line(), s.column());
    tokens.push(Tok::new(SeqKind::Eof, "", line, column));
    Lexed { tokens, errors }
}

fn trailing_text(s: &mut Scanner, tokens: &mut Vec<SeqToken>) {
    s.skip_blanks();
    if s.at_line_end() {
        return;
    }
    let (line, column) = (s.line(), s.column());
    let text = s.take_line();
    tokens.push(Tok::new(SeqKind::Text, text.trim_end(), line, column));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<SeqKind> {
        tokenize(text).tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_message() {
        use SeqKind::*;
        assert_eq!(
            kinds("sequenceDiagram\nAlice->>Bob: Hello: there"),
            vec![Header, Newline, Ident, Arrow, Ident, Colon, Text, Eof]
        );
        let lexed = tokenize("A->>B: Hello: there");
        assert_eq!(lexed.tokens[4].image, "Hello: there");
    }

    #[test]
    fn test_arrow_forms() {
        for arrow in ["->>", "-->>", "->", "-->", "-x", "--x", "-)", "--)", "<<->>", "<<-->>"] {
            let lexed = tokenize(&format!("A{}B", arrow));
            assert!(lexed.errors.is_empty(), "{}", arrow);
            assert_eq!(lexed.tokens[1].kind, SeqKind::Arrow, "{}", arrow);
            assert_eq!(lexed.tokens[1].image, arrow);
        }
    }

    #[test]
    fn test_invalid_arrows() {
        for arrow in ["=>", "==>", "=>>"] {
            let lexed = tokenize(&format!("A{}B", arrow));
            assert_eq!(lexed.tokens[1].kind, SeqKind::InvalidArrow, "{}", arrow);
            assert_eq!(lexed.tokens[1].image, arrow);
        }
    }

    #[test]
    fn test_activation_shorthand() {
        use SeqKind::*;
        assert_eq!(kinds("A->>+B: hi"), vec![Ident, Arrow, Activation, Ident, Colon, Text, Eof]);
        assert_eq!(kinds("B-->>-A: ok"), vec![Ident, Arrow, Activation, Ident, Colon, Text, Eof]);
    }

    #[test]
    fn test_block_keywords_take_text() {
        use SeqKind::*;
        assert_eq!(
            kinds("loop Every minute\n  A->>B: ping\nend"),
            vec![Keyword, Text, Newline, Ident, Arrow, Ident, Colon, Text, Newline, Keyword, Eof]
        );
        assert_eq!(kinds("activate Alice"), vec![Keyword, Ident, Eof]);
    }

    #[test]
    fn test_keyword_only_at_line_start() {
        let lexed = tokenize("A->>loop: x");
        assert_eq!(lexed.tokens[2].kind, SeqKind::Ident);
    }

    #[test]
    fn test_unexpected_character() {
        let lexed = tokenize("A->>B $");
        assert_eq!(lexed.errors.len(), 1);
        assert_eq!(lexed.errors[0].column, 7);
    }
}
