//! Pie chart lexer

use crate::pipeline::{LexError, Lexed};
use crate::plugins::scan::{Scanner, Tok, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieKind {
    Header,
    ShowData,
    Title,
    Text,
    Str,
    Colon,
    Number,
    Word,
    Newline,
    Eof,
}

impl TokenKind for PieKind {
    fn name(&self) -> &'static str {
        match self {
            PieKind::Header => "Header",
            PieKind::ShowData => "ShowData",
            PieKind::Title => "Title",
            PieKind::Text => "Text",
            PieKind::Str => "String",
            PieKind::Colon => "Colon",
            PieKind::Number => "Number",
            PieKind::Word => "Word",
            PieKind::Newline => "Newline",
            PieKind::Eof => "EOF",
        }
    }
}

pub type PieToken = Tok<PieKind>;

pub const HEADERS: &[&str] = &["pie"];

pub fn tokenize(text: &str) -> Lexed<PieToken> {
    let mut s = Scanner::new(text);
    let mut tokens: Vec<PieToken> = Vec::new();
    let mut errors = Vec::new();
    let mut seen_header = false;

    while let Some(c) = s.peek() {
        let (line, column) = (s.line(), s.column());
        let line_start = tokens.last().map_or(true, |t| t.is(PieKind::Newline));
        let after_header = tokens
            .last()
            .map_or(false, |t| t.is(PieKind::Header) || t.is(PieKind::ShowData));

        match c {
            ' ' | '\t' | '\r' => {
                s.bump();
            }
            '\n' => {
                s.bump();
                tokens.push(Tok::new(PieKind::Newline, "\n", line, column));
            }
            '%' if s.starts_with("%%") => {
                s.take_line();
            }
            ':' => {
                s.bump();
                tokens.push(Tok::new(PieKind::Colon, ":", line, column));
            }
            '"' => {
                let mut image = String::new();
                image.push('"');
                s.bump();
                let mut closed = false;
                while let Some(c) = s.peek() {
                    if c == '\n' {
                        break;
                    }
                    if c == '\\' && s.peek_at(1) == Some('"') {
                        image.push_str(&s.take(2));
                        continue;
                    }
                    image.push(c);
                    s.bump();
                    if c == '"' {
                        closed = true;
                        break;
                    }
                }
                if closed {
                    tokens.push(Tok::new(PieKind::Str, image, line, column));
                } else {
                    errors.push(LexError::new(
                        line,
                        column,
                        image.chars().count(),
                        "Unterminated string",
                    ));
                }
            }
            _ if c.is_ascii_digit()
                || (c == '-' && s.peek_at(1).map_or(false, |n| n.is_ascii_digit())) =>
            {
                let mut image = s.take(1);
                image.push_str(&s.take_while(|c| c.is_ascii_digit() || c == '.'));
                tokens.push(Tok::new(PieKind::Number, image, line, column));
            }
            _ => {
                let word = s.take_while(|c| !c.is_whitespace() && c != ':' && c != '"');
                if !seen_header && line_start && HEADERS.contains(&word.as_str()) {
                    seen_header = true;
                    tokens.push(Tok::new(PieKind::Header, word, line, column));
                } else if (line_start || after_header) && word == "showData" {
                    tokens.push(Tok::new(PieKind::ShowData, word, line, column));
                } else if (line_start || after_header) && word == "title" {
                    tokens.push(Tok::new(PieKind::Title, word, line, column));
                    s.skip_blanks();
                    if !s.at_line_end() {
                        let (line, column) = (s.line(), s.column());
                        let text = s.take_line();
                        tokens.push(Tok::new(PieKind::Text, text.trim_end(), line, column));
                    }
                } else {
                    tokens.push(Tok::new(PieKind::Word, word, line, column));
                }
            }
        }
    }

    let (line, column) = (s.line(), s.column());
    tokens.push(Tok::new(PieKind::Eof, "", line, column));
    Lexed { tokens, errors }
}
