//! Character scanner and generic token shared by the built-in dialects

use crate::pipeline::Token;
use std::fmt::Debug;

/// Token kind enums implement this to expose a stable name
pub trait TokenKind: Copy + Eq + Debug {
    fn name(&self) -> &'static str;
}

/// A token with its source position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tok<K> {
    pub kind: K,
    pub image: String,
    pub line: usize,
    pub column: usize,
}

impl<K: TokenKind> Tok<K> {
    pub fn new(kind: K, image: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            image: image.into(),
            line,
            column,
        }
    }

    /// Length in characters, at least 1 so carets stay visible
    pub fn len(&self) -> usize {
        self.image.chars().count().max(1)
    }

    pub fn is(&self, kind: K) -> bool {
        self.kind == kind
    }

    /// Column just past the last character
    pub fn end_column(&self) -> usize {
        self.column + self.image.chars().count()
    }
}

impl<K: TokenKind> Token for Tok<K> {
    fn start_line(&self) -> usize {
        self.line
    }

    fn start_column(&self) -> usize {
        self.column
    }

    fn image(&self) -> &str {
        &self.image
    }

    fn kind(&self) -> &str {
        self.kind.name()
    }
}

/// Cursor over a text that tracks 1-based line and character column
#[derive(Debug, Clone)]
pub struct Scanner {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Scanner {
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.chars.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    pub fn peek_at(&self, n: usize) -> Option<char> {
        self.chars.get(self.pos + n).copied()
    }

    /// Advance one character
    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    pub fn starts_with(&self, s: &str) -> bool {
        let mut i = self.pos;
        for c in s.chars() {
            if self.chars.get(i) != Some(&c) {
                return false;
            }
            i += 1;
        }
        true
    }

    /// Consume `s` if the input starts with it
    pub fn eat(&mut self, s: &str) -> bool {
        if !self.starts_with(s) {
            return false;
        }
        for _ in s.chars() {
            self.bump();
        }
        true
    }

    pub fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            out.push(c);
            self.bump();
        }
        out
    }

    /// Consume `n` characters
    pub fn take(&mut self, n: usize) -> String {
        (0..n).filter_map(|_| self.bump()).collect()
    }

    /// Skip spaces, tabs and carriage returns; newlines are significant
    pub fn skip_blanks(&mut self) {
        self.take_while(|c| c == ' ' || c == '\t' || c == '\r');
    }

    /// Remaining text of the current line, without the terminator
    pub fn rest_of_line(&self) -> String {
        self.chars[self.pos.min(self.chars.len())..]
            .iter()
            .take_while(|&&c| c != '\n')
            .collect::<String>()
            .trim_end_matches('\r')
            .to_string()
    }

    /// Consume the rest of the current line, leaving the newline
    pub fn take_line(&mut self) -> String {
        let rest = self.rest_of_line();
        self.take_while(|c| c != '\n');
        rest
    }

    /// Whether only blanks remain before the end of the line
    pub fn at_line_end(&self) -> bool {
        self.rest_of_line().trim().is_empty()
    }
}

/// Characters allowed in identifiers
pub fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum K {
        Word,
    }

    impl TokenKind for K {
        fn name(&self) -> &'static str {
            "Word"
        }
    }

    #[test]
    fn test_positions_track_lines() {
        let mut s = Scanner::new("ab\ncd");
        assert_eq!((s.line(), s.column()), (1, 1));
        s.take(2);
        assert_eq!((s.line(), s.column()), (1, 3));
        s.bump();
        assert_eq!((s.line(), s.column()), (2, 1));
        assert_eq!(s.take_line(), "cd");
        assert!(s.is_eof());
    }

    #[test]
    fn test_columns_count_chars() {
        let mut s = Scanner::new("éé x");
        s.take(3);
        assert_eq!(s.column(), 4);
        assert_eq!(s.peek(), Some('x'));
    }

    #[test]
    fn test_eat_and_rest_of_line() {
        let mut s = Scanner::new("--> B\r\nC");
        assert!(!s.eat("->"));
        assert!(s.eat("-->"));
        s.skip_blanks();
        assert_eq!(s.rest_of_line(), "B");
        s.take_line();
        assert_eq!(s.peek(), Some('\n'));
    }

    #[test]
    fn test_tok_implements_token() {
        let tok = Tok::new(K::Word, "hello", 3, 7);
        assert_eq!(tok.start_line(), 3);
        assert_eq!(tok.start_column(), 7);
        assert_eq!(Token::kind(&tok), "Word");
        assert_eq!(tok.end_column(), 12);
        assert_eq!(Tok::new(K::Word, "", 1, 1).len(), 1);
    }
}
