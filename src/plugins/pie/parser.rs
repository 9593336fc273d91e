//! Pie chart parser

use super::lexer::{PieKind, PieToken};
use crate::fix::nearest_keyword;
use crate::pipeline::Parsed;

const KEYWORDS: &[&str] = &["title", "showData"];

#[derive(Debug, Clone, PartialEq)]
pub struct PieChart {
    pub show_data: bool,
    pub title: Option<String>,
    pub entries: Vec<Entry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub label: String,
    pub line: usize,
    pub column: usize,
    pub value: f64,
    pub value_column: usize,
    pub value_len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PieError {
    MissingColon {
        line: usize,
        column: usize,
    },
    UnquotedLabel {
        line: usize,
        column: usize,
        length: usize,
        label: String,
    },
    MisspelledKeyword {
        line: usize,
        column: usize,
        word: String,
        suggestion: &'static str,
    },
    Unexpected {
        line: usize,
        column: usize,
        length: usize,
        found: String,
        expected: &'static str,
    },
}

pub fn parse(tokens: &[PieToken]) -> Parsed<PieChart, PieError> {
    let mut parser = Parser {
        tokens,
        pos: 0,
        errors: Vec::new(),
    };
    let cst = parser.chart();
    Parsed {
        cst,
        errors: parser.errors,
    }
}

struct Parser<'t> {
    tokens: &'t [PieToken],
    pos: usize,
    errors: Vec<PieError>,
}

impl<'t> Parser<'t> {
    fn peek(&self) -> Option<&'t PieToken> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> PieKind {
        self.peek().map_or(PieKind::Eof, |t| t.kind)
    }

    fn bump(&mut self) -> Option<&'t PieToken> {
        let tok = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(tok)
    }

    fn at_line_end(&self) -> bool {
        matches!(self.peek_kind(), PieKind::Newline | PieKind::Eof)
    }

    fn recover(&mut self) {
        while !self.at_line_end() {
            self.pos += 1;
        }
    }

    fn unexpected(&mut self, expected: &'static str) {
        if let Some(tok) = self.peek() {
            let found = match tok.kind {
                PieKind::Newline => "end of line".to_string(),
                PieKind::Eof => "end of input".to_string(),
                _ => format!("'{}'", tok.image),
            };
            self.errors.push(PieError::Unexpected {
                line: tok.line,
                column: tok.column,
                length: tok.len(),
                found,
                expected,
            });
        }
        self.recover();
    }

    fn skip_newlines(&mut self) {
        while self.peek_kind() == PieKind::Newline {
            self.pos += 1;
        }
    }

    fn chart(&mut self) -> Option<PieChart> {
        self.skip_newlines();
        if self.peek_kind() != PieKind::Header {
            self.unexpected("'pie' header");
            return None;
        }
        self.pos += 1;

        let mut chart = PieChart {
            show_data: false,
            title: None,
            entries: Vec::new(),
        };

        loop {
            match self.peek_kind() {
                PieKind::Eof => break,
                PieKind::Newline => {
                    self.pos += 1;
                    continue;
                }
                PieKind::ShowData => {
                    // `pie showData title ...` keeps going on the same line
                    self.pos += 1;
                    chart.show_data = true;
                    continue;
                }
                PieKind::Title => {
                    self.pos += 1;
                    if self.peek_kind() == PieKind::Text {
                        chart.title = self.bump().map(|t| t.image.clone());
                    }
                }
                PieKind::Str => {
                    if let Some(entry) = self.quoted_entry() {
                        chart.entries.push(entry);
                    }
                }
                PieKind::Word => {
                    if let Some(entry) = self.bare_entry() {
                        chart.entries.push(entry);
                    }
                }
                _ => self.unexpected("a quoted label, 'title' or 'showData'"),
            }
            if !self.at_line_end() {
                self.unexpected("end of line");
            }
        }

        Some(chart)
    }

    fn value(&mut self, label: String, line: usize, column: usize) -> Option<Entry> {
        if self.peek_kind() != PieKind::Number {
            self.unexpected("a number");
            return None;
        }
        let tok = self.bump()?;
        let value = match tok.image.parse::<f64>() {
            Ok(value) => value,
            Err(_) => {
                self.pos -= 1;
                self.unexpected("a number");
                return None;
            }
        };
        Some(Entry {
            label,
            line,
            column,
            value,
            value_column: tok.column,
            value_len: tok.len(),
        })
    }

    fn quoted_entry(&mut self) -> Option<Entry> {
        let label_tok = self.bump()?;
        let label = unquote(&label_tok.image);

        match self.peek_kind() {
            PieKind::Colon => {
                self.pos += 1;
            }
            PieKind::Number => {
                self.errors.push(PieError::MissingColon {
                    line: label_tok.line,
                    column: label_tok.end_column(),
                });
            }
            _ => {
                self.unexpected("':' after the label");
                return None;
            }
        }
        self.value(label, label_tok.line, label_tok.column)
    }

    fn bare_entry(&mut self) -> Option<Entry> {
        let first = self.peek()?;

        let next = self.tokens.get(self.pos + 1).map_or(PieKind::Eof, |t| t.kind);
        if !matches!(next, PieKind::Colon | PieKind::Number) {
            if let Some(suggestion) = nearest_keyword(&first.image, KEYWORDS) {
                self.errors.push(PieError::MisspelledKeyword {
                    line: first.line,
                    column: first.column,
                    word: first.image.clone(),
                    suggestion,
                });
                self.recover();
                return None;
            }
        }

        let mut words = Vec::new();
        let mut end = first.end_column();
        while self.peek_kind() == PieKind::Word {
            if let Some(tok) = self.bump() {
                words.push(tok.image.as_str());
                end = tok.end_column();
            }
        }
        if self.peek_kind() != PieKind::Colon {
            self.unexpected("':' after the label");
            return None;
        }
        let label = words.join(" ");
        self.errors.push(PieError::UnquotedLabel {
            line: first.line,
            column: first.column,
            length: end - first.column,
            label: label.clone(),
        });
        self.pos += 1;
        self.value(label, first.line, first.column)
    }
}

/// Label text without the surrounding quotes
pub fn unquote(image: &str) -> String {
    image
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(image)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::super::lexer::tokenize;
    use super::*;

    fn parse_text(text: &str) -> Parsed<PieChart, PieError> {
        parse(&tokenize(text).tokens)
    }

    #[test]
    fn test_parse_chart() {
        let parsed = parse_text("pie showData\n    title Pets\n    \"Dogs\" : 386\n    \"Cats\" : 85.5\n");
        assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
        let chart = parsed.cst.unwrap();
        assert!(chart.show_data);
        assert_eq!(chart.title.as_deref(), Some("Pets"));
        assert_eq!(chart.entries.len(), 2);
        assert_eq!(chart.entries[1].label, "Cats");
        assert_eq!(chart.entries[1].value, 85.5);
    }

    #[test]
    fn test_missing_colon() {
        let parsed = parse_text("pie\n    \"Dogs\" 42");
        assert_eq!(
            parsed.errors,
            vec![PieError::MissingColon { line: 2, column: 11 }]
        );
        assert_eq!(parsed.cst.unwrap().entries.len(), 1);
    }

    #[test]
    fn test_unquoted_label() {
        let parsed = parse_text("pie\nBig dogs: 3");
        assert_eq!(
            parsed.errors,
            vec![PieError::UnquotedLabel {
                line: 2,
                column: 1,
                length: 8,
                label: "Big dogs".to_string(),
            }]
        );
    }

    #[test]
    fn test_misspelled_title() {
        let parsed = parse_text("pie\ntitel Pets");
        assert!(matches!(
            &parsed.errors[0],
            PieError::MisspelledKeyword { suggestion: "title", .. }
        ));
    }

    #[test]
    fn test_missing_value() {
        let parsed = parse_text("pie\n\"Dogs\":");
        assert!(matches!(
            &parsed.errors[0],
            PieError::Unexpected { expected: "a number", .. }
        ));
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("\"a\""), "a");
        assert_eq!(unquote("a"), "a");
    }
}
