//! Sequence diagram parser
//!
//! Line-oriented: every statement fills one line, and a bad line is
//! skipped after its first error. Blocks are tracked on an explicit stack so
//! an `end` with nothing open, or a block still open at the end of input,
//! is reported where it happens.

use super::lexer::{SeqKind, SeqToken, KEYWORDS};
use crate::fix::nearest_keyword;
use crate::pipeline::Parsed;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceDiagram {
    pub header_line: usize,
    pub statements: Vec<SeqStatement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeqStatement {
    Participant {
        line: usize,
        keyword: String,
        name: String,
    },
    Message(Message),
    Note {
        line: usize,
    },
    Activation {
        line: usize,
        active: bool,
        target: String,
    },
    /// `autonumber`, `title`
    Directive {
        line: usize,
        keyword: String,
    },
    Block(Block),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub from: String,
    pub to: String,
    pub arrow: String,
    pub line: usize,
    pub text: Option<String>,
}

/// `loop`, `alt`, `opt`, `par`, `critical`, `break`, `rect` or `box` up to its `end`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub keyword: String,
    pub line: usize,
    pub column: usize,
    pub label: Option<String>,
    /// Lines of `else` / `and` / `option` branches
    pub branches: Vec<usize>,
    pub body: Vec<SeqStatement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeqError {
    MissingColon {
        line: usize,
        column: usize,
    },
    MisspelledKeyword {
        line: usize,
        column: usize,
        word: String,
        suggestion: &'static str,
    },
    BlockMissingEnd {
        line: usize,
        column: usize,
        keyword: String,
        opened_at: usize,
    },
    EndWithoutBlock {
        line: usize,
        column: usize,
    },
    BranchOutsideBlock {
        line: usize,
        column: usize,
        keyword: String,
        parent: &'static str,
    },
    Unexpected {
        line: usize,
        column: usize,
        length: usize,
        found: String,
        expected: &'static str,
    },
}

const BLOCK_KEYWORDS: &[&str] = &["loop", "alt", "opt", "par", "critical", "break", "rect", "box"];

/// Block a branch keyword belongs to
fn branch_parent(keyword: &str) -> Option<&'static str> {
    match keyword {
        "else" => Some("alt"),
        "and" => Some("par"),
        "option" => Some("critical"),
        _ => None,
    }
}

pub fn parse(tokens: &[SeqToken]) -> Parsed<SequenceDiagram, SeqError> {
    Parser {
        tokens,
        pos: 0,
        errors: Vec::new(),
    }
    .run()
}

struct Parser<'t> {
    tokens: &'t [SeqToken],
    pos: usize,
    errors: Vec<SeqError>,
}

impl<'t> Parser<'t> {
    fn peek(&self) -> Option<&'t SeqToken> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> SeqKind {
        self.peek().map_or(SeqKind::Eof, |t| t.kind)
    }

    fn peek_kind_at(&self, n: usize) -> SeqKind {
        self.tokens.get(self.pos + n).map_or(SeqKind::Eof, |t| t.kind)
    }

    fn bump(&mut self) -> Option<&'t SeqToken> {
        let tok = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(tok)
    }

    fn at_line_end(&self) -> bool {
        matches!(self.peek_kind(), SeqKind::Newline | SeqKind::Eof)
    }

    fn recover(&mut self) {
        while !self.at_line_end() {
            self.pos += 1;
        }
    }

    fn unexpected(&mut self, expected: &'static str) {
        if let Some(tok) = self.peek() {
            let found = match tok.kind {
                SeqKind::Newline => "end of line".to_string(),
                SeqKind::Eof => "end of input".to_string(),
                _ => format!("'{}'", tok.image),
            };
            self.errors.push(SeqError::Unexpected {
                line: tok.line,
                column: tok.column,
                length: tok.len(),
                found,
                expected,
            });
        }
        self.recover();
    }

    fn text(&mut self) -> Option<String> {
        if self.peek_kind() == SeqKind::Text {
            return self.bump().map(|t| t.image.clone());
        }
        None
    }

    fn run(mut self) -> Parsed<SequenceDiagram, SeqError> {
        while self.peek_kind() == SeqKind::Newline {
            self.pos += 1;
        }
        let header_line = match self.peek() {
            Some(tok) if tok.is(SeqKind::Header) => tok.line,
            _ => {
                self.unexpected("'sequenceDiagram' header");
                return Parsed {
                    cst: None,
                    errors: self.errors,
                };
            }
        };
        self.pos += 1;

        let mut stack: Vec<(Block, Vec<SeqStatement>)> = Vec::new();
        let mut statements = Vec::new();

        loop {
            match self.peek_kind() {
                SeqKind::Eof => break,
                SeqKind::Newline => {
                    self.pos += 1;
                    continue;
                }
                SeqKind::Keyword => {
                    let Some(tok) = self.bump() else { break };
                    let keyword = tok.image.as_str();
                    if BLOCK_KEYWORDS.contains(&keyword) {
                        let block = Block {
                            keyword: keyword.to_string(),
                            line: tok.line,
                            column: tok.column,
                            label: self.text(),
                            branches: Vec::new(),
                            body: Vec::new(),
                        };
                        stack.push((block, std::mem::take(&mut statements)));
                    } else if keyword == "end" {
                        match stack.pop() {
                            Some((mut block, outer)) => {
                                block.body = std::mem::replace(&mut statements, outer);
                                statements.push(SeqStatement::Block(block));
                            }
                            None => self.errors.push(SeqError::EndWithoutBlock {
                                line: tok.line,
                                column: tok.column,
                            }),
                        }
                    } else if let Some(parent) = branch_parent(keyword) {
                        self.text();
                        match stack.last_mut() {
                            Some((block, _)) if block.keyword == parent => block.branches.push(tok.line),
                            _ => self.errors.push(SeqError::BranchOutsideBlock {
                                line: tok.line,
                                column: tok.column,
                                keyword: keyword.to_string(),
                                parent,
                            }),
                        }
                    } else if let Some(statement) = self.keyword_statement(tok) {
                        statements.push(statement);
                    }
                }
                SeqKind::Ident => {
                    if let Some(statement) = self.message() {
                        statements.push(statement);
                    }
                }
                _ => self.unexpected("a message, declaration or block"),
            }
            if !self.at_line_end() {
                self.unexpected("end of line");
            }
        }

        if let Some(eof) = self.peek() {
            for (block, _) in stack.iter().rev() {
                self.errors.push(SeqError::BlockMissingEnd {
                    line: eof.line,
                    column: eof.column,
                    keyword: block.keyword.clone(),
                    opened_at: block.line,
                });
            }
        }
        // Fold unclosed blocks back so the tree still holds every statement.
        while let Some((mut block, outer)) = stack.pop() {
            block.body = std::mem::replace(&mut statements, outer);
            statements.push(SeqStatement::Block(block));
        }

        Parsed {
            cst: Some(SequenceDiagram {
                header_line,
                statements,
            }),
            errors: self.errors,
        }
    }

    fn keyword_statement(&mut self, tok: &'t SeqToken) -> Option<SeqStatement> {
        let line = tok.line;
        match tok.image.as_str() {
            "participant" | "actor" => {
                let Some(text) = self.text() else {
                    self.unexpected("a participant name");
                    return None;
                };
                let name = text.split_whitespace().next().unwrap_or_default().to_string();
                Some(SeqStatement::Participant {
                    line,
                    keyword: tok.image.clone(),
                    name,
                })
            }
            "activate" | "deactivate" => {
                if self.peek_kind() != SeqKind::Ident {
                    self.unexpected("a participant");
                    return None;
                }
                let target = self.bump()?.image.clone();
                Some(SeqStatement::Activation {
                    line,
                    active: tok.image == "activate",
                    target,
                })
            }
            "note" => {
                if self.text().is_none() {
                    self.unexpected("a note placement such as 'right of A: text'");
                    return None;
                }
                Some(SeqStatement::Note { line })
            }
            _ => {
                self.text();
                Some(SeqStatement::Directive {
                    line,
                    keyword: tok.image.clone(),
                })
            }
        }
    }

    fn message(&mut self) -> Option<SeqStatement> {
        let from = self.peek()?;
        if !matches!(self.peek_kind_at(1), SeqKind::Arrow | SeqKind::InvalidArrow) {
            if let Some(suggestion) = nearest_keyword(&from.image, KEYWORDS) {
                self.errors.push(SeqError::MisspelledKeyword {
                    line: from.line,
                    column: from.column,
                    word: from.image.clone(),
                    suggestion,
                });
                self.recover();
            } else {
                self.pos += 1;
                self.unexpected("an arrow");
            }
            return None;
        }
        self.pos += 1;

        let arrow = self.bump()?.image.clone();
        if self.peek_kind() == SeqKind::Activation {
            self.pos += 1;
        }
        if self.peek_kind() != SeqKind::Ident {
            self.unexpected("a participant");
            return None;
        }
        let to = self.bump()?;

        let text = match self.peek_kind() {
            SeqKind::Colon => {
                self.pos += 1;
                self.text()
            }
            SeqKind::Newline | SeqKind::Eof => None,
            _ => {
                self.errors.push(SeqError::MissingColon {
                    line: to.line,
                    column: to.end_column(),
                });
                self.recover();
                None
            }
        };

        Some(SeqStatement::Message(Message {
            from: from.image.clone(),
            to: to.image.clone(),
            arrow,
            line: from.line,
            text,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::super::lexer::tokenize;
    use super::*;

    fn parse_text(text: &str) -> Parsed<SequenceDiagram, SeqError> {
        parse(&tokenize(text).tokens)
    }

    #[test]
    fn test_parse_diagram() {
        let parsed = parse_text(
            "sequenceDiagram\n    participant A as Alice\n    A->>+B: Hello\n    alt ok\n        B-->>-A: Fine\n    else not ok\n        B-xA: No\n    end\n    note right of A: done\n",
        );
        assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
        let diagram = parsed.cst.unwrap();
        assert_eq!(diagram.statements.len(), 4);
        match &diagram.statements[2] {
            SeqStatement::Block(block) => {
                assert_eq!(block.keyword, "alt");
                assert_eq!(block.branches, vec![6]);
                assert_eq!(block.body.len(), 2);
            }
            other => panic!("expected block, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_colon() {
        let parsed = parse_text("sequenceDiagram\n    Alice->>Bob hello there");
        assert_eq!(
            parsed.errors,
            vec![SeqError::MissingColon { line: 2, column: 16 }]
        );
    }

    #[test]
    fn test_message_without_text() {
        let parsed = parse_text("sequenceDiagram\nA->>B");
        assert!(parsed.errors.is_empty());
    }

    #[test]
    fn test_block_missing_end() {
        let parsed = parse_text("sequenceDiagram\nloop forever\n  A->>B: ping\n");
        assert_eq!(
            parsed.errors,
            vec![SeqError::BlockMissingEnd {
                line: 4,
                column: 1,
                keyword: "loop".to_string(),
                opened_at: 2,
            }]
        );
        assert_eq!(parsed.cst.unwrap().statements.len(), 1);
    }

    #[test]
    fn test_end_without_block() {
        let parsed = parse_text("sequenceDiagram\nA->>B: hi\nend");
        assert_eq!(parsed.errors, vec![SeqError::EndWithoutBlock { line: 3, column: 1 }]);
    }

    #[test]
    fn test_else_outside_alt() {
        let parsed = parse_text("sequenceDiagram\nloop x\nelse y\nend");
        assert!(matches!(
            &parsed.errors[..],
            [SeqError::BranchOutsideBlock { parent: "alt", line: 3, .. }]
        ));
    }

    #[test]
    fn test_misspelled_keyword() {
        let parsed = parse_text("sequenceDiagram\nparticpant Alice");
        assert!(matches!(
            &parsed.errors[..],
            [SeqError::MisspelledKeyword { suggestion: "participant", .. }]
        ));
    }

    #[test]
    fn test_unknown_word() {
        let parsed = parse_text("sequenceDiagram\nbanana split");
        assert!(matches!(
            &parsed.errors[..],
            [SeqError::Unexpected { expected: "an arrow", .. }]
        ));
    }

    #[test]
    fn test_missing_header() {
        let parsed = parse_text("A->>B: hi");
        assert!(parsed.cst.is_none());
        assert_eq!(parsed.errors.len(), 1);
    }
}
