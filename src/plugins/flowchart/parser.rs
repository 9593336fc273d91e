//! Flowchart parser with statement-level recovery

use super::lexer::{closer_for, FlowKind, FlowToken};
use crate::fix::nearest_keyword;
use crate::pipeline::Parsed;

/// Keywords a misspelled statement opener is compared against
pub const MISSPELLABLE: &[&str] = &[
    "subgraph",
    "direction",
    "classDef",
    "class",
    "style",
    "linkStyle",
    "click",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flowchart {
    pub header_line: usize,
    pub direction: Option<String>,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Subgraph(Subgraph),
    Edges(Chain),
    Direction { line: usize, value: String },
    /// classDef, class, style, linkStyle, click
    Style { line: usize, keyword: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subgraph {
    pub id: Option<String>,
    pub line: usize,
    pub column: usize,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub line: usize,
    pub column: usize,
    pub shape: Option<String>,
    pub label: Option<String>,
}

/// `group (link group)*`; a group is `node (& node)*`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Chain {
    pub groups: Vec<Vec<Node>>,
    pub links: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    MismatchedCloser {
        line: usize,
        column: usize,
        found: String,
        expected: &'static str,
    },
    Unclosed {
        line: usize,
        column: usize,
        expected: &'static str,
    },
    MissingArrow {
        line: usize,
        column: usize,
        length: usize,
    },
    TrailingStatement {
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
        opened_at: usize,
    },
    EndWithoutBlock {
        line: usize,
        column: usize,
    },
    Unexpected {
        line: usize,
        column: usize,
        length: usize,
        found: String,
        expected: &'static str,
    },
}

/// Parse a token stream. Always builds a fresh parser.
pub fn parse(tokens: &[FlowToken]) -> Parsed<Flowchart, FlowError> {
    Parser::new(tokens).run()
}

struct Frame {
    subgraph: Subgraph,
    outer: Vec<Statement>,
}

struct Parser<'t> {
    tokens: &'t [FlowToken],
    pos: usize,
    errors: Vec<FlowError>,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [FlowToken]) -> Self {
        Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
        }
    }

    fn peek(&self) -> Option<&'t FlowToken> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> FlowKind {
        self.peek().map_or(FlowKind::Eof, |t| t.kind)
    }

    fn peek_kind_at(&self, n: usize) -> FlowKind {
        self.tokens.get(self.pos + n).map_or(FlowKind::Eof, |t| t.kind)
    }

    fn bump(&mut self) -> Option<&'t FlowToken> {
        let tok = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(tok)
    }

    fn at_separator(&self) -> bool {
        matches!(
            self.peek_kind(),
            FlowKind::Newline | FlowKind::Semi | FlowKind::Eof
        )
    }

    fn skip_separators(&mut self) {
        while matches!(self.peek_kind(), FlowKind::Newline | FlowKind::Semi) {
            self.pos += 1;
        }
    }

    /// Skip to the end of the current statement
    fn recover(&mut self) {
        while !self.at_separator() {
            self.pos += 1;
        }
    }

    fn unexpected(&mut self, expected: &'static str) {
        if let Some(tok) = self.peek() {
            let found = match tok.kind {
                FlowKind::Newline => "end of line".to_string(),
                FlowKind::Eof => "end of input".to_string(),
                _ => format!("'{}'", tok.image),
            };
            self.errors.push(FlowError::Unexpected {
                line: tok.line,
                column: tok.column,
                length: tok.len(),
                found,
                expected,
            });
        }
    }

    fn end_statement(&mut self) {
        if !self.at_separator() {
            self.unexpected("end of statement");
            self.recover();
        }
    }

    fn run(mut self) -> Parsed<Flowchart, FlowError> {
        self.skip_separators();
        let header = match self.peek() {
            Some(tok) if tok.kind == FlowKind::Header => tok,
            _ => {
                self.unexpected("'flowchart' or 'graph' header");
                return Parsed {
                    cst: None,
                    errors: self.errors,
                };
            }
        };
        self.pos += 1;

        let direction = if self.peek_kind() == FlowKind::Direction {
            self.bump().map(|t| t.image.clone())
        } else {
            None
        };
        self.end_statement();

        let mut statements = Vec::new();
        let mut stack: Vec<Frame> = Vec::new();

        loop {
            self.skip_separators();
            let Some(tok) = self.peek() else { break };

            match tok.kind {
                FlowKind::Eof => break,
                FlowKind::Keyword => match tok.image.as_str() {
                    "subgraph" => {
                        self.pos += 1;
                        let id = if self.peek_kind() == FlowKind::Text {
                            self.bump().and_then(|t| subgraph_id(&t.image))
                        } else {
                            None
                        };
                        stack.push(Frame {
                            subgraph: Subgraph {
                                id,
                                line: tok.line,
                                column: tok.column,
                                body: Vec::new(),
                            },
                            outer: std::mem::take(&mut statements),
                        });
                        self.end_statement();
                    }
                    "end" => {
                        self.pos += 1;
                        match stack.pop() {
                            Some(frame) => {
                                let mut subgraph = frame.subgraph;
                                subgraph.body = std::mem::replace(&mut statements, frame.outer);
                                statements.push(Statement::Subgraph(subgraph));
                            }
                            None => self.errors.push(FlowError::EndWithoutBlock {
                                line: tok.line,
                                column: tok.column,
                            }),
                        }
                        self.end_statement();
                    }
                    "direction" => {
                        self.pos += 1;
                        if self.peek_kind() == FlowKind::Direction {
                            let value = self.bump().map(|t| t.image.clone()).unwrap_or_default();
                            statements.push(Statement::Direction {
                                line: tok.line,
                                value,
                            });
                            self.end_statement();
                        } else {
                            self.unexpected("a direction (TB, TD, BT, RL or LR)");
                            self.recover();
                        }
                    }
                    keyword => {
                        self.pos += 1;
                        if self.peek_kind() == FlowKind::Text {
                            self.pos += 1;
                        }
                        statements.push(Statement::Style {
                            line: tok.line,
                            keyword: keyword.to_string(),
                        });
                        self.end_statement();
                    }
                },
                FlowKind::Ident => {
                    if let Some(suggestion) = self.misspelled_keyword(tok) {
                        self.errors.push(FlowError::MisspelledKeyword {
                            line: tok.line,
                            column: tok.column,
                            word: tok.image.clone(),
                            suggestion,
                        });
                        self.recover();
                        continue;
                    }
                    if let Some(chain) = self.chain() {
                        statements.push(Statement::Edges(chain));
                    }
                }
                _ => {
                    self.unexpected("a node, 'subgraph' or 'end'");
                    self.recover();
                }
            }
        }

        if !stack.is_empty() {
            let (line, column) = self
                .tokens
                .last()
                .map_or((1, 1), |t| (t.line, t.column));
            while let Some(frame) = stack.pop() {
                self.errors.push(FlowError::BlockMissingEnd {
                    line,
                    column,
                    opened_at: frame.subgraph.line,
                });
                let mut subgraph = frame.subgraph;
                subgraph.body = std::mem::replace(&mut statements, frame.outer);
                statements.push(Statement::Subgraph(subgraph));
            }
        }

        Parsed {
            cst: Some(Flowchart {
                header_line: header.line,
                direction,
                statements,
            }),
            errors: self.errors,
        }
    }

    /// `subgrph one` reads as a misspelled keyword, `subgrph --> B` as a node
    fn misspelled_keyword(&self, tok: &FlowToken) -> Option<&'static str> {
        if !matches!(self.peek_kind_at(1), FlowKind::Ident | FlowKind::Direction) {
            return None;
        }
        nearest_keyword(&tok.image, MISSPELLABLE)
    }

    fn chain(&mut self) -> Option<Chain> {
        let mut chain = Chain::default();
        chain.groups.push(self.group()?);

        loop {
            match self.peek_kind() {
                FlowKind::Link | FlowKind::InvalidLink => {
                    let link = self.bump().map(|t| t.image.clone()).unwrap_or_default();
                    if self.peek_kind() == FlowKind::EdgeLabel {
                        self.pos += 1;
                    }
                    if !self.starts_node() {
                        self.unexpected("a node after the link");
                        self.recover();
                        return None;
                    }
                    chain.links.push(link);
                    chain.groups.push(self.group()?);
                }
                FlowKind::Newline | FlowKind::Semi | FlowKind::Eof => return Some(chain),
                FlowKind::Ident | FlowKind::Keyword | FlowKind::Header => {
                    let tok = self.peek()?;
                    if chain.links.is_empty() && tok.kind == FlowKind::Ident {
                        self.errors.push(FlowError::MissingArrow {
                            line: tok.line,
                            column: tok.column,
                            length: tok.len(),
                        });
                    } else {
                        self.errors.push(FlowError::TrailingStatement {
                            line: tok.line,
                            column: tok.column,
                        });
                    }
                    self.recover();
                    return None;
                }
                _ => {
                    self.unexpected("a link or the end of the statement");
                    self.recover();
                    return None;
                }
            }
        }
    }

    fn starts_node(&self) -> bool {
        match self.peek() {
            Some(tok) => {
                tok.kind == FlowKind::Ident || (tok.kind == FlowKind::Keyword && tok.image == "end")
            }
            None => false,
        }
    }

    fn group(&mut self) -> Option<Vec<Node>> {
        let mut nodes = vec![self.node()?];
        while self.peek_kind() == FlowKind::Amp {
            self.pos += 1;
            if !self.starts_node() {
                self.unexpected("a node after '&'");
                self.recover();
                return None;
            }
            nodes.push(self.node()?);
        }
        Some(nodes)
    }

    fn node(&mut self) -> Option<Node> {
        let id_tok = self.bump()?;
        let mut node = Node {
            id: id_tok.image.clone(),
            line: id_tok.line,
            column: id_tok.column,
            shape: None,
            label: None,
        };

        if self.peek_kind() == FlowKind::ShapeOpen {
            let open = self.bump()?;
            let expected = closer_for(&open.image);
            node.shape = Some(open.image.clone());
            if matches!(self.peek_kind(), FlowKind::Label | FlowKind::QuotedLabel) {
                node.label = self.bump().map(|t| t.image.clone());
            }

            let tok = self.peek()?;
            if tok.kind == FlowKind::ShapeClose {
                self.pos += 1;
                if tok.image != expected {
                    self.errors.push(FlowError::MismatchedCloser {
                        line: tok.line,
                        column: tok.column,
                        found: tok.image.clone(),
                        expected,
                    });
                }
            } else {
                self.errors.push(FlowError::Unclosed {
                    line: tok.line,
                    column: tok.column,
                    expected,
                });
                if !matches!(
                    tok.kind,
                    FlowKind::Newline | FlowKind::Semi | FlowKind::Eof | FlowKind::Link
                ) {
                    self.recover();
                    return None;
                }
            }
        }

        if self.peek_kind() == FlowKind::ClassRef {
            self.pos += 1;
        }
        Some(node)
    }
}

/// Subgraph id: the first word of the header text, unless it is only a bracketed title
fn subgraph_id(text: &str) -> Option<String> {
    let word = text
        .split(|c: char| c.is_whitespace() || c == '[')
        .next()
        .unwrap_or("");
    if word.is_empty() {
        None
    } else {
        Some(word.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::super::lexer::tokenize;
    use super::*;

    fn parse_text(text: &str) -> Parsed<Flowchart, FlowError> {
        let lexed = tokenize(text);
        assert!(lexed.errors.is_empty(), "lex errors: {:?}", lexed.errors);
        parse(&lexed.tokens)
    }

    #[test]
    fn test_simple_chart() {
        let parsed = parse_text("flowchart LR\n    A[Start] --> B{Is it?}\n    B -->|Yes| C & D");
        assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
        let chart = parsed.cst.unwrap();
        assert_eq!(chart.direction.as_deref(), Some("LR"));
        assert_eq!(chart.statements.len(), 2);
        match &chart.statements[1] {
            Statement::Edges(chain) => {
                assert_eq!(chain.groups[1].len(), 2);
                assert_eq!(chain.links, vec!["-->"]);
            }
            other => panic!("unexpected statement {:?}", other),
        }
    }

    #[test]
    fn test_subgraphs_nest() {
        let parsed = parse_text(
            "graph TD\nsubgraph outer\n  subgraph inner\n    A --> B\n  end\nend\nC --> A",
        );
        assert!(parsed.errors.is_empty());
        let chart = parsed.cst.unwrap();
        assert_eq!(chart.statements.len(), 2);
        match &chart.statements[0] {
            Statement::Subgraph(outer) => {
                assert_eq!(outer.id.as_deref(), Some("outer"));
                assert!(matches!(&outer.body[0], Statement::Subgraph(s) if s.id.as_deref() == Some("inner")));
            }
            other => panic!("unexpected statement {:?}", other),
        }
    }

    #[test]
    fn test_missing_header() {
        let parsed = parse_text("A --> B");
        assert!(parsed.cst.is_none());
        assert!(matches!(parsed.errors[0], FlowError::Unexpected { .. }));
    }

    #[test]
    fn test_mismatched_closer() {
        let parsed = parse_text("flowchart TD\nA[foo) --> B");
        assert_eq!(
            parsed.errors,
            vec![FlowError::MismatchedCloser {
                line: 2,
                column: 6,
                found: ")".to_string(),
                expected: "]",
            }]
        );
    }

    #[test]
    fn test_unclosed_shape() {
        let parsed = parse_text("flowchart TD\nA[foo --> B");
        assert_eq!(
            parsed.errors,
            vec![FlowError::Unclosed {
                line: 2,
                column: 7,
                expected: "]",
            }]
        );
    }

    #[test]
    fn test_missing_arrow_vs_trailing_statement() {
        let parsed = parse_text("flowchart TD\nA B\nC --> D E --> F");
        assert_eq!(
            parsed.errors,
            vec![
                FlowError::MissingArrow {
                    line: 2,
                    column: 3,
                    length: 1
                },
                FlowError::TrailingStatement { line: 3, column: 9 },
            ]
        );
    }

    #[test]
    fn test_misspelled_keyword() {
        let parsed = parse_text("flowchart TD\nsubgrap one\nend");
        assert_eq!(parsed.errors.len(), 2);
        assert!(matches!(
            &parsed.errors[0],
            FlowError::MisspelledKeyword { suggestion: "subgraph", line: 2, .. }
        ));
        assert!(matches!(parsed.errors[1], FlowError::EndWithoutBlock { line: 3, .. }));
    }

    #[test]
    fn test_block_missing_end() {
        let parsed = parse_text("flowchart TD\nsubgraph one\n  A --> B\n");
        assert_eq!(
            parsed.errors,
            vec![FlowError::BlockMissingEnd {
                line: 4,
                column: 1,
                opened_at: 2
            }]
        );
        assert!(parsed.cst.is_some());
    }

    #[test]
    fn test_invalid_link_is_accepted() {
        let parsed = parse_text("flowchart TD\nA -> B");
        assert!(parsed.errors.is_empty());
    }

    #[test]
    fn test_end_as_node_is_accepted() {
        let parsed = parse_text("flowchart TD\nA --> end");
        assert!(parsed.errors.is_empty());
    }

    #[test]
    fn test_dangling_link() {
        let parsed = parse_text("flowchart TD\nA -->\nB --> C");
        assert_eq!(parsed.errors.len(), 1);
        assert!(matches!(
            &parsed.errors[0],
            FlowError::Unexpected { line: 2, expected: "a node after the link", .. }
        ));
    }

    #[test]
    fn test_style_statements_pass_through() {
        let parsed = parse_text("flowchart TD\nA --> B\nclassDef hot fill:#f00\nclass A hot\nstyle B stroke:#333");
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.cst.unwrap().statements.len(), 4);
    }

    #[test]
    fn test_subgraph_id_from_text() {
        assert_eq!(subgraph_id("one [Title]"), Some("one".to_string()));
        assert_eq!(subgraph_id("one[Title]"), Some("one".to_string()));
        assert_eq!(subgraph_id("[Title]"), None);
    }
}
