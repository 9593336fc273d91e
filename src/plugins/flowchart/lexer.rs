//! Flowchart lexer

use crate::pipeline::{LexError, Lexed};
use crate::plugins::scan::{is_ident_char, Scanner, Tok, TokenKind};
use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowKind {
    Header,
    Direction,
    Keyword,
    Ident,
    Link,
    InvalidLink,
    EdgeLabel,
    ShapeOpen,
    ShapeClose,
    Label,
    QuotedLabel,
    ClassRef,
    /// Free text after a statement keyword
    Text,
    Amp,
    Semi,
    Newline,
    Eof,
}

impl TokenKind for FlowKind {
    fn name(&self) -> &'static str {
        match self {
            FlowKind::Header => "Header",
            FlowKind::Direction => "Direction",
            FlowKind::Keyword => "Keyword",
            FlowKind::Ident => "Identifier",
            FlowKind::Link => "Link",
            FlowKind::InvalidLink => "InvalidLink",
            FlowKind::EdgeLabel => "EdgeLabel",
            FlowKind::ShapeOpen => "ShapeOpen",
            FlowKind::ShapeClose => "ShapeClose",
            FlowKind::Label => "Label",
            FlowKind::QuotedLabel => "QuotedLabel",
            FlowKind::ClassRef => "ClassRef",
            FlowKind::Text => "Text",
            FlowKind::Amp => "Ampersand",
            FlowKind::Semi => "Semicolon",
            FlowKind::Newline => "Newline",
            FlowKind::Eof => "EOF",
        }
    }
}

pub type FlowToken = Tok<FlowKind>;

pub const HEADERS: &[&str] = &["flowchart", "graph"];
pub const DIRECTIONS: &[&str] = &["TB", "TD", "BT", "RL", "LR"];

/// Keywords recognised at the start of a statement
pub const STATEMENT_KEYWORDS: &[&str] = &[
    "subgraph",
    "end",
    "direction",
    "classDef",
    "class",
    "style",
    "linkStyle",
    "click",
];

/// Keywords whose remaining line is kept as one text token
const TEXT_KEYWORDS: &[&str] = &["subgraph", "classDef", "class", "style", "linkStyle", "click"];

/// Shape openers, longest first
pub const SHAPE_OPENERS: &[&str] = &["((", "([", "[[", "[(", "{{", "[", "(", "{", ">"];

/// Shape closers, longest first
pub const SHAPE_CLOSERS: &[&str] = &["))", "])", "]]", ")]", "}}", "]", ")", "}"];

/// Closer expected for a shape opener
pub fn closer_for(open: &str) -> &'static str {
    match open {
        "((" => "))",
        "([" => "])",
        "[[" => "]]",
        "[(" => ")]",
        "{{" => "}}",
        "(" => ")",
        "{" => "}",
        _ => "]",
    }
}

static TEXT_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:--|==|-\.)[ \t]+[^-=.|\n][^|\n]*?[ \t]*(?:-{2,}>|-{3,}|={2,}>|={3,}|\.-+>|\.-+)")
        .unwrap()
});

static LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:<?(?:-{2,}|={2,}|-\.+-)[>ox]?|~{3,})").unwrap()
});

static INVALID_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:->|=>)").unwrap());

/// Whether `s` begins with something that looks like a link
pub fn starts_link(s: &str) -> bool {
    ["--", "==", "-.", "->", "=>", "~~~", "<-", "<="]
        .iter()
        .any(|p| s.starts_with(p))
}

pub fn tokenize(text: &str) -> Lexed<FlowToken> {
    Lexer::new(text).run()
}

struct Lexer {
    s: Scanner,
    tokens: Vec<FlowToken>,
    errors: Vec<LexError>,
    seen_header: bool,
}

impl Lexer {
    fn new(text: &str) -> Self {
        Self {
            s: Scanner::new(text),
            tokens: Vec::new(),
            errors: Vec::new(),
            seen_header: false,
        }
    }

    fn run(mut self) -> Lexed<FlowToken> {
        while let Some(c) = self.s.peek() {
            match c {
                ' ' | '\t' | '\r' => {
                    self.s.bump();
                }
                '\n' => self.single(FlowKind::Newline),
                '%' if self.s.starts_with("%%") => {
                    self.s.take_line();
                }
                ';' => self.single(FlowKind::Semi),
                '&' => self.single(FlowKind::Amp),
                '|' => self.edge_label(),
                _ => self.token(c),
            }
        }
        let (line, column) = (self.s.line(), self.s.column());
        self.tokens.push(Tok::new(FlowKind::Eof, "", line, column));

        Lexed {
            tokens: self.tokens,
            errors: self.errors,
        }
    }

    fn single(&mut self, kind: FlowKind) {
        let (line, column) = (self.s.line(), self.s.column());
        let image = self.s.take(1);
        self.tokens.push(Tok::new(kind, image, line, column));
    }

    fn push(&mut self, kind: FlowKind, image: String, line: usize, column: usize) {
        self.tokens.push(Tok::new(kind, image, line, column));
    }

    fn at_statement_start(&self) -> bool {
        self.tokens
            .last()
            .map_or(true, |t| matches!(t.kind, FlowKind::Newline | FlowKind::Semi))
    }

    /// Previous token is an identifier ending right here
    fn follows_ident(&self) -> bool {
        self.tokens.last().map_or(false, |t| {
            t.kind == FlowKind::Ident && t.line == self.s.line() && t.end_column() == self.s.column()
        })
    }

    fn token(&mut self, c: char) {
        let (line, column) = (self.s.line(), self.s.column());
        let rest = self.s.rest_of_line();

        if rest.starts_with(":::") {
            self.s.take(3);
            let name = self.s.take_while(|c| is_ident_char(c) || c == '-');
            self.push(FlowKind::ClassRef, format!(":::{}", name), line, column);
            return;
        }

        for (regex, kind) in [
            (&*TEXT_LINK, FlowKind::Link),
            (&*LINK, FlowKind::Link),
            (&*INVALID_LINK, FlowKind::InvalidLink),
        ] {
            if let Some(m) = regex.find(&rest) {
                let image = self.s.take(m.as_str().chars().count());
                self.push(kind, image, line, column);
                return;
            }
        }

        if c == '>' && !self.follows_ident() {
            self.unexpected(c);
            return;
        }
        if let Some(open) = SHAPE_OPENERS.iter().find(|o| rest.starts_with(*o)) {
            self.s.take(open.chars().count());
            self.push(FlowKind::ShapeOpen, open.to_string(), line, column);
            self.label(open);
            return;
        }
        if let Some(close) = SHAPE_CLOSERS.iter().find(|o| rest.starts_with(*o)) {
            self.s.take(close.chars().count());
            self.push(FlowKind::ShapeClose, close.to_string(), line, column);
            return;
        }

        if is_ident_char(c) {
            self.word(line, column);
            return;
        }

        self.unexpected(c);
    }

    fn unexpected(&mut self, c: char) {
        let (line, column) = (self.s.line(), self.s.column());
        let message = if c == '"' {
            "Quoted text is only allowed inside a node shape".to_string()
        } else {
            format!("Unexpected character '{}'", c)
        };
        self.errors.push(LexError::new(line, column, 1, message));
        self.s.bump();
    }

    fn word(&mut self, line: usize, column: usize) {
        let mut word = String::new();
        while let Some(c) = self.s.peek() {
            let inner_dash = c == '-' && self.s.peek_at(1).map_or(false, |n| n.is_alphanumeric());
            if !is_ident_char(c) && !inner_dash {
                break;
            }
            word.push(c);
            self.s.bump();
        }

        let statement_start = self.at_statement_start();
        let after_direction_slot = self.tokens.last().map_or(false, |t| {
            t.kind == FlowKind::Header || (t.kind == FlowKind::Keyword && t.image == "direction")
        });

        if !self.seen_header && statement_start && HEADERS.contains(&word.as_str()) {
            self.seen_header = true;
            self.push(FlowKind::Header, word, line, column);
        } else if after_direction_slot && DIRECTIONS.contains(&word.as_str()) {
            self.push(FlowKind::Direction, word, line, column);
        } else if word == "end" || (statement_start && STATEMENT_KEYWORDS.contains(&word.as_str())) {
            let takes_text = TEXT_KEYWORDS.contains(&word.as_str());
            self.push(FlowKind::Keyword, word, line, column);
            if takes_text {
                self.trailing_text();
            }
        } else {
            self.push(FlowKind::Ident, word, line, column);
        }
    }

    fn trailing_text(&mut self) {
        self.s.skip_blanks();
        if self.s.at_line_end() {
            return;
        }
        let (line, column) = (self.s.line(), self.s.column());
        let text = self.s.take_line();
        self.push(FlowKind::Text, text.trim_end().to_string(), line, column);
    }

    fn edge_label(&mut self) {
        let (line, column) = (self.s.line(), self.s.column());
        let rest = self.s.rest_of_line();
        match rest[1..].find('|') {
            Some(end) => {
                let image = self.s.take(rest[..end + 2].chars().count());
                self.push(FlowKind::EdgeLabel, image, line, column);
            }
            None => {
                self.errors
                    .push(LexError::new(line, column, 1, "Unterminated edge label"));
                self.s.take_line();
            }
        }
    }

    fn label(&mut self, open: &str) {
        let (line, column) = (self.s.line(), self.s.column());
        if self.s.peek() != Some('"') {
            let text = self.label_text(open);
            if !text.is_empty() {
                self.push(FlowKind::Label, text, line, column);
            }
            return;
        }

        let mut image = String::new();
        image.push('"');
        self.s.bump();
        let mut closed = false;
        while let Some(c) = self.s.peek() {
            if c == '\n' {
                break;
            }
            if c == '\\' && self.s.peek_at(1) == Some('"') {
                image.push_str(&self.s.take(2));
                continue;
            }
            image.push(c);
            self.s.bump();
            if c == '"' {
                closed = true;
                break;
            }
        }
        if !closed {
            self.errors.push(LexError::new(
                line,
                column,
                image.chars().count(),
                "Unterminated string in node label",
            ));
            return;
        }

        // Anything between the closing quote and the shape closer stays in the label.
        let spill = self.label_text(open);
        image.push_str(&spill);
        self.push(FlowKind::QuotedLabel, image, line, column);
    }

    /// Unquoted label text up to the closer, the end of the line or a link
    fn label_text(&mut self, open: &str) -> String {
        let paren_closes = closer_for(open).starts_with(')');
        let mut depth = 0usize;
        let mut out = String::new();

        while let Some(c) = self.s.peek() {
            if c == '\n' || c == '\r' {
                break;
            }
            if c.is_whitespace() && starts_link(self.s.rest_of_line().trim_start()) {
                break;
            }
            if c == '(' && !paren_closes {
                depth += 1;
            } else if c == ')' && !paren_closes && depth > 0 {
                depth -= 1;
            } else if matches!(c, ')' | ']' | '}') {
                break;
            }
            out.push(c);
            self.s.bump();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<FlowKind> {
        tokenize(text).tokens.iter().map(|t| t.kind).collect()
    }

    fn images(text: &str) -> Vec<String> {
        tokenize(text)
            .tokens
            .into_iter()
            .filter(|t| !matches!(t.kind, FlowKind::Newline | FlowKind::Eof))
            .map(|t| t.image)
            .collect()
    }

    #[test]
    fn test_header_and_edge() {
        use FlowKind::*;
        assert_eq!(
            kinds("flowchart TD\nA --> B"),
            vec![Header, Direction, Newline, Ident, Link, Ident, Eof]
        );
    }

    #[test]
    fn test_link_forms() {
        for link in ["-->", "---", "-.->", "-.-", "==>", "===", "--o", "--x", "<-->", "~~~", "---->"] {
            let text = format!("A {} B", link);
            let lexed = tokenize(&text);
            assert!(lexed.errors.is_empty(), "{}", link);
            assert_eq!(lexed.tokens[1].kind, FlowKind::Link, "{}", link);
            assert_eq!(lexed.tokens[1].image, link);
        }
    }

    #[test]
    fn test_text_link() {
        let lexed = tokenize("A -- some text --> B");
        assert_eq!(lexed.tokens[1].kind, FlowKind::Link);
        assert_eq!(lexed.tokens[1].image, "-- some text -->");
        assert_eq!(lexed.tokens[2].image, "B");
    }

    #[test]
    fn test_invalid_links_are_tokens() {
        let lexed = tokenize("A -> B\nC => D");
        assert!(lexed.errors.is_empty());
        let invalid: Vec<_> = lexed
            .tokens
            .iter()
            .filter(|t| t.kind == FlowKind::InvalidLink)
            .map(|t| (t.line, t.column, t.image.as_str()))
            .collect();
        assert_eq!(invalid, vec![(1, 3, "->"), (2, 3, "=>")]);
    }

    #[test]
    fn test_shapes() {
        assert_eq!(images("A((circle))"), vec!["A", "((", "circle", "))"]);
        assert_eq!(images("A[(db)]"), vec!["A", "[(", "db", ")]"]);
        assert_eq!(images("A([stadium])"), vec!["A", "([", "stadium", "])"]);
        assert_eq!(images("A>flag]"), vec!["A", ">", "flag", "]"]);
        assert_eq!(images("A{{hex}}"), vec!["A", "{{", "hex", "}}"]);
    }

    #[test]
    fn test_parens_inside_square_label() {
        assert_eq!(images("A[call (x)]"), vec!["A", "[", "call (x)", "]"]);
    }

    #[test]
    fn test_quoted_label_with_escapes() {
        let lexed = tokenize(r#"A["He said \"Hi\""]"#);
        assert!(lexed.errors.is_empty());
        assert_eq!(lexed.tokens[2].kind, FlowKind::QuotedLabel);
        assert_eq!(lexed.tokens[2].image, r#""He said \"Hi\"""#);
        assert_eq!(lexed.tokens[3].image, "]");
    }

    #[test]
    fn test_quoted_label_spills_to_closer() {
        let lexed = tokenize(r#"A["He said "Hi""]"#);
        assert!(lexed.errors.is_empty());
        assert_eq!(lexed.tokens[2].image, r#""He said "Hi"""#);
    }

    #[test]
    fn test_unclosed_label_stops_before_link() {
        let lexed = tokenize("A[foo --> B");
        assert_eq!(
            lexed.tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![
                FlowKind::Ident,
                FlowKind::ShapeOpen,
                FlowKind::Label,
                FlowKind::Link,
                FlowKind::Ident,
                FlowKind::Eof
            ]
        );
        assert_eq!(lexed.tokens[2].image, "foo");
    }

    #[test]
    fn test_unterminated_string_is_lex_error() {
        let lexed = tokenize("A[\"oops]");
        assert_eq!(lexed.errors.len(), 1);
        assert_eq!(lexed.errors[0].column, 3);
    }

    #[test]
    fn test_keywords_and_text() {
        use FlowKind::*;
        assert_eq!(
            kinds("subgraph one [Title]\nend\nclassDef red fill:#f00"),
            vec![Keyword, Text, Newline, Keyword, Newline, Keyword, Text, Eof]
        );
    }

    #[test]
    fn test_end_is_always_keyword() {
        let lexed = tokenize("A --> end");
        assert_eq!(lexed.tokens[2].kind, FlowKind::Keyword);
    }

    #[test]
    fn test_dashed_identifier() {
        assert_eq!(images("my-node-->other"), vec!["my-node", "-->", "other"]);
    }

    #[test]
    fn test_edge_label_and_classref() {
        use FlowKind::*;
        assert_eq!(
            kinds("A -->|yes| B:::hot"),
            vec![Ident, Link, EdgeLabel, Ident, ClassRef, Eof]
        );
    }

    #[test]
    fn test_comments_and_unknown_characters() {
        let lexed = tokenize("%% comment\nA --> B $");
        assert_eq!(lexed.errors.len(), 1);
        assert_eq!((lexed.errors[0].line, lexed.errors[0].column), (2, 9));
    }

    #[test]
    fn test_eof_position() {
        let lexed = tokenize("A\n");
        let eof = lexed.tokens.last().unwrap();
        assert_eq!((eof.line, eof.column), (2, 1));
    }
}
