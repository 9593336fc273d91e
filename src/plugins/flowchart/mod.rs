//! Flowchart dialect (`flowchart` / `graph`)

mod lexer;
mod parser;
mod rules;

pub use lexer::{FlowKind, FlowToken};
pub use parser::{FlowError, Flowchart, Statement};
pub use rules::REQUIRE_DIRECTION;

use crate::codes::*;
use crate::diagnostic::Diagnostic;
use crate::fix::keyword_hint;
use crate::pipeline::{
    validate_with_report, Adapter, AnalyzeError, HookError, Lexed, LintOptions, Parsed,
    ValidationReport,
};
use crate::plugin::Dialect;

/// Flowchart linter. Stateless; every call lexes and parses from scratch.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlowchartPlugin;

impl FlowchartPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl Adapter for FlowchartPlugin {
    type Token = FlowToken;
    type Cst = Flowchart;
    type ParseError = FlowError;

    fn tokenize(&self, text: &str) -> Lexed<FlowToken> {
        lexer::tokenize(text)
    }

    fn parse(&self, tokens: &[FlowToken]) -> Parsed<Flowchart, FlowError> {
        parser::parse(tokens)
    }

    fn analyze(
        &self,
        cst: &Flowchart,
        tokens: &[FlowToken],
        options: &LintOptions,
    ) -> Result<Vec<Diagnostic>, AnalyzeError> {
        rules::analyze(cst, tokens, options)
    }

    fn map_parser_error(&self, err: &FlowError, _text: &str) -> Diagnostic {
        match err {
            FlowError::MismatchedCloser {
                line,
                column,
                found,
                expected,
            } => Diagnostic::error(
                *line,
                *column,
                format!("Shape closed with '{}' but expected '{}'", found, expected),
            )
            .with_code(SHAPE_MISMATCHED_CLOSER)
            .with_length(found.chars().count())
            .with_hint(&format!("Close the shape with '{}'", expected)),

            FlowError::Unclosed {
                line,
                column,
                expected,
            } => Diagnostic::error(
                *line,
                *column,
                format!("Unclosed node shape, expected '{}'", expected),
            )
            .with_code(SHAPE_UNCLOSED)
            .with_hint(&format!("Add '{}' after the label", expected)),

            FlowError::MissingArrow {
                line,
                column,
                length,
            } => Diagnostic::error(*line, *column, "Missing arrow between nodes")
                .with_code(LINK_MISSING_ARROW)
                .with_length(*length)
                .with_hint("Connect the nodes with '-->'"),

            FlowError::TrailingStatement { line, column } => {
                Diagnostic::error(*line, *column, "Unexpected tokens after a complete statement")
                    .with_code(STATEMENT_TRAILING_TOKENS)
                    .with_hint("Put each statement on its own line")
            }

            FlowError::MisspelledKeyword {
                line,
                column,
                word,
                suggestion,
            } => Diagnostic::error(
                *line,
                *column,
                format!("Unknown keyword '{}', did you mean '{}'?", word, suggestion),
            )
            .with_code(KEYWORD_MISSPELLED)
            .with_length(word.chars().count())
            .with_hint(&keyword_hint(suggestion)),

            FlowError::BlockMissingEnd {
                line,
                column,
                opened_at,
            } => Diagnostic::error(
                *line,
                *column,
                format!("Subgraph opened on line {} is missing 'end'", opened_at),
            )
            .with_code(BLOCK_MISSING_END)
            .with_hint("Close the subgraph with 'end'"),

            FlowError::EndWithoutBlock { line, column } => {
                Diagnostic::error(*line, *column, "'end' without an open subgraph")
                    .with_code(END_WITHOUT_BLOCK)
                    .with_length(3)
            }

            FlowError::Unexpected {
                line,
                column,
                length,
                found,
                expected,
            } => Diagnostic::error(
                *line,
                *column,
                format!("Unexpected {}, expected {}", found, expected),
            )
            .with_code(UNEXPECTED_TOKEN)
            .with_length(*length),
        }
    }

    fn post_lex(&self, _text: &str, tokens: &[FlowToken]) -> Result<Vec<Diagnostic>, HookError> {
        Ok(rules::token_checks(tokens))
    }

    fn post_parse(
        &self,
        _text: &str,
        tokens: &[FlowToken],
        _cst: Option<&Flowchart>,
        prior: &[Diagnostic],
    ) -> Result<Vec<Diagnostic>, HookError> {
        Ok(rules::reserved_ids(tokens, prior))
    }
}

impl Dialect for FlowchartPlugin {
    fn id(&self) -> &str {
        "flowchart"
    }

    fn description(&self) -> &str {
        "Flowchart diagrams (flowchart, graph)"
    }

    fn headers(&self) -> &[&str] {
        lexer::HEADERS
    }

    fn validate(&self, text: &str, options: &LintOptions) -> ValidationReport {
        validate_with_report(self, text, options)
    }
}
