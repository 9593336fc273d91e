//! Sequence diagram dialect (`sequenceDiagram`)

mod lexer;
mod parser;

pub use lexer::{SeqKind, SeqToken};
pub use parser::{Block, Message, SeqError, SeqStatement, SequenceDiagram};

use crate::codes::*;
use crate::diagnostic::Diagnostic;
use crate::fix::keyword_hint;
use crate::pipeline::{
    validate_with_report, Adapter, AnalyzeError, HookError, Lexed, LintOptions, Parsed,
    ValidationReport,
};
use crate::plugin::Dialect;

#[derive(Debug, Clone, Copy, Default)]
pub struct SequencePlugin;

impl SequencePlugin {
    pub fn new() -> Self {
        Self
    }
}

impl Adapter for SequencePlugin {
    type Token = SeqToken;
    type Cst = SequenceDiagram;
    type ParseError = SeqError;

    fn tokenize(&self, text: &str) -> Lexed<SeqToken> {
        lexer::tokenize(text)
    }

    fn parse(&self, tokens: &[SeqToken]) -> Parsed<SequenceDiagram, SeqError> {
        parser::parse(tokens)
    }

    /// Everything a sequence diagram can get wrong is caught by the grammar
    fn analyze(
        &self,
        _cst: &SequenceDiagram,
        _tokens: &[SeqToken],
        _options: &LintOptions,
    ) -> Result<Vec<Diagnostic>, AnalyzeError> {
        Ok(Vec::new())
    }

    fn map_parser_error(&self, err: &SeqError, _text: &str) -> Diagnostic {
        match err {
            SeqError::MissingColon { line, column } => {
                Diagnostic::error(*line, *column, "Message text must follow a ':'")
                    .with_code(SEQ_MESSAGE_MISSING_COLON)
                    .with_hint("Write messages as A->>B: text")
            }
            SeqError::MisspelledKeyword {
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
            SeqError::BlockMissingEnd {
                line,
                column,
                keyword,
                opened_at,
            } => Diagnostic::error(
                *line,
                *column,
                format!("'{}' block opened on line {} is missing 'end'", keyword, opened_at),
            )
            .with_code(BLOCK_MISSING_END)
            .with_hint(&format!("Close the '{}' block with 'end'", keyword)),
            SeqError::EndWithoutBlock { line, column } => {
                Diagnostic::error(*line, *column, "'end' without an open block")
                    .with_code(END_WITHOUT_BLOCK)
                    .with_length(3)
            }
            SeqError::BranchOutsideBlock {
                line,
                column,
                keyword,
                parent,
            } => Diagnostic::error(
                *line,
                *column,
                format!("'{}' is only allowed inside an '{}' block", keyword, parent),
            )
            .with_code(SEQ_ELSE_OUTSIDE_BLOCK)
            .with_length(keyword.chars().count()),
            SeqError::Unexpected {
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

    fn post_lex(&self, _text: &str, tokens: &[SeqToken]) -> Result<Vec<Diagnostic>, HookError> {
        Ok(tokens
            .iter()
            .filter(|t| t.is(SeqKind::InvalidArrow))
            .map(|t| {
                Diagnostic::error(t.line, t.column, format!("Invalid message arrow '{}'", t.image))
                    .with_code(SEQ_ARROW_INVALID)
                    .with_length(t.len())
                    .with_hint("Use '->>' for a solid arrow or '-->>' for a dotted one")
            })
            .collect())
    }
}

impl Dialect for SequencePlugin {
    fn id(&self) -> &str {
        "sequence"
    }

    fn description(&self) -> &str {
        "Sequence diagrams"
    }

    fn headers(&self) -> &[&str] {
        lexer::HEADERS
    }

    fn validate(&self, text: &str, options: &LintOptions) -> ValidationReport {
        validate_with_report(self, text, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fix::{fix_text_with, FixLevel, FixOptions};
    use pretty_assertions::assert_eq;

    fn codes(text: &str) -> Vec<String> {
        SequencePlugin
            .validate(text, &LintOptions::default())
            .diagnostics
            .into_iter()
            .filter_map(|d| d.code)
            .collect()
    }

    fn fix(text: &str, level: FixLevel) -> String {
        fix_text_with(&SequencePlugin, text, &FixOptions::with_level(level)).fixed
    }

    #[test]
    fn test_clean_diagram() {
        let text = "sequenceDiagram\n    autonumber\n    actor U as User\n    U->>+S: login\n    S-->>-U: token\n    par one\n        U-)S: a\n    and two\n        U-)S: b\n    end\n";
        assert!(codes(text).is_empty(), "{:?}", codes(text));
    }

    #[test]
    fn test_fix_invalid_arrow() {
        let text = "sequenceDiagram\n    A=>B: hi";
        assert_eq!(codes(text), vec![SEQ_ARROW_INVALID]);
        assert_eq!(fix(text, FixLevel::Safe), "sequenceDiagram\n    A->>B: hi");
    }

    #[test]
    fn test_fix_missing_colon() {
        let text = "sequenceDiagram\n    Alice->>Bob hello there";
        assert_eq!(codes(text), vec![SEQ_MESSAGE_MISSING_COLON]);
        assert_eq!(
            fix(text, FixLevel::Safe),
            "sequenceDiagram\n    Alice->>Bob: hello there"
        );
    }

    #[test]
    fn test_fix_missing_end() {
        let text = "sequenceDiagram\nloop forever\n  A->>B: ping\n";
        assert_eq!(codes(text), vec![BLOCK_MISSING_END]);
        assert_eq!(fix(text, FixLevel::Safe), text);
        assert_eq!(
            fix(text, FixLevel::All),
            "sequenceDiagram\nloop forever\n  A->>B: ping\nend\n"
        );
    }

    #[test]
    fn test_fix_misspelled_keyword() {
        assert_eq!(
            fix("sequenceDiagram\nparticpant Alice", FixLevel::Safe),
            "sequenceDiagram\nparticipant Alice"
        );
    }

    #[test]
    fn test_fix_misspelled_block_keyword() {
        for word in ["alte", "alts"] {
            let text = format!("sequenceDiagram\n{} x\n  A->>B: hi\nend\n", word);
            let outcome = fix_text_with(&SequencePlugin, &text, &FixOptions::default());
            assert_eq!(outcome.fixed, "sequenceDiagram\nalt x\n  A->>B: hi\nend\n", "{}", word);
            assert!(outcome.errors.is_empty(), "{}: {:?}", word, outcome.errors);
        }
    }

    #[test]
    fn test_else_outside_alt_is_unfixable() {
        let text = "sequenceDiagram\nopt maybe\nelse never\nend";
        assert_eq!(codes(text), vec![SEQ_ELSE_OUTSIDE_BLOCK]);
        let outcome = fix_text_with(&SequencePlugin, text, &FixOptions::with_level(FixLevel::All));
        assert_eq!(outcome.fixed, text);
        assert_eq!(outcome.errors.len(), 1);
    }

    #[test]
    fn test_end_without_block() {
        assert_eq!(codes("sequenceDiagram\nend"), vec![END_WITHOUT_BLOCK]);
    }
}
