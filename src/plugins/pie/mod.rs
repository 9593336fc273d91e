//! Pie chart dialect (`pie`)

mod lexer;
mod parser;

pub use lexer::{PieKind, PieToken};
pub use parser::{Entry, PieChart, PieError};

use crate::codes::*;
use crate::diagnostic::{Diagnostic, Severity};
use crate::fix::keyword_hint;
use crate::pipeline::{
    validate_with_report, Adapter, AnalyzeError, HookError, Lexed, LintOptions, Parsed,
    ValidationReport,
};
use crate::plugin::Dialect;
use std::collections::HashMap;

/// Pie chart linter
#[derive(Debug, Clone, Copy, Default)]
pub struct PiePlugin;

impl PiePlugin {
    pub fn new() -> Self {
        Self
    }
}

impl Adapter for PiePlugin {
    type Token = PieToken;
    type Cst = PieChart;
    type ParseError = PieError;

    fn tokenize(&self, text: &str) -> Lexed<PieToken> {
        lexer::tokenize(text)
    }

    fn parse(&self, tokens: &[PieToken]) -> Parsed<PieChart, PieError> {
        parser::parse(tokens)
    }

    fn analyze(
        &self,
        chart: &PieChart,
        _tokens: &[PieToken],
        options: &LintOptions,
    ) -> Result<Vec<Diagnostic>, AnalyzeError> {
        let mut out = Vec::new();
        let mut seen: HashMap<&str, usize> = HashMap::new();

        for entry in &chart.entries {
            if entry.value < 0.0 {
                out.push(
                    Diagnostic::error(
                        entry.line,
                        entry.value_column,
                        format!("Slice '{}' has a negative value", entry.label),
                    )
                    .with_code(PIE_VALUE_NEGATIVE)
                    .with_length(entry.value_len)
                    .with_hint("Pie values must be positive"),
                );
            } else if entry.value == 0.0 {
                out.push(
                    Diagnostic::new(
                        Severity::for_mode(options.strict),
                        entry.line,
                        entry.value_column,
                        format!("Slice '{}' has a zero value and will not be drawn", entry.label),
                    )
                    .with_code(PIE_VALUE_ZERO)
                    .with_length(entry.value_len),
                );
            }

            match seen.get(entry.label.as_str()) {
                Some(first) => out.push(
                    Diagnostic::new(
                        Severity::for_mode(options.strict),
                        entry.line,
                        entry.column,
                        format!("Label '{}' already used on line {}", entry.label, first),
                    )
                    .with_code(PIE_DUPLICATE_LABEL)
                    .with_length(entry.label.chars().count() + 2),
                ),
                None => {
                    seen.insert(&entry.label, entry.line);
                }
            }
        }

        Ok(out)
    }

    fn map_parser_error(&self, err: &PieError, _text: &str) -> Diagnostic {
        match err {
            PieError::MissingColon { line, column } => {
                Diagnostic::error(*line, *column, "Missing ':' between label and value")
                    .with_code(PIE_MISSING_COLON)
                    .with_hint("Write entries as \"label\" : value")
            }
            PieError::UnquotedLabel {
                line,
                column,
                length,
                label,
            } => Diagnostic::error(*line, *column, format!("Label '{}' must be quoted", label))
                .with_code(PIE_LABEL_UNQUOTED)
                .with_length(*length)
                .with_hint(&format!("Write \"{}\"", label)),
            PieError::MisspelledKeyword {
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
            PieError::Unexpected {
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

    fn post_lex(&self, _text: &str, tokens: &[PieToken]) -> Result<Vec<Diagnostic>, HookError> {
        Ok(tokens
            .iter()
            .filter(|t| t.is(PieKind::Str))
            .filter_map(|t| {
                let at = t.image.find("\\\"")?;
                let column = t.column + t.image[..at].chars().count();
                Some(
                    Diagnostic::error(t.line, column, "Backslash-escaped quote in label is not supported")
                        .with_code(LABEL_ESCAPED_QUOTE)
                        .with_length(2)
                        .with_hint("Use &quot; instead of \\\""),
                )
            })
            .collect())
    }
}

impl Dialect for PiePlugin {
    fn id(&self) -> &str {
        "pie"
    }

    fn description(&self) -> &str {
        "Pie charts"
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

    fn lint(text: &str) -> Vec<Diagnostic> {
        PiePlugin.validate(text, &LintOptions::default()).diagnostics
    }

    fn codes(text: &str) -> Vec<String> {
        lint(text).into_iter().filter_map(|d| d.code).collect()
    }

    #[test]
    fn test_clean_chart() {
        assert!(lint("pie title Pets\n    \"Dogs\" : 386\n    \"Cats\" : 85\n").is_empty());
    }

    #[test]
    fn test_value_checks() {
        let diags = lint("pie\n    \"A\" : -1\n    \"B\" : 0\n    \"A\" : 2");
        let found: Vec<_> = diags
            .iter()
            .map(|d| (d.code().unwrap_or(""), d.severity))
            .collect();
        assert_eq!(
            found,
            vec![
                (PIE_VALUE_NEGATIVE, Severity::Error),
                (PIE_VALUE_ZERO, Severity::Warning),
                (PIE_DUPLICATE_LABEL, Severity::Warning),
            ]
        );
    }

    #[test]
    fn test_strict_mode_raises_warnings() {
        let report = PiePlugin.validate("pie\n\"B\" : 0", &LintOptions::strict());
        assert_eq!(report.diagnostics[0].severity, Severity::Error);
    }

    #[test]
    fn test_fix_missing_colon() {
        let text = "pie\n    \"Dogs\" 42";
        assert_eq!(codes(text), vec![PIE_MISSING_COLON]);
        let outcome = fix_text_with(&PiePlugin, text, &FixOptions::default());
        assert_eq!(outcome.fixed, "pie\n    \"Dogs\": 42");
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn test_fix_escaped_quote() {
        let text = "pie\n    \"The \\\"best\\\" pet\" : 3";
        assert_eq!(codes(text), vec![LABEL_ESCAPED_QUOTE]);
        let outcome = fix_text_with(&PiePlugin, text, &FixOptions::default());
        assert_eq!(outcome.fixed, "pie\n    \"The &quot;best&quot; pet\" : 3");
    }

    #[test]
    fn test_fix_misspelled_title() {
        let outcome = fix_text_with(
            &PiePlugin,
            "pie\n    titel Pets\n    \"Dogs\" : 1",
            &FixOptions::with_level(FixLevel::Safe),
        );
        assert_eq!(outcome.fixed, "pie\n    title Pets\n    \"Dogs\" : 1");
    }

    #[test]
    fn test_fix_uses_pie_keyword() {
        let outcome = fix_text_with(
            &PiePlugin,
            "pie\n    ttile Pets\n    \"Dogs\" : 1\n",
            &FixOptions::with_level(FixLevel::Safe),
        );
        assert_eq!(outcome.fixed, "pie\n    title Pets\n    \"Dogs\" : 1\n");
        assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
    }

    #[test]
    fn test_unquoted_label_is_reported_not_fixed() {
        let text = "pie\n    Dogs : 3";
        assert_eq!(codes(text), vec![PIE_LABEL_UNQUOTED]);
        let outcome = fix_text_with(&PiePlugin, text, &FixOptions::with_level(FixLevel::All));
        assert_eq!(outcome.fixed, text);
        assert_eq!(outcome.errors.len(), 1);
    }

    #[test]
    fn test_detect() {
        assert!(PiePlugin.detect("pie showData\n\"a\": 1"));
        assert!(!PiePlugin.detect("pies\n"));
    }
}
