//! Staged lint pipeline
//!
//! ```text
//! tokenize -> post_lex -> parse -> analyze -> post_parse
//! ```
//!
//! Every stage boundary isolates failures: lexer errors only block parsing,
//! parser errors are mapped into dialect diagnostics, a failing analyzer is
//! reduced to one diagnostic, and failing hooks are logged and dropped.

use crate::diagnostic::Diagnostic;
use crate::position::LineIndex;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Code attached to lexer errors
pub const LEX_ERROR: &str = "LEX_ERROR";

/// Code attached to the fallback diagnostic of a failed analyzer
pub const SEMANTIC_ERROR: &str = "SEMANTIC_ERROR";

/// Read-only view of a token owned by an adapter
pub trait Token {
    /// Line of the first character (1-based)
    fn start_line(&self) -> usize;

    /// Column of the first character (1-based)
    fn start_column(&self) -> usize;

    /// Raw source text of the token
    fn image(&self) -> &str;

    /// Kind discriminator (e.g. "Arrow", "Identifier")
    fn kind(&self) -> &str;
}

/// Error reported by a lexer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub line: usize,
    pub column: usize,
    pub length: usize,
    pub message: String,
}

impl LexError {
    pub fn new(line: usize, column: usize, length: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            length,
            message: message.into(),
        }
    }

    fn into_diagnostic(self) -> Diagnostic {
        Diagnostic::error(self.line, self.column, self.message)
            .with_code(LEX_ERROR)
            .with_length(self.length)
    }
}

/// Output of `tokenize`. Lexing never fails; problems land in `errors`.
#[derive(Debug)]
pub struct Lexed<T> {
    pub tokens: Vec<T>,
    pub errors: Vec<LexError>,
}

/// Output of `parse`. Recognition errors are returned, never raised.
#[derive(Debug)]
pub struct Parsed<C, E> {
    pub cst: Option<C>,
    pub errors: Vec<E>,
}

/// Failure of an optional post-lex or post-parse hook
#[derive(Debug, Error)]
pub enum HookError {
    #[error("hook failed: {0}")]
    Failed(String),
}

/// Failure of the semantic analyzer
#[derive(Debug, Error)]
#[error("{0}")]
pub struct AnalyzeError(pub String);

/// Options bag forwarded to `analyze`
#[derive(Debug, Clone, Default)]
pub struct LintOptions {
    /// Report lenient-mode warnings as errors
    pub strict: bool,

    /// Free-form dialect settings
    pub settings: HashMap<String, serde_yaml::Value>,
}

impl LintOptions {
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }
}

/// Pipeline stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Tokenize,
    PostLex,
    Parse,
    Analyze,
    PostParse,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Tokenize => write!(f, "tokenize"),
            Stage::PostLex => write!(f, "post-lex"),
            Stage::Parse => write!(f, "parse"),
            Stage::Analyze => write!(f, "analyze"),
            Stage::PostParse => write!(f, "post-parse"),
        }
    }
}

/// A hook failure dropped by the pipeline, kept for observability
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookFailure {
    pub stage: Stage,
    pub message: String,
}

/// Result of one validation call
#[derive(Debug, Default)]
pub struct ValidationReport {
    /// Diagnostics in stage order
    pub diagnostics: Vec<Diagnostic>,
    /// Hook failures that were dropped
    pub hook_failures: Vec<HookFailure>,
}

/// One dialect's grammar.
///
/// Implementations must not keep mutable parser state between calls: build
/// a fresh parser inside `parse` so concurrent validations never share one.
pub trait Adapter: Send + Sync {
    type Token: Token;
    type Cst;
    type ParseError;

    fn tokenize(&self, text: &str) -> Lexed<Self::Token>;

    fn parse(&self, tokens: &[Self::Token]) -> Parsed<Self::Cst, Self::ParseError>;

    fn analyze(
        &self,
        cst: &Self::Cst,
        tokens: &[Self::Token],
        options: &LintOptions,
    ) -> Result<Vec<Diagnostic>, AnalyzeError>;

    /// Pure mapping from a recognition error to a user-facing diagnostic
    fn map_parser_error(&self, err: &Self::ParseError, text: &str) -> Diagnostic;

    fn post_lex(&self, _text: &str, _tokens: &[Self::Token]) -> Result<Vec<Diagnostic>, HookError> {
        Ok(Vec::new())
    }

    fn post_parse(
        &self,
        _text: &str,
        _tokens: &[Self::Token],
        _cst: Option<&Self::Cst>,
        _prior: &[Diagnostic],
    ) -> Result<Vec<Diagnostic>, HookError> {
        Ok(Vec::new())
    }
}

/// Run every stage and return diagnostics only
pub fn validate<A: Adapter + ?Sized>(adapter: &A, text: &str, options: &LintOptions) -> Vec<Diagnostic> {
    validate_with_report(adapter, text, options).diagnostics
}

/// Run every stage, keeping dropped hook failures in the report
pub fn validate_with_report<A: Adapter + ?Sized>(
    adapter: &A,
    text: &str,
    options: &LintOptions,
) -> ValidationReport {
    let mut report = ValidationReport::default();

    let lexed = adapter.tokenize(text);
    let lex_failed = !lexed.errors.is_empty();
    report
        .diagnostics
        .extend(lexed.errors.into_iter().map(LexError::into_diagnostic));
    let tokens = lexed.tokens;

    // Token-level checks run even when the file cannot be parsed
    let post_lex = adapter.post_lex(text, &tokens);
    absorb_hook(&mut report, Stage::PostLex, post_lex);

    let mut cst = None;
    if !lex_failed {
        let parsed = adapter.parse(&tokens);
        for err in &parsed.errors {
            report.diagnostics.push(adapter.map_parser_error(err, text));
        }
        cst = parsed.cst;
    } else {
        log::trace!("skipping {} after lexer errors", Stage::Parse);
    }

    if let Some(cst) = &cst {
        match adapter.analyze(cst, &tokens, options) {
            Ok(diagnostics) => report.diagnostics.extend(diagnostics),
            Err(e) => {
                log::debug!("{} stage failed: {}", Stage::Analyze, e);
                report.diagnostics.push(
                    Diagnostic::error(1, 1, format!("Semantic analysis failed: {}", e))
                        .with_code(SEMANTIC_ERROR),
                );
            }
        }
    }

    let post_parse = adapter.post_parse(text, &tokens, cst.as_ref(), &report.diagnostics);
    absorb_hook(&mut report, Stage::PostParse, post_parse);

    let index = LineIndex::new(text);
    report.diagnostics = report
        .diagnostics
        .into_iter()
        .map(|d| d.clamped_to(&index))
        .collect();
    report
}

fn absorb_hook(
    report: &mut ValidationReport,
    stage: Stage,
    result: Result<Vec<Diagnostic>, HookError>,
) {
    match result {
        Ok(diagnostics) => report.diagnostics.extend(diagnostics),
        Err(e) => {
            log::debug!("dropping {} hook failure: {}", stage, e);
            report.hook_failures.push(HookFailure {
                stage,
                message: e.to_string(),
            });
        }
    }
}

/// Check whether `prior` already flags `line` with `code`
pub fn already_reported(prior: &[Diagnostic], code: &str, line: usize) -> bool {
    prior.iter().any(|d| d.line == line && d.has_code(code))
}
