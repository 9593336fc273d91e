//! Flowchart checks outside the grammar

use super::lexer::{FlowKind, FlowToken};
use super::parser::{Flowchart, Statement};
use crate::codes::*;
use crate::diagnostic::{Diagnostic, Severity};
use crate::pipeline::{already_reported, AnalyzeError, LintOptions};
use std::collections::HashMap;

/// Setting that turns off the direction check
pub const REQUIRE_DIRECTION: &str = "require_direction";

/// Token-level checks; these run even when the chart does not parse
pub fn token_checks(tokens: &[FlowToken]) -> Vec<Diagnostic> {
    let mut out = Vec::new();

    for (i, tok) in tokens.iter().enumerate() {
        match tok.kind {
            FlowKind::InvalidLink => out.push(
                Diagnostic::error(
                    tok.line,
                    tok.column,
                    format!("Invalid arrow '{}'", tok.image),
                )
                .with_code(ARROW_INVALID)
                .with_length(tok.len())
                .with_hint("Use '-->' for an arrow"),
            ),
            FlowKind::QuotedLabel => quoted_label(tok, &mut out),
            FlowKind::Label => {
                let square = i > 0 && tokens[i - 1].is(FlowKind::ShapeOpen) && tokens[i - 1].image == "[";
                bare_label(tok, square, &mut out);
            }
            _ => {}
        }
    }

    out
}

fn quoted_label(tok: &FlowToken, out: &mut Vec<Diagnostic>) {
    let chars: Vec<char> = tok.image.chars().collect();
    let last = chars.len().saturating_sub(1);
    let mut escaped_at = None;
    let mut raw_at = None;

    let mut i = 1;
    while i < chars.len() {
        if chars[i] == '\\' && chars.get(i + 1) == Some(&'"') {
            escaped_at.get_or_insert(i);
            i += 2;
            continue;
        }
        if chars[i] == '"' && i != last {
            raw_at.get_or_insert(i);
        }
        i += 1;
    }

    if let Some(at) = escaped_at {
        out.push(
            Diagnostic::error(
                tok.line,
                tok.column + at,
                "Backslash-escaped quote in label is not supported",
            )
            .with_code(LABEL_ESCAPED_QUOTE)
            .with_length(2)
            .with_hint("Use &quot; instead of \\\""),
        );
    } else if let Some(at) = raw_at {
        out.push(
            Diagnostic::error(tok.line, tok.column + at, "Unescaped quote inside quoted label")
                .with_code(LABEL_RAW_QUOTE)
                .with_hint("Use &quot; for quotes inside labels"),
        );
    }
}

fn bare_label(tok: &FlowToken, square: bool, out: &mut Vec<Diagnostic>) {
    if let Some(at) = tok.image.chars().position(|c| c == '"') {
        out.push(
            Diagnostic::error(tok.line, tok.column + at, "Quote inside unquoted label")
                .with_code(LABEL_RAW_QUOTE)
                .with_hint("Use &quot; for quotes inside labels"),
        );
    }
    if square {
        if let Some(at) = tok.image.chars().position(|c| c == '(' || c == ')') {
            out.push(
                Diagnostic::error(
                    tok.line,
                    tok.column + at,
                    "Parentheses inside a square label break parsing",
                )
                .with_code(LABEL_PAREN_IN_LABEL)
                .with_hint("Use &#40; and &#41;, or quote the label"),
            );
        }
    }
}

/// Semantic checks over a parsed chart
pub fn analyze(
    chart: &Flowchart,
    tokens: &[FlowToken],
    options: &LintOptions,
) -> Result<Vec<Diagnostic>, AnalyzeError> {
    let mut out = Vec::new();

    let require_direction = match options.settings.get(REQUIRE_DIRECTION) {
        None => true,
        Some(value) => value.as_bool().ok_or_else(|| {
            AnalyzeError(format!("setting '{}' must be a boolean", REQUIRE_DIRECTION))
        })?,
    };

    if require_direction && chart.direction.is_none() {
        let header_len = tokens
            .iter()
            .find(|t| t.is(FlowKind::Header))
            .map_or(1, |t| t.len());
        out.push(
            Diagnostic::new(
                Severity::for_mode(options.strict),
                chart.header_line,
                1,
                "Flowchart has no direction",
            )
            .with_code(DIRECTION_MISSING)
            .with_length(header_len)
            .with_hint("Add a direction such as TD or LR after the header"),
        );
    }

    let mut seen = HashMap::new();
    duplicate_subgraphs(&chart.statements, &mut seen, &mut out);

    Ok(out)
}

fn duplicate_subgraphs(
    statements: &[Statement],
    seen: &mut HashMap<String, usize>,
    out: &mut Vec<Diagnostic>,
) {
    for statement in statements {
        if let Statement::Subgraph(subgraph) = statement {
            if let Some(id) = &subgraph.id {
                if let Some(first) = seen.get(id) {
                    out.push(
                        Diagnostic::error(
                            subgraph.line,
                            subgraph.column,
                            format!("Subgraph id '{}' already used on line {}", id, first),
                        )
                        .with_code(SUBGRAPH_DUPLICATE_ID)
                        .with_length("subgraph".len()),
                    );
                } else {
                    seen.insert(id.clone(), subgraph.line);
                }
            }
            duplicate_subgraphs(&subgraph.body, seen, out);
        }
    }
}

/// Flags lowercase `end` used as a node id
pub fn reserved_ids(tokens: &[FlowToken], prior: &[Diagnostic]) -> Vec<Diagnostic> {
    let mut out: Vec<Diagnostic> = Vec::new();

    for (i, tok) in tokens.iter().enumerate() {
        if !(tok.is(FlowKind::Keyword) && tok.image == "end") {
            continue;
        }
        let statement_start = i == 0
            || matches!(tokens[i - 1].kind, FlowKind::Newline | FlowKind::Semi);
        if statement_start {
            continue;
        }
        if already_reported(prior, NODE_ID_RESERVED, tok.line)
            || already_reported(&out, NODE_ID_RESERVED, tok.line)
        {
            continue;
        }
        out.push(
            Diagnostic::error(tok.line, tok.column, "'end' is reserved and cannot be a node id")
                .with_code(NODE_ID_RESERVED)
                .with_length(3)
                .with_hint("Capitalise it (End) or use another id"),
        );
    }

    out
}
