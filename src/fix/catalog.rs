//! Built-in fix registrations

use super::encode::Delimiter;
use super::strategy::{Anchor, BlockOpener, Shape, Strategy};
use super::{FixLevel, FixRegistry};
use crate::codes::*;

/// Keywords a misspelled first word may be corrected to
pub const FIX_KEYWORDS: &[&str] = &[
    "flowchart",
    "graph",
    "subgraph",
    "direction",
    "classDef",
    "class",
    "click",
    "style",
    "linkStyle",
    "sequenceDiagram",
    "participant",
    "actor",
    "activate",
    "deactivate",
    "autonumber",
    "loop",
    "alt",
    "else",
    "opt",
    "par",
    "and",
    "critical",
    "option",
    "break",
    "rect",
    "box",
    "note",
    "title",
    "showData",
];

/// Keywords whose line opens a block closed by `end`
pub const END_BLOCK_OPENERS: &[&str] = &[
    "subgraph", "block", "alt", "opt", "loop", "par", "critical", "break", "rect", "box",
];

/// Bracket shapes, double forms first
pub const BRACKET_SHAPES: &[Shape] = &[
    ("((", "))"),
    ("[[", "]]"),
    ("([", "])"),
    ("[(", ")]"),
    ("{{", "}}"),
    ("(", ")"),
    ("[", "]"),
    ("{", "}"),
];

const ESCAPED_QUOTE: &[(&str, &str)] = &[("\\\"", "&quot;")];
const RAW_QUOTE: &[(&str, &str)] = &[("\"", "&quot;")];
const PARENS: &[(&str, &str)] = &[("(", "&#40;"), (")", "&#41;")];

const QUOTED: &[Delimiter] = &[Delimiter::Quote];
const BRACKETED: &[Delimiter] = &[
    Delimiter::Pair('[', ']'),
    Delimiter::Pair('(', ')'),
    Delimiter::Pair('{', '}'),
];
const SQUARE: &[Delimiter] = &[Delimiter::Pair('[', ']')];

pub(crate) fn builtin() -> FixRegistry {
    let mut registry = FixRegistry::new();

    registry.register(ARROW_INVALID, Strategy::ReplaceToken { replacement: "-->" });
    registry.register(SEQ_ARROW_INVALID, Strategy::ReplaceToken { replacement: "->>" });
    registry.register(
        KEYWORD_MISSPELLED,
        Strategy::ReplaceKeyword {
            keywords: FIX_KEYWORDS,
        },
    );

    registry.register(
        LABEL_ESCAPED_QUOTE,
        Strategy::EncodeEntities {
            rules: ESCAPED_QUOTE,
            delimiters: QUOTED,
        },
    );
    registry.register(
        LABEL_RAW_QUOTE,
        Strategy::EncodeEntities {
            rules: RAW_QUOTE,
            delimiters: BRACKETED,
        },
    );
    registry.register(
        LABEL_PAREN_IN_LABEL,
        Strategy::EncodeEntities {
            rules: PARENS,
            delimiters: SQUARE,
        },
    );

    registry.register(
        SHAPE_MISMATCHED_CLOSER,
        Strategy::RepairBracket {
            shapes: BRACKET_SHAPES,
        },
    );
    registry.register(
        SHAPE_UNCLOSED,
        Strategy::RepairBracket {
            shapes: BRACKET_SHAPES,
        },
    );

    registry.register(
        BLOCK_MISSING_END,
        Strategy::CloseBlock {
            opener: BlockOpener::Keywords(END_BLOCK_OPENERS),
            closer: "end",
        },
    );
    registry.register(
        STATE_BLOCK_MISSING_BRACE,
        Strategy::CloseBlock {
            opener: BlockOpener::TrailingBrace,
            closer: "}",
        },
    );

    registry.register(STATEMENT_TRAILING_TOKENS, Strategy::SplitStatement);

    registry.register(
        PIE_MISSING_COLON,
        Strategy::InsertText {
            text: ": ",
            anchor: Anchor::Caret,
            level: FixLevel::Safe,
        },
    );
    registry.register(
        SEQ_MESSAGE_MISSING_COLON,
        Strategy::InsertText {
            text: ": ",
            anchor: Anchor::Caret,
            level: FixLevel::Safe,
        },
    );
    registry.register(
        DIRECTION_MISSING,
        Strategy::InsertText {
            text: " TD",
            anchor: Anchor::LineEnd,
            level: FixLevel::All,
        },
    );
    registry.register(
        LINK_MISSING_ARROW,
        Strategy::InsertText {
            text: "--> ",
            anchor: Anchor::Caret,
            level: FixLevel::All,
        },
    );

    registry
}
