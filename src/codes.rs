//! Stable diagnostic codes shared by the dialects and the fix catalog

pub use crate::pipeline::{LEX_ERROR, SEMANTIC_ERROR};

pub const ARROW_INVALID: &str = "ARROW_INVALID";
pub const SEQ_ARROW_INVALID: &str = "SEQ_ARROW_INVALID";
pub const KEYWORD_MISSPELLED: &str = "KEYWORD_MISSPELLED";

pub const LABEL_ESCAPED_QUOTE: &str = "LABEL_ESCAPED_QUOTE";
pub const LABEL_RAW_QUOTE: &str = "LABEL_RAW_QUOTE";
pub const LABEL_PAREN_IN_LABEL: &str = "LABEL_PAREN_IN_LABEL";

pub const SHAPE_MISMATCHED_CLOSER: &str = "SHAPE_MISMATCHED_CLOSER";
pub const SHAPE_UNCLOSED: &str = "SHAPE_UNCLOSED";

pub const BLOCK_MISSING_END: &str = "BLOCK_MISSING_END";
pub const STATE_BLOCK_MISSING_BRACE: &str = "STATE_BLOCK_MISSING_BRACE";
pub const END_WITHOUT_BLOCK: &str = "END_WITHOUT_BLOCK";

pub const STATEMENT_TRAILING_TOKENS: &str = "STATEMENT_TRAILING_TOKENS";
pub const LINK_MISSING_ARROW: &str = "LINK_MISSING_ARROW";
pub const DIRECTION_MISSING: &str = "DIRECTION_MISSING";
pub const UNEXPECTED_TOKEN: &str = "UNEXPECTED_TOKEN";

pub const NODE_ID_RESERVED: &str = "NODE_ID_RESERVED";
pub const SUBGRAPH_DUPLICATE_ID: &str = "SUBGRAPH_DUPLICATE_ID";

pub const PIE_MISSING_COLON: &str = "PIE_MISSING_COLON";
pub const PIE_LABEL_UNQUOTED: &str = "PIE_LABEL_UNQUOTED";
pub const PIE_VALUE_NEGATIVE: &str = "PIE_VALUE_NEGATIVE";
pub const PIE_VALUE_ZERO: &str = "PIE_VALUE_ZERO";
pub const PIE_DUPLICATE_LABEL: &str = "PIE_DUPLICATE_LABEL";

pub const SEQ_MESSAGE_MISSING_COLON: &str = "SEQ_MESSAGE_MISSING_COLON";
pub const SEQ_ELSE_OUTSIDE_BLOCK: &str = "SEQ_ELSE_OUTSIDE_BLOCK";

pub const UNKNOWN_DIAGRAM: &str = "UNKNOWN_DIAGRAM";
pub const FILE_READ_ERROR: &str = "FILE_READ_ERROR";

/// Every code with a one-line description, for `--list-codes`
pub const ALL: &[(&str, &str)] = &[
    (ARROW_INVALID, "Flowchart link written as '->' or '=>'"),
    (SEQ_ARROW_INVALID, "Sequence message arrow written as '=>'"),
    (KEYWORD_MISSPELLED, "Statement keyword within two edits of a known one"),
    (LABEL_ESCAPED_QUOTE, "Backslash-escaped quote inside a label"),
    (LABEL_RAW_QUOTE, "Bare quote inside a label"),
    (LABEL_PAREN_IN_LABEL, "Parentheses inside an unquoted square label"),
    (SHAPE_MISMATCHED_CLOSER, "Node shape closed with the wrong bracket"),
    (SHAPE_UNCLOSED, "Node shape never closed"),
    (BLOCK_MISSING_END, "Block still open at the end of the diagram"),
    (STATE_BLOCK_MISSING_BRACE, "Composite state missing its closing brace"),
    (END_WITHOUT_BLOCK, "'end' with no open block"),
    (STATEMENT_TRAILING_TOKENS, "Second statement on the same line"),
    (LINK_MISSING_ARROW, "Two nodes with no link between them"),
    (DIRECTION_MISSING, "Flowchart header without a direction"),
    (UNEXPECTED_TOKEN, "Token the grammar does not allow here"),
    (NODE_ID_RESERVED, "Lowercase 'end' used as a node id"),
    (SUBGRAPH_DUPLICATE_ID, "Subgraph id declared twice"),
    (PIE_MISSING_COLON, "Pie entry without ':' between label and value"),
    (PIE_LABEL_UNQUOTED, "Pie label not in double quotes"),
    (PIE_VALUE_NEGATIVE, "Pie slice with a negative value"),
    (PIE_VALUE_ZERO, "Pie slice with a zero value"),
    (PIE_DUPLICATE_LABEL, "Pie label used twice"),
    (SEQ_MESSAGE_MISSING_COLON, "Sequence message text without ':'"),
    (SEQ_ELSE_OUTSIDE_BLOCK, "'else', 'and' or 'option' outside its block"),
    (LEX_ERROR, "Text the dialect's lexer cannot tokenize"),
    (SEMANTIC_ERROR, "Semantic analysis failed"),
    (UNKNOWN_DIAGRAM, "No dialect recognises the diagram header"),
    (FILE_READ_ERROR, "File could not be read"),
];
