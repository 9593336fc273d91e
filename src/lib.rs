//! merlint - Diagram Linter with Auto-Fix
//!
//! Lints text diagram sources (flowcharts, pie charts, sequence diagrams)
//! and repairs the common mistakes through a deterministic fix loop.
//!
//! # Architecture
//!
//! ```text
//! CLI/API -> Engine -> Dialect -> Adapter pipeline -> Diagnostics
//!                   \-> Fix loop -> FixRegistry -> TextEdits
//! ```
//!
//! Every dialect runs the same staged pipeline (tokenize, post-lex hook,
//! parse, analyze, post-parse hook) and reports [`Diagnostic`]s with stable
//! codes. The fix engine maps codes to edit strategies and re-validates until
//! the text stops changing.
//!
//! # Example
//!
//! ```
//! use merlint::{fix_text, FixOptions};
//!
//! let outcome = fix_text("flowchart TD\n    A -> B\n", &FixOptions::default());
//! assert_eq!(outcome.fixed, "flowchart TD\n    A --> B\n");
//! assert!(outcome.errors.is_empty());
//! ```

pub mod codes;
pub mod config;
pub mod diagnostic;
pub mod edit;
pub mod engine;
pub mod fix;
pub mod fixer;
pub mod output;
pub mod pipeline;
pub mod plugin;
pub mod position;

// Re-export main types
pub use config::Config;
pub use diagnostic::{Diagnostic, Severity};
pub use edit::{apply_edits, TextEdit};
pub use engine::{Engine, FileReport, LintResult};
pub use fix::{compute_fixes, FixLevel, FixOptions, FixOutcome, FixRegistry, Strategy};
pub use fixer::{FixMode, FixResult, Fixer};
pub use output::{CompactFormatter, JsonFormatter, OutputFormatter, TextFormatter};
pub use pipeline::{validate, Adapter, LintOptions, ValidationReport};
pub use plugin::{builtin_dialects, detect_dialect, Dialect};
pub use position::{LineIndex, Position};

// Built-in dialects
pub mod plugins {
    pub mod flowchart;
    pub mod pie;
    pub mod scan;
    pub mod sequence;
}

use once_cell::sync::Lazy;
use std::sync::Arc;

static BUILTIN: Lazy<Vec<Arc<dyn Dialect>>> = Lazy::new(builtin_dialects);

fn unknown_diagram() -> Diagnostic {
    Diagnostic::error(1, 1, "Unknown diagram type").with_code(codes::UNKNOWN_DIAGRAM)
}

/// Validate text with whichever built-in dialect recognises its header
pub fn validate_text(text: &str, options: &LintOptions) -> Vec<Diagnostic> {
    match detect_dialect(text, BUILTIN.as_slice()) {
        Some(dialect) => dialect.validate(text, options).diagnostics,
        None => vec![unknown_diagram()],
    }
}

/// Run the fix loop with whichever built-in dialect recognises the header
pub fn fix_text(text: &str, options: &FixOptions) -> FixOutcome {
    match detect_dialect(text, BUILTIN.as_slice()) {
        Some(dialect) => fix::fix_text_with(dialect, text, options),
        None => FixOutcome {
            fixed: text.to_string(),
            errors: vec![unknown_diagram()],
            passes: 0,
            edits_applied: 0,
        },
    }
}
