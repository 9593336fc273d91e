//! Validate → fix → re-validate loop

use super::{compute_fixes_with, FixLevel, FixRegistry};
use crate::diagnostic::Diagnostic;
use crate::edit::apply_edits;
use crate::pipeline::LintOptions;
use crate::plugin::Dialect;
use serde::Serialize;

/// Upper bound on fix passes before the last validation
pub const MAX_FIX_PASSES: usize = 5;

#[derive(Debug, Clone, Default)]
pub struct FixOptions {
    pub level: FixLevel,
    pub lint: LintOptions,
}

impl FixOptions {
    pub fn with_level(level: FixLevel) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }
}

/// Result of fixing one text
#[derive(Debug, Clone, Serialize)]
pub struct FixOutcome {
    /// Text after the last applied pass
    pub fixed: String,
    /// Diagnostics that remain in `fixed`
    pub errors: Vec<Diagnostic>,
    /// Passes that applied edits
    pub passes: usize,
    /// Total edits applied over all passes
    pub edits_applied: usize,
}

impl FixOutcome {
    pub fn changed(&self, original: &str) -> bool {
        self.fixed != original
    }
}

/// Fix `text` with `dialect` and the built-in fix catalog
pub fn fix_text_with(dialect: &dyn Dialect, text: &str, options: &FixOptions) -> FixOutcome {
    converge(
        |current| dialect.validate(current, &options.lint).diagnostics,
        FixRegistry::builtin(),
        text,
        options.level,
    )
}

/// Drive `text` toward a fixed point.
///
/// Stops when a pass yields no edits or leaves the text unchanged. After
/// [`MAX_FIX_PASSES`] the text is validated once more and returned as is.
pub fn converge<F>(validate: F, registry: &FixRegistry, text: &str, level: FixLevel) -> FixOutcome
where
    F: Fn(&str) -> Vec<Diagnostic>,
{
    let mut current = text.to_string();
    let mut edits_applied = 0;

    for pass in 0..MAX_FIX_PASSES {
        let diagnostics = validate(&current);
        let edits = compute_fixes_with(registry, &current, &diagnostics, level);
        if edits.is_empty() {
            log::trace!("Fix pass {}: nothing to apply", pass + 1);
            return FixOutcome {
                fixed: current,
                errors: diagnostics,
                passes: pass,
                edits_applied,
            };
        }

        let next = apply_edits(&current, &edits);
        if next == current {
            log::trace!("Fix pass {}: text unchanged", pass + 1);
            return FixOutcome {
                fixed: current,
                errors: diagnostics,
                passes: pass,
                edits_applied,
            };
        }

        log::trace!("Fix pass {}: applied {} edit(s)", pass + 1, edits.len());
        edits_applied += edits.len();
        current = next;
    }

    let errors = validate(&current);
    log::debug!(
        "Fix loop stopped after {} passes with {} diagnostic(s) left",
        MAX_FIX_PASSES,
        errors.len()
    );
    FixOutcome {
        fixed: current,
        errors,
        passes: MAX_FIX_PASSES,
        edits_applied,
    }
}
