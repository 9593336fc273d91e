//! Auto-fix engine
//!
//! Turns diagnostics into text edits. Each diagnostic code maps to at most one
//! [`Strategy`]; codes without a registration are left alone. A single pass
//! resolves every proposal against the same text, so accepted edits never
//! overlap and can be applied together with [`crate::edit::apply_edits`].

mod catalog;
mod converge;
pub mod encode;
pub mod strategy;

pub use catalog::{BRACKET_SHAPES, END_BLOCK_OPENERS, FIX_KEYWORDS};
pub use converge::{converge, fix_text_with, FixOptions, FixOutcome, MAX_FIX_PASSES};
pub use strategy::{edit_distance, keyword_hint, nearest_keyword, Proposal, Strategy};

use crate::diagnostic::Diagnostic;
use crate::edit::TextEdit;
use crate::position::LineIndex;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// How aggressive fixing may be
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FixLevel {
    /// Only fixes that cannot change meaning
    #[default]
    Safe,
    /// Also heuristic fixes (block closers, inserted brackets and arrows)
    All,
}

impl fmt::Display for FixLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixLevel::Safe => write!(f, "safe"),
            FixLevel::All => write!(f, "all"),
        }
    }
}

impl FromStr for FixLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "safe" => Ok(FixLevel::Safe),
            "all" | "unsafe" => Ok(FixLevel::All),
            _ => Err(format!("Unknown fix level: {}", s)),
        }
    }
}

/// Code → strategy table
#[derive(Debug, Clone, Default)]
pub struct FixRegistry {
    strategies: HashMap<String, Strategy>,
}

static BUILTIN: Lazy<FixRegistry> = Lazy::new(catalog::builtin);

impl FixRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared registry with every built-in fix
    pub fn builtin() -> &'static FixRegistry {
        &BUILTIN
    }

    /// Register (or replace) the strategy for a code
    pub fn register(&mut self, code: impl Into<String>, strategy: Strategy) {
        self.strategies.insert(code.into(), strategy);
    }

    pub fn get(&self, code: &str) -> Option<&Strategy> {
        self.strategies.get(code)
    }

    pub fn is_fixable(&self, code: &str) -> bool {
        self.strategies.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

/// Compute edits for one pass using the built-in registry
pub fn compute_fixes(text: &str, diagnostics: &[Diagnostic], level: FixLevel) -> Vec<TextEdit> {
    compute_fixes_with(FixRegistry::builtin(), text, diagnostics, level)
}

fn overlaps(a: (usize, usize), b: (usize, usize)) -> bool {
    if a.0 == a.1 && b.0 == b.1 {
        return a.0 == b.0;
    }
    a.0 < b.1 && b.0 < a.1
}

/// Compute edits for one pass.
///
/// Diagnostics sharing `(code, line, column, length)` are handled once. A
/// proposal above `level` is dropped. Proposals that rewrite a whole label
/// claim their line first; any other proposal on a claimed line, or one whose
/// range collides with an accepted edit, waits for the next pass.
pub fn compute_fixes_with(
    registry: &FixRegistry,
    text: &str,
    diagnostics: &[Diagnostic],
    level: FixLevel,
) -> Vec<TextEdit> {
    let index = LineIndex::new(text);
    let mut seen = HashSet::new();
    let mut proposals: Vec<(usize, Proposal)> = Vec::new();

    for diag in diagnostics {
        let Some(code) = diag.code() else {
            continue;
        };
        if !seen.insert((code, diag.line, diag.column, diag.span_len())) {
            continue;
        }
        let Some(strategy) = registry.get(code) else {
            log::trace!("No fix registered for {}", code);
            continue;
        };
        if strategy.min_level() > level {
            continue;
        }
        let Some(proposal) = strategy.propose(&index, diag) else {
            log::trace!("{} declined at {}:{}", code, diag.line, diag.column);
            continue;
        };
        if proposal.level > level || proposal.edits.is_empty() {
            continue;
        }
        proposals.push((diag.line, proposal));
    }

    // Stable: keeps diagnostic order within each group.
    proposals.sort_by_key(|(_, proposal)| !proposal.whole_line);

    let mut patched_lines = HashSet::new();
    let mut claimed: Vec<(usize, usize)> = Vec::new();
    let mut edits = Vec::new();

    for (line, proposal) in proposals {
        if patched_lines.contains(&line) {
            log::debug!("Line {} already rewritten this pass, deferring fix", line);
            continue;
        }
        let ranges: Vec<(usize, usize)> = proposal.edits.iter().map(|e| e.resolve(&index)).collect();
        if ranges
            .iter()
            .any(|r| claimed.iter().any(|c| overlaps(*r, *c)))
        {
            log::debug!("Overlapping fix on line {} deferred", line);
            continue;
        }
        if proposal.whole_line {
            patched_lines.insert(line);
        }
        claimed.extend(ranges);
        edits.extend(proposal.edits);
    }

    edits
}
