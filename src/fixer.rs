//! File-level auto-fix
//!
//! Runs the engine's fix loop over each file and then, depending on the
//! mode, rewrites the file, only reports, or renders a unified diff.
//! The fix level comes from the engine's configuration.

use crate::diagnostic::Diagnostic;
use crate::engine::Engine;
use similar::TextDiff;
use std::path::{Path, PathBuf};

/// What to do with fixed text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FixMode {
    /// Report what would change without touching files
    #[default]
    DryRun,
    /// Rewrite files in place
    Write,
    /// Render a unified diff instead of writing
    Diff,
}

/// Outcome for one file
#[derive(Debug, Clone, Default)]
pub struct FileFix {
    pub path: PathBuf,
    /// Text differs from what was read
    pub changed: bool,
    /// Passes that applied edits
    pub passes: usize,
    pub edits_applied: usize,
    /// Diagnostics left after fixing
    pub remaining: Vec<Diagnostic>,
    /// Unified diff (diff mode only)
    pub diff: Option<String>,
}

/// Result of fixing a set of files
#[derive(Debug, Default)]
pub struct FixResult {
    pub files: Vec<FileFix>,
    /// Number of files changed (or that would change)
    pub files_modified: usize,
    /// Total edits applied over all passes and files
    pub edits_applied: usize,
    /// Errors left after fixing
    pub remaining_errors: usize,
    /// Warnings left after fixing
    pub remaining_warnings: usize,
    /// I/O errors encountered
    pub errors: Vec<String>,
}

impl FixResult {
    fn add(&mut self, file: FileFix) {
        if file.changed {
            self.files_modified += 1;
        }
        self.edits_applied += file.edits_applied;
        self.remaining_errors += file.remaining.iter().filter(|d| d.is_error()).count();
        self.remaining_warnings += file.remaining.iter().filter(|d| d.is_warning()).count();
        self.files.push(file);
    }

    /// Exit code after fixing (0 = clean, 1 = warnings left, 2 = errors left)
    pub fn exit_code(&self) -> i32 {
        if self.remaining_errors > 0 || !self.errors.is_empty() {
            2
        } else if self.remaining_warnings > 0 {
            1
        } else {
            0
        }
    }
}

/// Auto-fixer that applies the fix loop to files
pub struct Fixer<'e> {
    engine: &'e Engine,
    mode: FixMode,
}

impl<'e> Fixer<'e> {
    /// Create a dry-run fixer
    pub fn new(engine: &'e Engine) -> Self {
        Self {
            engine,
            mode: FixMode::DryRun,
        }
    }

    /// Set the fix mode
    pub fn with_mode(mut self, mode: FixMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> FixMode {
        self.mode
    }

    pub fn is_dry_run(&self) -> bool {
        self.mode != FixMode::Write
    }

    /// Fix every file; read and write failures are collected, not raised
    pub fn fix_files(&self, files: &[PathBuf]) -> FixResult {
        let mut result = FixResult::default();
        for file in files {
            match self.fix_path(file) {
                Ok(fixed) => result.add(fixed),
                Err(e) => {
                    log::warn!("Cannot fix {}: {}", file.display(), e);
                    result.errors.push(format!("{}: {}", file.display(), e));
                }
            }
        }
        result
    }

    /// Fix a single file
    pub fn fix_path(&self, path: &Path) -> std::io::Result<FileFix> {
        let original = std::fs::read_to_string(path)?;
        let outcome = self.engine.fix_text(&original);
        let changed = outcome.changed(&original);

        let mut diff = None;
        if changed {
            match self.mode {
                FixMode::Write => {
                    std::fs::write(path, &outcome.fixed)?;
                    log::debug!(
                        "{}: {} edit(s) in {} pass(es)",
                        path.display(),
                        outcome.edits_applied,
                        outcome.passes
                    );
                }
                FixMode::Diff => diff = Some(unified_diff(path, &original, &outcome.fixed)),
                FixMode::DryRun => {}
            }
        }

        Ok(FileFix {
            path: path.to_path_buf(),
            changed,
            passes: outcome.passes,
            edits_applied: outcome.edits_applied,
            remaining: outcome.errors,
            diff,
        })
    }

    /// Format diff output for display
    pub fn format_diffs(&self, result: &FixResult) -> String {
        result
            .files
            .iter()
            .filter_map(|f| f.diff.as_deref())
            .collect()
    }
}

/// Unified diff between two versions of a file
pub fn unified_diff(file: &Path, original: &str, modified: &str) -> String {
    let name = file.display().to_string();
    TextDiff::from_lines(original, modified)
        .unified_diff()
        .context_radius(3)
        .header(&format!("a/{}", name), &format!("b/{}", name))
        .to_string()
}
