//! Core linter engine

use crate::codes::{FILE_READ_ERROR, UNKNOWN_DIAGRAM};
use crate::config::{Config, ConfigError};
use crate::diagnostic::Diagnostic;
use crate::fix::{converge, FixOutcome, FixRegistry};
use crate::plugin::{builtin_dialects, detect_dialect, Dialect};
use glob::glob;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Diagnostics for one file
#[derive(Debug, Clone, Default, Serialize)]
pub struct FileReport {
    pub path: PathBuf,

    /// Dialect that handled the file, if any recognised it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dialect: Option<String>,

    pub diagnostics: Vec<Diagnostic>,

    /// File contents, kept for source excerpts
    #[serde(skip)]
    pub source: Option<String>,
}

impl FileReport {
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_warning()).count()
    }
}

/// Result of linting operation
#[derive(Debug, Default)]
pub struct LintResult {
    /// Per-file reports, in input order
    pub files: Vec<FileReport>,

    /// Files processed
    pub files_processed: usize,

    /// Files with errors
    pub files_with_errors: usize,

    /// Files with warnings
    pub files_with_warnings: usize,

    /// Total errors
    pub error_count: usize,

    /// Total warnings
    pub warning_count: usize,

    /// Processing duration
    pub duration: Duration,
}

impl LintResult {
    fn from_report(report: FileReport) -> Self {
        let error_count = report.error_count();
        let warning_count = report.warning_count();
        Self {
            files: vec![report],
            files_processed: 1,
            files_with_errors: usize::from(error_count > 0),
            files_with_warnings: usize::from(warning_count > 0),
            error_count,
            warning_count,
            duration: Duration::ZERO,
        }
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        self.warning_count > 0
    }

    /// Check if result is clean (no errors or warnings)
    pub fn is_clean(&self) -> bool {
        self.error_count == 0 && self.warning_count == 0
    }

    /// Get exit code (0 = success, 1 = warnings, 2 = errors)
    pub fn exit_code(&self) -> i32 {
        if self.error_count > 0 {
            2
        } else if self.warning_count > 0 {
            1
        } else {
            0
        }
    }

    /// All diagnostics with the file they belong to
    pub fn diagnostics(&self) -> impl Iterator<Item = (&Path, &Diagnostic)> {
        self.files
            .iter()
            .flat_map(|f| f.diagnostics.iter().map(move |d| (f.path.as_path(), d)))
    }

    /// Merge another result into this one
    pub fn merge(&mut self, other: LintResult) {
        self.files.extend(other.files);
        self.files_processed += other.files_processed;
        self.files_with_errors += other.files_with_errors;
        self.files_with_warnings += other.files_with_warnings;
        self.error_count += other.error_count;
        self.warning_count += other.warning_count;
    }
}

/// The main linter engine
pub struct Engine {
    config: Config,

    /// Dialects in detection order
    dialects: Vec<Arc<dyn Dialect>>,
}

impl Engine {
    /// Create an engine with every built-in dialect
    pub fn new(config: Config) -> Self {
        Self::with_dialects(config, builtin_dialects())
    }

    /// Create an engine with an explicit dialect set
    pub fn with_dialects(config: Config, dialects: Vec<Arc<dyn Dialect>>) -> Self {
        Self { config, dialects }
    }

    /// Register another dialect; later registrations are tried last
    pub fn register_dialect(&mut self, dialect: Arc<dyn Dialect>) {
        self.dialects.push(dialect);
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn dialects(&self) -> &[Arc<dyn Dialect>] {
        &self.dialects
    }

    /// Dialect whose header starts `text`
    pub fn detect(&self, text: &str) -> Option<&dyn Dialect> {
        detect_dialect(text, self.dialects.as_slice())
    }

    /// Lint multiple files
    pub fn lint(&self, files: &[PathBuf]) -> LintResult {
        let start = Instant::now();

        let results: Vec<LintResult> = match self.thread_pool() {
            Some(pool) => pool.install(|| files.par_iter().map(|f| self.lint_file(f)).collect()),
            None => files.iter().map(|f| self.lint_file(f)).collect(),
        };

        let mut combined = LintResult::default();
        for result in results {
            combined.merge(result);
        }

        combined.duration = start.elapsed();
        combined
    }

    fn thread_pool(&self) -> Option<rayon::ThreadPool> {
        if !self.config.engine.parallel {
            return None;
        }
        let threads = match self.config.engine.jobs {
            0 => num_cpus::get(),
            n => n,
        };
        match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => Some(pool),
            Err(e) => {
                log::warn!("Falling back to sequential linting: {}", e);
                None
            }
        }
    }

    /// Lint a single file
    pub fn lint_file(&self, path: &Path) -> LintResult {
        let report = match std::fs::read_to_string(path) {
            Ok(content) => self.lint_text(&content, path),
            Err(e) => {
                log::warn!("Cannot read {}: {}", path.display(), e);
                FileReport {
                    path: path.to_path_buf(),
                    dialect: None,
                    source: None,
                    diagnostics: self.filter(vec![Diagnostic::error(
                        1,
                        1,
                        format!("Failed to read file: {}", e),
                    )
                    .with_code(FILE_READ_ERROR)]),
                }
            }
        };
        LintResult::from_report(report)
    }

    /// Lint text as if it had been read from `path`
    pub fn lint_text(&self, text: &str, path: &Path) -> FileReport {
        let options = self.config.lint_options();
        let (dialect, diagnostics) = match self.detect(text) {
            Some(dialect) => {
                log::debug!("{}: {} dialect", path.display(), dialect.id());
                let report = dialect.validate(text, &options);
                for failure in &report.hook_failures {
                    log::debug!(
                        "{}: {} hook failed: {}",
                        path.display(),
                        failure.stage,
                        failure.message
                    );
                }
                (Some(dialect.id().to_string()), report.diagnostics)
            }
            None => (None, vec![self.unknown_diagram()]),
        };

        FileReport {
            path: path.to_path_buf(),
            dialect,
            diagnostics: self.filter(diagnostics),
            source: Some(text.to_string()),
        }
    }

    /// Run the fix loop over text
    pub fn fix_text(&self, text: &str) -> FixOutcome {
        let Some(dialect) = self.detect(text) else {
            return FixOutcome {
                fixed: text.to_string(),
                errors: self.filter(vec![self.unknown_diagram()]),
                passes: 0,
                edits_applied: 0,
            };
        };

        let options = self.config.lint_options();
        converge(
            |current| self.filter(dialect.validate(current, &options).diagnostics),
            FixRegistry::builtin(),
            text,
            self.config.fix.level,
        )
    }

    /// Run the fix loop over one file; nothing is written
    pub fn fix_file(&self, path: &Path) -> std::io::Result<FixOutcome> {
        let content = std::fs::read_to_string(path)?;
        Ok(self.fix_text(&content))
    }

    fn unknown_diagram(&self) -> Diagnostic {
        let headers: Vec<&str> = self
            .dialects
            .iter()
            .flat_map(|d| d.headers().iter().copied())
            .collect();
        Diagnostic::error(1, 1, "Unknown diagram type")
            .with_code(UNKNOWN_DIAGRAM)
            .with_hint(&format!("Start the diagram with one of: {}", headers.join(", ")))
    }

    /// Drop disabled codes and apply severity overrides
    pub fn filter(&self, diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
        diagnostics
            .into_iter()
            .filter(|d| d.code().map_or(true, |code| self.config.is_code_enabled(code)))
            .map(|d| match d.code().and_then(|code| self.config.get_severity_override(code)) {
                Some(severity) => d.with_severity(severity),
                None => d,
            })
            .collect()
    }

    /// Expand file arguments: glob patterns, plain files, and directories
    /// searched with the configured include and exclude patterns
    pub fn discover_files(&self, inputs: &[String]) -> Result<Vec<PathBuf>, ConfigError> {
        let matcher = self.config.file_matcher()?;
        let mut files = Vec::new();

        for input in inputs {
            let path = Path::new(input);
            if path.is_dir() {
                let pattern = format!("{}/**/*", input.trim_end_matches('/'));
                files.extend(expand(&pattern)?.into_iter().filter(|p| matcher.is_match(p)));
            } else if path.is_file() {
                files.push(path.to_path_buf());
            } else {
                files.extend(expand(input)?.into_iter().filter(|p| !matcher.is_excluded(p)));
            }
        }

        files.sort();
        files.dedup();
        Ok(files)
    }
}

fn expand(pattern: &str) -> Result<Vec<PathBuf>, ConfigError> {
    let paths = glob(pattern).map_err(|e| {
        ConfigError::Invalid(format!("Invalid pattern '{}': {}", pattern, e))
    })?;
    Ok(paths.flatten().filter(|p| p.is_file()).collect())
}

/// Severity counts as a short summary line, e.g. "2 errors, 1 warning"
pub fn summarize(errors: usize, warnings: usize) -> String {
    let plural = |n: usize, word: &str| {
        if n == 1 {
            format!("{} {}", n, word)
        } else {
            format!("{} {}s", n, word)
        }
    };
    format!("{}, {}", plural(errors, "error"), plural(warnings, "warning"))
}
