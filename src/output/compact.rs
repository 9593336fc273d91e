//! Compact output formatter
//!
//! One line per diagnostic, minimal output for scripting.

use super::OutputFormatter;
use crate::diagnostic::Diagnostic;
use crate::engine::LintResult;
use std::path::Path;

/// Compact one-line-per-problem formatter
pub struct CompactFormatter {
    /// Show the `[code]` tag
    pub show_code: bool,
}

impl CompactFormatter {
    /// Create a new compact formatter
    pub fn new() -> Self {
        Self { show_code: true }
    }

    /// Hide diagnostic codes
    pub fn without_code(mut self) -> Self {
        self.show_code = false;
        self
    }
}

impl Default for CompactFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for CompactFormatter {
    fn format(&self, result: &LintResult) -> String {
        let mut output = String::new();
        for (file, diag) in result.diagnostics() {
            output.push_str(&self.format_diagnostic(file, diag));
            output.push('\n');
        }
        output
    }

    fn format_diagnostic(&self, file: &Path, diagnostic: &Diagnostic) -> String {
        let location = format!(
            "{}:{}:{}: {}",
            file.display(),
            diagnostic.line,
            diagnostic.column,
            diagnostic.severity
        );
        match diagnostic.code() {
            Some(code) if self.show_code => {
                format!("{} [{}] {}", location, code, diagnostic.message)
            }
            _ => format!("{} {}", location, diagnostic.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FileReport;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    #[test]
    fn test_compact_format() {
        let diag = Diagnostic::error(10, 5, "Invalid arrow '->'").with_code("FL_ARROW_INVALID");
        let output = CompactFormatter::new().format_diagnostic(Path::new("a.mmd"), &diag);
        assert_eq!(output, "a.mmd:10:5: error [FL_ARROW_INVALID] Invalid arrow '->'");
    }

    #[test]
    fn test_compact_without_code() {
        let diag = Diagnostic::warning(1, 1, "Zero slice").with_code("PIE_VALUE_ZERO");
        let output = CompactFormatter::new()
            .without_code()
            .format_diagnostic(Path::new("p.mmd"), &diag);
        assert_eq!(output, "p.mmd:1:1: warning Zero slice");
    }

    #[test]
    fn test_compact_result() {
        let result = LintResult {
            files: vec![FileReport {
                path: PathBuf::from("f.mmd"),
                diagnostics: vec![Diagnostic::error(1, 1, "E1"), Diagnostic::warning(2, 1, "W1")],
                ..Default::default()
            }],
            files_processed: 1,
            error_count: 1,
            warning_count: 1,
            ..Default::default()
        };

        let output = CompactFormatter::new().format(&result);
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines, vec!["f.mmd:1:1: error E1", "f.mmd:2:1: warning W1"]);
    }
}
