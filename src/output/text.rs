//! Human-readable text output formatter

use super::OutputFormatter;
use crate::diagnostic::{Diagnostic, Severity};
use crate::engine::{FileReport, LintResult};
use colored::*;
use std::path::Path;

/// Text formatter with optional color support
pub struct TextFormatter {
    /// Enable colored output
    pub colored: bool,

    /// Show the offending source line with a caret underline
    pub show_source: bool,

    /// Show hints
    pub show_hints: bool,

    /// Show statistics
    pub show_stats: bool,
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self {
            colored: true,
            show_source: true,
            show_hints: true,
            show_stats: true,
        }
    }
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable colors
    pub fn without_color(mut self) -> Self {
        self.colored = false;
        self
    }

    fn paint(&self, text: &str, style: fn(&str) -> ColoredString) -> String {
        if self.colored {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn severity_str(&self, severity: Severity) -> String {
        let s = severity.to_string();
        match severity {
            Severity::Error => self.paint(&s, |s| s.red().bold()),
            Severity::Warning => self.paint(&s, |s| s.yellow().bold()),
        }
    }

    /// Source line plus a caret row under the diagnostic's span
    fn excerpt(&self, source: &str, diag: &Diagnostic) -> String {
        let Some(line) = source.lines().nth(diag.line.saturating_sub(1)) else {
            return String::new();
        };
        let bar = self.paint("|", |s| s.blue());
        let indent = diag.column.saturating_sub(1);
        let available = line.chars().count().saturating_sub(indent);
        let width = diag.span_len().min(available).max(1);
        let carets = "^".repeat(width);

        format!(
            "{} {} {}\n     {} {}{}\n",
            self.paint(&format!("{:>4}", diag.line), |s| s.blue()),
            bar,
            line,
            bar,
            " ".repeat(indent),
            self.paint(&carets, |s| s.red())
        )
    }

    fn format_file(&self, report: &FileReport) -> String {
        let mut output = String::new();
        let path = report.path.display().to_string();
        output.push_str(&self.paint(&path, |s| s.underline()));
        output.push('\n');

        for diag in &report.diagnostics {
            output.push_str(&self.format_diagnostic(&report.path, diag));
            if self.show_source {
                if let Some(source) = &report.source {
                    output.push_str(&self.excerpt(source, diag));
                }
            }
            if self.show_hints {
                if let Some(hint) = &diag.hint {
                    output.push_str(&format!("     {} hint: {}\n", self.paint("=", |s| s.blue()), hint));
                }
            }
        }
        output
    }

    fn count(&self, n: usize, word: &str, style: fn(&str) -> ColoredString) -> String {
        let s = format!("{} {}{}", n, word, if n == 1 { "" } else { "s" });
        self.paint(&s, style)
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, result: &LintResult) -> String {
        let mut output = String::new();

        for report in result.files.iter().filter(|f| !f.diagnostics.is_empty()) {
            output.push_str(&self.format_file(report));
            output.push('\n');
        }

        if self.show_stats {
            output.push_str(&format!(
                "{} processed",
                self.count(result.files_processed, "file", |s| s.normal())
            ));

            let mut counts = Vec::new();
            if result.error_count > 0 {
                counts.push(self.count(result.error_count, "error", |s| s.red()));
            }
            if result.warning_count > 0 {
                counts.push(self.count(result.warning_count, "warning", |s| s.yellow()));
            }
            if !counts.is_empty() {
                output.push_str(&format!(": {}", counts.join(", ")));
            }
            output.push('\n');

            output.push_str(&format!(
                "Finished in {:.2}s\n",
                result.duration.as_secs_f64()
            ));
        }

        output
    }

    fn format_diagnostic(&self, file: &Path, diag: &Diagnostic) -> String {
        let code = match diag.code() {
            Some(code) => format!("[{}]", self.paint(code, |s| s.cyan())),
            None => String::new(),
        };
        format!(
            "{}:{}:{}: {}{}: {}\n",
            file.display(),
            diag.line,
            diag.column,
            self.severity_str(diag.severity),
            code,
            diag.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn report(source: &str, diagnostics: Vec<Diagnostic>) -> LintResult {
        let warnings = diagnostics.iter().filter(|d| d.is_warning()).count();
        let errors = diagnostics.len() - warnings;
        LintResult {
            files: vec![FileReport {
                path: PathBuf::from("chart.mmd"),
                dialect: Some("flowchart".to_string()),
                diagnostics,
                source: Some(source.to_string()),
            }],
            files_processed: 1,
            error_count: errors,
            warning_count: warnings,
            ..Default::default()
        }
    }

    #[test]
    fn test_format_diagnostic() {
        let diag = Diagnostic::error(2, 7, "Invalid arrow '->'").with_code("FL_ARROW_INVALID");
        let output = TextFormatter::new()
            .without_color()
            .format_diagnostic(Path::new("chart.mmd"), &diag);
        assert_eq!(
            output,
            "chart.mmd:2:7: error[FL_ARROW_INVALID]: Invalid arrow '->'\n"
        );
    }

    #[test]
    fn test_caret_underline_uses_length() {
        let diag = Diagnostic::error(2, 7, "Invalid arrow '->'")
            .with_code("FL_ARROW_INVALID")
            .with_length(2)
            .with_hint("Use '-->'");
        let output = TextFormatter::new()
            .without_color()
            .format(&report("flowchart TD\n    A -> B\n", vec![diag]));

        assert!(output.contains("   2 |     A -> B\n"), "{}", output);
        assert!(output.contains("     |       ^^\n"), "{}", output);
        assert!(output.contains("hint: Use '-->'"));
        assert!(output.contains("1 file processed: 1 error"));
    }

    #[test]
    fn test_caret_stays_on_line() {
        let diag = Diagnostic::error(1, 4, "x").with_length(50);
        let output = TextFormatter::new()
            .without_color()
            .format(&report("pie\n", vec![diag]));
        assert!(output.contains("     |    ^\n"), "{}", output);
    }

    #[test]
    fn test_clean_files_are_not_listed() {
        let output = TextFormatter::new()
            .without_color()
            .format(&report("pie\n", vec![]));
        assert!(!output.contains("chart.mmd"));
        assert!(output.contains("1 file processed\n"));
    }

    #[test]
    fn test_plural_counts() {
        let diags = vec![Diagnostic::warning(1, 1, "a"), Diagnostic::warning(1, 2, "b")];
        let output = TextFormatter::new()
            .without_color()
            .format(&report("pie\n", diags));
        assert!(output.contains("1 file processed: 2 warnings"));
    }
}
