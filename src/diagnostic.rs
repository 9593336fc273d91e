//! Diagnostic types for linting results

use crate::position::LineIndex;
use serde::{Deserialize, Serialize};

/// Severity level for diagnostics
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Warning - potential issue
    #[default]
    Warning,
    /// Error - definite problem
    Error,
}

impl Severity {
    /// Severity for checks that are warnings in lenient mode and errors in strict mode
    pub fn for_mode(strict: bool) -> Self {
        if strict {
            Severity::Error
        } else {
            Severity::Warning
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "warning" | "warn" => Ok(Severity::Warning),
            "error" | "err" => Ok(Severity::Error),
            _ => Err(()),
        }
    }
}

/// A single reported problem.
///
/// Serializes directly to the wire shape consumed by editors and the JSON
/// formatter: `{ line, column, message, severity, code?, hint?, length? }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based, in characters)
    pub column: usize,
    /// Human-readable message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Stable identifier used to select an auto-fix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Number of characters the underline spans, starting at `column`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(severity: Severity, line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line: line.max(1),
            column: column.max(1),
            message: message.into(),
            severity,
            code: None,
            hint: None,
            length: None,
        }
    }

    /// Create an error diagnostic
    pub fn error(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, line, column, message)
    }

    /// Create a warning diagnostic
    pub fn warning(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, line, column, message)
    }

    /// Attach a stable code
    pub fn with_code(mut self, code: &str) -> Self {
        self.code = Some(code.to_string());
        self
    }

    /// Add help text
    pub fn with_hint(mut self, hint: &str) -> Self {
        self.hint = Some(hint.to_string());
        self
    }

    /// Set the highlighted length (zero is stored as one)
    pub fn with_length(mut self, length: usize) -> Self {
        self.length = Some(length.max(1));
        self
    }

    /// Remap the severity, leaving everything else untouched
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Underline length, defaulting to one character
    pub fn span_len(&self) -> usize {
        self.length.unwrap_or(1).max(1)
    }

    /// Code as a string slice
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Check whether this diagnostic carries the given code
    pub fn has_code(&self, code: &str) -> bool {
        self.code.as_deref() == Some(code)
    }

    /// Clamp `line` and `column` into the bounds of `text`
    pub fn clamped(self, text: &str) -> Self {
        self.clamped_to(&LineIndex::new(text))
    }

    /// Clamp against a prebuilt line index
    pub fn clamped_to(mut self, index: &LineIndex<'_>) -> Self {
        let pos = index.clamp(crate::position::Position::new(self.line, self.column));
        self.line = pos.line;
        self.column = pos.column;
        self
    }

    /// Check if this is an error
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Check if this is a warning
    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}
