//! Dialect plugins: type-erased adapters selected by diagram header

use crate::pipeline::{LintOptions, ValidationReport};
use crate::plugins::{flowchart::FlowchartPlugin, pie::PiePlugin, sequence::SequencePlugin};
use std::sync::Arc;

/// A diagram dialect the engine can lint and fix.
///
/// Built-in dialects implement this by forwarding to
/// [`crate::pipeline::validate_with_report`] over their [`crate::pipeline::Adapter`].
pub trait Dialect: Send + Sync {
    /// Dialect identifier (e.g., "flowchart", "pie")
    fn id(&self) -> &str;

    /// Dialect version
    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    /// Human-readable description
    fn description(&self) -> &str;

    /// Header keywords that introduce this dialect (e.g., "flowchart", "graph")
    fn headers(&self) -> &[&str];

    /// Whether `text` is written in this dialect
    fn detect(&self, text: &str) -> bool {
        header_keyword(text).map_or(false, |keyword| self.headers().iter().any(|h| *h == keyword))
    }

    /// Run the full lint pipeline
    fn validate(&self, text: &str, options: &LintOptions) -> ValidationReport;
}

/// First word of the first significant line, skipping blank lines and `%%` comments
pub fn header_keyword(text: &str) -> Option<&str> {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with("%%"))
        .and_then(|line| line.split(|c: char| c.is_whitespace() || c == ';').next())
        .filter(|word| !word.is_empty())
}

/// Pick the first dialect that recognises `text`
pub fn detect_dialect<'a, D>(text: &str, dialects: &'a [D]) -> Option<&'a dyn Dialect>
where
    D: AsRef<dyn Dialect>,
{
    dialects
        .iter()
        .map(AsRef::as_ref)
        .find(|dialect| dialect.detect(text))
}

/// Every built-in dialect, in detection order
pub fn builtin_dialects() -> Vec<Arc<dyn Dialect>> {
    vec![
        Arc::new(FlowchartPlugin),
        Arc::new(PiePlugin),
        Arc::new(SequencePlugin),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fake;

    impl Dialect for Fake {
        fn id(&self) -> &str {
            "fake"
        }

        fn description(&self) -> &str {
            "Test dialect"
        }

        fn headers(&self) -> &[&str] {
            &["fake", "fakeDiagram"]
        }

        fn validate(&self, _text: &str, _options: &LintOptions) -> ValidationReport {
            ValidationReport::default()
        }
    }

    #[test]
    fn test_header_keyword() {
        assert_eq!(header_keyword("flowchart TD\nA-->B"), Some("flowchart"));
        assert_eq!(header_keyword("\n%% comment\n  pie showData\n"), Some("pie"));
        assert_eq!(header_keyword("graph;"), Some("graph"));
        assert_eq!(header_keyword("\n\n%% only comments"), None);
        assert_eq!(header_keyword(""), None);
    }

    #[test]
    fn test_detect() {
        assert!(Fake.detect("fake\nstuff"));
        assert!(Fake.detect("%% hi\nfakeDiagram"));
        assert!(!Fake.detect("fakery"));
    }

    #[test]
    fn test_detect_dialect() {
        let dialects: Vec<Arc<dyn Dialect>> = vec![Arc::new(Fake)];
        assert_eq!(detect_dialect("fake", &dialects).map(|d| d.id()), Some("fake"));
        assert!(detect_dialect("pie", &dialects).is_none());
    }

    #[test]
    fn test_builtin_dialects() {
        let dialects = builtin_dialects();
        let ids: Vec<_> = dialects.iter().map(|d| d.id()).collect();
        assert_eq!(ids, vec!["flowchart", "pie", "sequence"]);
        assert_eq!(
            detect_dialect("graph LR\nA-->B", &dialects).map(|d| d.id()),
            Some("flowchart")
        );
        assert_eq!(
            detect_dialect("%% hi\nsequenceDiagram\n", &dialects).map(|d| d.id()),
            Some("sequence")
        );
        assert!(detect_dialect("gantt\n", &dialects).is_none());
    }

    #[test]
    fn test_default_version() {
        assert_eq!(Fake.version(), env!("CARGO_PKG_VERSION"));
    }
}
