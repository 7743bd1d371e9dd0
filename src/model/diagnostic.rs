//! Diagnostics recorded while processing a document.

use serde::{Deserialize, Serialize};

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational
    Info,
    /// Data was kept but may be wrong, or a page was skipped
    Warning,
    /// Data was dropped because of an internal fault
    Error,
}

/// What a diagnostic is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// The page's token stream violated the data model; page skipped
    MalformedInput,
    /// A table was emitted with a low confidence score
    LowConfidenceTable,
    /// One region failed and was dropped; the rest of the page was kept
    RegionFailure,
    /// Segmentation of a whole page failed; page skipped
    PageFailure,
    /// The page was not finished before cancellation
    Cancelled,
}

/// A note attached to an extraction result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// 0-based page index, when page-specific
    pub page: Option<usize>,
    /// Severity
    pub severity: Severity,
    /// Category
    pub kind: DiagnosticKind,
    /// Human-readable detail
    pub message: String,
}

impl Diagnostic {
    /// Create a new diagnostic.
    pub fn new(
        page: Option<usize>,
        severity: Severity,
        kind: DiagnosticKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            page,
            severity,
            kind,
            message: message.into(),
        }
    }

    /// A page was skipped because its tokens are malformed.
    pub fn malformed_input(page: usize, message: impl Into<String>) -> Self {
        Self::new(
            Some(page),
            Severity::Warning,
            DiagnosticKind::MalformedInput,
            message,
        )
    }

    /// A table was kept despite low confidence.
    pub fn low_confidence_table(page: usize, message: impl Into<String>) -> Self {
        Self::new(
            Some(page),
            Severity::Warning,
            DiagnosticKind::LowConfidenceTable,
            message,
        )
    }

    /// A region was dropped after an internal fault.
    pub fn region_failure(page: usize, message: impl Into<String>) -> Self {
        Self::new(
            Some(page),
            Severity::Error,
            DiagnosticKind::RegionFailure,
            message,
        )
    }

    /// A whole page was dropped after an internal fault.
    pub fn page_failure(page: usize, message: impl Into<String>) -> Self {
        Self::new(
            Some(page),
            Severity::Error,
            DiagnosticKind::PageFailure,
            message,
        )
    }

    /// A page was abandoned because processing was cancelled.
    pub fn cancelled(page: usize) -> Self {
        Self::new(
            Some(page),
            Severity::Info,
            DiagnosticKind::Cancelled,
            "processing cancelled before this page finished",
        )
    }

    /// Check if this is a warning or worse.
    pub fn is_problem(&self) -> bool {
        self.severity >= Severity::Warning
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        match self.page {
            Some(page) => write!(f, "{} (page {}): {}", severity, page + 1, self.message),
            None => write!(f, "{}: {}", severity, self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_one_based_page() {
        let d = Diagnostic::malformed_input(0, "token 3: right <= left");
        assert_eq!(d.to_string(), "warning (page 1): token 3: right <= left");
        assert!(d.is_problem());
    }

    #[test]
    fn test_cancelled_is_info() {
        let d = Diagnostic::cancelled(1);
        assert_eq!(d.kind, DiagnosticKind::Cancelled);
        assert!(!d.is_problem());
    }
}
