//! Document-level extraction result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Diagnostic, DiagnosticKind, Table};
use crate::error::{Error, Result};

/// Everything the pipeline produced for one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extraction {
    /// All narrative text, paragraphs separated by a blank line
    pub text: String,

    /// Reconstructed tables in document order (page-major, top to bottom)
    pub tables: Vec<Table>,

    /// Warnings and errors collected along the way, in page order
    pub diagnostics: Vec<Diagnostic>,

    /// Processing statistics
    pub stats: ExtractionStats,

    /// Whether processing was cancelled before every page finished
    pub cancelled: bool,

    /// When processing finished
    pub processed_at: DateTime<Utc>,
}

impl Extraction {
    /// Create an empty result.
    pub fn new() -> Self {
        Self {
            text: String::new(),
            tables: Vec::new(),
            diagnostics: Vec::new(),
            stats: ExtractionStats::default(),
            cancelled: false,
            processed_at: Utc::now(),
        }
    }

    /// Number of tables.
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Check if nothing was extracted.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.tables.is_empty()
    }

    /// Diagnostics of a given kind.
    pub fn diagnostics_of(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.kind == kind)
    }

    /// Check if any warning or error was recorded.
    pub fn has_problems(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_problem)
    }

    /// Fail with [`Error::Cancelled`] if processing stopped early.
    pub fn ensure_complete(&self) -> Result<()> {
        if self.cancelled {
            return Err(Error::Cancelled);
        }
        Ok(())
    }
}

impl Default for Extraction {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics collected during extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Pages handed to the pipeline
    pub pages_total: u32,

    /// Pages whose results were kept
    pub pages_processed: u32,

    /// Pages skipped as malformed or failed
    pub pages_failed: u32,

    /// Pages abandoned because of cancellation
    pub pages_cancelled: u32,

    /// Pages excluded by the page selection
    pub pages_skipped: u32,

    /// Tokens on kept pages
    pub token_count: u32,

    /// Regions found on kept pages
    pub region_count: u32,

    /// Paragraphs emitted
    pub paragraph_count: u32,

    /// Tables emitted
    pub table_count: u32,

    /// Tables flagged low-confidence
    pub low_confidence_table_count: u32,

    /// Approximate word count of the text output
    pub word_count: u32,

    /// Character count of the text output (excluding whitespace)
    pub char_count: u32,
}

impl ExtractionStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add word and character counts from text.
    pub fn count_text(&mut self, text: &str) {
        self.word_count += text.split_whitespace().count() as u32;
        self.char_count += text.chars().filter(|c| !c.is_whitespace()).count() as u32;
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &ExtractionStats) {
        self.pages_total += other.pages_total;
        self.pages_processed += other.pages_processed;
        self.pages_failed += other.pages_failed;
        self.pages_cancelled += other.pages_cancelled;
        self.pages_skipped += other.pages_skipped;
        self.token_count += other.token_count;
        self.region_count += other.region_count;
        self.paragraph_count += other.paragraph_count;
        self.table_count += other.table_count;
        self.low_confidence_table_count += other.low_confidence_table_count;
        self.word_count += other.word_count;
        self.char_count += other.char_count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_stats_count_text() {
        let mut stats = ExtractionStats::new();
        stats.count_text("Hello, world! This is a test.");

        assert_eq!(stats.word_count, 6);
        assert_eq!(stats.char_count, 24);
    }

    #[test]
    fn test_extraction_stats_merge() {
        let mut stats1 = ExtractionStats {
            paragraph_count: 5,
            table_count: 2,
            ..Default::default()
        };
        let stats2 = ExtractionStats {
            paragraph_count: 3,
            table_count: 1,
            pages_failed: 1,
            ..Default::default()
        };

        stats1.merge(&stats2);

        assert_eq!(stats1.paragraph_count, 8);
        assert_eq!(stats1.table_count, 3);
        assert_eq!(stats1.pages_failed, 1);
    }

    #[test]
    fn test_empty_extraction() {
        let extraction = Extraction::new();
        assert!(extraction.is_empty());
        assert!(!extraction.has_problems());
        assert_eq!(extraction.table_count(), 0);
        assert!(extraction.ensure_complete().is_ok());
    }

    #[test]
    fn test_cancelled_extraction_is_incomplete() {
        let extraction = Extraction {
            cancelled: true,
            ..Extraction::new()
        };
        assert!(matches!(extraction.ensure_complete(), Err(Error::Cancelled)));
    }
}
