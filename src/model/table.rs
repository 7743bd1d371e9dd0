//! Table types.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::BoundingBox;

/// A reconstructed table grid.
///
/// Every row holds exactly `column_count()` cells; unfilled cells are empty
/// strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// 1-based position in the document (0 until numbered)
    pub number: usize,

    /// Cell text, row-major
    pub rows: Vec<Vec<String>>,

    /// 0-based source page index
    pub page: usize,

    /// Union of the member token boxes
    pub bbox: BoundingBox,

    /// X position of every column slot, ascending
    pub column_positions: Vec<f32>,

    /// Reconstruction confidence in [0, 1]
    pub confidence: f32,

    /// Whether the grid collapsed to trivial structure or scored below threshold
    pub low_confidence: bool,
}

impl Table {
    /// Create a table from a rectangular grid.
    ///
    /// Short rows are padded with empty cells; an empty grid becomes a
    /// single empty cell.
    pub fn new(rows: Vec<Vec<String>>, page: usize, bbox: BoundingBox) -> Self {
        let columns = rows.iter().map(|r| r.len()).max().unwrap_or(0).max(1);
        let mut rows = rows;
        if rows.is_empty() {
            rows.push(Vec::new());
        }
        for row in &mut rows {
            row.resize(columns, String::new());
        }

        Self {
            number: 0,
            rows,
            page,
            bbox,
            column_positions: Vec::new(),
            confidence: 1.0,
            low_confidence: false,
        }
    }

    /// Set the column slot positions and return self.
    pub fn with_column_positions(mut self, positions: Vec<f32>) -> Self {
        self.column_positions = positions;
        self
    }

    /// Set confidence and the low-confidence flag and return self.
    pub fn with_confidence(mut self, confidence: f32, low_confidence: bool) -> Self {
        self.confidence = confidence;
        self.low_confidence = low_confidence;
        self
    }

    /// Assign the document-order number and return self.
    pub fn with_number(mut self, number: usize) -> Self {
        self.number = number;
        self
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.rows.first().map(|r| r.len()).unwrap_or(0)
    }

    /// Get cell text, or `None` outside the grid.
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column).map(String::as_str)
    }

    /// Number of cells holding text.
    pub fn filled_cells(&self) -> usize {
        self.rows
            .iter()
            .flatten()
            .filter(|c| !c.is_empty())
            .count()
    }

    /// Human-readable title, e.g. "Table 2 from Page 3".
    pub fn title(&self) -> String {
        format!("Table {} from Page {}", self.number, self.page + 1)
    }

    /// File-name-safe form of the title, e.g. "table_2_from_page_3".
    pub fn file_stem(&self) -> String {
        sanitize_file_stem(&self.title())
    }

    /// Get plain text representation of the table (tab-separated).
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.join("\t"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Lowercase, turn spaces into underscores and drop anything outside `[a-z0-9_]`.
pub fn sanitize_file_stem(title: &str) -> String {
    static DISALLOWED: OnceLock<Regex> = OnceLock::new();
    let re = DISALLOWED.get_or_init(|| Regex::new(r"[^a-z0-9_]+").expect("valid regex"));
    let lowered = title.to_lowercase().replace(' ', "_");
    re.replace_all(&lowered, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_table_pads_rows() {
        let table = Table::new(
            grid(&[&["Name", "Age", "City"], &["Ana", "30"]]),
            0,
            BoundingBox::new(0.0, 0.0, 100.0, 40.0),
        );
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.cell(1, 2), Some(""));
        assert_eq!(table.filled_cells(), 5);
    }

    #[test]
    fn test_empty_table_is_one_cell() {
        let table = Table::new(Vec::new(), 0, BoundingBox::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.column_count(), 1);
        assert_eq!(table.cell(0, 0), Some(""));
    }

    #[test]
    fn test_title_and_file_stem() {
        let table = Table::new(grid(&[&["a"]]), 2, BoundingBox::new(0.0, 0.0, 1.0, 1.0))
            .with_number(4);
        assert_eq!(table.title(), "Table 4 from Page 3");
        assert_eq!(table.file_stem(), "table_4_from_page_3");
    }

    #[test]
    fn test_sanitize_file_stem() {
        assert_eq!(sanitize_file_stem("Native Table 1"), "native_table_1");
        assert_eq!(sanitize_file_stem("Q3 (draft) — Ünits!"), "q3_draft__nits");
    }

    #[test]
    fn test_plain_text() {
        let table = Table::new(
            grid(&[&["a", "b"], &["c", "d"]]),
            0,
            BoundingBox::new(0.0, 0.0, 1.0, 1.0),
        );
        assert_eq!(table.plain_text(), "a\tb\nc\td");
    }
}
