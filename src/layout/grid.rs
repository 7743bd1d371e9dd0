//! Table grid reconstruction.
//!
//! Rows come from baseline grouping. Columns come from one shared axis of
//! slots, found by clustering the left edges of every cell fragment in the
//! region; each token is then placed in its nearest slot. Because every
//! row is measured against the same slots, slightly misaligned OCR rows
//! still reconcile into a rectangular grid.

use crate::model::{Region, Table, Token};

use super::cluster::{cluster_positions, nearest_slot};
use super::line::{build_lines, LayoutMetrics, TextLine};
use super::options::LayoutOptions;

/// Confidence given to grids with a single row or column.
const TRIVIAL_STRUCTURE_SCORE: f32 = 0.25;

/// Builds tables from table-candidate regions.
pub struct TableGridBuilder {
    options: LayoutOptions,
}

impl TableGridBuilder {
    /// Create a builder with default options.
    pub fn new() -> Self {
        Self {
            options: LayoutOptions::default(),
        }
    }

    /// Create a builder with custom options.
    pub fn with_options(options: LayoutOptions) -> Self {
        Self { options }
    }

    /// Column slot tolerance for a token set.
    ///
    /// Moving every left edge by less than this amount does not change the
    /// column count, as long as columns sit more than four tolerances apart.
    pub fn column_tolerance(&self, tokens: &[Token]) -> f32 {
        LayoutMetrics::from_tokens(tokens).column_tolerance(&self.options)
    }

    /// Rebuild a region as a table.
    ///
    /// Always succeeds. Degenerate input (no tokens, one row, one column)
    /// produces a low-confidence table instead of an error.
    pub fn build(&self, region: &Region) -> Table {
        let page = region.page();
        if region.is_empty() {
            return Table::new(Vec::new(), page, region.bbox).with_confidence(0.0, true);
        }

        let metrics = LayoutMetrics::from_tokens(&region.tokens);
        let lines = build_lines(
            &region.tokens,
            metrics.line_tolerance(&self.options),
            metrics.cell_gap(&self.options),
        );
        let slots = self.infer_columns(&lines, metrics.column_tolerance(&self.options));
        let rows = assign_cells(&lines, &slots);

        let mut table = Table::new(rows, page, region.bbox).with_column_positions(slots);
        let (confidence, low) = self.score(&table, &region.tokens);
        table = table.with_confidence(confidence, low);

        log::debug!(
            "TableGridBuilder: page {} -> {}x{} grid, confidence {:.2}{}",
            page,
            table.row_count(),
            table.column_count(),
            confidence,
            if low { " (low)" } else { "" }
        );
        table
    }

    /// Shared column slot positions, ascending.
    fn infer_columns(&self, lines: &[TextLine], tolerance: f32) -> Vec<f32> {
        let lefts: Vec<f32> = lines
            .iter()
            .flat_map(|line| line.fragments.iter().map(|f| line.fragment_left(f)))
            .collect();

        cluster_positions(&lefts, 2.0 * tolerance)
            .into_iter()
            .map(|cluster| cluster.center)
            .collect()
    }

    /// Confidence score and low-confidence flag for a finished grid.
    fn score(&self, table: &Table, tokens: &[Token]) -> (f32, bool) {
        let rows = table.row_count();
        let columns = table.column_count();
        let trivial = rows <= 1 || columns <= 1;

        let structure = if trivial {
            TRIVIAL_STRUCTURE_SCORE
        } else {
            table.filled_cells() as f32 / (rows * columns) as f32
        };
        let recognition = tokens.iter().map(|t| t.confidence).sum::<f32>() / tokens.len() as f32;
        let confidence = (structure * recognition).clamp(0.0, 1.0);

        (
            confidence,
            trivial || confidence < self.options.low_confidence_threshold,
        )
    }
}

impl Default for TableGridBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Place the tokens of every line into their nearest column slots.
///
/// A fragment stays whole while its tokens share a slot; a token whose
/// nearest slot moves on starts a new piece in that slot.
fn assign_cells(lines: &[TextLine], slots: &[f32]) -> Vec<Vec<String>> {
    let columns = slots.len().max(1);
    lines
        .iter()
        .map(|line| {
            let mut cells: Vec<Vec<String>> = vec![Vec::new(); columns];
            for fragment in &line.fragments {
                let mut start = fragment.start;
                let mut col = nearest_slot(line.fragment_left(fragment), slots).unwrap_or(0);
                for i in fragment.clone().skip(1) {
                    let next = nearest_slot(line.tokens[i].left(), slots).unwrap_or(0);
                    if next != col {
                        push_piece(&mut cells[col], line.fragment_text(&(start..i)));
                        start = i;
                        col = next;
                    }
                }
                push_piece(&mut cells[col], line.fragment_text(&(start..fragment.end)));
            }
            cells.into_iter().map(|parts| parts.join(" ")).collect()
        })
        .collect()
}

fn push_piece(cell: &mut Vec<String>, text: String) {
    if !text.is_empty() {
        cell.push(text);
    }
}
