//! Text lines and cell fragments built from tokens.

use std::ops::Range;

use crate::model::{BoundingBox, Token};

use super::cluster::{group_lines, median, split_on_gaps};
use super::options::LayoutOptions;

/// Typical token dimensions of a token set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMetrics {
    /// Median token height
    pub median_height: f32,
    /// Median token width
    pub median_width: f32,
}

impl LayoutMetrics {
    /// Measure a token set. Empty sets get unit metrics.
    pub fn from_tokens(tokens: &[Token]) -> Self {
        let heights: Vec<f32> = tokens.iter().map(Token::height).collect();
        let widths: Vec<f32> = tokens.iter().map(Token::width).collect();
        Self {
            median_height: median(&heights).filter(|h| *h > 0.0).unwrap_or(1.0),
            median_width: median(&widths).filter(|w| *w > 0.0).unwrap_or(1.0),
        }
    }

    /// Baseline difference below which two tokens share a line.
    pub fn line_tolerance(&self, options: &LayoutOptions) -> f32 {
        options.line_tolerance_factor * self.median_height
    }

    /// Horizontal gap below which adjacent tokens stay in one cell fragment.
    pub fn cell_gap(&self, options: &LayoutOptions) -> f32 {
        options.cell_gap_factor * self.median_height
    }

    /// How far a left edge may sit from its column slot.
    pub fn column_tolerance(&self, options: &LayoutOptions) -> f32 {
        options.column_tolerance_factor * self.median_width
    }
}

/// A line of tokens sharing a baseline, split into cell fragments.
#[derive(Debug, Clone)]
pub struct TextLine {
    /// Tokens sorted by left edge
    pub tokens: Vec<Token>,
    /// Runs of tokens separated by wide horizontal gaps
    pub fragments: Vec<Range<usize>>,
    /// Baseline of the first token that opened the line
    pub baseline: f32,
    /// Union of the token boxes
    pub bbox: BoundingBox,
}

impl TextLine {
    /// Build a line from tokens already sorted by left edge.
    pub fn from_sorted(tokens: Vec<Token>, anchor_baseline: f32, cell_gap: f32) -> Self {
        let intervals: Vec<(f32, f32)> = tokens.iter().map(|t| (t.left(), t.right())).collect();
        let fragments = split_on_gaps(&intervals, cell_gap);
        let bbox = BoundingBox::union_all(tokens.iter().map(|t| &t.bbox))
            .unwrap_or(BoundingBox::new(0.0, 0.0, 0.0, 0.0));
        Self {
            tokens,
            fragments,
            baseline: anchor_baseline,
            bbox,
        }
    }

    /// Line height (box extent).
    pub fn height(&self) -> f32 {
        self.bbox.height()
    }

    /// Number of cell fragments.
    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    /// Left edge of a fragment.
    pub fn fragment_left(&self, fragment: &Range<usize>) -> f32 {
        self.tokens[fragment.start].left()
    }

    /// Tokens of a fragment joined by single spaces.
    pub fn fragment_text(&self, fragment: &Range<usize>) -> String {
        join_tokens(&self.tokens[fragment.clone()])
    }
}

/// Group tokens into lines (top to bottom) with their cell fragments.
pub fn build_lines(tokens: &[Token], line_tolerance: f32, cell_gap: f32) -> Vec<TextLine> {
    group_lines(tokens, line_tolerance)
        .into_iter()
        .map(|members| {
            let anchor = members
                .iter()
                .map(|&i| tokens[i].baseline)
                .fold(f32::INFINITY, f32::min);
            let line_tokens: Vec<Token> = members.into_iter().map(|i| tokens[i].clone()).collect();
            TextLine::from_sorted(line_tokens, anchor, cell_gap)
        })
        .collect()
}

/// Token text with surrounding whitespace removed and inner runs collapsed.
pub fn normalize_token_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Join token texts with single spaces, skipping blanks.
pub fn join_tokens(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| normalize_token_text(&t.text))
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
