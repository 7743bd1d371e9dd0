//! Reading-order text assembly for prose regions.

use crate::model::{Paragraph, Region};

use super::line::{build_lines, join_tokens, LayoutMetrics};
use super::options::LayoutOptions;

/// Joins prose tokens into paragraphs.
///
/// Tokens are read line by line, left to right. Source line breaks are
/// reflowed into single spaces.
pub struct TextAssembler {
    options: LayoutOptions,
}

impl TextAssembler {
    /// Create an assembler with default options.
    pub fn new() -> Self {
        Self {
            options: LayoutOptions::default(),
        }
    }

    /// Create an assembler with custom options.
    pub fn with_options(options: LayoutOptions) -> Self {
        Self { options }
    }

    /// Assemble a region into one paragraph.
    pub fn assemble(&self, region: &Region) -> Paragraph {
        let metrics = LayoutMetrics::from_tokens(&region.tokens);
        let lines = build_lines(
            &region.tokens,
            metrics.line_tolerance(&self.options),
            metrics.cell_gap(&self.options),
        );

        let text = lines
            .iter()
            .map(|line| join_tokens(&line.tokens))
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        Paragraph::new(text, region.page(), region.bbox).with_token_count(region.len())
    }
}

impl Default for TextAssembler {
    fn default() -> Self {
        Self::new()
    }
}
