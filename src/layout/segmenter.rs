//! Region segmentation using line and column alignment statistics.
//!
//! Tokens are grouped into lines by baseline, lines into blocks by vertical
//! gap, and every block is classified as prose or table candidate from two
//! signals: how regularly its cell fragments line up in shared column slots,
//! and how stable the fragment count per line is. Ambiguous blocks stay
//! prose.

use crate::model::{Region, RegionKind, Token, TokenStream};

use super::cluster::{cluster_positions, mean_and_std, median};
use super::line::{build_lines, LayoutMetrics, TextLine};
use super::options::LayoutOptions;

/// Signals computed for one block of lines.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BlockSignals {
    /// Number of lines in the block
    pub lines: usize,
    /// Column slots hit by at least two distinct lines
    pub shared_slots: usize,
    /// Fraction of fragments sitting in shared slots
    pub alignment: f32,
    /// `1 - cv` of the fragment count per line, floored at 0
    pub regularity: f32,
    /// Mean number of tokens per fragment
    pub tokens_per_fragment: f32,
    /// Whether the block reads as a bulleted or numbered list
    pub list_like: bool,
}

/// Splits a page into prose and table-candidate regions.
pub struct RegionSegmenter {
    options: LayoutOptions,
}

impl RegionSegmenter {
    /// Create a segmenter with default options.
    pub fn new() -> Self {
        Self {
            options: LayoutOptions::default(),
        }
    }

    /// Create a segmenter with custom options.
    pub fn with_options(options: LayoutOptions) -> Self {
        Self { options }
    }

    /// Get the options.
    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// Segment a page into regions, top to bottom.
    ///
    /// An empty stream yields no regions.
    pub fn segment(&self, stream: &TokenStream) -> Vec<Region> {
        self.segment_tokens(&stream.tokens)
    }

    /// Segment a set of tokens into regions, top to bottom.
    pub fn segment_tokens(&self, tokens: &[Token]) -> Vec<Region> {
        if tokens.is_empty() {
            return Vec::new();
        }

        let metrics = LayoutMetrics::from_tokens(tokens);
        let lines = build_lines(
            tokens,
            metrics.line_tolerance(&self.options),
            metrics.cell_gap(&self.options),
        );
        log::debug!(
            "RegionSegmenter: {} tokens in {} lines (median height {:.2}, width {:.2})",
            tokens.len(),
            lines.len(),
            metrics.median_height,
            metrics.median_width
        );

        let mut regions = Vec::new();
        for block in self.group_into_blocks(lines) {
            let parts = if self.options.refine_blocks {
                self.refine_block(block)
            } else {
                vec![block]
            };

            for part in parts {
                let kind = self.classify(&part, &metrics);
                let tokens: Vec<Token> = part.into_iter().flat_map(|line| line.tokens).collect();
                regions.push(Region::new(kind, tokens));
            }
        }

        log::debug!(
            "RegionSegmenter: {} regions ({} table candidates)",
            regions.len(),
            regions.iter().filter(|r| r.is_table_candidate()).count()
        );
        regions
    }

    /// Group consecutive lines into blocks separated by large vertical gaps.
    fn group_into_blocks(&self, lines: Vec<TextLine>) -> Vec<Vec<TextLine>> {
        let mut blocks: Vec<Vec<TextLine>> = Vec::new();
        let mut current: Vec<TextLine> = Vec::new();
        let mut bottom = f32::NEG_INFINITY;

        for line in lines {
            if !current.is_empty() {
                let heights: Vec<f32> = current.iter().map(TextLine::height).collect();
                let line_height = median(&heights).unwrap_or(0.0);
                let gap = line.bbox.top - bottom;
                if gap > self.options.block_gap_factor * line_height {
                    blocks.push(std::mem::take(&mut current));
                    bottom = f32::NEG_INFINITY;
                }
            }
            bottom = bottom.max(line.bbox.bottom);
            current.push(line);
        }

        if !current.is_empty() {
            blocks.push(current);
        }
        blocks
    }

    /// Split runs of multi-fragment lines away from single-fragment lines.
    ///
    /// Separates a heading directly above a table, or a caption directly
    /// below it, from the table rows.
    fn refine_block(&self, block: Vec<TextLine>) -> Vec<Vec<TextLine>> {
        let min_rows = self.options.min_table_rows;
        let multi: Vec<bool> = block.iter().map(|l| l.fragment_count() >= 2).collect();

        // Mark lines belonging to a long enough run of multi-fragment lines.
        let mut in_run = vec![false; block.len()];
        let mut i = 0;
        while i < block.len() {
            if !multi[i] {
                i += 1;
                continue;
            }
            let start = i;
            while i < block.len() && multi[i] {
                i += 1;
            }
            if i - start >= min_rows {
                in_run[start..i].iter_mut().for_each(|m| *m = true);
            }
        }

        let mut parts: Vec<Vec<TextLine>> = Vec::new();
        let mut current: Vec<TextLine> = Vec::new();
        let mut current_flag = None;
        for (line, flag) in block.into_iter().zip(in_run) {
            if current_flag.is_some_and(|f| f != flag) {
                parts.push(std::mem::take(&mut current));
            }
            current_flag = Some(flag);
            current.push(line);
        }
        if !current.is_empty() {
            parts.push(current);
        }
        parts
    }

    /// Classify a block of lines.
    ///
    /// Single-line blocks are always prose.
    pub fn classify(&self, lines: &[TextLine], metrics: &LayoutMetrics) -> RegionKind {
        if lines.len() < self.options.min_table_rows.max(2) {
            return RegionKind::Prose;
        }

        let signals = self.block_signals(lines, metrics);
        let aligned = signals.shared_slots >= 2
            && signals.alignment >= self.options.min_alignment_ratio;
        let regular = signals.regularity >= self.options.min_count_regularity;
        let cell_sized = signals.tokens_per_fragment <= self.options.max_tokens_per_cell;
        let list_like = self.options.detect_lists && signals.list_like;

        log::debug!(
            "RegionSegmenter: block of {} lines: slots={}, alignment={:.2}, regularity={:.2}, tokens/fragment={:.2}, list={}",
            signals.lines,
            signals.shared_slots,
            signals.alignment,
            signals.regularity,
            signals.tokens_per_fragment,
            signals.list_like
        );

        if aligned && regular && cell_sized && !list_like {
            RegionKind::TableCandidate
        } else {
            RegionKind::Prose
        }
    }

    /// Compute the classification signals of a block.
    pub fn block_signals(&self, lines: &[TextLine], metrics: &LayoutMetrics) -> BlockSignals {
        let mut lefts = Vec::new();
        let mut owners = Vec::new();
        let mut counts = Vec::with_capacity(lines.len());
        let mut token_total = 0usize;

        for (line_idx, line) in lines.iter().enumerate() {
            counts.push(line.fragment_count() as f32);
            token_total += line.tokens.len();
            for fragment in &line.fragments {
                lefts.push(line.fragment_left(fragment));
                owners.push(line_idx);
            }
        }

        if lefts.is_empty() {
            return BlockSignals {
                lines: lines.len(),
                ..Default::default()
            };
        }

        let link = 2.0 * metrics.column_tolerance(&self.options);
        let mut shared_slots = 0;
        let mut shared_fragments = 0;
        for cluster in cluster_positions(&lefts, link) {
            let mut hit: Vec<usize> = cluster.members.iter().map(|&m| owners[m]).collect();
            hit.sort_unstable();
            hit.dedup();
            if hit.len() >= 2 {
                shared_slots += 1;
                shared_fragments += cluster.len();
            }
        }

        let (mean, std) = mean_and_std(&counts);
        let regularity = if mean > 0.0 {
            (1.0 - std / mean).max(0.0)
        } else {
            0.0
        };

        BlockSignals {
            lines: lines.len(),
            shared_slots,
            alignment: shared_fragments as f32 / lefts.len() as f32,
            regularity,
            tokens_per_fragment: token_total as f32 / lefts.len() as f32,
            list_like: is_list_pattern(lines, shared_slots),
        }
    }
}

impl Default for RegionSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if a block is a bulleted or numbered list laid out in columns.
///
/// When a list marker and its item text become separate fragments they look
/// like a two-column table.
fn is_list_pattern(lines: &[TextLine], columns: usize) -> bool {
    if columns < 2 || lines.is_empty() {
        return false;
    }

    let mut bullet_count = 0;
    let mut number_count = 0;
    for line in lines {
        let Some(first) = line.fragments.first() else {
            continue;
        };
        let text = line.fragment_text(first);
        if is_bullet_marker(&text) {
            bullet_count += 1;
        } else if is_number_marker(&text) {
            number_count += 1;
        }
    }

    let bullet_ratio = bullet_count as f32 / lines.len() as f32;
    let total_ratio = (bullet_count + number_count) as f32 / lines.len() as f32;

    // Number markers only count in two-column blocks.
    bullet_ratio >= 0.5 || (columns == 2 && total_ratio >= 0.5)
}

/// Check if text is a bullet marker (•, -, etc.).
fn is_bullet_marker(text: &str) -> bool {
    matches!(
        text.trim(),
        "-" | "–" | "—" | "•" | "·" | "*" | "○" | "▪" | "◦" | "▸" | "►" | "■" | "●" | "□" | "◆" | "▶" | "➤"
    )
}

/// Check if text is a number-style list marker (1., 2), a., etc.).
fn is_number_marker(text: &str) -> bool {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return false;
    }

    if let Some(pos) = cleaned.find(|c: char| !c.is_ascii_digit()) {
        let (prefix, suffix) = cleaned.split_at(pos);
        if !prefix.is_empty() && (suffix == "." || suffix == ")") {
            return true;
        }
    }

    let mut chars = cleaned.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some(c), Some('.' | ')'), None) if c.is_alphabetic()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BoundingBox;

    const H: f32 = 10.0;

    fn token(text: &str, left: f32, top: f32) -> Token {
        let width = text.chars().count() as f32 * 6.0;
        Token::new(text, BoundingBox::new(left, top, left + width, top + H), 0)
    }

    /// Lay out words of a sentence with normal spacing starting at `left`.
    fn words(sentence: &str, left: f32, top: f32) -> Vec<Token> {
        let mut x = left;
        sentence
            .split_whitespace()
            .map(|w| {
                let t = token(w, x, top);
                x = t.right() + 4.0;
                t
            })
            .collect()
    }

    fn stream(tokens: Vec<Token>) -> TokenStream {
        TokenStream::with_tokens(0, tokens)
    }

    #[test]
    fn test_empty_stream_has_no_regions() {
        let segmenter = RegionSegmenter::new();
        assert!(segmenter.segment(&TokenStream::new(0)).is_empty());
    }

    #[test]
    fn test_single_line_is_prose() {
        let segmenter = RegionSegmenter::new();
        let tokens = vec![
            token("Name", 10.0, 10.0),
            token("Age", 100.0, 10.0),
            token("City", 200.0, 10.0),
        ];
        let regions = segmenter.segment(&stream(tokens));
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].kind, RegionKind::Prose);
    }

    #[test]
    fn test_aligned_grid_is_table_candidate() {
        let segmenter = RegionSegmenter::new();
        let tokens = vec![
            token("Name", 10.0, 10.0),
            token("Age", 100.0, 10.0),
            token("City", 200.0, 10.0),
            token("Ana", 10.0, 25.0),
            token("30", 100.0, 25.0),
            token("Rome", 200.0, 25.0),
        ];
        let regions = segmenter.segment(&stream(tokens));
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].kind, RegionKind::TableCandidate);
        assert_eq!(regions[0].len(), 6);
        assert_eq!(regions[0].tokens[0].text, "Name");
        assert_eq!(regions[0].tokens[3].text, "Ana");
    }

    #[test]
    fn test_prose_paragraph() {
        let segmenter = RegionSegmenter::new();
        let mut tokens = words("The quick brown fox jumps over the lazy dog.", 10.0, 10.0);
        tokens.extend(words("It was not amused by this at all.", 10.0, 25.0));
        tokens.extend(words("Nobody saw it coming.", 10.0, 40.0));
        let regions = segmenter.segment(&stream(tokens));
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].kind, RegionKind::Prose);
    }

    #[test]
    fn test_two_column_prose_stays_prose() {
        let segmenter = RegionSegmenter::new();
        let mut tokens = Vec::new();
        for (i, (left, right)) in [
            ("Lorem ipsum dolor sit amet", "sed do eiusmod tempor incididunt"),
            ("consectetur adipiscing elit", "ut labore et dolore magna"),
            ("quis nostrud exercitation ullamco", "aliqua enim ad minim veniam"),
        ]
        .iter()
        .enumerate()
        {
            let top = 10.0 + i as f32 * 15.0;
            tokens.extend(words(left, 10.0, top));
            tokens.extend(words(right, 300.0, top));
        }
        let regions = segmenter.segment(&stream(tokens));
        assert!(regions.iter().all(|r| r.kind == RegionKind::Prose));
    }

    #[test]
    fn test_blocks_split_on_vertical_gap() {
        let segmenter = RegionSegmenter::new();
        let mut tokens = words("First paragraph line.", 10.0, 10.0);
        tokens.extend(words("Second paragraph line.", 10.0, 80.0));
        let regions = segmenter.segment(&stream(tokens));
        assert_eq!(regions.len(), 2);
        assert!(regions[0].bbox.top < regions[1].bbox.top);
    }

    #[test]
    fn test_heading_split_from_table() {
        let segmenter = RegionSegmenter::new();
        let mut tokens = words("Quarterly results", 10.0, 10.0);
        for (i, row) in [["Q1", "10", "12"], ["Q2", "11", "15"], ["Q3", "9", "20"]]
            .iter()
            .enumerate()
        {
            let top = 25.0 + i as f32 * 15.0;
            tokens.push(token(row[0], 10.0, top));
            tokens.push(token(row[1], 100.0, top));
            tokens.push(token(row[2], 200.0, top));
        }
        let regions = segmenter.segment(&stream(tokens));
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].kind, RegionKind::Prose);
        assert_eq!(regions[0].len(), 2);
        assert_eq!(regions[1].kind, RegionKind::TableCandidate);
        assert_eq!(regions[1].len(), 9);
    }

    #[test]
    fn test_bullet_list_is_prose() {
        let segmenter = RegionSegmenter::new();
        let mut tokens = Vec::new();
        for (i, item) in ["Apples", "Oranges", "Pears"].iter().enumerate() {
            let top = 10.0 + i as f32 * 15.0;
            tokens.push(token("•", 10.0, top));
            tokens.push(token(item, 40.0, top));
        }
        let regions = segmenter.segment(&stream(tokens));
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].kind, RegionKind::Prose);

        let lists_off = RegionSegmenter::with_options(LayoutOptions::new().with_detect_lists(false));
        let mut tokens = Vec::new();
        for (i, item) in ["Apples", "Oranges", "Pears"].iter().enumerate() {
            let top = 10.0 + i as f32 * 15.0;
            tokens.push(token("•", 10.0, top));
            tokens.push(token(item, 40.0, top));
        }
        let regions = lists_off.segment(&stream(tokens));
        assert_eq!(regions[0].kind, RegionKind::TableCandidate);
    }

    #[test]
    fn test_segment_is_deterministic() {
        let segmenter = RegionSegmenter::new();
        let mut tokens = vec![
            token("Rome", 200.0, 25.0),
            token("Name", 10.0, 10.0),
            token("30", 100.0, 25.0),
            token("Age", 100.0, 10.0),
            token("Ana", 10.0, 25.0),
            token("City", 200.0, 10.0),
        ];
        let first = segmenter.segment(&stream(tokens.clone()));
        tokens.reverse();
        let second = segmenter.segment(&stream(tokens));
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.kind, b.kind);
            assert_eq!(a.tokens, b.tokens);
        }
    }

    #[test]
    fn test_markers() {
        assert!(is_bullet_marker("•"));
        assert!(is_bullet_marker(" - "));
        assert!(!is_bullet_marker("Name"));

        assert!(is_number_marker("1."));
        assert!(is_number_marker("12)"));
        assert!(is_number_marker("a."));
        assert!(is_number_marker("1 ."));
        assert!(!is_number_marker("30"));
        assert!(!is_number_marker("Rome"));
        assert!(!is_number_marker(""));
    }
}
