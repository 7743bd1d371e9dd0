//! Layout analysis options.

/// Tunable thresholds shared by segmentation, grid building and text assembly.
///
/// Distances are expressed as factors of page statistics (median token
/// height or width) so the same settings work across scan resolutions.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOptions {
    /// Baselines closer than this many median token heights share a line
    pub line_tolerance_factor: f32,

    /// Horizontal gaps of at least this many median heights split cell fragments
    pub cell_gap_factor: f32,

    /// Vertical gaps above this many median line heights start a new block
    pub block_gap_factor: f32,

    /// Column slot tolerance as a fraction of the median token width
    pub column_tolerance_factor: f32,

    /// Minimum number of lines for a table candidate
    pub min_table_rows: usize,

    /// Minimum fraction of fragments sitting in shared column slots
    pub min_alignment_ratio: f32,

    /// Minimum value of `1 - cv` of fragments per line
    pub min_count_regularity: f32,

    /// Mean tokens per fragment above which a block reads as prose columns
    pub max_tokens_per_cell: f32,

    /// Whether to split multi-fragment line runs out of mixed blocks
    pub refine_blocks: bool,

    /// Reject list-like blocks (bullets, numbered items) as tables
    pub detect_lists: bool,

    /// Tables scoring below this are flagged low-confidence
    pub low_confidence_threshold: f32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            line_tolerance_factor: 0.5,
            cell_gap_factor: 1.0,
            block_gap_factor: 1.2,
            column_tolerance_factor: 0.5,
            min_table_rows: 2,
            min_alignment_ratio: 0.6,
            min_count_regularity: 0.5,
            max_tokens_per_cell: 4.0,
            refine_blocks: true,
            detect_lists: true,
            low_confidence_threshold: 0.5,
        }
    }
}

impl LayoutOptions {
    /// Create new options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the line grouping tolerance factor.
    pub fn with_line_tolerance_factor(mut self, factor: f32) -> Self {
        self.line_tolerance_factor = factor;
        self
    }

    /// Set the cell fragment gap factor.
    pub fn with_cell_gap_factor(mut self, factor: f32) -> Self {
        self.cell_gap_factor = factor;
        self
    }

    /// Set the block gap factor.
    pub fn with_block_gap_factor(mut self, factor: f32) -> Self {
        self.block_gap_factor = factor;
        self
    }

    /// Set the column slot tolerance factor.
    pub fn with_column_tolerance_factor(mut self, factor: f32) -> Self {
        self.column_tolerance_factor = factor;
        self
    }

    /// Set the minimum number of table rows (at least 2).
    pub fn with_min_table_rows(mut self, rows: usize) -> Self {
        self.min_table_rows = rows.max(2);
        self
    }

    /// Set the minimum alignment ratio.
    pub fn with_min_alignment_ratio(mut self, ratio: f32) -> Self {
        self.min_alignment_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    /// Set the minimum fragment count regularity.
    pub fn with_min_count_regularity(mut self, regularity: f32) -> Self {
        self.min_count_regularity = regularity.clamp(0.0, 1.0);
        self
    }

    /// Set the maximum mean tokens per cell fragment.
    pub fn with_max_tokens_per_cell(mut self, tokens: f32) -> Self {
        self.max_tokens_per_cell = tokens;
        self
    }

    /// Enable or disable block refinement.
    pub fn with_refine_blocks(mut self, refine: bool) -> Self {
        self.refine_blocks = refine;
        self
    }

    /// Enable or disable list rejection.
    pub fn with_detect_lists(mut self, detect: bool) -> Self {
        self.detect_lists = detect;
        self
    }

    /// Set the low-confidence threshold.
    pub fn with_low_confidence_threshold(mut self, threshold: f32) -> Self {
        self.low_confidence_threshold = threshold.clamp(0.0, 1.0);
        self
    }
}
