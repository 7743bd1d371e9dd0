//! Layout analysis: region segmentation, table grid reconstruction and
//! prose assembly.
//!
//! All stages work on page-local tokens and share the clustering
//! primitives in [`cluster`], which take explicit tolerances and can be
//! used on their own.

pub mod cluster;
mod assembler;
mod grid;
mod line;
mod options;
mod segmenter;

pub use assembler::TextAssembler;
pub use grid::TableGridBuilder;
pub use line::{build_lines, LayoutMetrics, TextLine};
pub use options::LayoutOptions;
pub use segmenter::{BlockSignals, RegionSegmenter};
