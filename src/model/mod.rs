//! Data model for token streams and extraction results.
//!
//! Tokens and token streams are what format readers produce; regions are
//! the page-local intermediate form; tables, paragraphs and the extraction
//! aggregate are what the pipeline hands to renderers.

mod diagnostic;
mod extraction;
mod paragraph;
mod region;
mod table;
mod token;

pub use diagnostic::{Diagnostic, DiagnosticKind, Severity};
pub use extraction::{Extraction, ExtractionStats};
pub use paragraph::Paragraph;
pub use region::{Region, RegionKind};
pub use table::{sanitize_file_stem, Table};
pub use token::{BoundingBox, Token, TokenStream};
