//! # unscan
//!
//! Layout analysis and table reconstruction for OCR token streams.
//!
//! This library takes the positioned words an OCR engine or document
//! parser produces for each page, separates narrative text from tabular
//! regions, rebuilds table grids from word geometry alone and emits
//! plain text plus one CSV per table.
//!
//! ## Quick Start
//!
//! ```no_run
//! use unscan::{process_file, render};
//!
//! fn main() -> unscan::Result<()> {
//!     // Read an OCR token dump and analyze every page
//!     let extraction = process_file("scan.json")?;
//!
//!     println!("{}", extraction.text);
//!     for table in &extraction.tables {
//!         println!("{}", table.title());
//!         println!("{}", render::table_to_csv(table)?);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Region segmentation**: Prose, tables and lists told apart by alignment
//! - **Grid reconstruction**: Column slots clustered from word positions
//! - **Confidence scoring**: Weak or trivial grids are flagged, never dropped
//! - **Parallel processing**: Pages run on a bounded Rayon pool
//! - **Fault isolation**: A bad page or region never sinks the document
//! - **Cleanup pipeline**: Text normalization for OCR output

pub mod detect;
pub mod error;
pub mod layout;
pub mod model;
pub mod pipeline;
pub mod reader;
pub mod render;

// Re-export commonly used types
pub use detect::{detect_format_from_bytes, detect_format_from_path, InputFormat};
pub use error::{Error, Result};
pub use layout::{LayoutOptions, RegionSegmenter, TableGridBuilder, TextAssembler};
pub use model::{
    BoundingBox, Diagnostic, DiagnosticKind, Extraction, ExtractionStats, Paragraph, Region,
    RegionKind, Severity, Table, Token, TokenStream,
};
pub use pipeline::{
    CancellationToken, PageSelection, PageStatus, PipelineOptions, PipelineOrchestrator,
    ProgressObserver,
};
pub use reader::{FormatReader, JsonTokenReader, ReaderRegistry};
pub use render::{
    CleanupOptions, CleanupPreset, JsonFormat, OutputWriter, TextOptions, WrittenFiles,
};

use std::path::Path;
use std::sync::Arc;

/// Read a file with the default readers and run the pipeline on it.
///
/// # Example
///
/// ```no_run
/// use unscan::process_file;
///
/// let extraction = process_file("scan.json").unwrap();
/// println!("Tables: {}", extraction.table_count());
/// ```
pub fn process_file<P: AsRef<Path>>(path: P) -> Result<Extraction> {
    Unscan::new().process_file(path)
}

/// Read bytes with the default readers and run the pipeline on them.
///
/// `ext` is an optional extension hint; without it the format is sniffed.
pub fn process_bytes(data: &[u8], ext: Option<&str>) -> Result<Extraction> {
    Unscan::new().process_bytes(data, ext)
}

/// Run the pipeline on token streams already in memory.
///
/// # Example
///
/// ```
/// use unscan::{process_pages, BoundingBox, Token, TokenStream};
///
/// let page = TokenStream::with_tokens(
///     0,
///     vec![Token::new("Hello", BoundingBox::new(0.0, 0.0, 30.0, 10.0), 0)],
/// );
/// let extraction = process_pages(vec![page]).unwrap();
/// assert_eq!(extraction.text, "Hello");
/// ```
pub fn process_pages(pages: Vec<TokenStream>) -> Result<Extraction> {
    Unscan::new().process_pages(pages)
}

/// Extract the narrative text from a file.
///
/// # Example
///
/// ```no_run
/// use unscan::extract_text;
///
/// let text = extract_text("scan.json").unwrap();
/// println!("{}", text);
/// ```
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let extraction = process_file(path)?;
    render::to_text(&extraction, &TextOptions::default())
}

/// Builder for reading and analyzing documents.
///
/// # Example
///
/// ```no_run
/// use unscan::{PageSelection, Unscan};
///
/// let extraction = Unscan::new()
///     .with_pages(PageSelection::Range(1..=5))
///     .with_concurrency(4)
///     .process_file("scan.json")?;
/// extraction.ensure_complete()?;
/// # Ok::<(), unscan::Error>(())
/// ```
pub struct Unscan {
    options: PipelineOptions,
    registry: ReaderRegistry,
    observer: Option<Arc<dyn ProgressObserver>>,
    cancel: CancellationToken,
}

impl Unscan {
    /// Create a new builder with the default readers.
    pub fn new() -> Self {
        Self {
            options: PipelineOptions::default(),
            registry: ReaderRegistry::with_defaults(),
            observer: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Set all pipeline options at once.
    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.options = self.options.with_pages(pages);
        self
    }

    /// Bound the number of pages processed at once.
    pub fn with_concurrency(mut self, threads: usize) -> Self {
        self.options = self.options.with_concurrency(threads);
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    /// Set layout thresholds.
    pub fn with_layout(mut self, layout: LayoutOptions) -> Self {
        self.options = self.options.with_layout(layout);
        self
    }

    /// Replace the reader registry.
    pub fn with_registry(mut self, registry: ReaderRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Register an additional reader (e.g. an OCR engine for images).
    pub fn with_reader(mut self, reader: Arc<dyn FormatReader>) -> Self {
        self.registry.register(reader);
        self
    }

    /// Attach a progress observer.
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Use a caller-owned cancellation token.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Get the pipeline options.
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Get the reader registry.
    pub fn registry(&self) -> &ReaderRegistry {
        &self.registry
    }

    /// Read a file and analyze it.
    pub fn process_file<P: AsRef<Path>>(&self, path: P) -> Result<Extraction> {
        let pages = self.registry.read_path(path.as_ref())?;
        self.process_pages(pages)
    }

    /// Read bytes and analyze them.
    pub fn process_bytes(&self, data: &[u8], ext: Option<&str>) -> Result<Extraction> {
        let pages = self.registry.read_bytes(data, ext)?;
        self.process_pages(pages)
    }

    /// Analyze token streams already in memory.
    pub fn process_pages(&self, pages: Vec<TokenStream>) -> Result<Extraction> {
        let mut orchestrator = PipelineOrchestrator::with_options(self.options.clone());
        if let Some(observer) = &self.observer {
            orchestrator = orchestrator.with_observer(Arc::clone(observer));
        }
        orchestrator.process_with_cancel(pages, &self.cancel)
    }
}

impl Default for Unscan {
    fn default() -> Self {
        Self::new()
    }
}
