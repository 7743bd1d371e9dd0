//! Document processing pipeline.
//!
//! The orchestrator runs every page through segmentation and then routes
//! each region to the grid builder or the text assembler. Pages run on a
//! bounded worker pool; results are merged in page order once every page
//! has settled.

mod cancel;
mod options;
mod orchestrator;

pub use cancel::CancellationToken;
pub use options::{PageSelection, PipelineOptions};
pub use orchestrator::PipelineOrchestrator;

/// How a page settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    /// Results were produced and will be published
    Completed,
    /// The token stream was malformed; page skipped
    Malformed,
    /// Segmentation faulted; page skipped
    Failed,
    /// Cancellation was observed; nothing published
    Cancelled,
}

/// Receives page lifecycle events.
///
/// Calls arrive from worker threads, in no particular order across pages.
pub trait ProgressObserver: Send + Sync {
    /// A page has started processing.
    fn page_started(&self, _page: usize) {}

    /// A page has settled.
    fn page_finished(&self, _page: usize, _status: PageStatus) {}
}
