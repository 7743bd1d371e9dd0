//! Page scheduling and result aggregation.

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crossbeam_channel::{bounded, SendError};
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::layout::{RegionSegmenter, TableGridBuilder, TextAssembler};
use crate::model::{
    Diagnostic, Extraction, ExtractionStats, Paragraph, Region, RegionKind, Table, TokenStream,
};

use super::{CancellationToken, PageStatus, PipelineOptions, ProgressObserver};

/// Drives pages through layout analysis and assembles the document result.
pub struct PipelineOrchestrator {
    options: PipelineOptions,
    segmenter: RegionSegmenter,
    builder: TableGridBuilder,
    assembler: TextAssembler,
    observer: Option<Arc<dyn ProgressObserver>>,
    #[cfg(test)]
    region_hook: Option<fn(&Region)>,
}

/// What one page contributed.
#[derive(Debug, Default)]
struct PageResult {
    paragraphs: Vec<Paragraph>,
    tables: Vec<Table>,
    diagnostics: Vec<Diagnostic>,
    token_count: usize,
    region_count: usize,
}

#[derive(Debug)]
enum PageOutcome {
    Completed(PageResult),
    Skipped(PageStatus, Diagnostic),
    Cancelled(usize),
}

impl PageOutcome {
    fn status(&self) -> PageStatus {
        match self {
            PageOutcome::Completed(_) => PageStatus::Completed,
            PageOutcome::Skipped(status, _) => *status,
            PageOutcome::Cancelled(_) => PageStatus::Cancelled,
        }
    }
}

/// A region after routing by kind.
enum Assembled {
    Paragraph(Paragraph),
    Table(Table),
}

impl PipelineOrchestrator {
    /// Create an orchestrator with default options.
    pub fn new() -> Self {
        Self::with_options(PipelineOptions::default())
    }

    /// Create an orchestrator with custom options.
    pub fn with_options(options: PipelineOptions) -> Self {
        Self {
            segmenter: RegionSegmenter::with_options(options.layout.clone()),
            builder: TableGridBuilder::with_options(options.layout.clone()),
            assembler: TextAssembler::with_options(options.layout.clone()),
            options,
            observer: None,
            #[cfg(test)]
            region_hook: None,
        }
    }

    /// Attach a progress observer.
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Get the options.
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Process a document's pages.
    pub fn process(&self, pages: Vec<TokenStream>) -> Result<Extraction> {
        self.process_with_cancel(pages, &CancellationToken::new())
    }

    /// Process a document's pages, stopping early when `cancel` fires.
    ///
    /// Pages that finished before cancellation keep their results; pages
    /// that did not publish nothing and get a cancellation diagnostic.
    /// Returns an error only when the worker pool cannot be started.
    pub fn process_with_cancel(
        &self,
        pages: Vec<TokenStream>,
        cancel: &CancellationToken,
    ) -> Result<Extraction> {
        let total = pages.len();
        let selected: Vec<(usize, TokenStream)> = pages
            .into_iter()
            .enumerate()
            .filter(|(_, stream)| self.options.pages.includes_index(stream.page))
            .collect();
        log::debug!(
            "PipelineOrchestrator: {} of {} pages selected",
            selected.len(),
            total
        );

        let (tx, rx) = bounded::<(usize, PageOutcome)>(selected.len().max(1));

        if self.options.sequential {
            for (index, stream) in &selected {
                tx.send((*index, self.run_page(stream, cancel)))
                    .map_err(channel_closed)?;
            }
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.options.concurrency)
                .thread_name(|i| format!("unscan-page-{}", i))
                .build()
                .map_err(|e| Error::Pipeline(format!("failed to start worker pool: {}", e)))?;

            pool.install(|| {
                selected
                    .par_iter()
                    .try_for_each_with(tx.clone(), |tx, (index, stream)| {
                        tx.send((*index, self.run_page(stream, cancel)))
                            .map_err(channel_closed)
                    })
            })?;
        }
        drop(tx);

        // Completion order is arbitrary; the map restores page order.
        let outcomes: BTreeMap<usize, PageOutcome> = rx.iter().collect();

        let mut extraction = self.aggregate(outcomes);
        extraction.stats.pages_total = total as u32;
        extraction.stats.pages_skipped = (total - selected.len()) as u32;
        Ok(extraction)
    }

    /// Process one page and report it to the observer.
    fn run_page(&self, stream: &TokenStream, cancel: &CancellationToken) -> PageOutcome {
        if cancel.is_cancelled() {
            return PageOutcome::Cancelled(stream.page);
        }
        if let Some(observer) = &self.observer {
            observer.page_started(stream.page);
        }

        let outcome = self.process_page(stream, cancel);

        if let Some(observer) = &self.observer {
            observer.page_finished(stream.page, outcome.status());
        }
        outcome
    }

    fn process_page(&self, stream: &TokenStream, cancel: &CancellationToken) -> PageOutcome {
        let page = stream.page;

        if let Err(e) = stream.validate() {
            let reason = match e {
                Error::MalformedInput { reason, .. } => reason,
                other => other.to_string(),
            };
            log::warn!("Skipping page {}: malformed input: {}", page + 1, reason);
            return PageOutcome::Skipped(
                PageStatus::Malformed,
                Diagnostic::malformed_input(page, reason),
            );
        }

        let regions = match guarded(|| self.segmenter.segment(stream)) {
            Ok(regions) => regions,
            Err(message) => {
                log::warn!("Skipping page {}: segmentation failed: {}", page + 1, message);
                return PageOutcome::Skipped(
                    PageStatus::Failed,
                    Diagnostic::page_failure(page, format!("segmentation failed: {}", message)),
                );
            }
        };

        let mut result = PageResult {
            token_count: stream.len(),
            region_count: regions.len(),
            ..Default::default()
        };

        for (i, region) in regions.iter().enumerate() {
            match guarded(|| self.route(region)) {
                Ok(Assembled::Paragraph(paragraph)) => {
                    if !paragraph.is_empty() {
                        result.paragraphs.push(paragraph);
                    }
                }
                Ok(Assembled::Table(table)) => result.tables.push(table),
                Err(message) => {
                    log::warn!(
                        "Dropping region {} on page {}: {}",
                        i + 1,
                        page + 1,
                        message
                    );
                    result.diagnostics.push(Diagnostic::region_failure(
                        page,
                        format!("region {} dropped: {}", i + 1, message),
                    ));
                }
            }
        }

        if cancel.is_cancelled() {
            return PageOutcome::Cancelled(page);
        }
        PageOutcome::Completed(result)
    }

    /// Dispatch a region by kind.
    fn route(&self, region: &Region) -> Assembled {
        #[cfg(test)]
        if let Some(hook) = self.region_hook {
            hook(region);
        }
        match region.kind {
            RegionKind::Prose => Assembled::Paragraph(self.assembler.assemble(region)),
            RegionKind::TableCandidate => Assembled::Table(self.builder.build(region)),
        }
    }

    /// Merge page outcomes, already in page order, into one result.
    fn aggregate(&self, outcomes: BTreeMap<usize, PageOutcome>) -> Extraction {
        let mut extraction = Extraction::new();
        let mut stats = ExtractionStats::new();
        let mut paragraphs: Vec<String> = Vec::new();

        for outcome in outcomes.into_values() {
            match outcome {
                PageOutcome::Completed(result) => {
                    stats.pages_processed += 1;
                    stats.token_count += result.token_count as u32;
                    stats.region_count += result.region_count as u32;
                    stats.paragraph_count += result.paragraphs.len() as u32;
                    paragraphs.extend(result.paragraphs.into_iter().map(|p| p.text));
                    extraction.diagnostics.extend(result.diagnostics);

                    for table in result.tables {
                        let table = table.with_number(extraction.tables.len() + 1);
                        if table.low_confidence {
                            stats.low_confidence_table_count += 1;
                            extraction.diagnostics.push(Diagnostic::low_confidence_table(
                                table.page,
                                format!(
                                    "{} has low confidence ({:.2}, {}x{})",
                                    table.title(),
                                    table.confidence,
                                    table.row_count(),
                                    table.column_count()
                                ),
                            ));
                        }
                        extraction.tables.push(table);
                    }
                }
                PageOutcome::Skipped(_, diagnostic) => {
                    stats.pages_failed += 1;
                    extraction.diagnostics.push(diagnostic);
                }
                PageOutcome::Cancelled(page) => {
                    stats.pages_cancelled += 1;
                    extraction.cancelled = true;
                    extraction.diagnostics.push(Diagnostic::cancelled(page));
                }
            }
        }

        extraction.text = paragraphs.join("\n\n");
        stats.table_count = extraction.tables.len() as u32;
        stats.count_text(&extraction.text);
        extraction.stats = stats;

        log::debug!(
            "PipelineOrchestrator: {} pages processed, {} tables, {} diagnostics",
            extraction.stats.pages_processed,
            extraction.stats.table_count,
            extraction.diagnostics.len()
        );
        extraction
    }
}

impl Default for PipelineOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

/// Run a layout step, turning a panic into an error message.
fn guarded<T>(f: impl FnOnce() -> T) -> std::result::Result<T, String> {
    catch_unwind(AssertUnwindSafe(f)).map_err(|payload| panic_message(payload.as_ref()))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn channel_closed<T>(_: SendError<T>) -> Error {
    Error::Pipeline("page result channel closed".to_string())
}
