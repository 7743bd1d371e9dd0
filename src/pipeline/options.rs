//! Pipeline options and page selection.

use std::ops::RangeInclusive;

use crate::error::{Error, Result};
use crate::layout::LayoutOptions;

/// Options for document processing.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Worker threads for page processing (0 = rayon default)
    pub concurrency: usize,

    /// Process pages one after another on the calling thread
    pub sequential: bool,

    /// Pages to process
    pub pages: PageSelection,

    /// Layout analysis thresholds
    pub layout: LayoutOptions,
}

impl PipelineOptions {
    /// Create new pipeline options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the number of pages processed at once.
    pub fn with_concurrency(mut self, threads: usize) -> Self {
        self.concurrency = threads;
        self
    }

    /// Process pages sequentially on the calling thread.
    pub fn sequential(mut self) -> Self {
        self.sequential = true;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }

    /// Set layout options.
    pub fn with_layout(mut self, layout: LayoutOptions) -> Self {
        self.layout = layout;
        self
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            concurrency: 0,
            sequential: false,
            pages: PageSelection::All,
            layout: LayoutOptions::default(),
        }
    }
}

/// Page selection (1-indexed page numbers).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    /// All pages
    #[default]
    All,
    /// A range of pages (inclusive)
    Range(RangeInclusive<u32>),
    /// Specific pages
    Pages(Vec<u32>),
}

impl PageSelection {
    /// Check if a 1-indexed page number is selected.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.contains(&page),
        }
    }

    /// Check if a 0-based page index is selected.
    pub fn includes_index(&self, index: usize) -> bool {
        u32::try_from(index + 1).is_ok_and(|page| self.includes(page))
    }

    /// Parse a page selection string (e.g., "1-10", "1,3,5,7-10").
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(PageSelection::All);
        }

        if let Some((start, end)) = s.split_once('-') {
            if !start.contains(',') && !end.contains(',') {
                let (start, end) = parse_bounds(start, end, s)?;
                return Ok(PageSelection::Range(start..=end));
            }
        }

        let mut pages = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            if let Some((start, end)) = part.split_once('-') {
                let (start, end) = parse_bounds(start, end, s)?;
                pages.extend(start..=end);
            } else {
                pages.push(parse_page(part, s)?);
            }
        }

        pages.sort_unstable();
        pages.dedup();
        Ok(PageSelection::Pages(pages))
    }
}

impl std::str::FromStr for PageSelection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn parse_page(part: &str, input: &str) -> Result<u32> {
    match part.trim().parse::<u32>() {
        Ok(0) => Err(Error::InvalidPageRange(format!(
            "{}: pages are numbered from 1",
            input
        ))),
        Ok(page) => Ok(page),
        Err(_) => Err(Error::InvalidPageRange(format!(
            "{}: invalid page number '{}'",
            input,
            part.trim()
        ))),
    }
}

fn parse_bounds(start: &str, end: &str, input: &str) -> Result<(u32, u32)> {
    let start = parse_page(start, input)?;
    let end = parse_page(end, input)?;
    if start > end {
        return Err(Error::InvalidPageRange(format!(
            "{}: range start {} is after end {}",
            input, start, end
        )));
    }
    Ok((start, end))
}
