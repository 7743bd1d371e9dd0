//! End-to-end tests for the layout pipeline.

use std::sync::{Arc, Mutex};

use unscan::{
    BoundingBox, CancellationToken, DiagnosticKind, Extraction, PageStatus, PipelineOptions,
    PipelineOrchestrator, ProgressObserver, Region, RegionKind, RegionSegmenter, TableGridBuilder,
    Token, TokenStream,
};

const HEIGHT: f32 = 10.0;

fn token(text: &str, left: f32, top: f32, page: usize) -> Token {
    let width = text.chars().count() as f32 * 6.0;
    Token::new(text, BoundingBox::new(left, top, left + width, top + HEIGHT), page)
}

/// Lay out a sentence with normal word spacing.
fn sentence(text: &str, left: f32, top: f32, page: usize) -> Vec<Token> {
    let mut x = left;
    text.split_whitespace()
        .map(|w| {
            let t = token(w, x, top, page);
            x = t.right() + 4.0;
            t
        })
        .collect()
}

/// Tokens for a grid of cells at fixed column positions.
fn grid(rows: &[&[&str]], columns: &[f32], top: f32, page: usize) -> Vec<Token> {
    let mut tokens = Vec::new();
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            tokens.push(token(cell, columns[c], top + r as f32 * 15.0, page));
        }
    }
    tokens
}

fn name_age_city(page: usize) -> TokenStream {
    TokenStream::with_tokens(
        page,
        grid(
            &[&["Name", "Age", "City"], &["Ana", "30", "Rome"]],
            &[10.0, 100.0, 200.0],
            10.0,
            page,
        ),
    )
}

fn prose(page: usize) -> TokenStream {
    let mut tokens = sentence("The survey covered three regions.", 10.0, 10.0, page);
    tokens.extend(sentence("Responses were collected by mail.", 10.0, 25.0, page));
    tokens.extend(sentence("Results follow below.", 10.0, 40.0, page));
    TokenStream::with_tokens(page, tokens)
}

fn process(pages: Vec<TokenStream>) -> Extraction {
    PipelineOrchestrator::new().process(pages).unwrap()
}

#[test]
fn test_empty_stream_contributes_nothing() {
    assert!(RegionSegmenter::new().segment(&TokenStream::new(0)).is_empty());

    let extraction = process(vec![TokenStream::new(0), name_age_city(1)]);
    assert_eq!(extraction.table_count(), 1);
    assert_eq!(extraction.tables[0].page, 1);
    assert!(extraction.text.is_empty());
    assert!(extraction.diagnostics.is_empty());
    assert_eq!(extraction.stats.pages_processed, 2);
}

#[test]
fn test_name_age_city_table() {
    let extraction = process(vec![name_age_city(0)]);

    assert_eq!(extraction.table_count(), 1);
    let table = &extraction.tables[0];
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.column_count(), 3);
    assert_eq!(
        table.rows,
        vec![vec!["Name", "Age", "City"], vec!["Ana", "30", "Rome"]]
    );
    assert_eq!(table.title(), "Table 1 from Page 1");
    assert!(!table.low_confidence);
    assert!(extraction.text.is_empty());
}

#[test]
fn test_prose_becomes_one_paragraph() {
    let extraction = process(vec![prose(0)]);

    assert_eq!(extraction.table_count(), 0);
    assert_eq!(extraction.stats.paragraph_count, 1);
    assert_eq!(
        extraction.text,
        "The survey covered three regions. Responses were collected by mail. Results follow below."
    );
}

#[test]
fn test_malformed_page_is_skipped() {
    let mut broken = name_age_city(1);
    broken.tokens[2].bbox = BoundingBox::new(220.0, 10.0, 200.0, 20.0);

    let extraction = process(vec![name_age_city(0), broken, prose(2)]);

    assert_eq!(extraction.table_count(), 1);
    assert_eq!(extraction.tables[0].page, 0);
    assert!(extraction.text.starts_with("The survey"));

    let malformed: Vec<_> = extraction
        .diagnostics_of(DiagnosticKind::MalformedInput)
        .collect();
    assert_eq!(malformed.len(), 1);
    assert_eq!(malformed[0].page, Some(1));
    assert!(malformed[0].message.contains("token 2"));
    assert_eq!(extraction.stats.pages_failed, 1);
    assert_eq!(extraction.stats.pages_processed, 2);
    assert!(!extraction.cancelled);
}

/// Cancels the run as soon as the given page starts.
struct CancelOnStart {
    page: usize,
    cancel: CancellationToken,
    finished: Mutex<Vec<(usize, PageStatus)>>,
}

impl ProgressObserver for CancelOnStart {
    fn page_started(&self, page: usize) {
        if page == self.page {
            self.cancel.cancel();
        }
    }

    fn page_finished(&self, page: usize, status: PageStatus) {
        if let Ok(mut finished) = self.finished.lock() {
            finished.push((page, status));
        }
    }
}

#[test]
fn test_cancel_while_second_page_in_flight() {
    let cancel = CancellationToken::new();
    let observer = Arc::new(CancelOnStart {
        page: 1,
        cancel: cancel.clone(),
        finished: Mutex::new(Vec::new()),
    });

    let orchestrator = PipelineOrchestrator::with_options(PipelineOptions::new().sequential())
        .with_observer(observer.clone());
    let extraction = orchestrator
        .process_with_cancel(vec![name_age_city(0), name_age_city(1), prose(2)], &cancel)
        .unwrap();

    assert!(extraction.cancelled);
    assert_eq!(extraction.table_count(), 1);
    assert_eq!(extraction.tables[0].page, 0);
    assert!(extraction.text.is_empty());

    let cancelled: Vec<_> = extraction
        .diagnostics_of(DiagnosticKind::Cancelled)
        .map(|d| d.page)
        .collect();
    assert_eq!(cancelled, vec![Some(1), Some(2)]);
    assert_eq!(extraction.stats.pages_processed, 1);
    assert_eq!(extraction.stats.pages_cancelled, 2);

    let finished = observer.finished.lock().unwrap().clone();
    assert_eq!(
        finished,
        vec![(0, PageStatus::Completed), (1, PageStatus::Cancelled)]
    );
}

#[test]
fn test_repeated_runs_are_identical() {
    let pages = || -> Vec<TokenStream> {
        (0..12)
            .map(|page| if page % 3 == 1 { prose(page) } else { name_age_city(page) })
            .collect()
    };
    let orchestrator =
        PipelineOrchestrator::with_options(PipelineOptions::new().with_concurrency(4));

    let first = orchestrator.process(pages()).unwrap();
    assert_eq!(first.table_count(), 8);
    for _ in 0..5 {
        let again = orchestrator.process(pages()).unwrap();
        assert_eq!(again.text, first.text);
        assert_eq!(again.tables, first.tables);
        assert_eq!(again.stats, first.stats);
    }

    let numbered: Vec<(usize, usize)> = first.tables.iter().map(|t| (t.number, t.page)).collect();
    assert_eq!(
        numbered,
        vec![(1, 0), (2, 2), (3, 3), (4, 5), (5, 6), (6, 8), (7, 9), (8, 11)]
    );
}

#[test]
fn test_exact_grid_is_recovered() {
    let cells: Vec<Vec<String>> = (0..4)
        .map(|r| (0..5).map(|c| format!("r{}c{}", r, c)).collect())
        .collect();
    let rows: Vec<Vec<&str>> = cells
        .iter()
        .map(|r| r.iter().map(String::as_str).collect())
        .collect();
    let row_refs: Vec<&[&str]> = rows.iter().map(Vec::as_slice).collect();
    let tokens = grid(&row_refs, &[10.0, 80.0, 150.0, 220.0, 290.0], 10.0, 0);

    let extraction = process(vec![TokenStream::with_tokens(0, tokens)]);
    assert_eq!(extraction.table_count(), 1);
    assert_eq!(extraction.tables[0].rows, cells);
}

#[test]
fn test_column_count_survives_jitter() {
    let columns = [10.0, 100.0, 200.0];
    let rows: &[&[&str]] = &[
        &["Item", "Qty", "Price"],
        &["Pen", "4", "1.20"],
        &["Ink", "12", "3.75"],
        &["Pad", "1", "0.90"],
    ];
    let clean = grid(rows, &columns, 10.0, 0);
    let builder = TableGridBuilder::new();
    let tolerance = builder.column_tolerance(&clean);
    assert!(tolerance > 0.0);

    let offsets = [0.9, -0.9, 0.5, -0.3];
    let jittered: Vec<Token> = clean
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let dx = offsets[i % offsets.len()] * tolerance;
            let mut t = t.clone();
            t.bbox.left += dx;
            t.bbox.right += dx;
            t
        })
        .collect();

    let expected = builder.build(&Region::table_candidate(clean));
    let actual = builder.build(&Region::table_candidate(jittered));
    assert_eq!(expected.column_count(), 3);
    assert_eq!(actual.column_count(), expected.column_count());
    assert_eq!(actual.rows, expected.rows);
}

#[test]
fn test_single_line_is_never_a_table() {
    let tokens = vec![
        token("Name", 10.0, 10.0, 0),
        token("Age", 100.0, 10.0, 0),
        token("City", 200.0, 10.0, 0),
    ];
    let regions = RegionSegmenter::new().segment(&TokenStream::with_tokens(0, tokens));
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].kind, RegionKind::Prose);
}

#[test]
fn test_table_between_paragraphs() {
    let mut tokens = sentence("Quarterly figures are listed below.", 10.0, 10.0, 0);
    tokens.extend(grid(
        &[&["Q1", "120"], &["Q2", "135"], &["Q3", "150"]],
        &[10.0, 120.0],
        50.0,
        0,
    ));
    tokens.extend(sentence("All values are in thousands.", 10.0, 130.0, 0));

    let extraction = process(vec![TokenStream::with_tokens(0, tokens)]);
    assert_eq!(extraction.table_count(), 1);
    assert_eq!(extraction.tables[0].rows[2], vec!["Q3", "150"]);
    assert_eq!(
        extraction.text,
        "Quarterly figures are listed below.\n\nAll values are in thousands."
    );
}
