//! Writing extraction artifacts into an output directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::model::{sanitize_file_stem, Extraction};

use super::{table_to_csv, to_combined_text, to_json, to_text, JsonFormat, TextOptions};

/// Files produced by [`OutputWriter::write`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrittenFiles {
    /// Document text file
    pub text: Option<PathBuf>,
    /// One CSV file per table, in table order
    pub tables: Vec<PathBuf>,
    /// Combined text and tables file
    pub combined: Option<PathBuf>,
    /// JSON report
    pub report: Option<PathBuf>,
}

impl WrittenFiles {
    /// All written paths.
    pub fn all(&self) -> Vec<&Path> {
        self.text
            .iter()
            .chain(self.tables.iter())
            .chain(self.combined.iter())
            .chain(self.report.iter())
            .map(PathBuf::as_path)
            .collect()
    }
}

/// Writes the text file, table CSVs and optional extras for a document.
///
/// Layout inside the output directory:
/// - `<stem>.txt`: document text
/// - `<table stem>.csv`: one per table, e.g. `table_1_from_page_2.csv`
/// - `<stem>_combined.txt`: text followed by every table (optional)
/// - `<stem>.json`: full report (optional)
#[derive(Debug, Clone)]
pub struct OutputWriter {
    dir: PathBuf,
    stem: String,
    text_options: TextOptions,
    write_text: bool,
    write_tables: bool,
    write_combined: bool,
    report_format: Option<JsonFormat>,
}

impl OutputWriter {
    /// Create a writer for a directory; the document stem defaults to "extracted_text".
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            stem: "extracted_text".to_string(),
            text_options: TextOptions::default(),
            write_text: true,
            write_tables: true,
            write_combined: false,
            report_format: None,
        }
    }

    /// Set the document stem (sanitized for use as a file name).
    pub fn with_stem(mut self, stem: &str) -> Self {
        let sanitized = sanitize_file_stem(stem);
        if !sanitized.is_empty() {
            self.stem = sanitized;
        }
        self
    }

    /// Set text rendering options.
    pub fn with_text_options(mut self, options: TextOptions) -> Self {
        self.text_options = options;
        self
    }

    /// Enable or disable the text file.
    pub fn with_text(mut self, enabled: bool) -> Self {
        self.write_text = enabled;
        self
    }

    /// Enable or disable table CSV files.
    pub fn with_tables(mut self, enabled: bool) -> Self {
        self.write_tables = enabled;
        self
    }

    /// Enable or disable the combined file.
    pub fn with_combined(mut self, enabled: bool) -> Self {
        self.write_combined = enabled;
        self
    }

    /// Write a JSON report in the given format.
    pub fn with_report(mut self, format: JsonFormat) -> Self {
        self.report_format = Some(format);
        self
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write all enabled artifacts, creating the directory if needed.
    pub fn write(&self, extraction: &Extraction) -> Result<WrittenFiles> {
        fs::create_dir_all(&self.dir)?;
        let mut written = WrittenFiles::default();

        if self.write_text {
            let path = self.dir.join(format!("{}.txt", self.stem));
            let mut text = to_text(extraction, &self.text_options)?;
            if !text.is_empty() {
                text.push('\n');
            }
            fs::write(&path, text)?;
            written.text = Some(path);
        }

        if self.write_tables {
            for table in &extraction.tables {
                let path = self.dir.join(format!("{}.csv", table.file_stem()));
                fs::write(&path, table_to_csv(table)?)?;
                written.tables.push(path);
            }
        }

        if self.write_combined {
            let path = self.dir.join(format!("{}_combined.txt", self.stem));
            fs::write(&path, to_combined_text(extraction, &self.text_options)?)?;
            written.combined = Some(path);
        }

        if let Some(format) = self.report_format {
            let path = self.dir.join(format!("{}.json", self.stem));
            fs::write(&path, to_json(extraction, format)?)?;
            written.report = Some(path);
        }

        log::debug!(
            "OutputWriter: wrote {} files to {}",
            written.all().len(),
            self.dir.display()
        );
        Ok(written)
    }
}
