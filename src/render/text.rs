//! Plain text rendering.

use crate::error::Result;
use crate::model::{Extraction, Table};

use super::{CleanupOptions, CleanupPipeline, CleanupPreset};

/// Options for plain text output.
#[derive(Debug, Clone, Default)]
pub struct TextOptions {
    /// Text cleanup options
    pub cleanup: Option<CleanupOptions>,
}

impl TextOptions {
    /// Create new text options (no cleanup).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set cleanup options.
    pub fn with_cleanup(mut self, cleanup: CleanupOptions) -> Self {
        self.cleanup = Some(cleanup);
        self
    }

    /// Set cleanup preset.
    pub fn with_cleanup_preset(mut self, preset: CleanupPreset) -> Self {
        self.cleanup = Some(CleanupOptions::from_preset(preset));
        self
    }
}

/// Render the document text: paragraphs separated by one blank line, no markup.
pub fn to_text(extraction: &Extraction, options: &TextOptions) -> Result<String> {
    let mut output = extraction.text.clone();

    if let Some(ref cleanup_options) = options.cleanup {
        let pipeline = CleanupPipeline::new(cleanup_options.clone());
        output = pipeline.process(&output);
    }

    Ok(output.trim().to_string())
}

const BANNER: &str = "Extracted Text";

/// Render text and every table into one document.
///
/// The text comes first under an "Extracted Text" banner, followed by each
/// table under its title as tab-separated rows.
pub fn to_combined_text(extraction: &Extraction, options: &TextOptions) -> Result<String> {
    let mut output = String::new();
    output.push_str(BANNER);
    output.push('\n');
    output.push_str(&"=".repeat(20));
    output.push('\n');
    output.push_str(&to_text(extraction, options)?);
    output.push_str("\n\n");

    for table in &extraction.tables {
        push_table(&mut output, table);
    }

    Ok(output.trim_end().to_string() + "\n")
}

fn push_table(output: &mut String, table: &Table) {
    let title = table.title();
    output.push_str(&title);
    output.push('\n');
    output.push_str(&"=".repeat(title.chars().count()));
    output.push('\n');
    output.push_str(&table.plain_text());
    output.push_str("\n\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BoundingBox;

    fn extraction() -> Extraction {
        let mut extraction = Extraction::new();
        extraction.text = "First  paragraph.\n\nSecond ﬁne paragraph.".to_string();
        extraction.tables.push(
            Table::new(
                vec![
                    vec!["Name".into(), "Age".into()],
                    vec!["Ana".into(), "30".into()],
                ],
                0,
                BoundingBox::new(0.0, 0.0, 100.0, 30.0),
            )
            .with_number(1),
        );
        extraction
    }

    #[test]
    fn test_to_text() {
        let text = to_text(&extraction(), &TextOptions::new()).unwrap();
        assert_eq!(text, "First  paragraph.\n\nSecond ﬁne paragraph.");
    }

    #[test]
    fn test_to_text_with_cleanup() {
        let options = TextOptions::new().with_cleanup_preset(CleanupPreset::Standard);
        let text = to_text(&extraction(), &options).unwrap();
        assert_eq!(text, "First paragraph.\n\nSecond fine paragraph.");
    }

    #[test]
    fn test_combined_text() {
        let combined = to_combined_text(&extraction(), &TextOptions::new()).unwrap();
        assert!(combined.starts_with("Extracted Text\n====================\nFirst"));
        assert!(combined.contains("Table 1 from Page 1\n"));
        assert!(combined.ends_with("Name\tAge\nAna\t30\n"));
    }

    #[test]
    fn test_combined_text_without_tables() {
        let mut extraction = Extraction::new();
        extraction.text = "Only prose.".into();
        let combined = to_combined_text(&extraction, &TextOptions::new()).unwrap();
        assert_eq!(combined, "Extracted Text\n====================\nOnly prose.\n");
    }
}
