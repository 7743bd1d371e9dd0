//! Paragraph types.

use serde::{Deserialize, Serialize};

use super::BoundingBox;

/// One prose unit: the tokens of a region reflowed into a single line of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Reflowed text, tokens joined by single spaces
    pub text: String,

    /// 0-based source page index
    pub page: usize,

    /// Union of the member token boxes
    pub bbox: BoundingBox,

    /// Number of tokens that went into the text
    pub token_count: usize,
}

impl Paragraph {
    /// Create a new paragraph; the token count defaults to the word count.
    pub fn new(text: impl Into<String>, page: usize, bbox: BoundingBox) -> Self {
        let text = text.into();
        let token_count = text.split_whitespace().count();
        Self {
            text,
            page,
            bbox,
            token_count,
        }
    }

    /// Set the source token count and return self.
    pub fn with_token_count(mut self, count: usize) -> Self {
        self.token_count = count;
        self
    }

    /// Check if the paragraph has no visible text.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Word count (whitespace-separated).
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}
