//! Positioned text tokens and per-page token streams.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// An axis-aligned box in page coordinates (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge X coordinate
    pub left: f32,
    /// Top edge Y coordinate
    pub top: f32,
    /// Right edge X coordinate
    pub right: f32,
    /// Bottom edge Y coordinate
    pub bottom: f32,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Width of the box.
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Height of the box.
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Horizontal center.
    pub fn center_x(&self) -> f32 {
        (self.left + self.right) / 2.0
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }

    /// Union of all boxes, or `None` for an empty iterator.
    pub fn union_all<'a>(boxes: impl IntoIterator<Item = &'a BoundingBox>) -> Option<BoundingBox> {
        boxes
            .into_iter()
            .fold(None, |acc: Option<BoundingBox>, b| match acc {
                Some(a) => Some(a.union(b)),
                None => Some(*b),
            })
    }

    /// Check the box against the data model: finite, non-negative, positive extent.
    pub fn check(&self) -> std::result::Result<(), String> {
        let coords = [self.left, self.top, self.right, self.bottom];
        if coords.iter().any(|c| !c.is_finite()) {
            return Err("non-finite coordinate".to_string());
        }
        if coords.iter().any(|c| *c < 0.0) {
            return Err("negative coordinate".to_string());
        }
        if self.right <= self.left {
            return Err(format!(
                "right ({}) <= left ({})",
                self.right, self.left
            ));
        }
        if self.bottom <= self.top {
            return Err(format!(
                "bottom ({}) <= top ({})",
                self.bottom, self.top
            ));
        }
        Ok(())
    }

    /// Whether the box satisfies the data model invariants.
    pub fn is_valid(&self) -> bool {
        self.check().is_ok()
    }
}

/// One recognized text fragment with its position on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Recognized text
    pub text: String,
    /// Bounding box in page coordinates
    pub bbox: BoundingBox,
    /// Baseline Y coordinate
    pub baseline: f32,
    /// 0-based page index
    pub page: usize,
    /// Recognition confidence in [0, 1]
    pub confidence: f32,
}

impl Token {
    /// Create a token with baseline at the box bottom and full confidence.
    pub fn new(text: impl Into<String>, bbox: BoundingBox, page: usize) -> Self {
        Self {
            text: text.into(),
            baseline: bbox.bottom,
            bbox,
            page,
            confidence: 1.0,
        }
    }

    /// Set the baseline and return self.
    pub fn with_baseline(mut self, baseline: f32) -> Self {
        self.baseline = baseline;
        self
    }

    /// Set the confidence and return self.
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    /// Left edge X coordinate.
    pub fn left(&self) -> f32 {
        self.bbox.left
    }

    /// Right edge X coordinate.
    pub fn right(&self) -> f32 {
        self.bbox.right
    }

    /// Token width.
    pub fn width(&self) -> f32 {
        self.bbox.width()
    }

    /// Token height.
    pub fn height(&self) -> f32 {
        self.bbox.height()
    }

    fn check(&self, page: usize) -> std::result::Result<(), String> {
        if self.text.trim().is_empty() {
            return Err("empty text".to_string());
        }
        self.bbox.check()?;
        if !self.baseline.is_finite() {
            return Err("non-finite baseline".to_string());
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(format!("confidence {} outside [0, 1]", self.confidence));
        }
        if self.page != page {
            return Err(format!(
                "token page {} does not match stream page {}",
                self.page, page
            ));
        }
        Ok(())
    }
}

/// All tokens recognized on one page, in no particular order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenStream {
    /// 0-based page index
    pub page: usize,
    /// Page width, when the reader knows it
    pub width: Option<f32>,
    /// Page height, when the reader knows it
    pub height: Option<f32>,
    /// Tokens on this page
    pub tokens: Vec<Token>,
}

impl TokenStream {
    /// Create an empty stream for a page.
    pub fn new(page: usize) -> Self {
        Self {
            page,
            ..Default::default()
        }
    }

    /// Create a stream from tokens.
    pub fn with_tokens(page: usize, tokens: Vec<Token>) -> Self {
        Self {
            page,
            tokens,
            ..Default::default()
        }
    }

    /// Set page dimensions and return self.
    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Add a token.
    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Check if the page has no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Verify every token against the data model.
    ///
    /// Fails on the first offending token with [`Error::MalformedInput`].
    pub fn validate(&self) -> Result<()> {
        for (i, token) in self.tokens.iter().enumerate() {
            token
                .check(self.page)
                .map_err(|reason| Error::malformed(self.page, format!("token {}: {}", i, reason)))?;
        }
        Ok(())
    }
}
