//! Reader for OCR token dumps in JSON.
//!
//! The dump holds one entry per page; the page index is the entry's
//! position, so pages without tokens must still be present:
//!
//! ```json
//! {"pages": [
//!   {"width": 612, "height": 792, "tokens": [
//!     {"text": "Name", "bbox": [10, 10, 40, 20], "baseline": 19, "confidence": 0.98}
//!   ]},
//!   {"tokens": []}
//! ]}
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{BoundingBox, Token, TokenStream};

use super::FormatReader;

#[derive(Debug, Serialize, Deserialize)]
struct TokenDump {
    pages: Vec<PageRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PageRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    height: Option<f32>,
    #[serde(default)]
    tokens: Vec<TokenRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenRecord {
    text: String,
    /// left, top, right, bottom
    bbox: [f32; 4],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    baseline: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    confidence: Option<f32>,
}

/// Reads OCR token dumps.
///
/// Boxes are taken as they are; invalid tokens are reported per page by
/// the pipeline rather than failing the whole read.
#[derive(Debug, Default)]
pub struct JsonTokenReader;

impl JsonTokenReader {
    /// Create a new reader.
    pub fn new() -> Self {
        Self
    }

    /// Serialize token streams into the dump format.
    pub fn to_json(&self, pages: &[TokenStream]) -> Result<String> {
        let dump = TokenDump {
            pages: pages
                .iter()
                .map(|stream| PageRecord {
                    width: stream.width,
                    height: stream.height,
                    tokens: stream
                        .tokens
                        .iter()
                        .map(|t| TokenRecord {
                            text: t.text.clone(),
                            bbox: [t.bbox.left, t.bbox.top, t.bbox.right, t.bbox.bottom],
                            baseline: Some(t.baseline),
                            confidence: Some(t.confidence),
                        })
                        .collect(),
                })
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&dump)?)
    }
}

impl FormatReader for JsonTokenReader {
    fn name(&self) -> &str {
        "json"
    }

    fn supported_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn read_bytes(&self, bytes: &[u8]) -> Result<Vec<TokenStream>> {
        let bytes = bytes.strip_prefix(b"\xef\xbb\xbf").unwrap_or(bytes);
        let dump: TokenDump = serde_json::from_slice(bytes)?;
        log::debug!("JsonTokenReader: {} pages", dump.pages.len());

        Ok(dump
            .pages
            .into_iter()
            .enumerate()
            .map(|(page, record)| {
                let tokens = record
                    .tokens
                    .into_iter()
                    .map(|t| {
                        let [left, top, right, bottom] = t.bbox;
                        let token = Token::new(t.text, BoundingBox::new(left, top, right, bottom), page);
                        let token = match t.baseline {
                            Some(baseline) => token.with_baseline(baseline),
                            None => token,
                        };
                        match t.confidence {
                            Some(confidence) => token.with_confidence(confidence),
                            None => token,
                        }
                    })
                    .collect();

                TokenStream {
                    page,
                    width: record.width,
                    height: record.height,
                    tokens,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const DUMP: &str = r#"{
        "pages": [
            {"width": 612, "height": 792, "tokens": [
                {"text": "Name", "bbox": [10, 10, 40, 20], "baseline": 19, "confidence": 0.9},
                {"text": "Age", "bbox": [100, 10, 120, 20]}
            ]},
            {"tokens": []},
            {}
        ]
    }"#;

    #[test]
    fn test_read_dump() {
        let pages = JsonTokenReader::new().read_bytes(DUMP.as_bytes()).unwrap();
        assert_eq!(pages.len(), 3);

        let first = &pages[0];
        assert_eq!(first.page, 0);
        assert_eq!(first.width, Some(612.0));
        assert_eq!(first.tokens[0].baseline, 19.0);
        assert_eq!(first.tokens[0].confidence, 0.9);
        assert_eq!(first.tokens[1].baseline, 20.0);
        assert_eq!(first.tokens[1].confidence, 1.0);

        assert!(pages[1].is_empty());
        assert_eq!(pages[2].page, 2);
        assert!(pages[2].is_empty());
    }

    #[test]
    fn test_invalid_boxes_are_not_rejected() {
        let dump = r#"{"pages": [{"tokens": [{"text": "x", "bbox": [20, 0, 10, 5]}]}]}"#;
        let pages = JsonTokenReader::new().read_bytes(dump.as_bytes()).unwrap();
        assert!(pages[0].validate().is_err());
    }

    #[test]
    fn test_malformed_json() {
        let err = JsonTokenReader::new().read_bytes(b"{\"pages\": 3}").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_write_then_read() {
        let reader = JsonTokenReader::new();
        let pages = reader.read_bytes(DUMP.as_bytes()).unwrap();
        let json = reader.to_json(&pages).unwrap();
        let again = reader.read_bytes(json.as_bytes()).unwrap();
        assert_eq!(pages, again);
    }
}
