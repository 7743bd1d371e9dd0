//! Input format detection.
//!
//! Documents arrive as PDFs, images, word-processor files or OCR token
//! dumps. Only token dumps are read by this crate; the other formats are
//! recognized so that a caller-supplied reader can be chosen for them, or
//! so they can be rejected with a clear error.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// A recognized input format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputFormat {
    /// PDF document with its header version (e.g. "1.7")
    Pdf {
        /// Version from the `%PDF-x.y` header
        version: String,
    },
    /// PNG image
    Png,
    /// JPEG image
    Jpeg,
    /// Word-processor document (ZIP container)
    Docx,
    /// OCR token dump in JSON
    TokenJson,
}

impl InputFormat {
    /// Conventional file extension, lowercase without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            InputFormat::Pdf { .. } => "pdf",
            InputFormat::Png => "png",
            InputFormat::Jpeg => "jpg",
            InputFormat::Docx => "docx",
            InputFormat::TokenJson => "json",
        }
    }

    /// Whether the format needs OCR before layout analysis.
    pub fn is_image(&self) -> bool {
        matches!(self, InputFormat::Png | InputFormat::Jpeg)
    }
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputFormat::Pdf { version } => write!(f, "PDF {}", version),
            InputFormat::Png => write!(f, "PNG image"),
            InputFormat::Jpeg => write!(f, "JPEG image"),
            InputFormat::Docx => write!(f, "DOCX document"),
            InputFormat::TokenJson => write!(f, "OCR token dump (JSON)"),
        }
    }
}

const PDF_MAGIC: &[u8] = b"%PDF-";
const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";
const JPEG_MAGIC: &[u8] = b"\xff\xd8\xff";
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const HEADER_LEN: usize = 64;

/// Detect the format of a file from its first bytes.
///
/// # Example
/// ```no_run
/// use unscan::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("scan.json").unwrap();
/// println!("{}", format);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<InputFormat> {
    let mut header = Vec::with_capacity(HEADER_LEN);
    File::open(path)?
        .take(HEADER_LEN as u64)
        .read_to_end(&mut header)?;
    detect_format_from_bytes(&header)
}

/// Detect the format of in-memory data from its first bytes.
///
/// Returns [`Error::UnknownFormat`] when nothing matches.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<InputFormat> {
    if data.starts_with(PDF_MAGIC) {
        let version = data
            .get(PDF_MAGIC.len()..PDF_MAGIC.len() + 3)
            .map(|v| String::from_utf8_lossy(v).to_string())
            .filter(|v| is_valid_version(v))
            .ok_or(Error::UnknownFormat)?;
        return Ok(InputFormat::Pdf { version });
    }
    if data.starts_with(PNG_MAGIC) {
        return Ok(InputFormat::Png);
    }
    if data.starts_with(JPEG_MAGIC) {
        return Ok(InputFormat::Jpeg);
    }
    if data.starts_with(ZIP_MAGIC) {
        return Ok(InputFormat::Docx);
    }
    if looks_like_json(data) {
        return Ok(InputFormat::TokenJson);
    }
    Err(Error::UnknownFormat)
}

/// Check if a version string looks like "1.7".
fn is_valid_version(version: &str) -> bool {
    let bytes = version.as_bytes();
    bytes.len() == 3 && bytes[0].is_ascii_digit() && bytes[1] == b'.' && bytes[2].is_ascii_digit()
}

/// Check if data starts (after an optional BOM and whitespace) with a JSON object.
fn looks_like_json(data: &[u8]) -> bool {
    let data = data.strip_prefix(b"\xef\xbb\xbf").unwrap_or(data);
    data.iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|b| *b == b'{')
}

/// Check if bytes are an OCR token dump.
pub fn is_token_dump_bytes(data: &[u8]) -> bool {
    matches!(detect_format_from_bytes(data), Ok(InputFormat::TokenJson))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_pdf() {
        let format = detect_format_from_bytes(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3").unwrap();
        assert_eq!(
            format,
            InputFormat::Pdf {
                version: "1.7".into()
            }
        );
        assert_eq!(format.to_string(), "PDF 1.7");
        assert!(matches!(
            detect_format_from_bytes(b"%PDF-x"),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_detect_images_and_docx() {
        assert_eq!(
            detect_format_from_bytes(b"\x89PNG\r\n\x1a\n\0\0").unwrap(),
            InputFormat::Png
        );
        assert_eq!(
            detect_format_from_bytes(b"\xff\xd8\xff\xe0").unwrap(),
            InputFormat::Jpeg
        );
        assert_eq!(
            detect_format_from_bytes(b"PK\x03\x04rest").unwrap(),
            InputFormat::Docx
        );
        assert!(InputFormat::Png.is_image());
        assert!(!InputFormat::Docx.is_image());
    }

    #[test]
    fn test_detect_token_json() {
        assert!(is_token_dump_bytes(b"  \n{\"pages\": []}"));
        assert!(is_token_dump_bytes(b"\xef\xbb\xbf{\"pages\": []}"));
        assert!(!is_token_dump_bytes(b"[1, 2]"));
    }

    #[test]
    fn test_detect_unknown() {
        assert!(matches!(
            detect_format_from_bytes(b"<!DOCTYPE html>"),
            Err(Error::UnknownFormat)
        ));
        assert!(matches!(
            detect_format_from_bytes(b""),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_detect_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"{\"pages\":[]}").unwrap();
        assert_eq!(
            detect_format_from_path(file.path()).unwrap(),
            InputFormat::TokenJson
        );
    }
}
