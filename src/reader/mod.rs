//! Format readers turning input files into per-page token streams.
//!
//! A reader is the boundary to OCR and document parsing: whatever it does
//! internally, it hands back one [`TokenStream`] per page in page order,
//! including empty streams for pages without text. Readers are registered
//! by extension in a [`ReaderRegistry`].
//!
//! # Example
//!
//! ```no_run
//! use unscan::reader::ReaderRegistry;
//! use std::path::Path;
//!
//! fn main() -> unscan::Result<()> {
//!     let registry = ReaderRegistry::with_defaults();
//!     let pages = registry.read_path(Path::new("scan.json"))?;
//!     println!("{} pages", pages.len());
//!     Ok(())
//! }
//! ```

mod json;

pub use json::JsonTokenReader;

use crate::detect::{detect_format_from_bytes, InputFormat};
use crate::error::{Error, Result};
use crate::model::TokenStream;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Trait for format readers.
///
/// Implement this trait to plug an OCR engine or document parser in front
/// of the pipeline.
pub trait FormatReader: Send + Sync {
    /// Get the name of this reader.
    fn name(&self) -> &str;

    /// Get the supported file extensions for this reader.
    ///
    /// Extensions should be lowercase without the leading dot (e.g., `["png"]`).
    fn supported_extensions(&self) -> &[&str];

    /// Read pages from bytes.
    fn read_bytes(&self, bytes: &[u8]) -> Result<Vec<TokenStream>>;

    /// Read pages from a file.
    fn read(&self, path: &Path) -> Result<Vec<TokenStream>> {
        let bytes = std::fs::read(path)?;
        self.read_bytes(&bytes)
    }

    /// Check if this reader supports the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }
}

/// Registry for format readers.
pub struct ReaderRegistry {
    readers: HashMap<String, Arc<dyn FormatReader>>,
    by_name: HashMap<String, Arc<dyn FormatReader>>,
}

impl ReaderRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            readers: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a registry with the built-in readers (JSON token dumps).
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(JsonTokenReader::new()));
        registry
    }

    /// Register a reader for all its supported extensions.
    pub fn register(&mut self, reader: Arc<dyn FormatReader>) {
        for ext in reader.supported_extensions() {
            self.readers.insert(ext.to_lowercase(), reader.clone());
        }
        self.by_name.insert(reader.name().to_lowercase(), reader);
    }

    /// Get a reader by file extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn FormatReader>> {
        self.readers.get(&ext.to_lowercase()).cloned()
    }

    /// Get a reader by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn FormatReader>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Get a reader for a detected format.
    pub fn get_by_format(&self, format: &InputFormat) -> Option<Arc<dyn FormatReader>> {
        match format {
            InputFormat::Jpeg => self
                .get_by_extension("jpg")
                .or_else(|| self.get_by_extension("jpeg")),
            other => self.get_by_extension(other.extension()),
        }
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.readers.contains_key(&ext.to_lowercase())
    }

    /// Get all supported extensions, sorted.
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.readers.keys().map(|s| s.as_str()).collect();
        exts.sort_unstable();
        exts
    }

    /// Read a file with the reader for its extension, falling back to
    /// content sniffing when the extension is missing or unregistered.
    pub fn read_path(&self, path: &Path) -> Result<Vec<TokenStream>> {
        if let Some(reader) = extension_of(path).and_then(|ext| self.get_by_extension(ext)) {
            log::debug!("Reading {} with '{}' reader", path.display(), reader.name());
            return reader.read(path);
        }

        let bytes = std::fs::read(path)?;
        self.read_sniffed(&bytes)
    }

    /// Read bytes using an extension hint, falling back to content sniffing.
    pub fn read_bytes(&self, bytes: &[u8], ext: Option<&str>) -> Result<Vec<TokenStream>> {
        match ext.and_then(|e| self.get_by_extension(e)) {
            Some(reader) => reader.read_bytes(bytes),
            None => self.read_sniffed(bytes),
        }
    }

    /// Read a file asynchronously.
    #[cfg(feature = "async")]
    pub async fn read_path_async(&self, path: &Path) -> Result<Vec<TokenStream>> {
        let bytes = tokio::fs::read(path).await?;
        self.read_bytes(&bytes, extension_of(path))
    }

    fn read_sniffed(&self, bytes: &[u8]) -> Result<Vec<TokenStream>> {
        let format = detect_format_from_bytes(bytes)?;
        let reader = self
            .get_by_format(&format)
            .ok_or_else(|| Error::UnsupportedFormat(format!("{} (no reader registered)", format)))?;
        log::debug!("Detected {}, reading with '{}' reader", format, reader.name());
        reader.read_bytes(bytes)
    }
}

impl Default for ReaderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn extension_of(path: &Path) -> Option<&str> {
    path.extension().and_then(|e| e.to_str())
}
