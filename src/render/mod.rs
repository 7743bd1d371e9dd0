//! Rendering extraction results into output artifacts.

mod cleanup;
mod json;
mod table_csv;
mod text;
mod writer;

pub use cleanup::{CleanupOptions, CleanupPipeline, CleanupPreset};
pub use json::{to_json, JsonFormat};
pub use table_csv::{table_to_csv, write_table_csv};
pub use text::{to_combined_text, to_text, TextOptions};
pub use writer::{OutputWriter, WrittenFiles};
