//! CSV rendering for reconstructed tables.

use std::io::Write;

use crate::error::{Error, Result};
use crate::model::Table;

/// Write a table as header-less CSV, one record per row.
///
/// Cells containing the delimiter, a quote or a line break are quoted.
pub fn write_table_csv<W: Write>(table: &Table, writer: W) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    for row in &table.rows {
        csv_writer.write_record(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Render a table as a CSV string.
pub fn table_to_csv(table: &Table) -> Result<String> {
    let mut buffer = Vec::new();
    write_table_csv(table, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| Error::Render(format!("CSV output is not UTF-8: {}", e)))
}
