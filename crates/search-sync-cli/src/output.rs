// search-sync-cli/src/output.rs
// ============================================================================
// Module: Row Rendering
// Description: Text renderings of range-read results.
// Purpose: Emit rows as JSON lines or RFC 4180 CSV.
// Dependencies: search-sync-core, serde_json
// ============================================================================

//! ## Overview
//! Both formats emit one line per row in the order the store returned them.
//! JSON lines use the same array-per-row shape as the flat-file table.

// ============================================================================
// SECTION: Imports
// ============================================================================

use search_sync_core::CellValue;
use search_sync_core::TableRow;

// ============================================================================
// SECTION: Formats
// ============================================================================

/// Output format for the `read` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowFormat {
    /// One JSON array per line.
    Json,
    /// Comma-separated values.
    Csv,
}

/// Renders `rows` in `format`, one line per row.
///
/// # Errors
///
/// Returns [`serde_json::Error`] when a row cannot be encoded.
pub fn render_rows(rows: &[TableRow], format: RowFormat) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    for row in rows {
        let line = match format {
            RowFormat::Json => serde_json::to_string(row)?,
            RowFormat::Csv => csv_line(row),
        };
        output.push_str(&line);
        output.push('\n');
    }
    Ok(output)
}

/// Renders one CSV record.
fn csv_line(row: &TableRow) -> String {
    let fields: Vec<String> = match row {
        TableRow::Header(columns) => columns.iter().map(|name| csv_field(name)).collect(),
        TableRow::Record(cells) => cells
            .iter()
            .map(|cell| match cell {
                CellValue::Text(text) => csv_field(text),
                CellValue::Integer(_) | CellValue::Real(_) => cell.to_string(),
            })
            .collect(),
    };
    fields.join(",")
}

/// Quotes a text field when it contains a delimiter, quote, or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
