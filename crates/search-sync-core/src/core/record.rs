// search-sync-core/src/core/record.rs
// ============================================================================
// Module: Analysis Records
// Description: Typed analysis records and their keyed row form.
// Purpose: Carry normalized rows between the sync engine and storage.
// Dependencies: crate::core::{dates, schema}, serde, time
// ============================================================================

//! ## Overview
//! An [`AnalysisRecord`] is one row of daily performance data. Before it is
//! handed to storage it is flattened into an [`AnalysisRow`], a keyed and
//! ordered cell list that backends validate against the schema registry.
//! Reads come back as [`TableRow`] values, where a header row can only
//! appear first.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use time::Date;

use crate::core::dates::format_report_date;
use crate::core::dates::parse_report_date;
use crate::core::schema::ANALYSIS_COLUMNS;
use crate::core::schema::SchemaMismatch;

// ============================================================================
// SECTION: Cells
// ============================================================================

/// A single stored value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Integer value.
    Integer(i64),
    /// Real value.
    Real(f64),
    /// Text value.
    Text(String),
}

impl CellValue {
    /// Returns the text payload, if any.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            Self::Integer(_) | Self::Real(_) => None,
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Real(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

// ============================================================================
// SECTION: Analysis Record
// ============================================================================

/// One row of daily search performance.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRecord {
    /// Reporting day.
    pub date: Date,
    /// Search query text.
    pub query: String,
    /// Landing page URL.
    pub page: String,
    /// ISO country code.
    pub country: String,
    /// Device class (desktop, mobile, tablet).
    pub device: String,
    /// Click count.
    pub clicks: u64,
    /// Impression count.
    pub impressions: u64,
    /// Average rank.
    pub position: f64,
}

impl AnalysisRecord {
    /// Flattens the record into its keyed row form.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaMismatch`] when a metric exceeds the storable range.
    pub fn to_row(&self) -> Result<AnalysisRow, SchemaMismatch> {
        let clicks = storable_count("clicks", self.clicks)?;
        let impressions = storable_count("impressions", self.impressions)?;
        let cells = [
            CellValue::Text(format_report_date(self.date)),
            CellValue::Text(self.query.clone()),
            CellValue::Text(self.page.clone()),
            CellValue::Text(self.country.clone()),
            CellValue::Text(self.device.clone()),
            CellValue::Integer(clicks),
            CellValue::Integer(impressions),
            CellValue::Real(self.position),
        ];
        let fields = ANALYSIS_COLUMNS
            .iter()
            .zip(cells)
            .map(|(column, cell)| (column.name.to_string(), cell))
            .collect();
        Ok(AnalysisRow::new(fields))
    }

    /// Rebuilds a record from selected cells in storage order.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaMismatch`] when the cells do not follow the registry.
    #[allow(clippy::cast_precision_loss, reason = "Integral ranks are far below 2^52.")]
    pub fn from_cells(cells: &[CellValue]) -> Result<Self, SchemaMismatch> {
        let [date, query, page, country, device, clicks, impressions, position] = cells else {
            return Err(SchemaMismatch(format!(
                "expected {} cells, found {}",
                ANALYSIS_COLUMNS.len(),
                cells.len()
            )));
        };
        let date = parse_report_date(text_cell("date", date)?)
            .map_err(|err| SchemaMismatch(err.to_string()))?;
        Ok(Self {
            date,
            query: text_cell("query", query)?.to_string(),
            page: text_cell("page", page)?.to_string(),
            country: text_cell("country", country)?.to_string(),
            device: text_cell("device", device)?.to_string(),
            clicks: count_cell("clicks", clicks)?,
            impressions: count_cell("impressions", impressions)?,
            position: match position {
                CellValue::Real(value) => *value,
                CellValue::Integer(value) => *value as f64,
                CellValue::Text(_) => {
                    return Err(SchemaMismatch("position must be numeric".to_string()));
                }
            },
        })
    }
}

/// Converts a count into the signed integer range used by storage.
fn storable_count(name: &str, value: u64) -> Result<i64, SchemaMismatch> {
    i64::try_from(value).map_err(|_| SchemaMismatch(format!("{name} exceeds storable range")))
}

/// Extracts a text cell.
fn text_cell<'a>(name: &str, cell: &'a CellValue) -> Result<&'a str, SchemaMismatch> {
    cell.as_text().ok_or_else(|| SchemaMismatch(format!("{name} must be text")))
}

/// Extracts a non-negative integer cell.
fn count_cell(name: &str, cell: &CellValue) -> Result<u64, SchemaMismatch> {
    match cell {
        CellValue::Integer(value) => u64::try_from(*value)
            .map_err(|_| SchemaMismatch(format!("{name} must be non-negative"))),
        CellValue::Real(_) | CellValue::Text(_) => {
            Err(SchemaMismatch(format!("{name} must be an integer")))
        }
    }
}

// ============================================================================
// SECTION: Keyed Rows
// ============================================================================

/// Ordered, keyed cells ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRow {
    /// Column name and value pairs, in insertion order.
    fields: Vec<(String, CellValue)>,
}

impl AnalysisRow {
    /// Creates a row from explicit column/value pairs.
    #[must_use]
    pub const fn new(fields: Vec<(String, CellValue)>) -> Self {
        Self {
            fields,
        }
    }

    /// Returns the column/value pairs.
    #[must_use]
    pub fn fields(&self) -> &[(String, CellValue)] {
        &self.fields
    }

    /// Returns the `date` cell text when the row leads with it.
    #[must_use]
    pub fn date_text(&self) -> Option<&str> {
        self.fields.first().and_then(|(_, value)| value.as_text())
    }

    /// Returns the cell values in order.
    #[must_use]
    pub fn cells(&self) -> Vec<CellValue> {
        self.fields.iter().map(|(_, value)| value.clone()).collect()
    }
}

// ============================================================================
// SECTION: Table Rows
// ============================================================================

/// Row returned by a range select.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TableRow {
    /// Column names in registry order.
    Header(Vec<String>),
    /// Stored cells in registry order.
    Record(Vec<CellValue>),
}

impl TableRow {
    /// Returns true for the header row.
    #[must_use]
    pub const fn is_header(&self) -> bool {
        matches!(self, Self::Header(_))
    }

    /// Returns the data cells, or `None` for the header.
    #[must_use]
    pub fn cells(&self) -> Option<&[CellValue]> {
        match self {
            Self::Header(_) => None,
            Self::Record(cells) => Some(cells),
        }
    }
}

/// Counts data rows, ignoring any header row.
#[must_use]
pub fn count_records(rows: &[TableRow]) -> usize {
    rows.iter().filter(|row| !row.is_header()).count()
}
