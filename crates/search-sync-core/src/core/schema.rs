// search-sync-core/src/core/schema.rs
// ============================================================================
// Module: Analysis Schema Registry
// Description: Canonical column list for stored analysis rows.
// Purpose: Single definition of column names, order, and constraints.
// Dependencies: crate::core::{dates, record}, thiserror, time
// ============================================================================

//! ## Overview
//! Every storage backend lays out its physical storage from [`columns`] and
//! validates rows against it before persisting them. Column order is a durable
//! contract: header rows, flat-file lines, and relational columns all follow it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;
use time::Date;

use crate::core::dates::format_report_date;
use crate::core::dates::parse_report_date;
use crate::core::record::AnalysisRow;
use crate::core::record::CellValue;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Storage affinity for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnAffinity {
    /// UTF-8 text.
    Text,
    /// Non-negative 64-bit integer.
    Integer,
    /// Non-negative finite real number.
    Real,
}

impl ColumnAffinity {
    /// Returns the SQL type name for the affinity.
    #[must_use]
    pub const fn sql_type(self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
        }
    }

    /// Returns true when `value` is storable under this affinity.
    #[must_use]
    pub fn accepts(self, value: &CellValue) -> bool {
        match (self, value) {
            (Self::Text, CellValue::Text(_)) => true,
            (Self::Integer, CellValue::Integer(number)) => *number >= 0,
            (Self::Real, CellValue::Real(number)) => number.is_finite() && *number >= 0.0,
            _ => false,
        }
    }
}

/// Column declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    /// Column name.
    pub name: &'static str,
    /// Storage affinity.
    pub affinity: ColumnAffinity,
    /// Whether the column accepts nulls.
    pub nullable: bool,
}

impl ColumnDef {
    /// Returns the relational column constraint, e.g. `TEXT NOT NULL`.
    #[must_use]
    pub fn constraint(&self) -> String {
        if self.nullable {
            self.affinity.sql_type().to_string()
        } else {
            format!("{} NOT NULL", self.affinity.sql_type())
        }
    }
}

/// Row did not match the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("schema mismatch: {0}")]
pub struct SchemaMismatch(pub String);

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Relational table name for analysis rows.
pub const ANALYSIS_TABLE: &str = "analysis";
/// Column holding the reporting date.
pub const DATE_COLUMN: &str = "date";

/// Canonical analysis columns, in storage order.
pub const ANALYSIS_COLUMNS: [ColumnDef; 8] = [
    ColumnDef {
        name: DATE_COLUMN,
        affinity: ColumnAffinity::Text,
        nullable: false,
    },
    ColumnDef {
        name: "query",
        affinity: ColumnAffinity::Text,
        nullable: false,
    },
    ColumnDef {
        name: "page",
        affinity: ColumnAffinity::Text,
        nullable: false,
    },
    ColumnDef {
        name: "country",
        affinity: ColumnAffinity::Text,
        nullable: false,
    },
    ColumnDef {
        name: "device",
        affinity: ColumnAffinity::Text,
        nullable: false,
    },
    ColumnDef {
        name: "clicks",
        affinity: ColumnAffinity::Integer,
        nullable: false,
    },
    ColumnDef {
        name: "impressions",
        affinity: ColumnAffinity::Integer,
        nullable: false,
    },
    ColumnDef {
        name: "position",
        affinity: ColumnAffinity::Real,
        nullable: false,
    },
];

/// Returns the canonical columns in storage order.
#[must_use]
pub const fn columns() -> &'static [ColumnDef] {
    &ANALYSIS_COLUMNS
}

/// Returns the column names in storage order.
#[must_use]
pub fn column_names() -> Vec<&'static str> {
    ANALYSIS_COLUMNS.iter().map(|column| column.name).collect()
}

/// Returns the header row emitted ahead of selected data.
#[must_use]
pub fn header_row() -> Vec<String> {
    ANALYSIS_COLUMNS.iter().map(|column| column.name.to_string()).collect()
}

/// Validates a keyed row: exact column set, exact order, and value kinds.
///
/// # Errors
///
/// Returns [`SchemaMismatch`] describing the first deviation found.
pub fn validate_row(row: &AnalysisRow) -> Result<(), SchemaMismatch> {
    let fields = row.fields();
    if fields.len() != ANALYSIS_COLUMNS.len() {
        return Err(SchemaMismatch(format!(
            "row has {} columns, expected the ordered columns {}",
            fields.len(),
            column_names().join(",")
        )));
    }
    for (index, ((name, value), column)) in fields.iter().zip(ANALYSIS_COLUMNS.iter()).enumerate()
    {
        if name != column.name {
            return Err(SchemaMismatch(format!(
                "column {index} is '{name}', expected '{}'",
                column.name
            )));
        }
        if !column.affinity.accepts(value) {
            return Err(SchemaMismatch(format!(
                "column '{}' does not accept value '{value}'",
                column.name
            )));
        }
        if column.name == DATE_COLUMN {
            validate_date_cell(value)?;
        }
    }
    Ok(())
}

/// Requires the date cell to be a canonical `YYYY-MM-DD` calendar day.
fn validate_date_cell(value: &CellValue) -> Result<(), SchemaMismatch> {
    let canonical = value
        .as_text()
        .and_then(|text| parse_report_date(text).ok().map(|date| (text, date)))
        .is_some_and(|(text, date)| format_report_date(date) == text);
    if canonical {
        Ok(())
    } else {
        Err(SchemaMismatch(format!(
            "column '{DATE_COLUMN}' holds '{value}', expected a YYYY-MM-DD calendar day"
        )))
    }
}

/// Validates a persisted header against the registry.
///
/// # Errors
///
/// Returns [`SchemaMismatch`] when names or order differ.
pub fn validate_header<S: AsRef<str>>(names: &[S]) -> Result<(), SchemaMismatch> {
    let matches = names.len() == ANALYSIS_COLUMNS.len()
        && names.iter().zip(ANALYSIS_COLUMNS.iter()).all(|(name, column)| name.as_ref() == column.name);
    if matches {
        Ok(())
    } else {
        let found: Vec<&str> = names.iter().map(AsRef::as_ref).collect();
        Err(SchemaMismatch(format!(
            "stored columns [{}] differ from [{}]",
            found.join(","),
            column_names().join(",")
        )))
    }
}

/// Validates a batch of rows that must all belong to `date`.
///
/// # Errors
///
/// Returns [`SchemaMismatch`] for the first invalid row or the first row
/// stamped with another date.
pub fn validate_day(date: Date, rows: &[AnalysisRow]) -> Result<(), SchemaMismatch> {
    let expected = format_report_date(date);
    for row in rows {
        validate_row(row)?;
        if row.date_text() != Some(expected.as_str()) {
            return Err(SchemaMismatch(format!(
                "row dated '{}' does not belong to {expected}",
                row.date_text().unwrap_or_default()
            )));
        }
    }
    Ok(())
}
