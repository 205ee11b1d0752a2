// search-sync-core/src/core/dates.rs
// ============================================================================
// Module: Reporting Dates
// Description: Calendar-day and UTC offset helpers for reporting timezones.
// Purpose: Keep every stored date in the reporting timezone.
// Dependencies: thiserror, time
// ============================================================================

//! ## Overview
//! The reporting service delimits days in its own fixed timezone. These
//! helpers convert instants and caller-local dates into reporting dates and
//! render them as ISO 8601 calendar days (`YYYY-MM-DD`), the only form in
//! which dates are stored.
//!
//! ## Invariants
//! - Timezones are fixed UTC offsets; no daylight-saving rules are applied.
//! - Only the calendar day of an instant is ever used.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;
use time::Date;
use time::OffsetDateTime;
use time::UtcOffset;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::macros::offset;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default reporting timezone: fixed Pacific Standard Time.
pub const DEFAULT_REPORTING_OFFSET: UtcOffset = offset!(-8);
/// Default application (caller-facing) timezone.
pub const DEFAULT_APPLICATION_OFFSET: UtcOffset = UtcOffset::UTC;

/// Storage format for reporting dates.
const REPORT_DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");
/// Text format for UTC offsets (`+HH:MM` / `-HH:MM`).
const UTC_OFFSET_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[offset_hour sign:mandatory]:[offset_minute]");

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Date and offset parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    /// Calendar date text is not `YYYY-MM-DD`.
    #[error("invalid report date '{value}': {message}")]
    InvalidDate {
        /// Rejected input text.
        value: String,
        /// Parser diagnostic.
        message: String,
    },
    /// UTC offset text is not `+HH:MM`, `-HH:MM`, `Z`, or `UTC`.
    #[error("invalid utc offset '{value}': {message}")]
    InvalidOffset {
        /// Rejected input text.
        value: String,
        /// Parser diagnostic.
        message: String,
    },
    /// Formatting failed.
    #[error("date formatting failed: {0}")]
    Format(String),
}

// ============================================================================
// SECTION: Conversions
// ============================================================================

/// Returns the calendar day of `instant` as observed at `offset`.
#[must_use]
pub fn date_in_offset(instant: OffsetDateTime, offset: UtcOffset) -> Date {
    instant.to_offset(offset).date()
}

/// Converts a caller-local calendar day into the day observed at `to`.
///
/// The local day is taken at midnight in `from`, then shifted into `to`. A
/// reporting offset west of the caller therefore maps a local day onto the
/// previous reporting day. Shifts past the representable range saturate at
/// [`Date::MAX`] or [`Date::MIN`].
#[must_use]
pub fn convert_local_date(date: Date, from: UtcOffset, to: UtcOffset) -> Date {
    date.midnight().assume_offset(from).checked_to_offset(to).map_or_else(
        || {
            if to.whole_seconds() > from.whole_seconds() {
                Date::MAX
            } else {
                Date::MIN
            }
        },
        |shifted| shifted.date(),
    )
}

// ============================================================================
// SECTION: Text Forms
// ============================================================================

/// Formats a reporting date as `YYYY-MM-DD`.
#[must_use]
pub fn format_report_date(date: Date) -> String {
    date.format(REPORT_DATE_FORMAT).unwrap_or_else(|_| date.to_string())
}

/// Parses a `YYYY-MM-DD` reporting date.
///
/// # Errors
///
/// Returns [`DateError::InvalidDate`] when the text is not a calendar day.
pub fn parse_report_date(value: &str) -> Result<Date, DateError> {
    Date::parse(value.trim(), REPORT_DATE_FORMAT).map_err(|err| DateError::InvalidDate {
        value: value.to_string(),
        message: err.to_string(),
    })
}

/// Parses a fixed UTC offset.
///
/// # Errors
///
/// Returns [`DateError::InvalidOffset`] when the text is not a supported offset.
pub fn parse_utc_offset(value: &str) -> Result<UtcOffset, DateError> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("utc") || trimmed == "Z" {
        return Ok(UtcOffset::UTC);
    }
    UtcOffset::parse(trimmed, UTC_OFFSET_FORMAT).map_err(|err| DateError::InvalidOffset {
        value: value.to_string(),
        message: err.to_string(),
    })
}

/// Formats a UTC offset as `+HH:MM` / `-HH:MM`.
///
/// # Errors
///
/// Returns [`DateError::Format`] when the offset cannot be rendered.
pub fn format_utc_offset(offset: UtcOffset) -> Result<String, DateError> {
    offset.format(UTC_OFFSET_FORMAT).map_err(|err| DateError::Format(err.to_string()))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions are permitted."
    )]

    use time::macros::date;
    use time::macros::datetime;
    use time::macros::offset;

    use super::*;

    #[test]
    fn report_dates_use_iso_calendar_form() {
        assert_eq!(format_report_date(date!(2024 - 01 - 03)), "2024-01-03");
        assert_eq!(parse_report_date("2024-01-03").unwrap(), date!(2024 - 01 - 03));
        assert!(parse_report_date("2024/01/03").is_err());
        assert!(parse_report_date("2024-02-30").is_err());
    }

    #[test]
    fn offsets_parse_signed_hours_and_utc_aliases() {
        assert_eq!(parse_utc_offset("-08:00").unwrap(), offset!(-8));
        assert_eq!(parse_utc_offset("+05:30").unwrap(), offset!(+5:30));
        assert_eq!(parse_utc_offset("UTC").unwrap(), UtcOffset::UTC);
        assert_eq!(parse_utc_offset("Z").unwrap(), UtcOffset::UTC);
        assert!(parse_utc_offset("PST").is_err());
        assert_eq!(format_utc_offset(offset!(-8)).unwrap(), "-08:00");
    }

    #[test]
    fn reporting_day_ignores_time_of_day() {
        let early = datetime!(2024-03-10 08:30 UTC);
        let late = datetime!(2024-03-11 07:59 UTC);
        assert_eq!(date_in_offset(early, offset!(-8)), date!(2024 - 03 - 10));
        assert_eq!(date_in_offset(late, offset!(-8)), date!(2024 - 03 - 10));
    }

    #[test]
    fn local_midnight_maps_west_to_previous_day() {
        let converted = convert_local_date(date!(2024 - 01 - 02), UtcOffset::UTC, offset!(-8));
        assert_eq!(converted, date!(2024 - 01 - 01));
        let same = convert_local_date(date!(2024 - 01 - 02), offset!(-8), offset!(-8));
        assert_eq!(same, date!(2024 - 01 - 02));
    }

    #[test]
    fn local_dates_at_the_calendar_edges_saturate() {
        let east = convert_local_date(Date::MAX, offset!(-12), offset!(+14));
        assert_eq!(east, Date::MAX);
        let west = convert_local_date(Date::MIN, offset!(+14), offset!(-12));
        assert_eq!(west, Date::MIN);
        let inside = convert_local_date(Date::MAX, offset!(+14), offset!(-12));
        assert_eq!(inside, Date::MAX.previous_day().unwrap());
    }
}
