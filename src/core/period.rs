//! Reporting period parsing and normalization

use crate::core::error::ComparatorError;
use crate::core::table::{ColumnLabel, MetricTable};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%b %d, %Y",
];

// Timestamps above this magnitude are taken to be in milliseconds.
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

// Integer labels in this range are fiscal years, not timestamps.
const FISCAL_YEARS: std::ops::RangeInclusive<i64> = 1000..=9999;

/// A usable reporting period and the table column it resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Period {
    pub date: NaiveDate,
    pub column: usize,
}

/// De-duplicated reporting periods of a table, most recent first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodKey {
    periods: Vec<Period>,
}

impl PeriodKey {
    pub fn latest(&self) -> Period {
        self.periods[0]
    }

    pub fn previous(&self) -> Period {
        self.periods[1]
    }

    pub fn find(&self, date: NaiveDate) -> Option<Period> {
        self.periods.iter().copied().find(|p| p.date == date)
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.periods.iter().map(|p| p.date).collect()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Period> {
        self.periods.iter()
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }
}

/// Parses a column label into a calendar date.
///
/// Accepts ISO dates and datetimes, RFC 3339, a handful of common spreadsheet
/// formats, unix timestamps and a bare fiscal year (mapped to December 31).
/// Returns `None` for anything else.
pub fn parse_label(label: &ColumnLabel) -> Option<NaiveDate> {
    match label {
        ColumnLabel::Date(date) => Some(*date),
        ColumnLabel::Timestamp(year) if FISCAL_YEARS.contains(year) => fiscal_year_end(*year),
        ColumnLabel::Timestamp(ts) => {
            let datetime = if ts.abs() >= MILLIS_THRESHOLD {
                DateTime::<Utc>::from_timestamp_millis(*ts)
            } else {
                DateTime::<Utc>::from_timestamp(*ts, 0)
            };
            datetime.map(|dt| dt.date_naive())
        }
        ColumnLabel::Text(text) => parse_text(text.trim()),
    }
}

fn parse_text(text: &str) -> Option<NaiveDate> {
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }

    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
    {
        return Some(dt.date());
    }

    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
    {
        return Some(date);
    }

    if text.len() == 4 && text.bytes().all(|b| b.is_ascii_digit()) {
        return text.parse::<i64>().ok().and_then(fiscal_year_end);
    }

    None
}

fn fiscal_year_end(year: i64) -> Option<NaiveDate> {
    i32::try_from(year)
        .ok()
        .and_then(|year| NaiveDate::from_ymd_opt(year, 12, 31))
}

/// Derives the usable reporting periods of `table`, most recent first.
///
/// Labels that do not parse as dates are dropped. When several columns parse
/// to the same date, the last declared column wins. Fails with
/// [`ComparatorError::InsufficientData`] when fewer than two periods remain.
pub fn normalize_periods(table: &MetricTable) -> Result<PeriodKey, ComparatorError> {
    let mut by_date: BTreeMap<NaiveDate, usize> = BTreeMap::new();

    for (column, label) in table.columns().iter().enumerate() {
        match parse_label(label) {
            Some(date) => {
                if let Some(earlier) = by_date.insert(date, column) {
                    debug!(
                        "Columns {} and {} both resolve to {}, keeping column {}",
                        earlier, column, date, column
                    );
                }
            }
            None => debug!("Dropping column '{}': not a date", label),
        }
    }

    if by_date.len() < 2 {
        return Err(ComparatorError::InsufficientData {
            found: by_date.len(),
            detail: "at least two dated periods are required".to_string(),
        });
    }

    let periods = by_date
        .into_iter()
        .rev()
        .map(|(date, column)| Period { date, column })
        .collect();

    Ok(PeriodKey { periods })
}
