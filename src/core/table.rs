//! In-memory statement table consumed by the comparator

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use tracing::debug;

/// A raw column header as it appears in a statement source.
///
/// Text labels are parsed into dates lazily by
/// [`normalize_periods`](crate::core::period::normalize_periods); labels that
/// never parse are simply ignored there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnLabel {
    /// Integer header: a fiscal year (1000..=9999) or a unix timestamp in
    /// seconds or milliseconds.
    Timestamp(i64),
    Text(String),
    /// Already-typed calendar date. Never produced by deserialization.
    Date(NaiveDate),
}

impl Display for ColumnLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnLabel::Timestamp(ts) => write!(f, "{ts}"),
            ColumnLabel::Text(text) => write!(f, "{text}"),
            ColumnLabel::Date(date) => write!(f, "{date}"),
        }
    }
}

impl From<&str> for ColumnLabel {
    fn from(value: &str) -> Self {
        ColumnLabel::Text(value.to_string())
    }
}

impl From<String> for ColumnLabel {
    fn from(value: String) -> Self {
        ColumnLabel::Text(value)
    }
}

impl From<NaiveDate> for ColumnLabel {
    fn from(value: NaiveDate) -> Self {
        ColumnLabel::Date(value)
    }
}

impl From<i64> for ColumnLabel {
    fn from(value: i64) -> Self {
        ColumnLabel::Timestamp(value)
    }
}

/// Financial metrics (rows) over reporting periods (columns).
///
/// Every row is aligned to the column labels: short rows are padded with
/// missing values and extra trailing cells are discarded. Non-finite values
/// are stored as missing. When a metric name repeats, the last row wins but
/// the metric keeps its first position. The table is immutable once built.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetricTable {
    columns: Vec<ColumnLabel>,
    metrics: Vec<String>,
    rows: HashMap<String, Vec<Option<f64>>>,
}

impl MetricTable {
    pub fn new<I, M>(columns: Vec<ColumnLabel>, rows: I) -> Self
    where
        I: IntoIterator<Item = (M, Vec<Option<f64>>)>,
        M: Into<String>,
    {
        let width = columns.len();
        let mut metrics = Vec::new();
        let mut aligned: HashMap<String, Vec<Option<f64>>> = HashMap::new();

        for (metric, values) in rows {
            let metric = metric.into();
            if values.len() > width {
                debug!(
                    "Row '{}' has {} cells for {} columns, dropping the extra cells",
                    metric,
                    values.len(),
                    width
                );
            }

            let mut cells: Vec<Option<f64>> = values
                .into_iter()
                .take(width)
                .map(|v| v.filter(|v| v.is_finite()))
                .collect();
            cells.resize(width, None);

            if aligned.insert(metric.clone(), cells).is_some() {
                debug!("Duplicate metric '{}', keeping the last row", metric);
            } else {
                metrics.push(metric);
            }
        }

        Self {
            columns,
            metrics,
            rows: aligned,
        }
    }

    pub fn columns(&self) -> &[ColumnLabel] {
        &self.columns
    }

    /// Metric names in the order they were first declared.
    pub fn metrics(&self) -> impl Iterator<Item = &str> {
        self.metrics.iter().map(String::as_str)
    }

    pub fn contains(&self, metric: &str) -> bool {
        self.rows.contains_key(metric)
    }

    pub fn row(&self, metric: &str) -> Option<&[Option<f64>]> {
        self.rows.get(metric).map(Vec::as_slice)
    }

    /// Value of `metric` in the given column, `None` if either is absent or
    /// the cell is missing.
    pub fn cell(&self, metric: &str, column: usize) -> Option<f64> {
        self.rows
            .get(metric)
            .and_then(|row| row.get(column).copied().flatten())
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}
