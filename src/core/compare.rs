//! Period-over-period change calculations on a [`MetricTable`].
//!
//! Both entry points are pure: they never mutate the table and return the same
//! output for the same input. Metrics that are absent from the table, or whose
//! value is missing in either period, are left out of the results rather than
//! reported as errors.

use crate::core::error::ComparatorError;
use crate::core::period::{Period, PeriodKey, normalize_periods};
use crate::core::table::MetricTable;
use chrono::{Months, NaiveDate};
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// Tolerance around the one-year anniversary when picking a prior-year period.
/// Fiscal quarters often end on the last Saturday of a month rather than on a
/// fixed calendar date.
pub const YEAR_OVER_YEAR_TOLERANCE_DAYS: i64 = 15;

/// Which two periods a comparison looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeriodSelection {
    /// Latest period against the one immediately before it.
    #[default]
    Sequential,
    /// Latest period against the same period one year earlier.
    YearOverYear,
    /// Caller-supplied periods.
    Explicit {
        current: NaiveDate,
        previous: NaiveDate,
    },
}

/// Change of one metric between two periods.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub metric: String,
    pub current: f64,
    pub previous: f64,
    pub change: f64,
    /// `(change / previous) * 100`. A change away from a zero baseline is
    /// reported as positive or negative infinity, following the sign of
    /// `current`; zero to zero is `0.0`.
    pub percentage_change: f64,
}

impl ComparisonResult {
    pub fn new(metric: &str, current: f64, previous: f64) -> Self {
        Self {
            metric: metric.to_string(),
            current,
            previous,
            change: current - previous,
            percentage_change: percentage_change(current, previous),
        }
    }

    /// True when the change started from a zero baseline.
    pub fn is_unbounded(&self) -> bool {
        self.previous == 0.0 && self.current != 0.0
    }
}

/// Results of one comparison, in the order the metrics were requested.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub current_period: NaiveDate,
    pub previous_period: NaiveDate,
    pub results: Vec<ComparisonResult>,
}

impl Comparison {
    pub fn get(&self, metric: &str) -> Option<&ComparisonResult> {
        self.results.iter().find(|r| r.metric == metric)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// One step of a metric's change history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeStep {
    pub previous_period: NaiveDate,
    pub current_period: NaiveDate,
    pub result: ComparisonResult,
}

/// Period-over-period changes of one metric, oldest step first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricHistory {
    pub metric: String,
    pub steps: Vec<ChangeStep>,
}

/// Percentage change from `previous` to `current` with the zero-baseline
/// policy applied.
pub fn percentage_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        if current == 0.0 {
            0.0
        } else if current > 0.0 {
            f64::INFINITY
        } else {
            f64::NEG_INFINITY
        }
    } else {
        ((current - previous) / previous) * 100.0
    }
}

/// Resolves `selection` against the table's usable periods, returning
/// `(current, previous)`.
pub fn select_periods(
    key: &PeriodKey,
    selection: PeriodSelection,
) -> Result<(Period, Period), ComparatorError> {
    match selection {
        PeriodSelection::Sequential => Ok((key.latest(), key.previous())),
        PeriodSelection::YearOverYear => {
            let latest = key.latest();
            let anniversary = latest.date.checked_sub_months(Months::new(12)).ok_or_else(|| {
                ComparatorError::InsufficientData {
                    found: key.len(),
                    detail: format!("no date one year before {}", latest.date),
                }
            })?;

            key.iter()
                .skip(1)
                .map(|p| (p, (p.date - anniversary).num_days().abs()))
                .filter(|(_, distance)| *distance <= YEAR_OVER_YEAR_TOLERANCE_DAYS)
                .min_by_key(|(_, distance)| *distance)
                .map(|(p, _)| (latest, *p))
                .ok_or_else(|| ComparatorError::InsufficientData {
                    found: key.len(),
                    detail: format!("no period within a year-over-year window of {anniversary}"),
                })
        }
        PeriodSelection::Explicit { current, previous } => {
            let current = key
                .find(current)
                .ok_or(ComparatorError::UnknownPeriod(current))?;
            let previous = key
                .find(previous)
                .ok_or(ComparatorError::UnknownPeriod(previous))?;
            Ok((current, previous))
        }
    }
}

/// Compares `metric_names` between two periods of `table`.
///
/// Requested metrics missing from the table, or with a missing value in either
/// period, are omitted. A metric requested more than once appears once, at its
/// first position.
pub fn compare<S: AsRef<str>>(
    table: &MetricTable,
    metric_names: &[S],
    selection: PeriodSelection,
) -> Result<Comparison, ComparatorError> {
    let key = normalize_periods(table)?;
    let (current_period, previous_period) = select_periods(&key, selection)?;
    debug!(
        "Comparing {} against {}",
        current_period.date, previous_period.date
    );

    let mut seen = HashSet::new();
    let results = metric_names
        .iter()
        .map(|metric| metric.as_ref())
        .filter(|metric| seen.insert(*metric))
        .filter_map(|metric| {
            if !table.contains(metric) {
                debug!("Metric '{}' not in table, skipping", metric);
                return None;
            }
            match (
                table.cell(metric, current_period.column),
                table.cell(metric, previous_period.column),
            ) {
                (Some(current), Some(previous)) => {
                    Some(ComparisonResult::new(metric, current, previous))
                }
                _ => {
                    debug!("Metric '{}' has a missing value, skipping", metric);
                    None
                }
            }
        })
        .collect();

    Ok(Comparison {
        current_period: current_period.date,
        previous_period: previous_period.date,
        results,
    })
}

/// Change of each metric across every pair of consecutive usable periods.
///
/// Steps where either value is missing are skipped; metrics absent from the
/// table are omitted entirely.
pub fn change_history<S: AsRef<str>>(
    table: &MetricTable,
    metric_names: &[S],
) -> Result<Vec<MetricHistory>, ComparatorError> {
    let key = normalize_periods(table)?;
    let chronological: Vec<Period> = key.iter().rev().copied().collect();

    let mut seen = HashSet::new();
    let histories = metric_names
        .iter()
        .map(|metric| metric.as_ref())
        .filter(|metric| seen.insert(*metric))
        .filter(|metric| table.contains(metric))
        .map(|metric| {
            let steps = chronological
                .windows(2)
                .filter_map(|pair| {
                    let (previous, current) = (pair[0], pair[1]);
                    let current_value = table.cell(metric, current.column)?;
                    let previous_value = table.cell(metric, previous.column)?;
                    Some(ChangeStep {
                        previous_period: previous.date,
                        current_period: current.date,
                        result: ComparisonResult::new(metric, current_value, previous_value),
                    })
                })
                .collect();
            MetricHistory {
                metric: metric.to_string(),
                steps,
            }
        })
        .collect();

    Ok(histories)
}
