//! Error types for the comparator and statement loaders

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by period normalization and comparison.
///
/// Missing values or metrics are never errors; they are dropped from results.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ComparatorError {
    #[error("insufficient data: {detail} (found {found} usable period(s))")]
    InsufficientData { found: usize, detail: String },

    #[error("period {0} is not present in the table")]
    UnknownPeriod(NaiveDate),
}

/// Errors raised while locating or parsing a statement source.
#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("no statement file found for ticker {ticker} in {}", .dir.display())]
    NotFound { ticker: String, dir: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("invalid statement in {}: {message}", .path.display())]
    Schema { path: PathBuf, message: String },

    #[error("{} has no {frequency} statement", .path.display())]
    MissingStatement { path: PathBuf, frequency: String },
}
