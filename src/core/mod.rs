//! Core comparison logic and abstractions

pub mod compare;
pub mod config;
pub mod error;
pub mod log;
pub mod period;
pub mod source;
pub mod table;

// Re-export main types for cleaner imports
pub use compare::{
    ChangeStep, Comparison, ComparisonResult, MetricHistory, PeriodSelection, change_history,
    compare,
};
pub use error::{ComparatorError, DataSourceError};
pub use period::{Period, PeriodKey, normalize_periods};
pub use source::{Frequency, StatementSource};
pub use table::{ColumnLabel, MetricTable};
