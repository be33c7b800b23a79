//! Statement source abstractions

use crate::core::error::DataSourceError;
use crate::core::table::MetricTable;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Reporting frequency of an income statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Quarterly,
    Annual,
}

impl Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Frequency::Quarterly => "quarterly",
                Frequency::Annual => "annual",
            }
        )
    }
}

impl FromStr for Frequency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "quarterly" | "q" => Ok(Frequency::Quarterly),
            "annual" | "a" | "yearly" => Ok(Frequency::Annual),
            _ => Err(anyhow::anyhow!("Invalid frequency: {}", s)),
        }
    }
}

#[async_trait]
pub trait StatementSource: Send + Sync {
    /// Tickers this source can load, sorted.
    async fn list_tickers(&self) -> Result<Vec<String>, DataSourceError>;

    async fn load(&self, ticker: &str, frequency: Frequency)
    -> Result<MetricTable, DataSourceError>;
}
