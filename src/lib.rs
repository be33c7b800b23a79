pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::AppConfig;
use crate::core::{Frequency, PeriodSelection};
use crate::providers::FileStatementSource;
use anyhow::Result;
use tracing::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct CompareOptions {
    pub tickers: Vec<String>,
    /// Falls back to the configured frequency.
    pub frequency: Option<Frequency>,
    /// Falls back to the configured metrics when empty.
    pub metrics: Vec<String>,
    pub selection: PeriodSelection,
}

#[derive(Debug, Clone, Default)]
pub struct HistoryOptions {
    pub ticker: String,
    pub frequency: Option<Frequency>,
    pub metrics: Vec<String>,
}

#[derive(Debug, Clone)]
pub enum AppCommand {
    List,
    Show {
        ticker: String,
        frequency: Option<Frequency>,
    },
    Compare(CompareOptions),
    History(HistoryOptions),
}

fn metrics_or_default(requested: Vec<String>, config: &AppConfig) -> Vec<String> {
    if requested.is_empty() {
        config.metrics.clone()
    } else {
        requested
    }
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("stmtdelta starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let source = FileStatementSource::new(config.statements_path()?);
    debug!("Reading statements from {}", source.dir().display());

    match command {
        AppCommand::List => cli::list::run(&source).await,
        AppCommand::Show { ticker, frequency } => {
            cli::show::run(&source, &ticker, frequency.unwrap_or(config.frequency)).await
        }
        AppCommand::Compare(options) => {
            let frequency = options.frequency.unwrap_or(config.frequency);
            let metrics = metrics_or_default(options.metrics, &config);
            cli::compare::run(
                &source,
                &options.tickers,
                frequency,
                &metrics,
                options.selection,
            )
            .await
        }
        AppCommand::History(options) => {
            let frequency = options.frequency.unwrap_or(config.frequency);
            let metrics = metrics_or_default(options.metrics, &config);
            cli::history::run(&source, &options.ticker, frequency, &metrics).await
        }
    }
}
