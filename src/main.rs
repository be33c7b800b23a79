use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use stmtdelta::core::log::init_logging;
use stmtdelta::core::{Frequency, PeriodSelection};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum FrequencyArg {
    Quarterly,
    Annual,
}

impl From<FrequencyArg> for Frequency {
    fn from(arg: FrequencyArg) -> Frequency {
        match arg {
            FrequencyArg::Quarterly => Frequency::Quarterly,
            FrequencyArg::Annual => Frequency::Annual,
        }
    }
}

#[derive(Args)]
struct StatementArgs {
    /// Statement frequency (defaults to the configured one)
    #[arg(short, long, value_enum)]
    frequency: Option<FrequencyArg>,

    /// Metric to include; repeat for several (defaults to the configured list)
    #[arg(short, long = "metric")]
    metrics: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// List tickers with statement files
    List,
    /// Display a ticker's statement table
    Show {
        ticker: String,
        /// Statement frequency (defaults to the configured one)
        #[arg(short, long, value_enum)]
        frequency: Option<FrequencyArg>,
    },
    /// Compare the latest period against a prior one
    Compare {
        #[arg(required = true)]
        tickers: Vec<String>,

        #[command(flatten)]
        statement: StatementArgs,

        /// Compare against the same period one year earlier
        #[arg(long, conflicts_with = "periods")]
        yoy: bool,

        /// Compare two explicit periods
        #[arg(long, num_args = 2, value_names = ["CURRENT", "PREVIOUS"])]
        periods: Option<Vec<NaiveDate>>,
    },
    /// Display period-over-period % change across all periods
    History {
        ticker: String,

        #[command(flatten)]
        statement: StatementArgs,
    },
}

fn selection(yoy: bool, periods: Option<Vec<NaiveDate>>) -> PeriodSelection {
    match periods.as_deref() {
        Some(&[current, previous]) => PeriodSelection::Explicit { current, previous },
        _ if yoy => PeriodSelection::YearOverYear,
        _ => PeriodSelection::Sequential,
    }
}

impl From<Commands> for stmtdelta::AppCommand {
    fn from(cmd: Commands) -> stmtdelta::AppCommand {
        match cmd {
            Commands::List => stmtdelta::AppCommand::List,
            Commands::Show { ticker, frequency } => stmtdelta::AppCommand::Show {
                ticker,
                frequency: frequency.map(Into::into),
            },
            Commands::Compare {
                tickers,
                statement,
                yoy,
                periods,
            } => stmtdelta::AppCommand::Compare(stmtdelta::CompareOptions {
                tickers,
                frequency: statement.frequency.map(Into::into),
                metrics: statement.metrics,
                selection: selection(yoy, periods),
            }),
            Commands::History { ticker, statement } => {
                stmtdelta::AppCommand::History(stmtdelta::HistoryOptions {
                    ticker,
                    frequency: statement.frequency.map(Into::into),
                    metrics: statement.metrics,
                })
            }
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => stmtdelta::cli::setup::setup(),
        Some(cmd) => stmtdelta::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_flag() {
        let cli =
            Cli::try_parse_from(["stmtdelta", "compare", "AAPL", "MSFT", "-f", "annual"]).unwrap();
        let Some(Commands::Compare { tickers, statement, .. }) = cli.command else {
            panic!("expected compare command");
        };
        assert_eq!(tickers, vec!["AAPL", "MSFT"]);
        assert!(matches!(statement.frequency, Some(FrequencyArg::Annual)));

        let cli =
            Cli::try_parse_from(["stmtdelta", "history", "AAPL", "--frequency", "quarterly"])
                .unwrap();
        let Some(Commands::History { statement, .. }) = cli.command else {
            panic!("expected history command");
        };
        assert!(matches!(statement.frequency, Some(FrequencyArg::Quarterly)));

        assert!(Cli::try_parse_from(["stmtdelta", "show", "AAPL", "--annual"]).is_err());
    }

    #[test]
    fn test_compare_selection_flags() {
        let cli = Cli::try_parse_from([
            "stmtdelta", "compare", "AAPL", "--periods", "2024-03-31", "2023-03-31",
        ])
        .unwrap();
        let Some(Commands::Compare { yoy, periods, .. }) = cli.command else {
            panic!("expected compare command");
        };
        assert!(matches!(
            selection(yoy, periods),
            PeriodSelection::Explicit { .. }
        ));

        let conflicting = Cli::try_parse_from([
            "stmtdelta", "compare", "AAPL", "--yoy", "--periods", "2024-03-31", "2023-03-31",
        ]);
        assert!(conflicting.is_err());
    }
}
