use std::fs;
use std::path::Path;
use stmtdelta::core::{
    ComparatorError, DataSourceError, Frequency, PeriodSelection, StatementSource, compare,
};
use stmtdelta::providers::FileStatementSource;
use tracing::info;

mod test_utils {
    use std::fs;
    use std::path::{Path, PathBuf};

    pub const AAPL_STATEMENT: &str = r#"
ticker: AAPL
quarterly:
  columns: ["2023-12-31", "TTM", "2024-03-31", "2023-09-30", "2023-03-31"]
  rows:
    - metric: Total Revenue
      values: [119575, 385603, 90753, 89498, 94836]
    - metric: Net Income
      values: [33916, 100913, 23636, "-", 24160]
    - metric: Other Income
      values: [0, null, 12, 0, 0]
annual:
  columns: ["2023-09-30", "2022-09-30"]
  rows:
    - metric: Total Revenue
      values: [383285, 394328]
"#;

    pub const SHORT_STATEMENT: &str = r#"{
        "quarterly": {
            "columns": ["2024-03-31", "TTM"],
            "rows": [{"metric": "Net Income", "values": [1, 2]}]
        }
    }"#;

    /// Writes the statement fixtures and a config file pointing at them.
    pub fn write_fixtures(root: &Path) -> PathBuf {
        let statements = root.join("statements");
        fs::create_dir_all(&statements).expect("Failed to create statements dir");
        fs::write(statements.join("AAPL.yaml"), AAPL_STATEMENT).expect("Failed to write AAPL");
        fs::write(statements.join("SHORT.json"), SHORT_STATEMENT).expect("Failed to write SHORT");

        let config_path = root.join("config.yaml");
        let config_content = format!(
            r#"
data_path: "{}"
metrics:
  - "Total Revenue"
  - "Net Income"
frequency: quarterly
"#,
            statements.display()
        );
        fs::write(&config_path, config_content).expect("Failed to write config file");
        config_path
    }
}

fn config_arg(path: &Path) -> Option<&str> {
    path.to_str()
}

#[test_log::test(tokio::test)]
async fn test_compare_from_statement_file() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    test_utils::write_fixtures(dir.path());
    let source = FileStatementSource::new(dir.path().join("statements"));

    let table = source
        .load("AAPL", Frequency::Quarterly)
        .await
        .expect("Failed to load AAPL");
    let metrics = ["Total Revenue", "Net Income", "Other Income", "EBITDA"];

    let comparison =
        compare(&table, &metrics, PeriodSelection::default()).expect("Comparison failed");
    info!(?comparison, "Sequential comparison");

    assert_eq!(comparison.current_period.to_string(), "2024-03-31");
    assert_eq!(comparison.previous_period.to_string(), "2023-12-31");
    assert_eq!(comparison.len(), 3);

    let revenue = comparison.get("Total Revenue").unwrap();
    assert_eq!(revenue.change, 90753.0 - 119575.0);
    assert_eq!(
        revenue.percentage_change,
        (90753.0 - 119575.0) / 119575.0 * 100.0
    );
    assert_eq!(
        comparison.get("Other Income").unwrap().percentage_change,
        f64::INFINITY
    );
    assert!(comparison.get("EBITDA").is_none());

    let yoy = compare(&table, &metrics, PeriodSelection::YearOverYear).expect("YoY failed");
    assert_eq!(yoy.previous_period.to_string(), "2023-03-31");
    let net_income = yoy.get("Net Income").unwrap();
    assert_eq!(net_income.current, 23636.0);
    assert_eq!(net_income.previous, 24160.0);
}

#[test_log::test(tokio::test)]
async fn test_insufficient_and_missing_sources() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    test_utils::write_fixtures(dir.path());
    let source = FileStatementSource::new(dir.path().join("statements"));

    let table = source
        .load("SHORT", Frequency::Quarterly)
        .await
        .expect("Failed to load SHORT");
    let err = compare(&table, &["Net Income"], PeriodSelection::default()).unwrap_err();
    assert!(matches!(err, ComparatorError::InsufficientData { found: 1, .. }));

    let err = source.load("SHORT", Frequency::Annual).await.unwrap_err();
    assert!(matches!(err, DataSourceError::MissingStatement { .. }));

    let tickers = source.list_tickers().await.expect("Failed to list tickers");
    assert_eq!(tickers, vec!["AAPL", "SHORT"]);
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_fixtures(dir.path());
    let config = config_arg(&config_path);

    let commands = vec![
        stmtdelta::AppCommand::List,
        stmtdelta::AppCommand::Show {
            ticker: "AAPL".to_string(),
            frequency: Some(Frequency::Annual),
        },
        stmtdelta::AppCommand::Compare(stmtdelta::CompareOptions {
            tickers: vec!["AAPL".to_string(), "MISSING".to_string()],
            ..Default::default()
        }),
        stmtdelta::AppCommand::Compare(stmtdelta::CompareOptions {
            tickers: vec!["AAPL".to_string()],
            frequency: Some(Frequency::Quarterly),
            metrics: vec!["Net Income".to_string()],
            selection: PeriodSelection::Explicit {
                current: "2023-12-31".parse().unwrap(),
                previous: "2023-03-31".parse().unwrap(),
            },
        }),
        stmtdelta::AppCommand::History(stmtdelta::HistoryOptions {
            ticker: "AAPL".to_string(),
            ..Default::default()
        }),
    ];

    for command in commands {
        info!(?command, "Running command");
        let result = stmtdelta::run_command(command, config).await;
        assert!(
            result.is_ok(),
            "Command failed with: {:?}",
            result.err()
        );
    }
}

#[test_log::test(tokio::test)]
async fn test_app_flow_reports_failures() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_fixtures(dir.path());
    let config = config_arg(&config_path);

    let all_missing = stmtdelta::run_command(
        stmtdelta::AppCommand::Compare(stmtdelta::CompareOptions {
            tickers: vec!["MISSING".to_string(), "SHORT".to_string()],
            ..Default::default()
        }),
        config,
    )
    .await;
    assert!(all_missing.is_err());

    let history = stmtdelta::run_command(
        stmtdelta::AppCommand::History(stmtdelta::HistoryOptions {
            ticker: "SHORT".to_string(),
            ..Default::default()
        }),
        config,
    )
    .await;
    let message = format!("{:#}", history.unwrap_err());
    assert!(message.contains("insufficient data"), "{message}");

    let bad_config = dir.path().join("bad.yaml");
    fs::write(&bad_config, "currency: USD\n").expect("Failed to write config file");
    let result = stmtdelta::run_command(stmtdelta::AppCommand::List, bad_config.to_str()).await;
    assert!(result.is_err());
}
