use crate::core::error::DataSourceError;
use crate::core::source::{Frequency, StatementSource};
use crate::core::table::{ColumnLabel, MetricTable};
use async_trait::async_trait;
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const EXTENSIONS: &[&str] = &["json", "yaml", "yml"];

// Cell text treated as an empty cell rather than a parse failure.
const MISSING_MARKERS: &[&str] = &["", "-", "--", "n/a", "na", "nan", "none", "null"];

/// Loads statements from a directory holding one `<TICKER>.json`,
/// `<TICKER>.yaml` or `<TICKER>.yml` file per ticker.
pub struct FileStatementSource {
    dir: PathBuf,
}

impl FileStatementSource {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        FileStatementSource { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn not_found(&self, ticker: &str) -> DataSourceError {
        DataSourceError::NotFound {
            ticker: ticker.to_string(),
            dir: self.dir.clone(),
        }
    }

    async fn read_statement(&self, ticker: &str) -> Result<(PathBuf, String), DataSourceError> {
        if ticker.is_empty() || ticker.contains(['/', '\\']) || ticker.starts_with('.') {
            return Err(self.not_found(ticker));
        }

        for ext in EXTENSIONS {
            let path = self.dir.join(format!("{ticker}.{ext}"));
            match tokio::fs::read_to_string(&path).await {
                Ok(contents) => {
                    debug!("Read statement file {}", path.display());
                    return Ok((path, contents));
                }
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(source) => return Err(DataSourceError::Io { path, source }),
            }
        }
        Err(self.not_found(ticker))
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StatementFile {
    #[serde(default)]
    ticker: Option<String>,
    quarterly: Option<RawTable>,
    annual: Option<RawTable>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTable {
    columns: Vec<ColumnLabel>,
    rows: Vec<RawRow>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRow {
    metric: String,
    values: Vec<Option<RawCell>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCell {
    Number(f64),
    Text(String),
}

impl RawCell {
    fn value(&self) -> Option<f64> {
        match self {
            RawCell::Number(n) => Some(*n).filter(|n| n.is_finite()),
            RawCell::Text(text) => parse_amount(text),
        }
    }
}

/// Parses a spreadsheet-style amount such as `"1,234.5"` or `"(12)"`.
/// Anything that is not a finite number is missing.
fn parse_amount(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if MISSING_MARKERS.contains(&trimmed.to_lowercase().as_str()) {
        return None;
    }

    let (negative, body) = match trimmed
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
    {
        Some(inner) => (true, inner.trim()),
        None => (false, trimmed),
    };

    let value: f64 = body.replace(',', "").parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(if negative { -value } else { value })
}

fn parse_statement_file(path: &Path, contents: &str) -> Result<StatementFile, DataSourceError> {
    let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");
    let parsed: Result<StatementFile, String> = if is_json {
        serde_json::from_str(contents).map_err(|e| e.to_string())
    } else {
        serde_yaml::from_str(contents).map_err(|e| e.to_string())
    };
    parsed.map_err(|message| DataSourceError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

fn build_table(path: &Path, raw: RawTable) -> Result<MetricTable, DataSourceError> {
    let width = raw.columns.len();
    let mut rows = Vec::with_capacity(raw.rows.len());

    for (index, row) in raw.rows.into_iter().enumerate() {
        let metric = row.metric.trim();
        if metric.is_empty() {
            return Err(DataSourceError::Schema {
                path: path.to_path_buf(),
                message: format!("row {index} has an empty metric name"),
            });
        }
        if row.values.len() > width {
            return Err(DataSourceError::Schema {
                path: path.to_path_buf(),
                message: format!(
                    "row '{metric}' has {} values but only {width} columns",
                    row.values.len()
                ),
            });
        }

        let values: Vec<Option<f64>> = row
            .values
            .iter()
            .map(|cell| cell.as_ref().and_then(RawCell::value))
            .collect();
        rows.push((metric.to_string(), values));
    }

    Ok(MetricTable::new(raw.columns, rows))
}

#[async_trait]
impl StatementSource for FileStatementSource {
    async fn list_tickers(&self) -> Result<Vec<String>, DataSourceError> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|source| DataSourceError::Io {
                path: self.dir.clone(),
                source,
            })?;

        let mut tickers = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(source) => {
                    return Err(DataSourceError::Io {
                        path: self.dir.clone(),
                        source,
                    });
                }
            };
            let path = entry.path();
            let has_statement_ext = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| EXTENSIONS.contains(&ext));
            if !has_statement_ext {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                tickers.push(stem.to_string());
            }
        }

        tickers.sort();
        tickers.dedup();
        debug!("Found {} tickers in {}", tickers.len(), self.dir.display());
        Ok(tickers)
    }

    async fn load(
        &self,
        ticker: &str,
        frequency: Frequency,
    ) -> Result<MetricTable, DataSourceError> {
        let (path, contents) = self.read_statement(ticker).await?;
        let file = parse_statement_file(&path, &contents)?;
        if let Some(declared) = &file.ticker
            && !declared.eq_ignore_ascii_case(ticker)
        {
            warn!(
                "{} declares ticker {} but was loaded as {}",
                path.display(),
                declared,
                ticker
            );
        }

        let raw = match frequency {
            Frequency::Quarterly => file.quarterly,
            Frequency::Annual => file.annual,
        }
        .ok_or_else(|| DataSourceError::MissingStatement {
            path: path.clone(),
            frequency: frequency.to_string(),
        })?;

        let table = build_table(&path, raw)?;
        debug!(
            "Loaded {} {} statement with {} metrics",
            ticker,
            frequency,
            table.len()
        );
        Ok(table)
    }
}
