use super::ui;
use crate::core::{
    Comparison, DataSourceError, Frequency, MetricTable, PeriodSelection, StatementSource, compare,
};
use anyhow::Result;
use comfy_table::Cell;
use futures::future::join_all;

struct TickerReport {
    ticker: String,
    outcome: Result<Comparison, String>,
}

impl Comparison {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();

        table.set_header(vec![
            ui::header_cell("Metric"),
            ui::header_cell(&self.current_period.to_string()),
            ui::header_cell(&self.previous_period.to_string()),
            ui::header_cell("Change"),
            ui::header_cell("Change (%)"),
        ]);

        for result in &self.results {
            table.add_row(vec![
                Cell::new(&result.metric),
                ui::amount_cell(result.current),
                ui::amount_cell(result.previous),
                ui::amount_cell(result.change),
                ui::change_cell(result),
            ]);
        }

        table.to_string()
    }
}

fn build_reports(
    loaded: Vec<(String, Result<MetricTable, DataSourceError>)>,
    metrics: &[String],
    selection: PeriodSelection,
) -> Vec<TickerReport> {
    loaded
        .into_iter()
        .map(|(ticker, table)| {
            let outcome = table.map_err(|e| e.to_string()).and_then(|table| {
                compare(&table, metrics, selection).map_err(|e| e.to_string())
            });
            TickerReport { ticker, outcome }
        })
        .collect()
}

pub async fn run(
    source: &dyn StatementSource,
    tickers: &[String],
    frequency: Frequency,
    metrics: &[String],
    selection: PeriodSelection,
) -> Result<()> {
    let pb = ui::new_progress_bar(tickers.len() as u64, true)?;
    pb.set_message("Loading statements...");

    let load_futures = tickers.iter().map(|ticker| {
        let pb_clone = pb.clone();
        async move {
            let res = source.load(ticker, frequency).await;
            pb_clone.inc(1);
            (ticker.clone(), res)
        }
    });
    let loaded = join_all(load_futures).await;
    pb.finish_and_clear();

    let reports = build_reports(loaded, metrics, selection);
    let num_reports = reports.len();
    let mut failures = 0;

    for (i, report) in reports.iter().enumerate() {
        println!(
            "\n{} ({frequency})",
            ui::style_text(&report.ticker, ui::StyleType::Title)
        );
        match &report.outcome {
            Ok(comparison) if comparison.is_empty() => {
                println!(
                    "{}",
                    ui::style_text(
                        "None of the requested metrics have values in both periods.",
                        ui::StyleType::Subtle
                    )
                );
            }
            Ok(comparison) => println!("{}", comparison.display_as_table()),
            Err(e) => {
                failures += 1;
                tracing::warn!(ticker = %report.ticker, error = %e, "Comparison failed");
                println!("{}", ui::style_text(e, ui::StyleType::Error));
            }
        }

        if i < num_reports - 1 {
            ui::print_separator();
        }
    }

    if num_reports > 0 && failures == num_reports {
        anyhow::bail!("No comparison could be produced for {}", tickers.join(", "));
    }
    Ok(())
}
