use super::ui;
use crate::core::{Frequency, MetricHistory, StatementSource, change_history};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::Cell;
use std::collections::BTreeSet;

/// Renders one row per metric and one column per period step, labelled by the
/// later period of the step.
fn display_histories(histories: &[MetricHistory]) -> String {
    let periods: BTreeSet<NaiveDate> = histories
        .iter()
        .flat_map(|h| h.steps.iter().map(|s| s.current_period))
        .collect();

    let mut table = ui::new_styled_table();
    let mut header = vec![ui::header_cell("Metric")];
    for period in &periods {
        header.push(ui::header_cell(&period.to_string()));
    }
    table.set_header(header);

    for history in histories {
        let mut row_cells = vec![Cell::new(&history.metric)];
        for period in &periods {
            let cell = match history.steps.iter().find(|s| s.current_period == *period) {
                Some(step) => ui::change_cell(&step.result),
                None => ui::na_cell(),
            };
            row_cells.push(cell);
        }
        table.add_row(row_cells);
    }

    table.to_string()
}

pub async fn run(
    source: &dyn StatementSource,
    ticker: &str,
    frequency: Frequency,
    metrics: &[String],
) -> Result<()> {
    let table = source
        .load(ticker, frequency)
        .await
        .with_context(|| format!("Failed to load {frequency} statement for {ticker}"))?;
    let histories = change_history(&table, metrics)
        .with_context(|| format!("Failed to compute change history for {ticker}"))?;

    println!(
        "\n{} ({frequency} % change)",
        ui::style_text(ticker, ui::StyleType::Title)
    );
    if histories.is_empty() {
        println!(
            "{}",
            ui::style_text("None of the requested metrics are in the statement.", ui::StyleType::Subtle)
        );
        return Ok(());
    }
    println!("{}", display_histories(&histories));
    Ok(())
}
