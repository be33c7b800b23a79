use super::ui;
use crate::core::{Frequency, MetricTable, PeriodKey, StatementSource, normalize_periods};
use anyhow::{Context, Result};
use comfy_table::Cell;

fn display_table(table: &MetricTable, key: &PeriodKey) -> String {
    let mut output = ui::new_styled_table();

    let mut header = vec![ui::header_cell("Metric")];
    for period in key.iter() {
        header.push(ui::header_cell(&period.date.to_string()));
    }
    output.set_header(header);

    for metric in table.metrics() {
        let mut row_cells = vec![Cell::new(metric)];
        for period in key.iter() {
            let cell = match table.cell(metric, period.column) {
                Some(value) => ui::amount_cell(value),
                None => ui::na_cell(),
            };
            row_cells.push(cell);
        }
        output.add_row(row_cells);
    }

    output.to_string()
}

pub async fn run(source: &dyn StatementSource, ticker: &str, frequency: Frequency) -> Result<()> {
    let table = source
        .load(ticker, frequency)
        .await
        .with_context(|| format!("Failed to load {frequency} statement for {ticker}"))?;
    let key = normalize_periods(&table)
        .with_context(|| format!("Statement for {ticker} has no comparable periods"))?;

    println!(
        "\n{} ({frequency})",
        ui::style_text(ticker, ui::StyleType::Title)
    );
    println!("{}", display_table(&table, &key));
    Ok(())
}
