use super::ui;
use crate::core::StatementSource;
use anyhow::{Context, Result};

pub async fn run(source: &dyn StatementSource) -> Result<()> {
    let tickers = source
        .list_tickers()
        .await
        .context("Failed to list statement files")?;

    if tickers.is_empty() {
        println!(
            "{}",
            ui::style_text("No statement files found.", ui::StyleType::Subtle)
        );
        return Ok(());
    }

    for ticker in &tickers {
        println!("{ticker}");
    }
    Ok(())
}
