use anyhow::{Context, Result};

use crate::app::App;
use crate::render::terminal::render_rate;
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat) -> Result<()> {
    let stats = app.engine.stats().context("Failed to compute statistics")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Plain => {
            println!("Total number of cards: {}", stats.total_cards);
            println!("Cards due today: {}", stats.due_cards);
            println!("Retention rate: {}", render_rate(stats.retention_rate));
            println!("Retention rate (previous 30 days): {}", render_rate(stats.retention_rate_30_days));
        }
    }

    Ok(())
}
