use anyhow::{Context, Result};

use crate::app::App;
use crate::OutputFormat;

pub fn run_show(app: &App, format: &OutputFormat) -> Result<()> {
    let settings = app.settings().load().context("Failed to load settings")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&settings)?),
        OutputFormat::Plain => {
            println!("Data directory: {}", app.data_dir.display());
            println!("Target retention rate: {}%", settings.target_retention_rate);
        }
    }

    Ok(())
}

pub fn run_set_target(app: &App, rate: u8) -> Result<()> {
    app.settings().set_target_retention_rate(rate)
        .context("Failed to save settings")?;
    println!("Target retention rate set to {}%", rate);
    Ok(())
}
