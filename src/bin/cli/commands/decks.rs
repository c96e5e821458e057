use anyhow::{Context, Result};

use crate::app::App;
use crate::OutputFormat;

pub fn run_list(app: &App, format: &OutputFormat, _use_color: bool) -> Result<()> {
    let decks = app.decks.list_decks().context("Failed to list decks")?;

    match format {
        OutputFormat::Json => {
            let mut output = Vec::new();
            for deck in &decks {
                output.push(serde_json::json!({
                    "name": deck,
                    "due": app.engine.due_count(Some(deck))?,
                }));
            }
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if decks.is_empty() {
                println!("No decks yet. Create one with `memorygain deck add <name>`.");
                return Ok(());
            }
            for deck in &decks {
                let due = app.engine.due_count(Some(deck))?;
                println!("  {} ({} due)", deck, due);
            }
        }
    }

    Ok(())
}

pub fn run_add(app: &App, name: &str) -> Result<()> {
    app.decks.add_deck(name).context("Failed to create deck")?;
    println!("Created deck '{}'", name.trim());
    Ok(())
}

pub fn run_delete(app: &App, name: &str) -> Result<()> {
    let removed = app.decks.delete_deck(name, app.engine.cards())
        .context("Failed to delete deck")?;
    println!("Deleted deck '{}' and {} cards", name, removed);
    Ok(())
}

pub fn run_rename(app: &App, old_name: &str, new_name: &str) -> Result<()> {
    let moved = app.decks.rename_deck(old_name, new_name, app.engine.cards())
        .context("Failed to rename deck")?;
    println!("Renamed deck '{}' to '{}' ({} cards)", old_name, new_name.trim(), moved);
    Ok(())
}
