use anyhow::{Context, Result};

use memorygain_lib::flashcards::{Card, Outcome};

use crate::app::App;
use crate::render::terminal::{render_answer, render_question, render_schedule, truncate};
use crate::OutputFormat;

fn print_card(card: &Card, format: &OutputFormat, use_color: bool) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(card)?),
        OutputFormat::Plain => {
            println!("{}", render_question(card, use_color));
            println!("{}", render_answer(card, use_color));
            println!("  {}", render_schedule(card, use_color));
        }
    }
    Ok(())
}

pub fn run_next(app: &App, deck: Option<&str>, format: &OutputFormat, use_color: bool) -> Result<()> {
    match app.engine.next_card(deck).context("Failed to pick next card")? {
        Some(card) => print_card(&card, format, use_color),
        None => {
            match format {
                OutputFormat::Json => println!("null"),
                OutputFormat::Plain => println!("Nothing due today."),
            }
            Ok(())
        }
    }
}

pub fn run_answer(
    app: &App,
    question: &str,
    outcome: Outcome,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let card = app.find_card(question)?;
    let updated = match outcome {
        Outcome::Correct => app.engine.apply_correct(&card),
        Outcome::Again => app.engine.apply_again(&card),
    }
    .context("Failed to record answer")?;

    print_card(&updated, format, use_color)
}

pub fn run_add(
    app: &App,
    deck: &str,
    question: &str,
    answer: &str,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    app.require_deck(deck)?;
    let card = app.engine.add_card(deck, question, answer)
        .context("Failed to add card")?;

    if let OutputFormat::Plain = format {
        println!("Added card to '{}'", deck);
    }
    print_card(&card, format, use_color)
}

pub fn run_edit(
    app: &App,
    question: &str,
    new_question: Option<&str>,
    new_answer: Option<&str>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let card = app.find_card(question)?;
    let edited = app.engine
        .edit_card(
            question,
            new_question.unwrap_or(card.question.as_str()),
            new_answer.unwrap_or(card.answer.as_str()),
        )
        .context("Failed to edit card")?;

    print_card(&edited, format, use_color)
}

pub fn run_move(app: &App, question: &str, deck: &str, format: &OutputFormat, use_color: bool) -> Result<()> {
    app.require_deck(deck)?;
    let card = app.engine.move_card(question, deck)
        .context("Failed to move card")?;
    print_card(&card, format, use_color)
}

pub fn run_delete(app: &App, question: &str, format: &OutputFormat) -> Result<()> {
    let card = app.engine.delete_card(question)
        .context("Failed to delete card")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "deleted": card.question })),
        OutputFormat::Plain => println!("Deleted card from '{}'", card.deck),
    }
    Ok(())
}

pub fn run_search(app: &App, query: &str, format: &OutputFormat, _use_color: bool) -> Result<()> {
    let cards = app.engine.search(query).context("Failed to search cards")?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&cards)?);
        }
        OutputFormat::Plain => {
            if cards.is_empty() {
                println!("No cards matching '{}'.", query);
                return Ok(());
            }

            let deck_w = cards.iter().map(|c| c.deck.chars().count()).max().unwrap_or(4).clamp(4, 20);
            let question_w = 40;

            println!("{:<deck_w$} {:<question_w$} {}",
                "Deck", "Question", "Answer",
                deck_w = deck_w, question_w = question_w);
            println!("{} {} {}",
                "\u{2500}".repeat(deck_w),
                "\u{2500}".repeat(question_w),
                "\u{2500}".repeat(20));

            for card in &cards {
                println!("{:<deck_w$} {:<question_w$} {}",
                    truncate(&card.deck, deck_w),
                    truncate(&card.question, question_w),
                    truncate(&card.answer, 40),
                    deck_w = deck_w, question_w = question_w);
            }

            println!("\n{} cards", cards.len());
        }
    }

    Ok(())
}

pub fn run_due(app: &App, deck: Option<&str>, format: &OutputFormat) -> Result<()> {
    if let Some(deck) = deck {
        app.require_deck(deck)?;
    }
    let count = app.engine.due_count(deck).context("Failed to count due cards")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "deck": deck, "due": count })),
        OutputFormat::Plain => match deck {
            Some(deck) => println!("{} cards due in '{}'", count, deck),
            None => println!("{} cards due", count),
        },
    }
    Ok(())
}
