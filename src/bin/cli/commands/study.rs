use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};

use memorygain_lib::flashcards::algorithm::format_interval;
use memorygain_lib::flashcards::Outcome;

use crate::app::App;
use crate::render::terminal::{render_answer, render_question};

fn prompt(stdin: &mut impl BufRead, message: &str) -> Result<Option<String>> {
    print!("{}", message);
    io::stdout().flush()?;

    let mut line = String::new();
    if stdin.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_lowercase()))
}

/// Interactive study loop: question, reveal, then correct/again
pub fn run(app: &App, deck: Option<&str>, use_color: bool) -> Result<()> {
    if let Some(deck) = deck {
        app.require_deck(deck)?;
    }

    let stdin = io::stdin();
    let mut stdin = stdin.lock();
    let mut reviewed = 0;

    loop {
        let Some(card) = app.engine.next_card(deck).context("Failed to pick next card")? else {
            println!("Nothing left to study today. Reviewed {} cards.", reviewed);
            return Ok(());
        };

        let remaining = app.engine.due_count(None)?;
        println!("\n({} due)", remaining);
        println!("{}", render_question(&card, use_color));

        if prompt(&mut stdin, "Press Enter to show the answer (q to quit) ")?.as_deref() == Some("q") {
            break;
        }
        println!("{}", render_answer(&card, use_color));

        let outcome = loop {
            match prompt(&mut stdin, "[c]orrect / [a]gain / [q]uit: ")?.as_deref() {
                None | Some("q") => {
                    println!("Reviewed {} cards.", reviewed);
                    return Ok(());
                }
                Some("c") | Some("correct") => break Outcome::Correct,
                Some("a") | Some("again") => break Outcome::Again,
                Some(_) => continue,
            }
        };

        let updated = app.engine.answer(&card.question, outcome)
            .context("Failed to record answer")?;
        reviewed += 1;
        println!("Next review in {}", format_interval(updated.interval));
    }

    println!("Reviewed {} cards.", reviewed);
    Ok(())
}
