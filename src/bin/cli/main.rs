mod app;
mod commands;
mod render;

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use memorygain_lib::flashcards::Outcome;

#[derive(Parser)]
#[command(name = "memorygain", about = "Flashcards with spaced repetition", version)]
struct Cli {
    /// Use a specific data directory (default: the platform's local data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum AnswerArg {
    Correct,
    Again,
}

impl From<AnswerArg> for Outcome {
    fn from(arg: AnswerArg) -> Self {
        match arg {
            AnswerArg::Correct => Outcome::Correct,
            AnswerArg::Again => Outcome::Again,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Study due cards interactively
    Study {
        /// Prefer cards from this deck while it has any due
        #[arg(long)]
        deck: Option<String>,
    },

    /// Show the next card to study
    Next {
        /// Prefer cards from this deck while it has any due
        #[arg(long)]
        deck: Option<String>,
    },

    /// Record an answer for a card
    Answer {
        /// Exact question of the card
        question: String,
        outcome: AnswerArg,
    },

    /// Add a card to a deck
    Add {
        deck: String,
        question: String,
        answer: String,
    },

    /// Change a card's question or answer
    Edit {
        /// Exact question of the card
        question: String,
        /// New question text
        #[arg(long = "question")]
        new_question: Option<String>,
        /// New answer text
        #[arg(long = "answer")]
        new_answer: Option<String>,
    },

    /// Move a card to another deck
    Move {
        question: String,
        deck: String,
    },

    /// Delete a card
    Delete {
        question: String,
    },

    /// Find cards by question or answer text
    Search {
        /// Case-insensitive text to look for (empty lists every card)
        #[arg(default_value = "")]
        query: String,
    },

    /// Count cards due today
    Due {
        #[arg(long)]
        deck: Option<String>,
    },

    /// Show collection and retention statistics
    Stats,

    /// Manage decks
    #[command(subcommand)]
    Deck(DeckCommand),

    /// Show or change settings
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Subcommand)]
enum DeckCommand {
    /// List decks with their due counts
    List,
    /// Create a deck
    Add { name: String },
    /// Delete a deck and every card in it
    Delete { name: String },
    /// Rename a deck and move its cards
    Rename { old_name: String, new_name: String },
}

#[derive(Subcommand)]
enum SettingsCommand {
    /// Print current settings
    Show,
    /// Set the target retention rate (50-99)
    SetTarget { rate: u8 },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let use_color = !cli.no_color && std::io::stdout().is_terminal();
    let app = app::App::new(cli.data_dir)?;
    let format = &cli.format;

    match cli.command {
        Command::Study { deck } => {
            commands::study::run(&app, deck.as_deref(), use_color)?;
        }
        Command::Next { deck } => {
            commands::cards::run_next(&app, deck.as_deref(), format, use_color)?;
        }
        Command::Answer { question, outcome } => {
            commands::cards::run_answer(&app, &question, outcome.into(), format, use_color)?;
        }
        Command::Add { deck, question, answer } => {
            commands::cards::run_add(&app, &deck, &question, &answer, format, use_color)?;
        }
        Command::Edit { question, new_question, new_answer } => {
            commands::cards::run_edit(
                &app,
                &question,
                new_question.as_deref(),
                new_answer.as_deref(),
                format,
                use_color,
            )?;
        }
        Command::Move { question, deck } => {
            commands::cards::run_move(&app, &question, &deck, format, use_color)?;
        }
        Command::Delete { question } => {
            commands::cards::run_delete(&app, &question, format)?;
        }
        Command::Search { query } => {
            commands::cards::run_search(&app, &query, format, use_color)?;
        }
        Command::Due { deck } => {
            commands::cards::run_due(&app, deck.as_deref(), format)?;
        }
        Command::Stats => {
            commands::stats::run(&app, format)?;
        }
        Command::Deck(subcmd) => match subcmd {
            DeckCommand::List => commands::decks::run_list(&app, format, use_color)?,
            DeckCommand::Add { name } => commands::decks::run_add(&app, &name)?,
            DeckCommand::Delete { name } => commands::decks::run_delete(&app, &name)?,
            DeckCommand::Rename { old_name, new_name } => {
                commands::decks::run_rename(&app, &old_name, &new_name)?
            }
        },
        Command::Settings(subcmd) => match subcmd {
            SettingsCommand::Show => commands::settings::run_show(&app, format)?,
            SettingsCommand::SetTarget { rate } => commands::settings::run_set_target(&app, rate)?,
        },
    }

    Ok(())
}
