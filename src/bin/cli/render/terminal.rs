use memorygain_lib::flashcards::algorithm::format_interval;
use memorygain_lib::flashcards::Card;

/// ANSI color codes
pub struct Color;

impl Color {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const CYAN: &str = "\x1b[36m";
}

/// Wrap text in a color code when colors are enabled
pub fn paint(text: &str, color: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", color, text, Color::RESET)
    } else {
        text.to_string()
    }
}

/// Truncate to `width` characters, marking the cut with "..."
pub fn truncate(text: &str, width: usize) -> String {
    let single_line = text.replace(['\r', '\n'], " ");
    if single_line.chars().count() <= width {
        return single_line;
    }
    let kept: String = single_line.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Deck and question header shown while studying
pub fn render_question(card: &Card, use_color: bool) -> String {
    format!(
        "{}\n{}",
        paint(&format!("[{}]", card.deck), Color::DIM, use_color),
        paint(&card.question, Color::BOLD, use_color)
    )
}

pub fn render_answer(card: &Card, use_color: bool) -> String {
    paint(&card.answer, Color::CYAN, use_color)
}

/// One-line summary of a card's schedule
pub fn render_schedule(card: &Card, use_color: bool) -> String {
    let interval = format_interval(card.interval);
    let interval = if card.interval == 0 {
        paint(&interval, Color::RED, use_color)
    } else {
        paint(&interval, Color::GREEN, use_color)
    };
    format!(
        "interval {}, ease {:.2}, {}, due {}",
        interval,
        card.ease,
        card.phase.label(),
        card.due.format("%Y-%m-%d %H:%M")
    )
}

/// Render a percentage, or "n/a" when there is no data
pub fn render_rate(rate: Option<f64>) -> String {
    match rate {
        Some(rate) => format!("{:.1}%", rate),
        None => "n/a".to_string(),
    }
}
