//! Glyphs and styled spans shared by the prompt renderers.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use super::Status;

pub(crate) const POINTER: &str = "❯";
pub(crate) const CIRCLE_FILLED: &str = "◉";
pub(crate) const SEARCH: &str = "🔍";

const PENDING_PREFIX: &str = "?";
const DONE_PREFIX: &str = "✔";
const MORE_CHOICES_HINT: &str = "(Use arrow keys to reveal more choices)";
const NO_MATCHES: &str = "No matches found";

pub(crate) fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

pub(crate) fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

pub(crate) fn fg(color: Color) -> Style {
    Style::default().fg(color)
}

/// `?` while pending, `✔` once done.
pub(crate) fn prefix(status: Status) -> Span<'static> {
    let glyph = match status {
        Status::Pending => PENDING_PREFIX,
        Status::Done => DONE_PREFIX,
    };
    Span::styled(glyph, fg(Color::Green))
}

pub(crate) fn message(text: &str) -> Span<'static> {
    Span::styled(text.to_string(), bold())
}

/// Frame shown after the prompt finished: `✔ <message> <answer>`.
pub(crate) fn answer_line(message_text: &str, answer: String) -> Line<'static> {
    Line::from(vec![
        prefix(Status::Done),
        Span::raw(" "),
        message(message_text),
        Span::raw(" "),
        Span::styled(answer, fg(Color::Cyan)),
    ])
}

pub(crate) fn more_choices_hint() -> Line<'static> {
    Line::from(Span::styled(MORE_CHOICES_HINT, dim()))
}

pub(crate) fn no_matches() -> Line<'static> {
    Line::from(vec![Span::raw("  "), Span::styled(NO_MATCHES, fg(Color::Red))])
}

/// `- <label> <reason>`, all dimmed.
pub(crate) fn disabled_line(label: &str, positions: &[u32], reason: &str) -> Line<'static> {
    let mut spans = vec![Span::styled("- ", dim())];
    spans.extend(highlight(label, positions, dim()));
    spans.push(Span::styled(format!(" {}", reason), dim()));
    Line::from(spans)
}

/// Split `label` into spans, drawing chars at `positions` bold yellow on top
/// of `base`. Positions past the end of the label are ignored.
pub(crate) fn highlight(label: &str, positions: &[u32], base: Style) -> Vec<Span<'static>> {
    if positions.is_empty() {
        return vec![Span::styled(label.to_string(), base)];
    }

    let matched = base.fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut run = String::new();
    let mut run_matched = false;

    for (i, c) in label.chars().enumerate() {
        let is_match = positions.binary_search(&(i as u32)).is_ok();
        if is_match != run_matched && !run.is_empty() {
            let style = if run_matched { matched } else { base };
            spans.push(Span::styled(std::mem::take(&mut run), style));
        }
        run_matched = is_match;
        run.push(c);
    }
    if !run.is_empty() {
        let style = if run_matched { matched } else { base };
        spans.push(Span::styled(run, style));
    }

    spans
}
