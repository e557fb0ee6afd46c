//! Multi-choice prompt with a find mode.

use std::fmt::Display;

use crossterm::event::KeyEvent;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};

use crate::core::FuzzyMatcher;

use super::choice::{Choice, Entry};
use super::filter::{step_cursor, wrap_cursor, FilteredView, Row};
use super::input::{is_enter, is_letter, is_space, navigation, LineBuffer};
use super::paginate::{Paginator, DEFAULT_PAGE_SIZE};
use super::style::{self, CIRCLE_FILLED, POINTER, SEARCH};
use super::{Prompt, Status};

/// Configuration for [`CheckboxPrompt`].
#[derive(Debug, Clone)]
pub struct CheckboxConfig<V> {
    /// Question shown on the first line.
    pub message: String,
    /// Entries in display order; `checked` seeds the initial state.
    pub choices: Vec<Entry<V>>,
    /// Rows shown at once (default 7).
    pub page_size: Option<usize>,
    /// Replaces the default key help.
    pub instructions: Option<String>,
}

impl<V> CheckboxConfig<V> {
    /// A config with the default page size and key help.
    pub fn new(message: impl Into<String>, choices: Vec<Entry<V>>) -> Self {
        Self {
            message: message.into(),
            choices,
            page_size: None,
            instructions: None,
        }
    }

    /// Override the page size.
    #[must_use]
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Override the key help.
    #[must_use]
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }
}

/// Pick any number of values from a list.
///
/// Navigation mode: Space toggles, arrows move, `f` starts find mode, `r`
/// clears the filter, Enter finishes. Find mode: typing edits the filter and
/// Enter returns to navigation mode.
pub struct CheckboxPrompt<V> {
    message: String,
    entries: Vec<Entry<V>>,
    keys: Vec<String>,
    page_size: usize,
    instructions: Option<String>,
    matcher: FuzzyMatcher,
    line: LineBuffer,
    query: String,
    view: FilteredView,
    cursor: usize,
    find_mode: bool,
    checked: Vec<bool>,
    status: Status,
    paginator: Paginator,
}

impl<V: Clone + Display> CheckboxPrompt<V> {
    /// Build a prompt. An empty or fully disabled list is allowed; Enter then
    /// yields an empty selection.
    pub fn new(config: CheckboxConfig<V>) -> Self {
        let keys = config.choices.iter().map(search_key).collect::<Vec<_>>();
        let checked = config
            .choices
            .iter()
            .map(|entry| entry.as_choice().is_some_and(|c| c.checked))
            .collect();
        let mut matcher = FuzzyMatcher::new();
        let view = FilteredView::compute(&mut matcher, &config.choices, &keys, "");

        Self {
            message: config.message,
            entries: config.choices,
            keys,
            page_size: config.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            instructions: config.instructions,
            matcher,
            line: LineBuffer::default(),
            query: String::new(),
            view,
            cursor: 0,
            find_mode: false,
            checked,
            status: Status::Pending,
            paginator: Paginator::default(),
        }
    }

    /// Current filter text.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Cursor index into the filtered selectable rows.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether keystrokes currently edit the filter.
    pub fn is_finding(&self) -> bool {
        self.find_mode
    }

    /// Lifecycle state.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Checked flag of every entry, indexed like the original list.
    pub fn checked_flags(&self) -> &[bool] {
        &self.checked
    }

    /// The choice under the cursor, if any.
    pub fn highlighted(&self) -> Option<&Choice<V>> {
        self.view
            .entry_at(self.cursor)
            .and_then(|index| self.entries[index].as_choice())
    }

    /// Checked selectable choices in original order.
    fn selection(&self) -> impl Iterator<Item = &Choice<V>> {
        self.entries
            .iter()
            .zip(&self.checked)
            .filter(|(entry, checked)| **checked && entry.is_selectable())
            .filter_map(|(entry, _)| entry.as_choice())
    }

    /// Values of the checked selectable choices, in original order.
    pub fn checked_values(&self) -> Vec<V> {
        self.selection().map(|choice| choice.value.clone()).collect()
    }

    fn refilter(&mut self) {
        self.view = FilteredView::compute(&mut self.matcher, &self.entries, &self.keys, &self.query);
    }

    fn toggle(&mut self) {
        let Some(index) = self.view.entry_at(self.cursor) else {
            return;
        };
        if self.entries[index].is_selectable() {
            self.checked[index] = !self.checked[index];
        }
    }

    /// Apply one key event. Returns the checked values when the prompt
    /// finishes.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Vec<V>> {
        if self.status == Status::Done {
            return None;
        }

        if self.find_mode {
            if is_enter(&key) {
                self.find_mode = false;
                return None;
            }
            self.line.apply(&key);
            if self.line.as_str() != self.query {
                self.query = self.line.as_str().to_string();
                self.cursor = 0;
                self.refilter();
            }
            return None;
        }

        if is_space(&key) {
            self.toggle();
        } else if is_letter(&key, 'f') {
            self.line.clear();
            self.find_mode = true;
        } else if is_letter(&key, 'r') {
            self.line.clear();
            self.query.clear();
            self.refilter();
            self.cursor = wrap_cursor(self.cursor, self.view.selectable_count());
        } else if is_enter(&key) {
            self.status = Status::Done;
            let values = self.checked_values();
            tracing::debug!(message = %self.message, selected = values.len(), "checkbox prompt done");
            return Some(values);
        } else if let Some(step) = navigation(&key) {
            self.cursor = step_cursor(self.cursor, self.view.selectable_count(), step);
        }

        None
    }

    /// Render the current frame.
    pub fn render(&mut self) -> Text<'static> {
        if self.status == Status::Done {
            let answer = self
                .selection()
                .map(|choice| choice.label().into_owned())
                .collect::<Vec<_>>()
                .join(", ");
            return Text::from(style::answer_line(&self.message, answer));
        }

        let mut header = vec![
            style::prefix(self.status),
            Span::raw(" "),
            style::message(&self.message),
        ];
        if !self.find_mode {
            header.extend(self.help());
        }
        header.push(Span::raw(" "));

        let mut lines = vec![Line::from(header)];

        if self.view.rows.is_empty() {
            if !self.query.trim().is_empty() {
                lines.push(style::no_matches());
            }
        } else {
            let active = self.view.row_position(self.cursor);
            let rows: Vec<Line<'static>> = self
                .view
                .rows
                .iter()
                .enumerate()
                .map(|(pos, row)| self.render_row(row, Some(pos) == active))
                .collect();

            let window = self
                .paginator
                .window(rows, active.unwrap_or(0), self.page_size);
            lines.extend(window.rows);
            if window.truncated {
                lines.push(style::more_choices_hint());
            }

            if let Some(description) = self.highlighted().and_then(|c| c.description.clone()) {
                lines.push(Line::from(description));
            }
        }

        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            self.status_text(),
            style::fg(Color::Magenta),
        )));

        Text::from(lines)
    }

    fn help(&self) -> Vec<Span<'static>> {
        if let Some(instructions) = &self.instructions {
            return vec![Span::raw(format!(" {}", instructions))];
        }

        let key_style = style::fg(Color::Cyan).add_modifier(Modifier::BOLD);
        let mut spans = vec![Span::raw(" (Press ")];
        let keys = [
            ("<space>", " to select, "),
            ("<enter>", " to proceed, "),
            ("<f>", " to find, "),
            ("<r>", " to clear)"),
        ];
        for (key, action) in keys {
            spans.push(Span::styled(key, key_style));
            spans.push(Span::raw(action));
        }
        spans
    }

    fn status_text(&self) -> String {
        if !self.query.is_empty() {
            let verb = if self.find_mode { "Finding" } else { "Found" };
            format!("{} {}: {}", SEARCH, verb, self.query)
        } else if self.find_mode {
            format!("{} ...", SEARCH)
        } else {
            String::new()
        }
    }

    fn render_row(&self, row: &Row, is_active: bool) -> Line<'static> {
        let (index, positions) = (row.index, row.positions.as_slice());
        let Some(choice) = self.entries[index].as_choice() else {
            return Line::default();
        };
        let label = choice.label();

        if choice.disabled.is_disabled() {
            return style::disabled_line(&label, positions, choice.disabled.label());
        }

        let circle_color = if self.checked[index] {
            Color::Green
        } else {
            Color::DarkGray
        };
        let circle = Span::styled(CIRCLE_FILLED, style::fg(circle_color));

        let (lead, base) = if is_active {
            let cyan = style::fg(Color::Cyan);
            (Span::styled(format!("{} ", POINTER), cyan), cyan)
        } else {
            (Span::raw("  "), Style::default())
        };

        let mut spans = vec![lead, circle, Span::styled(" ", base)];
        spans.extend(style::highlight(&label, positions, base));
        Line::from(spans)
    }
}

impl<V: Clone + Display> Prompt for CheckboxPrompt<V> {
    type Output = Vec<V>;

    fn handle_key(&mut self, key: KeyEvent) -> Option<Vec<V>> {
        CheckboxPrompt::handle_key(self, key)
    }

    fn render(&mut self) -> Text<'static> {
        CheckboxPrompt::render(self)
    }
}

/// `<label> <description>` when the choice has a description, else `<label>`.
fn search_key<V: Display>(entry: &Entry<V>) -> String {
    match entry.as_choice() {
        Some(choice) => match &choice.description {
            Some(description) => format!("{} {}", choice.label(), description),
            None => choice.label().into_owned(),
        },
        None => String::new(),
    }
}
