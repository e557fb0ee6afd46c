//! Single-choice prompt with fuzzy search.

use std::fmt::Display;

use crossterm::event::KeyEvent;
use ratatui::style::Color;
use ratatui::text::{Line, Span, Text};

use crate::core::FuzzyMatcher;

use super::choice::{Choice, Entry};
use super::filter::{step_cursor, wrap_cursor, FilteredView, Row};
use super::input::{is_enter, navigation, LineBuffer};
use super::paginate::{Paginator, DEFAULT_PAGE_SIZE};
use super::style::{self, POINTER};
use super::{Prompt, PromptError, Status};

/// Hint appended to the message on the first frame only.
const NAVIGATION_HINT: &str = " (Use arrow keys)";

/// Configuration for [`SelectPrompt`].
#[derive(Debug, Clone)]
pub struct SelectConfig<V> {
    /// Question shown on the first line.
    pub message: String,
    /// Entries in display order.
    pub choices: Vec<Entry<V>>,
    /// Rows shown at once (default 7).
    pub page_size: Option<usize>,
}

impl<V> SelectConfig<V> {
    /// A config with the default page size.
    pub fn new(message: impl Into<String>, choices: Vec<Entry<V>>) -> Self {
        Self {
            message: message.into(),
            choices,
            page_size: None,
        }
    }

    /// Override the page size.
    #[must_use]
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }
}

/// Pick one value from a list.
///
/// Typing filters the list; arrows move between selectable rows with
/// wraparound; Enter picks the highlighted row.
pub struct SelectPrompt<V> {
    message: String,
    entries: Vec<Entry<V>>,
    keys: Vec<String>,
    page_size: usize,
    matcher: FuzzyMatcher,
    line: LineBuffer,
    query: String,
    view: FilteredView,
    cursor: usize,
    status: Status,
    first_render: bool,
    paginator: Paginator,
}

impl<V: Clone + Display> SelectPrompt<V> {
    /// Build a prompt. Fails when no entry is selectable.
    pub fn new(config: SelectConfig<V>) -> Result<Self, PromptError> {
        if !config.choices.iter().any(Entry::is_selectable) {
            return Err(PromptError::NoSelectableChoices);
        }

        let keys = config.choices.iter().map(search_key).collect::<Vec<_>>();
        let mut matcher = FuzzyMatcher::new();
        let view = FilteredView::compute(&mut matcher, &config.choices, &keys, "");

        Ok(Self {
            message: config.message,
            entries: config.choices,
            keys,
            page_size: config.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            matcher,
            line: LineBuffer::default(),
            query: String::new(),
            view,
            cursor: 0,
            status: Status::Pending,
            first_render: true,
            paginator: Paginator::default(),
        })
    }

    /// Current filter text.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Cursor index into the filtered selectable rows.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Lifecycle state.
    pub fn status(&self) -> Status {
        self.status
    }

    /// The choice under the cursor, if any row is selectable.
    pub fn highlighted(&self) -> Option<&Choice<V>> {
        self.view
            .entry_at(self.cursor)
            .and_then(|index| self.entries[index].as_choice())
    }

    /// Apply one key event. Returns the picked value when the prompt finishes.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<V> {
        if self.status == Status::Done {
            return None;
        }

        self.line.apply(&key);
        if self.line.as_str() != self.query {
            self.query = self.line.as_str().to_string();
            self.view =
                FilteredView::compute(&mut self.matcher, &self.entries, &self.keys, &self.query);
            self.cursor = wrap_cursor(self.cursor, self.view.selectable_count());
        }

        if is_enter(&key) {
            let value = self.highlighted().map(|choice| choice.value.clone())?;
            self.status = Status::Done;
            tracing::debug!(message = %self.message, "select prompt done");
            return Some(value);
        }

        if let Some(step) = navigation(&key) {
            self.cursor = step_cursor(self.cursor, self.view.selectable_count(), step);
        }

        None
    }

    /// Render the current frame.
    pub fn render(&mut self) -> Text<'static> {
        if self.status == Status::Done {
            let answer = self
                .highlighted()
                .map(|choice| choice.label().into_owned())
                .unwrap_or_default();
            return Text::from(style::answer_line(&self.message, answer));
        }

        let mut header = vec![
            style::prefix(self.status),
            Span::raw(" "),
            style::message(&self.message),
        ];
        if self.first_render {
            header.push(Span::styled(NAVIGATION_HINT, style::dim()));
            self.first_render = false;
        }
        header.push(Span::raw(" "));
        header.push(Span::raw(self.query.clone()));

        let mut lines = vec![Line::from(header)];

        if self.view.rows.is_empty() {
            lines.push(style::no_matches());
            return Text::from(lines);
        }

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
            lines.push(Line::from(Span::styled(description, style::fg(Color::Blue))));
        }

        Text::from(lines)
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

        if is_active {
            let color = choice.color.map_or(Color::Cyan, |c| c.bright());
            let mut spans = vec![Span::styled(format!("{} ", POINTER), style::fg(color))];
            spans.extend(style::highlight(&label, positions, style::fg(color)));
            return Line::from(spans);
        }

        let base = choice.color.map_or_else(Default::default, |c| style::fg(c.base()));
        let mut spans = vec![Span::raw("  ")];
        spans.extend(style::highlight(&label, positions, base));
        Line::from(spans)
    }
}

impl<V: Clone + Display> Prompt for SelectPrompt<V> {
    type Output = V;

    fn handle_key(&mut self, key: KeyEvent) -> Option<V> {
        SelectPrompt::handle_key(self, key)
    }

    fn render(&mut self) -> Text<'static> {
        SelectPrompt::render(self)
    }
}

/// `<name> <value>` when the choice has a name, else `<value>`.
fn search_key<V: Display>(entry: &Entry<V>) -> String {
    match entry.as_choice() {
        Some(Choice {
            name: Some(name),
            value,
            ..
        }) => format!("{} {}", name, value),
        Some(choice) => choice.value.to_string(),
        None => String::new(),
    }
}
