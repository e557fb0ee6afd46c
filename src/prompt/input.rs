//! Key classification and the editable query line.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::filter::Step;

fn plain(key: &KeyEvent) -> bool {
    !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
}

/// Enter / Return.
pub(crate) fn is_enter(key: &KeyEvent) -> bool {
    matches!(key.code, KeyCode::Enter)
}

/// Space bar without modifiers.
pub(crate) fn is_space(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char(' ') && plain(key)
}

/// A bare letter key, e.g. `f` or `r` in the checkbox prompt.
pub(crate) fn is_letter(key: &KeyEvent, letter: char) -> bool {
    key.code == KeyCode::Char(letter) && plain(key)
}

/// Ctrl-C or Ctrl-D.
pub(crate) fn is_interrupt(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('d'))
}

/// Navigation step for arrow keys and Ctrl-P / Ctrl-N.
///
/// Letters never navigate: they belong to the search text.
pub(crate) fn navigation(key: &KeyEvent) -> Option<Step> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Up => Some(Step::Up),
        KeyCode::Down => Some(Step::Down),
        KeyCode::Char('p') if ctrl => Some(Step::Up),
        KeyCode::Char('n') if ctrl => Some(Step::Down),
        _ => None,
    }
}

/// Single-line edit buffer fed by key events.
#[derive(Debug, Clone, Default)]
pub(crate) struct LineBuffer {
    text: String,
    /// Cursor position in chars.
    cursor: usize,
}

impl LineBuffer {
    pub(crate) fn as_str(&self) -> &str {
        &self.text
    }

    pub(crate) fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    fn byte_offset(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map_or(self.text.len(), |(i, _)| i)
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Apply an editing key. Returns true if the text changed.
    pub(crate) fn apply(&mut self, key: &KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('u') if ctrl => {
                let end = self.byte_offset(self.cursor);
                self.text.replace_range(..end, "");
                self.cursor = 0;
                end > 0
            }
            KeyCode::Char('w') if ctrl => self.delete_word(),
            KeyCode::Char('a') if ctrl => {
                self.cursor = 0;
                false
            }
            KeyCode::Char('e') if ctrl => {
                self.cursor = self.char_len();
                false
            }
            KeyCode::Char(c) if plain(key) => {
                let at = self.byte_offset(self.cursor);
                self.text.insert(at, c);
                self.cursor += 1;
                true
            }
            KeyCode::Backspace if self.cursor > 0 => {
                let at = self.byte_offset(self.cursor - 1);
                self.text.remove(at);
                self.cursor -= 1;
                true
            }
            KeyCode::Delete if self.cursor < self.char_len() => {
                let at = self.byte_offset(self.cursor);
                self.text.remove(at);
                true
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                false
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(self.char_len());
                false
            }
            KeyCode::Home => {
                self.cursor = 0;
                false
            }
            KeyCode::End => {
                self.cursor = self.char_len();
                false
            }
            _ => false,
        }
    }

    fn delete_word(&mut self) -> bool {
        let chars: Vec<char> = self.text.chars().collect();
        let mut start = self.cursor;
        while start > 0 && chars[start - 1].is_whitespace() {
            start -= 1;
        }
        while start > 0 && !chars[start - 1].is_whitespace() {
            start -= 1;
        }
        if start == self.cursor {
            return false;
        }
        let (from, to) = (self.byte_offset(start), self.byte_offset(self.cursor));
        self.text.replace_range(from..to, "");
        self.cursor = start;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn typed(s: &str) -> LineBuffer {
        let mut line = LineBuffer::default();
        for c in s.chars() {
            line.apply(&key(KeyCode::Char(c)));
        }
        line
    }

    #[test]
    fn typing_and_backspace() {
        let mut line = typed("mian");
        line.apply(&key(KeyCode::Backspace));
        assert_eq!(line.as_str(), "mia");
        assert!(!line.apply(&key(KeyCode::Enter)));
    }

    #[test]
    fn insert_in_middle_with_unicode() {
        let mut line = typed("fé");
        line.apply(&key(KeyCode::Left));
        line.apply(&key(KeyCode::Char('x')));
        assert_eq!(line.as_str(), "fxé");
        line.apply(&key(KeyCode::Delete));
        assert_eq!(line.as_str(), "fx");
    }

    #[test]
    fn backspace_on_empty_is_noop() {
        let mut line = LineBuffer::default();
        assert!(!line.apply(&key(KeyCode::Backspace)));
    }

    #[test]
    fn ctrl_w_deletes_previous_word() {
        let mut line = typed("feature login");
        assert!(line.apply(&ctrl('w')));
        assert_eq!(line.as_str(), "feature ");
        line.apply(&ctrl('u'));
        assert_eq!(line.as_str(), "");
    }

    #[test]
    fn control_chars_are_not_inserted() {
        let mut line = LineBuffer::default();
        assert!(!line.apply(&ctrl('n')));
        assert_eq!(line.as_str(), "");
    }

    #[test]
    fn navigation_keys() {
        assert_eq!(navigation(&key(KeyCode::Up)), Some(Step::Up));
        assert_eq!(navigation(&ctrl('n')), Some(Step::Down));
        assert_eq!(navigation(&key(KeyCode::Char('j'))), None);
        assert_eq!(navigation(&key(KeyCode::Char('k'))), None);
    }
}
