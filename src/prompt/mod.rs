//! Interactive terminal prompts.
//!
//! [`SelectPrompt`] picks one value, [`CheckboxPrompt`] picks any number.
//! Both are plain state machines fed with key events; [`run`] drives one
//! against the real terminal.

mod checkbox;
mod choice;
mod filter;
mod input;
mod paginate;
mod select;
mod style;
mod terminal;

use crossterm::event::KeyEvent;
use ratatui::text::Text;

pub use checkbox::{CheckboxConfig, CheckboxPrompt};
pub use choice::{Choice, ChoiceColor, Disabled, Entry, Separator};
pub use select::{SelectConfig, SelectPrompt};
pub use terminal::run;

/// Errors from building or running a prompt.
#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    /// Every entry is a separator or disabled.
    #[error("no selectable choices")]
    NoSelectableChoices,
    /// The user pressed Ctrl-C or Ctrl-D.
    #[error("prompt interrupted")]
    Interrupted,
    /// Terminal I/O failed.
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Prompt lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Waiting for input.
    Pending,
    /// An answer was produced; further keys are ignored.
    Done,
}

/// A prompt the terminal driver can render and feed keys to.
pub trait Prompt {
    /// Value produced when the prompt finishes.
    type Output;

    /// Apply one key. `Some` finishes the prompt.
    fn handle_key(&mut self, key: KeyEvent) -> Option<Self::Output>;

    /// The frame to paint for the current state.
    fn render(&mut self) -> Text<'static>;
}
