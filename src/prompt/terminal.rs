//! Drives a [`Prompt`] inline on the real terminal.

use std::io::{self, Stdout, Write};

use crossterm::cursor::{Hide, MoveToColumn, MoveUp, Show};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::style::{self as cstyle, Attribute, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{self, disable_raw_mode, enable_raw_mode, Clear, ClearType};
use crossterm::{execute, queue};
use ratatui::style::{Color, Modifier};
use ratatui::text::{Span, Text};

use super::input::is_interrupt;
use super::{Prompt, PromptError};

/// Run `prompt` until it produces a value.
///
/// Ctrl-C and Ctrl-D abort with [`PromptError::Interrupted`]. The terminal is
/// restored on every exit path, including SIGINT/SIGTERM/SIGQUIT.
pub fn run<P: Prompt>(mut prompt: P) -> Result<P::Output, PromptError> {
    let _timer = crate::metrics::Timer::start("prompt_run");
    let _session = Session::enter()?;
    let _signals = SignalScope::install();

    let mut stdout = io::stdout();
    let mut screen = InlineScreen::default();
    screen.paint(&mut stdout, &prompt.render())?;

    loop {
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if is_interrupt(&key) {
                    execute!(stdout, Print("\r\n"))?;
                    return Err(PromptError::Interrupted);
                }
                if let Some(output) = prompt.handle_key(key) {
                    screen.paint(&mut stdout, &prompt.render())?;
                    execute!(stdout, Print("\r\n"))?;
                    return Ok(output);
                }
                screen.paint(&mut stdout, &prompt.render())?;
            }
            Event::Resize(_, _) => screen.paint(&mut stdout, &prompt.render())?,
            _ => {}
        }
    }
}

/// Put the terminal back the way we found it. Safe to call more than once.
fn restore_terminal() {
    let _ = execute!(io::stdout(), Show);
    let _ = disable_raw_mode();
    let _ = io::stdout().flush();
}

/// RAII guard for raw mode and the hidden cursor.
struct Session;

impl Session {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        if let Err(e) = execute!(io::stdout(), Hide) {
            let _ = disable_raw_mode();
            return Err(e);
        }
        Ok(Self)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        restore_terminal();
    }
}

/// Restores the terminal and exits with `128 + signal` if a termination
/// signal arrives while a prompt is on screen.
#[cfg(unix)]
struct SignalScope {
    handle: signal_hook::iterator::Handle,
    thread: Option<std::thread::JoinHandle<()>>,
}

#[cfg(unix)]
impl SignalScope {
    fn install() -> Option<Self> {
        use signal_hook::consts::{SIGINT, SIGQUIT, SIGTERM};

        let mut signals = match signal_hook::iterator::Signals::new([SIGINT, SIGTERM, SIGQUIT]) {
            Ok(signals) => signals,
            Err(e) => {
                tracing::warn!(error = %e, "could not install signal handlers");
                return None;
            }
        };
        let handle = signals.handle();
        let thread = std::thread::spawn(move || {
            if let Some(sig) = signals.forever().next() {
                restore_terminal();
                let _ = io::stdout().write_all(b"\n");
                std::process::exit(128 + sig);
            }
        });

        Some(Self {
            handle,
            thread: Some(thread),
        })
    }
}

#[cfg(unix)]
impl Drop for SignalScope {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

#[cfg(not(unix))]
struct SignalScope;

#[cfg(not(unix))]
impl SignalScope {
    fn install() -> Option<Self> {
        None
    }
}

/// Repaints frames in place below the cursor.
#[derive(Debug, Default)]
struct InlineScreen {
    /// Terminal rows covered by the last frame.
    height: u16,
}

impl InlineScreen {
    fn paint(&mut self, out: &mut Stdout, text: &Text<'_>) -> io::Result<()> {
        let cols = terminal::size().map(|(cols, _)| cols).unwrap_or(80).max(1);

        queue!(out, MoveToColumn(0))?;
        if self.height > 1 {
            queue!(out, MoveUp(self.height - 1))?;
        }
        queue!(out, Clear(ClearType::FromCursorDown))?;

        for (i, line) in text.lines.iter().enumerate() {
            if i > 0 {
                queue!(out, Print("\r\n"))?;
            }
            for span in &line.spans {
                queue_span(out, span)?;
            }
        }
        out.flush()?;

        self.height = frame_height(text, cols);
        Ok(())
    }
}

/// Rows a frame occupies once long lines wrap at `cols`.
fn frame_height(text: &Text<'_>, cols: u16) -> u16 {
    let cols = usize::from(cols.max(1));
    let rows: usize = text
        .lines
        .iter()
        .map(|line| line.width().div_ceil(cols).max(1))
        .sum();
    u16::try_from(rows.max(1)).unwrap_or(u16::MAX)
}

fn queue_span(out: &mut Stdout, span: &Span<'_>) -> io::Result<()> {
    let styled = span.style.fg.is_some() || !span.style.add_modifier.is_empty();
    if let Some(color) = span.style.fg {
        queue!(out, SetForegroundColor(to_crossterm(color)))?;
    }
    if span.style.add_modifier.contains(Modifier::BOLD) {
        queue!(out, SetAttribute(Attribute::Bold))?;
    }
    if span.style.add_modifier.contains(Modifier::DIM) {
        queue!(out, SetAttribute(Attribute::Dim))?;
    }
    queue!(out, Print(span.content.as_ref()))?;
    if styled {
        queue!(out, SetAttribute(Attribute::Reset), ResetColor)?;
    }
    Ok(())
}

fn to_crossterm(color: Color) -> cstyle::Color {
    use cstyle::Color as C;
    match color {
        Color::Reset => C::Reset,
        Color::Black => C::Black,
        Color::Red => C::DarkRed,
        Color::Green => C::DarkGreen,
        Color::Yellow => C::DarkYellow,
        Color::Blue => C::DarkBlue,
        Color::Magenta => C::DarkMagenta,
        Color::Cyan => C::DarkCyan,
        Color::Gray => C::Grey,
        Color::DarkGray => C::DarkGrey,
        Color::LightRed => C::Red,
        Color::LightGreen => C::Green,
        Color::LightYellow => C::Yellow,
        Color::LightBlue => C::Blue,
        Color::LightMagenta => C::Magenta,
        Color::LightCyan => C::Cyan,
        Color::White => C::White,
        Color::Rgb(r, g, b) => C::Rgb { r, g, b },
        Color::Indexed(i) => C::AnsiValue(i),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::text::Line;

    #[test]
    fn colors_map_to_ansi_pairs() {
        assert_eq!(to_crossterm(Color::Red), cstyle::Color::DarkRed);
        assert_eq!(to_crossterm(Color::LightRed), cstyle::Color::Red);
        assert_eq!(to_crossterm(Color::DarkGray), cstyle::Color::DarkGrey);
        assert_eq!(to_crossterm(Color::Indexed(42)), cstyle::Color::AnsiValue(42));
        assert_eq!(
            to_crossterm(Color::Rgb(1, 2, 3)),
            cstyle::Color::Rgb { r: 1, g: 2, b: 3 }
        );
    }

    #[test]
    fn frame_height_counts_wrapped_rows() {
        let text = Text::from(vec![
            Line::from("short"),
            Line::from("x".repeat(25)),
            Line::default(),
        ]);
        assert_eq!(frame_height(&text, 10), 1 + 3 + 1);
        assert_eq!(frame_height(&Text::default(), 10), 1);
    }
}
