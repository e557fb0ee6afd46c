//! Prompt entries: choices and separators.

use std::borrow::Cow;
use std::fmt::Display;

use ratatui::style::Color;

/// Default separator line.
const SEPARATOR_LINE: &str = "──────────────";

/// Label shown after a disabled choice without a custom reason.
const DISABLED_LABEL: &str = "(disabled)";

/// Foreground colour for a select choice.
///
/// Each colour has a base variant used for ordinary rows and a bright variant
/// used when the row is highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceColor {
    /// Black / bright black.
    Black,
    /// Red / bright red.
    Red,
    /// Green / bright green.
    Green,
    /// Yellow / bright yellow.
    Yellow,
    /// Blue / bright blue.
    Blue,
    /// Magenta / bright magenta.
    Magenta,
    /// Cyan / bright cyan.
    Cyan,
    /// White / bright white.
    White,
}

impl ChoiceColor {
    /// Terminal colour for ordinary rows.
    pub fn base(self) -> Color {
        match self {
            Self::Black => Color::Black,
            Self::Red => Color::Red,
            Self::Green => Color::Green,
            Self::Yellow => Color::Yellow,
            Self::Blue => Color::Blue,
            Self::Magenta => Color::Magenta,
            Self::Cyan => Color::Cyan,
            Self::White => Color::Gray,
        }
    }

    /// Terminal colour for the highlighted row.
    pub fn bright(self) -> Color {
        match self {
            Self::Black => Color::DarkGray,
            Self::Red => Color::LightRed,
            Self::Green => Color::LightGreen,
            Self::Yellow => Color::LightYellow,
            Self::Blue => Color::LightBlue,
            Self::Magenta => Color::LightMagenta,
            Self::Cyan => Color::LightCyan,
            Self::White => Color::White,
        }
    }
}

/// Whether a choice can be focused.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Disabled {
    /// Selectable.
    #[default]
    No,
    /// Visible but not selectable, shown with `(disabled)`.
    Yes,
    /// Visible but not selectable, shown with a custom label.
    Reason(String),
}

impl Disabled {
    /// True unless [`Disabled::No`].
    pub fn is_disabled(&self) -> bool {
        !matches!(self, Self::No)
    }

    /// Suffix rendered after a disabled choice.
    pub fn label(&self) -> &str {
        match self {
            Self::Reason(reason) => reason,
            _ => DISABLED_LABEL,
        }
    }
}

/// A selectable (or disabled) entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice<V> {
    /// Value yielded when the choice is picked.
    pub value: V,
    /// Display name; the value is shown when absent.
    pub name: Option<String>,
    /// Extra line shown below the list while the choice is highlighted.
    pub description: Option<String>,
    /// Disabled state.
    pub disabled: Disabled,
    /// Initial checked state (checkbox only).
    pub checked: bool,
    /// Row colour (select only).
    pub color: Option<ChoiceColor>,
}

impl<V> Choice<V> {
    /// A plain choice showing its value.
    pub fn new(value: V) -> Self {
        Self {
            value,
            name: None,
            description: None,
            disabled: Disabled::No,
            checked: false,
            color: None,
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark as disabled.
    #[must_use]
    pub fn disabled(mut self, disabled: Disabled) -> Self {
        self.disabled = disabled;
        self
    }

    /// Set the initial checked state.
    #[must_use]
    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    /// Set the row colour.
    #[must_use]
    pub fn color(mut self, color: ChoiceColor) -> Self {
        self.color = Some(color);
        self
    }

    /// Not disabled.
    pub fn is_selectable(&self) -> bool {
        !self.disabled.is_disabled()
    }
}

impl<V: Display> Choice<V> {
    /// Text shown for this choice.
    pub fn label(&self) -> Cow<'_, str> {
        match &self.name {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(self.value.to_string()),
        }
    }
}

/// A non-selectable divider line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Separator {
    /// Divider text. The filterable prompts drop separators from their rows.
    pub text: String,
}

impl Separator {
    /// A separator with custom text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Default for Separator {
    fn default() -> Self {
        Self::new(SEPARATOR_LINE)
    }
}

/// One entry of a prompt's list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry<V> {
    /// A choice.
    Choice(Choice<V>),
    /// A divider.
    Separator(Separator),
}

impl<V> Entry<V> {
    /// The choice, unless this is a separator.
    pub fn as_choice(&self) -> Option<&Choice<V>> {
        match self {
            Self::Choice(choice) => Some(choice),
            Self::Separator(_) => None,
        }
    }

    /// A choice that is not disabled.
    pub fn is_selectable(&self) -> bool {
        self.as_choice().is_some_and(Choice::is_selectable)
    }
}

impl<V> From<Choice<V>> for Entry<V> {
    fn from(choice: Choice<V>) -> Self {
        Self::Choice(choice)
    }
}

impl<V> From<Separator> for Entry<V> {
    fn from(separator: Separator) -> Self {
        Self::Separator(separator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_falls_back_to_value() {
        assert_eq!(Choice::new("json").label(), "json");
        assert_eq!(Choice::new("json").name("JSON").label(), "JSON");
    }

    #[test]
    fn disabled_labels() {
        assert_eq!(Disabled::Yes.label(), "(disabled)");
        assert_eq!(Disabled::Reason("(no eslint)".into()).label(), "(no eslint)");
        assert!(!Disabled::No.is_disabled());
    }

    #[test]
    fn separators_are_never_selectable() {
        let sep: Entry<&str> = Separator::default().into();
        assert!(!sep.is_selectable());
        let disabled: Entry<&str> = Choice::new("x").disabled(Disabled::Yes).into();
        assert!(!disabled.is_selectable());
        let plain: Entry<&str> = Choice::new("x").into();
        assert!(plain.is_selectable());
    }
}
