//! Drives the prompts through their public API with synthetic key events.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fflt::prompt::{
    CheckboxConfig, CheckboxPrompt, Choice, Disabled, Entry, SelectConfig, SelectPrompt, Separator,
    Status,
};

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
}

fn branches() -> Vec<Entry<String>> {
    ["main", "develop", "feature/login", "feature/logout", "fix/typo"]
        .into_iter()
        .map(|b| Choice::new(b.to_string()).into())
        .collect()
}

#[test]
fn select_branch_by_typing() {
    let mut prompt = SelectPrompt::new(SelectConfig::new("Branch", branches())).unwrap();
    for c in "logout".chars() {
        assert_eq!(prompt.handle_key(key(KeyCode::Char(c))), None);
    }
    assert_eq!(
        prompt.handle_key(key(KeyCode::Enter)),
        Some("feature/logout".to_string())
    );
}

#[test]
fn select_extended_syntax_negation() {
    let mut prompt = SelectPrompt::new(SelectConfig::new("Branch", branches())).unwrap();
    for c in "feature !logout".chars() {
        prompt.handle_key(key(KeyCode::Char(c)));
    }
    assert_eq!(prompt.highlighted().map(|c| c.value.as_str()), Some("feature/login"));
    prompt.handle_key(key(KeyCode::Down));
    assert_eq!(prompt.highlighted().map(|c| c.value.as_str()), Some("feature/login"));
}

#[test]
fn select_ctrl_n_and_ctrl_p_navigate() {
    let mut prompt = SelectPrompt::new(SelectConfig::new("Branch", branches())).unwrap();
    prompt.handle_key(ctrl('n'));
    prompt.handle_key(ctrl('n'));
    prompt.handle_key(ctrl('p'));
    assert_eq!(prompt.highlighted().map(|c| c.value.as_str()), Some("develop"));
    assert_eq!(prompt.query(), "");
}

#[test]
fn select_ctrl_u_clears_query() {
    let mut prompt = SelectPrompt::new(SelectConfig::new("Branch", branches())).unwrap();
    for c in "fix".chars() {
        prompt.handle_key(key(KeyCode::Char(c)));
    }
    prompt.handle_key(ctrl('u'));
    assert_eq!(prompt.query(), "");
    assert_eq!(prompt.highlighted().map(|c| c.value.as_str()), Some("main"));
}

#[test]
fn checkbox_pick_scripts_across_separator() {
    let choices: Vec<Entry<&str>> = vec![
        Choice::new("lint").checked(true).into(),
        Choice::new("lint:fix").into(),
        Separator::new("-- other --").into(),
        Choice::new("build").disabled(Disabled::Reason("(slow)".into())).into(),
        Choice::new("format").into(),
    ];
    let mut prompt = CheckboxPrompt::new(CheckboxConfig::new("Scripts", choices));

    // lint -> lint:fix -> format (separator and disabled rows are skipped)
    prompt.handle_key(key(KeyCode::Down));
    prompt.handle_key(key(KeyCode::Down));
    prompt.handle_key(key(KeyCode::Char(' ')));
    assert_eq!(prompt.highlighted().map(|c| c.value), Some("format"));

    assert_eq!(
        prompt.handle_key(key(KeyCode::Enter)),
        Some(vec!["lint", "format"])
    );
    assert_eq!(prompt.status(), Status::Done);
}

#[test]
fn checkbox_find_then_toggle() {
    let choices: Vec<Entry<&str>> = vec![
        Choice::new("typecheck").into(),
        Choice::new("format").into(),
        Choice::new("fix").into(),
    ];
    let mut prompt = CheckboxPrompt::new(CheckboxConfig::new("Scripts", choices));
    prompt.handle_key(key(KeyCode::Char('f')));
    for c in "^fo".chars() {
        prompt.handle_key(key(KeyCode::Char(c)));
    }
    prompt.handle_key(key(KeyCode::Enter));
    prompt.handle_key(key(KeyCode::Char(' ')));
    assert_eq!(prompt.handle_key(key(KeyCode::Enter)), Some(vec!["format"]));
}
