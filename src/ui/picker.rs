//! Interactive shortcut picker
//!
//! A small state machine (`Browsing` → `Selected` | `Cancelled`) driven by
//! key events, plus a blocking loop that draws it on stderr and feeds it
//! keys from the terminal. stdout is left untouched so the chosen path can
//! be captured by a shell function.

use std::borrow::Cow;

use console::{truncate_str, Key, Term};
use owo_colors::OwoColorize;

use crate::shortcut::Shortcut;
use crate::ui::{stderr_theme, Icons};
use crate::{Error, Result};

const PROMPT: &str = "Select a shortcut (↑/↓ or j/k to move, Enter to select, q to quit):";

/// Input events the picker understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerKey {
    Up,
    Down,
    First,
    Last,
    Confirm,
    Abort,
    Ignored,
}

impl From<Key> for PickerKey {
    fn from(key: Key) -> Self {
        match key {
            Key::ArrowUp | Key::Char('k') => PickerKey::Up,
            Key::ArrowDown | Key::Char('j') => PickerKey::Down,
            Key::Home | Key::PageUp | Key::Char('g') => PickerKey::First,
            Key::End | Key::PageDown | Key::Char('G') => PickerKey::Last,
            Key::Enter => PickerKey::Confirm,
            Key::Escape | Key::Char('q') | Key::Char('\u{3}') => PickerKey::Abort,
            _ => PickerKey::Ignored,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerState {
    Browsing { cursor: usize },
    Selected(usize),
    Cancelled,
}

pub struct Picker<'a> {
    items: &'a [Shortcut],
    state: PickerState,
}

impl<'a> Picker<'a> {
    pub fn new(items: &'a [Shortcut]) -> Self {
        Self {
            items,
            state: PickerState::Browsing { cursor: 0 },
        }
    }

    pub fn state(&self) -> PickerState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        !matches!(self.state, PickerState::Browsing { .. })
    }

    /// Apply one key. Terminal states absorb every further key.
    pub fn handle(&mut self, key: PickerKey) -> PickerState {
        let PickerState::Browsing { cursor } = self.state else {
            return self.state;
        };
        let last = self.items.len().saturating_sub(1);

        self.state = match key {
            PickerKey::Up => PickerState::Browsing {
                cursor: cursor.saturating_sub(1),
            },
            PickerKey::Down => PickerState::Browsing {
                cursor: (cursor + 1).min(last),
            },
            PickerKey::First => PickerState::Browsing { cursor: 0 },
            PickerKey::Last => PickerState::Browsing { cursor: last },
            PickerKey::Confirm if !self.items.is_empty() => PickerState::Selected(cursor),
            PickerKey::Confirm | PickerKey::Abort => PickerState::Cancelled,
            PickerKey::Ignored => self.state,
        };
        self.state
    }

    pub fn selection(&self) -> Option<&'a Shortcut> {
        match self.state {
            PickerState::Selected(index) => self.items.get(index),
            _ => None,
        }
    }

    /// Lines to draw for the current state, without styling
    pub fn lines(&self) -> Vec<(bool, String)> {
        let cursor = match self.state {
            PickerState::Browsing { cursor } => Some(cursor),
            _ => None,
        };
        self.items
            .iter()
            .enumerate()
            .map(|(i, sc)| {
                let active = cursor == Some(i);
                let marker = if active { Icons::POINTER } else { " " };
                (active, format!("{} {}. {}", marker, i + 1, sc.display_line()))
            })
            .collect()
    }
}

/// Cut a row to the terminal width; a wrapped row would occupy more lines
/// than `clear_last_lines` erases on the next redraw.
fn fit_line(line: &str, width: usize) -> Cow<'_, str> {
    truncate_str(line, width, "…")
}

/// Owns the drawn region of the terminal; restores the cursor and erases
/// the picker on drop, whichever way the loop exits.
struct TerminalGuard {
    term: Term,
    drawn: usize,
}

impl TerminalGuard {
    fn acquire(term: Term) -> Result<Self> {
        term.hide_cursor()?;
        Ok(Self { term, drawn: 0 })
    }

    fn draw(&mut self, picker: &Picker<'_>) -> Result<()> {
        if self.drawn > 0 {
            self.term.clear_last_lines(self.drawn)?;
        }

        let theme = stderr_theme();
        let width = usize::from(self.term.size().1);
        let prompt = fit_line(PROMPT, width);
        self.term.write_line(&prompt.style(theme.header.clone()).to_string())?;
        self.term.write_line("")?;
        let lines = picker.lines();
        for (active, line) in &lines {
            let line = fit_line(line, width);
            if *active {
                self.term.write_line(&line.style(theme.selected.clone()).to_string())?;
            } else {
                self.term.write_line(&line)?;
            }
        }
        self.drawn = lines.len() + 2;
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.drawn > 0 {
            let _ = self.term.clear_last_lines(self.drawn);
        }
        let _ = self.term.show_cursor();
    }
}

/// Run the picker on the terminal until the user selects or cancels.
///
/// Fails with `SelectionCancelled` on abort.
pub fn pick(items: &[Shortcut]) -> Result<&Shortcut> {
    if items.is_empty() {
        return Err(Error::InvalidInput("no shortcuts to select from".to_string()));
    }

    let term = Term::stderr();
    if !term.is_term() {
        return Err(Error::InvalidInput(
            "interactive selection needs a terminal on stderr".to_string(),
        ));
    }

    let mut picker = Picker::new(items);
    let mut guard = TerminalGuard::acquire(term)?;
    while !picker.is_done() {
        guard.draw(&picker)?;
        // read_key enables raw mode for the duration of the read only
        let key = match guard.term.read_key() {
            Ok(key) => PickerKey::from(key),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => PickerKey::Abort,
            Err(e) => return Err(e.into()),
        };
        picker.handle(key);
    }
    drop(guard);

    tracing::debug!(state = ?picker.state(), "picker finished");
    picker.selection().ok_or(Error::SelectionCancelled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn items(n: usize) -> Vec<Shortcut> {
        (0..n)
            .map(|i| Shortcut::new(i as i64 + 1, format!("s{i}"), format!("/p/{i}"), Utc::now()))
            .collect()
    }

    #[test]
    fn test_cursor_clamps_at_both_ends() {
        let items = items(3);
        let mut picker = Picker::new(&items);

        assert_eq!(picker.handle(PickerKey::Up), PickerState::Browsing { cursor: 0 });
        picker.handle(PickerKey::Down);
        picker.handle(PickerKey::Down);
        assert_eq!(picker.handle(PickerKey::Down), PickerState::Browsing { cursor: 2 });
        assert_eq!(picker.handle(PickerKey::First), PickerState::Browsing { cursor: 0 });
        assert_eq!(picker.handle(PickerKey::Last), PickerState::Browsing { cursor: 2 });
    }

    #[test]
    fn test_confirm_selects_current_row() {
        let items = items(3);
        let mut picker = Picker::new(&items);
        picker.handle(PickerKey::Down);
        assert_eq!(picker.handle(PickerKey::Confirm), PickerState::Selected(1));
        assert!(picker.is_done());
        assert_eq!(picker.selection().unwrap().path, "/p/1");

        // terminal state absorbs further keys
        assert_eq!(picker.handle(PickerKey::Abort), PickerState::Selected(1));
    }

    #[test]
    fn test_abort_cancels() {
        let items = items(2);
        let mut picker = Picker::new(&items);
        picker.handle(PickerKey::Ignored);
        assert_eq!(picker.state(), PickerState::Browsing { cursor: 0 });
        assert_eq!(picker.handle(PickerKey::Abort), PickerState::Cancelled);
        assert!(picker.selection().is_none());
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(PickerKey::from(Key::Char('j')), PickerKey::Down);
        assert_eq!(PickerKey::from(Key::ArrowUp), PickerKey::Up);
        assert_eq!(PickerKey::from(Key::Enter), PickerKey::Confirm);
        assert_eq!(PickerKey::from(Key::Escape), PickerKey::Abort);
        assert_eq!(PickerKey::from(Key::Char('q')), PickerKey::Abort);
        assert_eq!(PickerKey::from(Key::Char('x')), PickerKey::Ignored);
    }

    #[test]
    fn test_lines_mark_the_cursor() {
        let items = items(2);
        let mut picker = Picker::new(&items);
        picker.handle(PickerKey::Down);

        let lines = picker.lines();
        assert_eq!(lines.len(), 2);
        assert!(!lines[0].0);
        assert!(lines[1].0);
        assert!(lines[1].1.contains("2. s1 -> /p/1"));
    }

    #[test]
    fn test_long_rows_fit_the_terminal() {
        let long = Shortcut::new(1, "deep", format!("/{}", "nested/".repeat(40)), Utc::now());
        let items = vec![long];
        let picker = Picker::new(&items);
        let (_, line) = &picker.lines()[0];

        let fitted = fit_line(line, 40);
        assert_eq!(console::measure_text_width(&fitted), 40);
        assert!(fitted.ends_with('…'));
        assert_eq!(fit_line("short", 40), "short");
    }
}
