//! Search form — read-only target path plus the event-ID input.
//!
//! # Editing
//!
//! - `Char(c)` inserts at the cursor; `Backspace` deletes before it.
//! - `TreeNav(Left)` / `TreeNav(Right)` move the cursor.
//! - `Enter` validates the input and submits; `Escape` cancels.

use crate::event::{AppEvent, Direction};
use crate::theme::Theme;
use evs_core::SearchCriterion;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph, Widget},
};

const PATH_LABEL: &str = "Path:     ";
const ID_LABEL: &str = "Event ID: ";

/// Outcome of a key press in the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormAction {
    Submit(SearchCriterion),
    /// The input did not parse; the form stays open.
    Invalid(String),
    Cancel,
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct SearchFormState {
    /// Target directory, shown read-only.
    pub directory: String,
    pub input: String,
    /// Byte offset of the cursor within `input`.
    pub cursor: usize,
    /// Validation error from the last submit, cleared on the next edit.
    pub error: Option<String>,
}

impl SearchFormState {
    pub fn new(directory: impl Into<String>, event_id: i64) -> Self {
        let input = event_id.to_string();
        Self {
            directory: directory.into(),
            cursor: input.len(),
            input,
            error: None,
        }
    }

    pub fn handle(&mut self, event: &AppEvent) -> Option<FormAction> {
        match event {
            AppEvent::Enter => match self.input.parse::<SearchCriterion>() {
                Ok(criterion) => {
                    self.error = None;
                    Some(FormAction::Submit(criterion))
                }
                Err(_) => {
                    let msg = format!("Invalid event ID: {}", self.input.trim());
                    self.error = Some(msg.clone());
                    Some(FormAction::Invalid(msg))
                }
            },
            AppEvent::Escape => Some(FormAction::Cancel),
            AppEvent::Char(c) => {
                self.error = None;
                self.input.insert(self.cursor, *c);
                self.cursor += c.len_utf8();
                None
            }
            AppEvent::Backspace => {
                self.error = None;
                if self.cursor > 0 {
                    let prev = prev_boundary(&self.input, self.cursor);
                    self.input.remove(prev);
                    self.cursor = prev;
                }
                None
            }
            AppEvent::TreeNav(Direction::Left) => {
                self.cursor = prev_boundary(&self.input, self.cursor);
                None
            }
            AppEvent::TreeNav(Direction::Right) => {
                if self.cursor < self.input.len() {
                    self.cursor = self.input[self.cursor..]
                        .char_indices()
                        .nth(1)
                        .map(|(i, _)| self.cursor + i)
                        .unwrap_or(self.input.len());
                }
                None
            }
            _ => None,
        }
    }
}

fn prev_boundary(s: &str, cursor: usize) -> usize {
    s[..cursor]
        .char_indices()
        .last()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Widget
// ---------------------------------------------------------------------------

pub struct SearchForm<'a> {
    state: &'a SearchFormState,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> SearchForm<'a> {
    /// Rows the form needs, borders included.
    pub const HEIGHT: u16 = 5;

    pub fn new(state: &'a SearchFormState, focused: bool, theme: &'a Theme) -> Self {
        Self { state, focused, theme }
    }

    /// Absolute terminal position of the text cursor for the event-ID input.
    pub fn cursor_position(&self, area: Rect) -> (u16, u16) {
        let col = (ID_LABEL.len() + self.state.input[..self.state.cursor].chars().count()) as u16;
        let x = (area.x + 1 + col).min(area.right().saturating_sub(2));
        (x, area.y + 2)
    }
}

impl Widget for SearchForm<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
        let block = Block::bordered()
            .title(" Search (Enter to run, Esc to cancel) ")
            .border_style(self.theme.border(self.focused))
            .style(self.theme.base);
        let inner = block.inner(area);
        block.render(area, buf);

        let label = Style::default().add_modifier(Modifier::BOLD);
        let mut lines = vec![
            Line::from(vec![
                Span::styled(PATH_LABEL, label),
                Span::styled(
                    self.state.directory.as_str(),
                    Style::default().add_modifier(Modifier::DIM),
                ),
            ]),
            Line::from(vec![
                Span::styled(ID_LABEL, label),
                Span::raw(self.state.input.as_str()),
            ]),
        ];
        if let Some(err) = &self.state.error {
            lines.push(Line::styled(err.as_str(), self.theme.notice_error));
        }
        Paragraph::new(lines).render(inner, buf);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
