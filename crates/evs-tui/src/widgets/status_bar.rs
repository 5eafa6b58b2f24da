//! Status strip at the top of the screen and the notice line at the bottom.
//!
//! The status bar shows the target directory, the search state (with a
//! spinner and live match count while running) and keybinding hints. The
//! notice line shows the most recent [`Notice`](evs_core::Notice)-style
//! message, coloured by severity.

use crate::theme::Theme;
use evs_core::{SearchLimit, SearchProgress, SearchState, Severity};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};

const SPINNER: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
const HINT: &str = " s:search  ?:help  q:quit ";

/// Search progress as the status bar renders it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchStatus {
    pub state: SearchState,
    pub progress: Option<SearchProgress>,
    /// Records in the finished result.
    pub results: usize,
    pub limit: SearchLimit,
}

impl SearchStatus {
    /// Text for the state segment. `tick` advances the spinner.
    pub fn describe(&self, tick: u64) -> String {
        match self.state {
            SearchState::Idle => "idle".to_string(),
            SearchState::Running => {
                let frame = SPINNER[(tick as usize) % SPINNER.len()];
                match self.progress {
                    Some(p) => format!(
                        "{frame} searching  {} matches · file {}/{}",
                        p.matched, p.files_done, p.files_total
                    ),
                    None => format!("{frame} searching"),
                }
            }
            SearchState::Completed => format!("{} events", self.results),
            SearchState::Truncated => {
                format!("{} events (limit {} reached)", self.results, self.limit)
            }
            SearchState::Failed => "search failed".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Status bar
// ---------------------------------------------------------------------------

pub struct StatusBar<'a> {
    directory: &'a str,
    status: SearchStatus,
    tick: u64,
    theme: &'a Theme,
}

impl<'a> StatusBar<'a> {
    pub fn new(directory: &'a str, status: SearchStatus, tick: u64, theme: &'a Theme) -> Self {
        Self {
            directory,
            status,
            tick,
            theme,
        }
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, self.theme.status_bar);

        let state_style = match self.status.state {
            SearchState::Running => self.theme.status_spinner,
            SearchState::Failed => self.theme.notice_error,
            SearchState::Truncated => self.theme.notice_warning,
            _ => self.theme.status_bar,
        };
        let line = Line::from(vec![
            Span::styled(" evs ", self.theme.status_title),
            Span::raw(format!(" {} ", self.directory)),
            Span::raw("│ "),
            Span::styled(self.status.describe(self.tick), state_style),
        ]);
        buf.set_line(area.x, area.y, &line, area.width);

        let hint_x = area.right().saturating_sub(HINT.len() as u16);
        buf.set_string(hint_x, area.y, HINT, self.theme.status_hint);
    }
}

// ---------------------------------------------------------------------------
// Notice line
// ---------------------------------------------------------------------------

/// A message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusNotice {
    pub severity: Severity,
    pub text: String,
}

impl StatusNotice {
    pub fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self {
            severity,
            text: text.into(),
        }
    }
}

pub struct NoticeLine<'a> {
    notice: Option<&'a StatusNotice>,
    /// Notices beyond the one displayed, from the same search.
    more: usize,
    theme: &'a Theme,
}

impl<'a> NoticeLine<'a> {
    pub fn new(notice: Option<&'a StatusNotice>, more: usize, theme: &'a Theme) -> Self {
        Self { notice, more, theme }
    }
}

impl Widget for NoticeLine<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, self.theme.base);
        let Some(notice) = self.notice else {
            return;
        };
        let mut spans = vec![Span::styled(
            format!(" {}", notice.text),
            self.theme.notice_style(notice.severity),
        )];
        if self.more > 0 {
            spans.push(Span::styled(
                format!("  (+{} more)", self.more),
                self.theme.status_hint,
            ));
        }
        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn status(state: SearchState) -> SearchStatus {
        SearchStatus {
            state,
            progress: None,
            results: 0,
            limit: SearchLimit::default(),
        }
    }

    #[test]
    fn running_shows_spinner_and_live_counts() {
        let mut s = status(SearchState::Running);
        s.progress = Some(SearchProgress {
            files_done: 1,
            files_total: 3,
            matched: 42,
        });
        assert_eq!(s.describe(0), "⠋ searching  42 matches · file 1/3");
        assert!(s.describe(1).starts_with('⠙'));
    }

    #[test]
    fn finished_states_describe_results() {
        let mut s = status(SearchState::Completed);
        s.results = 7;
        assert_eq!(s.describe(0), "7 events");

        s.state = SearchState::Truncated;
        s.limit = SearchLimit::new(7).unwrap();
        assert_eq!(s.describe(0), "7 events (limit 7 reached)");

        assert_eq!(status(SearchState::Failed).describe(0), "search failed");
        assert_eq!(status(SearchState::Idle).describe(0), "idle");
    }
}
