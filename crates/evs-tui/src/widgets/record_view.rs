//! Record detail widget — the selected event as pretty-printed JSON.
//!
//! # Navigation (when pane is focused)
//!
//! | Key | Action |
//! |-----|--------|
//! | `↑` / `k`, `↓` / `j` | Scroll one line |
//! | `PageUp` / `Ctrl+u`, `PageDown` / `Ctrl+d` | Scroll one page |
//! | `g` / `G` | Jump to top / bottom |
//!
//! `PageUp` / `PageDown` are forwarded here from the tree pane as well, so
//! the detail view can be scrolled without leaving the index.

use std::cell::Cell;

use crate::event::{AppEvent, Direction};
use crate::theme::Theme;
use evs_core::Record;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget, Widget,
    },
};

const PAGE_STEP: usize = 10;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

pub struct RecordViewState {
    /// Ordinal of the displayed record.
    pub ordinal: Option<usize>,
    /// File the record was read from, for the pane title.
    pub source: Option<String>,
    pub lines: Vec<String>,
    /// First visible line.
    pub scroll: usize,
    /// Cached from the last render so `handle()` can clamp page scrolling.
    last_height: Cell<usize>,
}

impl Default for RecordViewState {
    fn default() -> Self {
        Self {
            ordinal: None,
            source: None,
            lines: Vec::new(),
            scroll: 0,
            last_height: Cell::new(20),
        }
    }
}

impl RecordViewState {
    /// Display `record` from the top.
    pub fn show(&mut self, ordinal: usize, record: &Record) {
        let pretty = serde_json::to_string_pretty(record.data())
            .unwrap_or_else(|err| format!("<unprintable record: {err}>"));
        self.ordinal = Some(ordinal);
        self.source = record
            .source()
            .and_then(|p| p.file_name())
            .map(|name| name.to_string_lossy().into_owned());
        self.lines = pretty.lines().map(str::to_owned).collect();
        self.scroll = 0;
    }

    pub fn clear(&mut self) {
        self.ordinal = None;
        self.source = None;
        self.lines.clear();
        self.scroll = 0;
    }

    fn max_scroll(&self) -> usize {
        self.lines
            .len()
            .saturating_sub(self.last_height.get().max(1))
    }

    pub fn handle(&mut self, event: &AppEvent) {
        let before = self.scroll;
        match event {
            AppEvent::TreeNav(Direction::Up) => self.scroll = self.scroll.saturating_sub(1),
            AppEvent::TreeNav(Direction::Down) => self.scroll += 1,
            AppEvent::ScrollUp => self.scroll = self.scroll.saturating_sub(PAGE_STEP),
            AppEvent::ScrollDown => self.scroll += PAGE_STEP,
            AppEvent::ScrollToTop => self.scroll = 0,
            AppEvent::ScrollToBottom => self.scroll = usize::MAX,
            _ => return,
        }
        self.scroll = self.scroll.min(self.max_scroll());
        if self.scroll != before {
            tracing::debug!(scroll = self.scroll, "detail: scrolled");
        }
    }
}

// ---------------------------------------------------------------------------
// Widget
// ---------------------------------------------------------------------------

pub struct RecordView<'a> {
    state: &'a RecordViewState,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> RecordView<'a> {
    pub fn new(state: &'a RecordViewState, focused: bool, theme: &'a Theme) -> Self {
        Self { state, focused, theme }
    }
}

impl Widget for RecordView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = match (self.state.ordinal, &self.state.source) {
            (Some(n), Some(file)) => format!("Event #{} · {file}", n + 1),
            (Some(n), None) => format!("Event #{}", n + 1),
            (None, _) => "Event".to_string(),
        };
        let block = Block::bordered()
            .title(title)
            .border_style(self.theme.border(self.focused))
            .style(self.theme.base);
        let inner = block.inner(area);
        block.render(area, buf);

        let height = inner.height as usize;
        // Cache for handle(); draw always runs before the next key is read
        self.state.last_height.set(height);

        if self.state.lines.is_empty() {
            Paragraph::new(Line::styled(
                "no event selected",
                Style::default().add_modifier(Modifier::DIM),
            ))
            .render(inner, buf);
            return;
        }

        let text_area = Rect { width: inner.width.saturating_sub(1), ..inner };
        let sb_area = Rect {
            x: inner.right().saturating_sub(1),
            width: 1,
            ..inner
        };

        let total = self.state.lines.len();
        let start = self.state.scroll.min(total);
        let end = (start + height).min(total);
        let lines: Vec<Line<'static>> = self.state.lines[start..end]
            .iter()
            .map(|line| highlight_json_line(line, self.theme))
            .collect();
        Paragraph::new(lines).render(text_area, buf);

        let mut sb_state = ScrollbarState::new(total)
            .position(start)
            .viewport_content_length(height);
        StatefulWidget::render(
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(None)
                .end_symbol(None),
            sb_area,
            buf,
            &mut sb_state,
        );
    }
}

// ---------------------------------------------------------------------------
// JSON colouring
// ---------------------------------------------------------------------------

/// Colour one line of `serde_json::to_string_pretty` output.
///
/// Pretty output puts at most one `"key": value` pair per line, so a line is
/// indent, optional key, optional scalar or bracket, optional comma.
pub fn highlight_json_line(line: &str, theme: &Theme) -> Line<'static> {
    let trimmed = line.trim_start();
    let mut spans = vec![Span::raw(line[..line.len() - trimmed.len()].to_string())];
    let mut rest = trimmed;

    if let Some(end) = string_end(rest) {
        if let Some(after) = rest[end..].strip_prefix(':') {
            spans.push(Span::styled(rest[..end].to_string(), theme.json_key));
            spans.push(Span::styled(":", theme.json_punctuation));
            rest = after;
        }
    }

    let (value, comma) = match rest.strip_suffix(',') {
        Some(value) => (value, ","),
        None => (rest, ""),
    };
    let style = match value.trim() {
        v if v.starts_with('"') => theme.json_string,
        "true" | "false" | "null" => theme.json_literal,
        v if v.starts_with(|c: char| c == '-' || c.is_ascii_digit()) => theme.json_number,
        _ => theme.json_punctuation,
    };
    if !value.is_empty() {
        spans.push(Span::styled(value.to_string(), style));
    }
    if !comma.is_empty() {
        spans.push(Span::styled(comma.to_string(), theme.json_punctuation));
    }
    Line::from(spans)
}

/// Byte offset just past the closing quote when `s` starts with a JSON string.
fn string_end(s: &str) -> Option<usize> {
    let mut chars = s.char_indices();
    if chars.next()?.1 != '"' {
        return None;
    }
    let mut escaped = false;
    for (i, c) in chars {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(i + 1),
            _ => {}
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::path::Path;
    use std::sync::Arc;

    fn spans(line: &Line<'_>) -> Vec<String> {
        line.spans.iter().map(|s| s.content.to_string()).collect()
    }

    #[test]
    fn show_pretty_prints_and_resets_scroll() {
        let mut view = RecordViewState::default();
        view.scroll = 7;
        let record = Record::new(json!({"Event": {"System": {"EventID": 4624}}}))
            .with_source(Arc::from(Path::new("/logs/Security.evtx")));

        view.show(3, &record);
        assert_eq!(view.ordinal, Some(3));
        assert_eq!(view.source.as_deref(), Some("Security.evtx"));
        assert_eq!(view.scroll, 0);
        assert_eq!(view.lines.first().map(String::as_str), Some("{"));
        assert!(view.lines.iter().any(|l| l.contains("\"EventID\": 4624")));
    }

    #[test]
    fn scrolling_is_clamped_to_content() {
        let mut view = RecordViewState::default();
        view.lines = (0..30).map(|i| i.to_string()).collect();
        view.last_height.set(20);

        view.handle(&AppEvent::ScrollDown);
        assert_eq!(view.scroll, 10);
        view.handle(&AppEvent::ScrollDown);
        assert_eq!(view.scroll, 10, "cannot scroll past the last page");
        view.handle(&AppEvent::TreeNav(Direction::Up));
        assert_eq!(view.scroll, 9);
        view.handle(&AppEvent::ScrollToTop);
        assert_eq!(view.scroll, 0);
        view.handle(&AppEvent::ScrollToBottom);
        assert_eq!(view.scroll, 10);
    }

    #[test]
    fn short_record_does_not_scroll() {
        let mut view = RecordViewState::default();
        view.lines = vec!["{".into(), "}".into()];
        view.handle(&AppEvent::ScrollDown);
        assert_eq!(view.scroll, 0);
    }

    #[test]
    fn highlight_splits_key_value_and_comma() {
        let theme = Theme::default();
        let line = highlight_json_line("    \"EventID\": 4624,", &theme);
        assert_eq!(spans(&line), vec!["    ", "\"EventID\"", ":", " 4624", ","]);
        assert_eq!(line.spans[1].style, theme.json_key);
        assert_eq!(line.spans[3].style, theme.json_number);
    }

    #[test]
    fn highlight_handles_escaped_quotes_in_keys() {
        let theme = Theme::default();
        let line = highlight_json_line(r#"  "a\"b": "c""#, &theme);
        assert_eq!(spans(&line), vec!["  ", r#""a\"b""#, ":", r#" "c""#]);
        assert_eq!(line.spans[3].style, theme.json_string);
    }

    #[test]
    fn highlight_bare_values_and_brackets() {
        let theme = Theme::default();
        assert_eq!(highlight_json_line("  null", &theme).spans[1].style, theme.json_literal);
        assert_eq!(highlight_json_line("  },", &theme).spans[1].style, theme.json_punctuation);
        // A string element in an array is a value, not a key
        let line = highlight_json_line("  \"x\",", &theme);
        assert_eq!(line.spans[1].style, theme.json_string);
    }
}
