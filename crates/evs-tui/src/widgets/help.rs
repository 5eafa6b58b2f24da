//! Help popup — centred floating overlay listing all keybindings.
//!
//! Toggle with `?`; close with `?` or `Escape`.

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph, Widget},
};

pub const BINDINGS: &[(&str, &str)] = &[
    ("s", "Open the search form"),
    ("Enter", "Run search (form) / show event (index)"),
    ("Escape", "Close form, command line or help"),
    ("c", "Close the event viewer"),
    ("d", "Toggle dark / light theme"),
    ("Tab", "Cycle focus: form → index → event"),
    ("↑ k  /  ↓ j", "Move in index or scroll event"),
    ("← h  /  → l", "Collapse / expand the index"),
    ("PageUp  /  Ctrl+u", "Scroll event up"),
    ("PageDown / Ctrl+d", "Scroll event down"),
    ("g  /  G", "Jump to top / bottom"),
    (":", "Command line (search, limit, theme, q, help)"),
    ("?", "Toggle this help popup"),
    ("q  /  Ctrl+c", "Quit"),
];

pub struct HelpPopup<'a> {
    theme: &'a Theme,
}

impl<'a> HelpPopup<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }
}

impl Widget for HelpPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let popup = centered_rect(72, BINDINGS.len() as u16 + 2, area);
        Clear.render(popup, buf);

        let block = Block::bordered()
            .title(" evs — keybindings (? to close) ")
            .border_style(self.theme.border_focused)
            .style(self.theme.base);

        let inner = block.inner(popup);
        block.render(popup, buf);

        let lines: Vec<Line> = BINDINGS
            .iter()
            .map(|(key, desc)| {
                Line::from(vec![
                    Span::styled(
                        format!("  {:<22}", key),
                        self.theme.base.add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(*desc),
                ])
            })
            .collect();

        Paragraph::new(lines).render(inner, buf);
    }
}

pub(crate) fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}
