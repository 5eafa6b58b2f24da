//! Event tree widget — the result index in the left pane.
//!
//! One root node ("Events") with one leaf per matched record, labelled by
//! its creation time. Leaves carry the record's ordinal; the app shell uses
//! it to fetch the record for the detail view.
//!
//! # Navigation
//! - `↑`/`k` and `↓`/`j` move the cursor up and down the visible list.
//! - `→`/`l` expands the focused node; `←`/`h` collapses it.
//! - `Enter` on the root toggles it; on a leaf it re-selects the record.
//! - `g` / `G` jump to the first / last row.

use crate::event::{AppEvent, Direction};
use crate::theme::Theme;
use evs_core::IndexEntry;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::Line,
    widgets::{Block, List, ListItem, ListState, StatefulWidget, Widget},
};

pub const ROOT_LABEL: &str = "Events";

// ---------------------------------------------------------------------------
// Tree node
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub label: String,
    /// Position of the record in the result list. `None` for the root.
    pub ordinal: Option<usize>,
    pub expanded: bool,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn root(children: Vec<TreeNode>) -> Self {
        Self {
            label: ROOT_LABEL.to_string(),
            ordinal: None,
            expanded: true,
            children,
        }
    }

    pub fn leaf(ordinal: usize, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ordinal: Some(ordinal),
            expanded: false,
            children: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tree state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct EventTreeState {
    pub nodes: Vec<TreeNode>,
    /// Index into the currently-visible (flattened) list.
    pub cursor: usize,
}

impl EventTreeState {
    /// Replace the tree with one built from a result index. The cursor lands
    /// on the first record when there is one.
    pub fn load(&mut self, index: &[IndexEntry], timestamp_format: &str) {
        let children = index
            .iter()
            .map(|entry| TreeNode::leaf(entry.ordinal, entry.display_label(timestamp_format)))
            .collect();
        self.nodes = vec![TreeNode::root(children)];
        self.cursor = if index.is_empty() { 0 } else { 1 };
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.cursor = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Flatten the tree into `(depth, &node)` pairs, respecting expanded state.
    pub fn visible(&self) -> Vec<(usize, &TreeNode)> {
        flatten(&self.nodes, 0)
    }

    /// Ordinal of the record under the cursor, if the cursor is on a leaf.
    pub fn selected_ordinal(&self) -> Option<usize> {
        self.visible()
            .get(self.cursor)
            .and_then(|(_, node)| node.ordinal)
    }

    /// Handle an [`AppEvent`]. Returns the ordinal to display when the event
    /// selected a record.
    pub fn handle(&mut self, event: &AppEvent) -> Option<usize> {
        let before = self.selected_ordinal();
        match event {
            AppEvent::TreeNav(Direction::Up) => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            AppEvent::TreeNav(Direction::Down) => {
                let max = self.visible().len().saturating_sub(1);
                if self.cursor < max {
                    self.cursor += 1;
                }
            }
            AppEvent::ScrollToTop => self.cursor = 0,
            AppEvent::ScrollToBottom => {
                self.cursor = self.visible().len().saturating_sub(1);
            }
            AppEvent::TreeNav(Direction::Right) => self.set_root_expanded(true),
            AppEvent::TreeNav(Direction::Left) => {
                // Collapsing from a leaf moves the cursor to its parent
                self.set_root_expanded(false);
                self.cursor = 0;
            }
            AppEvent::Enter => {
                if before.is_some() {
                    return before;
                }
                let expanded = self.nodes.first().is_some_and(|root| root.expanded);
                self.set_root_expanded(!expanded);
            }
            _ => return None,
        }
        self.clamp_cursor();
        tracing::debug!(cursor = self.cursor, "tree: cursor moved");

        let after = self.selected_ordinal();
        if after != before {
            after
        } else {
            None
        }
    }

    fn set_root_expanded(&mut self, expanded: bool) {
        if let Some(root) = self.nodes.first_mut() {
            root.expanded = expanded;
        }
    }

    fn clamp_cursor(&mut self) {
        let max = self.visible().len().saturating_sub(1);
        if self.cursor > max {
            self.cursor = max;
        }
    }
}

fn flatten(nodes: &[TreeNode], depth: usize) -> Vec<(usize, &TreeNode)> {
    let mut out = Vec::new();
    for node in nodes {
        out.push((depth, node));
        if node.expanded {
            out.extend(flatten(&node.children, depth + 1));
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Widget
// ---------------------------------------------------------------------------

pub struct EventTree<'a> {
    state: &'a EventTreeState,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> EventTree<'a> {
    pub fn new(state: &'a EventTreeState, focused: bool, theme: &'a Theme) -> Self {
        Self {
            state,
            focused,
            theme,
        }
    }
}

impl Widget for EventTree<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .title("Index")
            .border_style(self.theme.border(self.focused))
            .style(self.theme.base);

        let inner = block.inner(area);
        block.render(area, buf);

        let items: Vec<ListItem> = self
            .state
            .visible()
            .iter()
            .map(|(depth, node)| {
                let indent = "  ".repeat(*depth);
                if node.ordinal.is_none() {
                    let expand = if node.expanded { "▼ " } else { "▶ " };
                    let line = format!("{indent}{expand}{} ({})", node.label, node.children.len());
                    ListItem::new(Line::styled(line, self.theme.tree_root))
                } else {
                    ListItem::new(Line::from(format!("{indent}  {}", node.label)))
                }
            })
            .collect();

        let list = List::new(items).highlight_style(self.theme.tree_highlight);
        let mut list_state = ListState::default().with_selected(Some(self.state.cursor));
        StatefulWidget::render(list, inner, buf, &mut list_state);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
