//! Ratatui widgets for the evs TUI.

pub mod command_bar;
pub mod event_tree;
pub mod help;
pub mod record_view;
pub mod search_form;
pub mod status_bar;
