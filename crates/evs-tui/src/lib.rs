//! evs TUI — ratatui application shell.

pub mod app;
pub mod commands;
pub mod event;
pub mod theme;
pub mod widgets;

pub use app::App;

use evs_core::{config::Config, SearchController};

/// Run the interactive viewer until the user quits.
///
/// The controller's runtime must outlive this call; the UI thread itself
/// never blocks on a search.
pub fn run(config: &Config, controller: SearchController) -> anyhow::Result<()> {
    App::new(config, controller)?.run()
}
