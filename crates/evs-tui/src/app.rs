//! Top-level application state and the main event loop.
//!
//! [`App::run`] sets up the terminal, drives the crossterm event loop, and
//! tears everything down cleanly on exit or panic. Search results reach the
//! UI through [`SearchController::pump`], which the loop calls once per tick
//! with [`AppState`] as the [`SearchConsumer`].

use crate::{
    commands::Command,
    event::{self, AppEvent},
    theme::{Theme, ThemeKind},
    widgets::{
        command_bar::{CommandBar, CommandBarState},
        event_tree::{EventTree, EventTreeState},
        help::HelpPopup,
        record_view::{RecordView, RecordViewState},
        search_form::{FormAction, SearchForm, SearchFormState},
        status_bar::{NoticeLine, SearchStatus, StatusBar, StatusNotice},
    },
};
use crossterm::{
    event::{self as ct_event, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use evs_core::{
    config::{Config, UiConfig},
    Generation, IndexEntry, SearchConsumer, SearchController, SearchCriterion, SearchLimit,
    SearchProgress, SearchReport, SearchRequest, SearchState, Severity,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction as LayoutDir, Layout, Rect},
    style::Modifier,
    text::Line,
    widgets::{Block, Paragraph},
    Frame, Terminal,
};
use std::{io, path::PathBuf, time::Duration};

/// Event-loop ticks per spinner frame (~100 ms at a 16 ms poll).
const TICKS_PER_FRAME: u64 = 6;
const MAX_NOTICES: usize = 32;

// ---------------------------------------------------------------------------
// Focus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    SearchForm,
    Tree,
    Detail,
    /// Vim-style `:` command line is active.
    Command,
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

pub struct AppState {
    pub focus: Focus,
    /// Focus before entering command mode, restored on exit.
    pub prev_focus: Focus,
    pub theme: Theme,
    pub ui: UiConfig,
    pub directory: PathBuf,
    /// Result cap for the next search. `:limit` changes it.
    pub limit: SearchLimit,
    pub form: SearchFormState,
    pub form_open: bool,
    /// Index tree and detail view are mounted.
    pub viewer_open: bool,
    pub tree: EventTreeState,
    pub detail: RecordViewState,
    pub search: SearchStatus,
    /// Most severe / most recent first.
    pub notices: Vec<StatusNotice>,
    pub show_help: bool,
    pub command_bar: CommandBarState,
    pub tick: u64,
    pub quit: bool,
}

impl AppState {
    pub fn new(config: &Config, limit: SearchLimit, theme: Theme) -> Self {
        let directory = config.search.resolved_directory();
        let form = SearchFormState::new(directory.display().to_string(), config.search.event_id);
        Self {
            focus: Focus::SearchForm,
            prev_focus: Focus::SearchForm,
            theme,
            ui: config.ui.clone(),
            directory,
            limit,
            form,
            form_open: true,
            viewer_open: false,
            tree: EventTreeState::default(),
            detail: RecordViewState::default(),
            search: SearchStatus {
                state: SearchState::Idle,
                progress: None,
                results: 0,
                limit,
            },
            notices: Vec::new(),
            show_help: false,
            command_bar: CommandBarState::default(),
            tick: 0,
            quit: false,
        }
    }

    /// Show a message on the notice line, ahead of older ones.
    pub fn notify(&mut self, severity: Severity, text: impl Into<String>) {
        let notice = StatusNotice::new(severity, text);
        tracing::debug!(?severity, text = %notice.text, "notice");
        self.notices.insert(0, notice);
        self.notices.truncate(MAX_NOTICES);
    }

    fn focus_order(&self) -> Vec<Focus> {
        let mut order = Vec::with_capacity(3);
        if self.form_open {
            order.push(Focus::SearchForm);
        }
        if self.viewer_open {
            order.push(Focus::Tree);
            order.push(Focus::Detail);
        }
        order
    }

    fn focus_next(&mut self) {
        let order = self.focus_order();
        let Some(first) = order.first().copied() else {
            return;
        };
        let next = order
            .iter()
            .position(|f| *f == self.focus)
            .and_then(|i| order.get(i + 1).copied())
            .unwrap_or(first);
        tracing::debug!(from = ?self.focus, to = ?next, "focus cycle");
        self.focus = next;
    }

    fn open_form(&mut self) {
        if self.form_open {
            self.notify(Severity::Info, "Search form already open.");
        } else {
            tracing::debug!("search form opened");
            self.form_open = true;
        }
        self.focus = Focus::SearchForm;
    }

    fn close_form(&mut self) {
        self.form_open = false;
        self.focus = Focus::Tree;
    }

    fn close_viewer(&mut self) {
        tracing::debug!("viewer closed");
        self.viewer_open = false;
        if matches!(self.focus, Focus::Tree | Focus::Detail) && self.form_open {
            self.focus = Focus::SearchForm;
        }
    }
}

impl SearchConsumer for AppState {
    fn on_search_started(&mut self, generation: Generation, request: &SearchRequest) {
        tracing::debug!(generation, "ui: search started");
        self.search = SearchStatus {
            state: SearchState::Running,
            progress: None,
            results: 0,
            limit: request.limit,
        };
        self.notices.clear();
        self.notify(
            Severity::Info,
            format!("Starting search for event {} ...", request.criterion),
        );
        // Results stay hidden until the search finishes
        self.viewer_open = false;
        self.tree.clear();
        self.detail.clear();
    }

    fn on_search_progress(&mut self, _generation: Generation, progress: SearchProgress) {
        self.search.progress = Some(progress);
    }

    fn on_search_finished(
        &mut self,
        generation: Generation,
        report: &SearchReport,
        index: &[IndexEntry],
    ) {
        tracing::debug!(generation, state = %report.state, results = report.len(), "ui: search finished");
        self.search.state = report.state;
        self.search.results = report.len();

        self.notices.clear();
        for notice in report.notices().into_iter().rev() {
            self.notify(notice.severity(), notice.to_string());
        }
        if self.notices.is_empty() {
            self.notify(Severity::Info, format!("Found {} events.", report.len()));
        }

        self.tree.load(index, &self.ui.timestamp_format);
        match report.record(0) {
            Some(first) => {
                self.detail.show(0, first);
                self.viewer_open = true;
                if !self.form_open || self.focus != Focus::SearchForm {
                    self.focus = Focus::Tree;
                }
            }
            None => {
                self.detail.clear();
                self.viewer_open = false;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    state: AppState,
    controller: SearchController,
}

impl App {
    pub fn new(config: &Config, controller: SearchController) -> anyhow::Result<Self> {
        let limit = config.search.limit()?;
        let kind = config.ui.theme.parse::<ThemeKind>().unwrap_or_else(|err| {
            tracing::warn!(%err, "falling back to the dark theme");
            ThemeKind::Dark
        });
        Ok(Self {
            state: AppState::new(config, limit, Theme::load(kind)),
            controller,
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Set up the terminal, run the event loop, and restore the terminal on exit.
    pub fn run(mut self) -> anyhow::Result<()> {
        install_panic_hook();

        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal);

        // Always restore terminal, even if the loop returned an error
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let _ = terminal.show_cursor();

        self.controller.cancel();
        result
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        loop {
            self.controller.pump(&mut self.state);
            self.state.tick = self.state.tick.wrapping_add(1);

            {
                let s = &self.state;
                terminal.draw(|frame| draw(frame, s))?;
            }

            if self.state.quit {
                break;
            }

            if ct_event::poll(Duration::from_millis(16))? {
                match ct_event::read()? {
                    Event::Key(key) if key.kind == crossterm::event::KeyEventKind::Press => {
                        let raw = Event::Key(key);
                        // Use insert-mode mapping when a text widget is focused
                        let app_event = if is_insert_mode(self.state.focus) {
                            event::to_app_event_insert(raw)
                        } else {
                            event::to_app_event(raw)
                        };
                        if let Some(ev) = app_event {
                            tracing::debug!(focus = ?self.state.focus, event = ?ev, "key event");
                            self.handle(ev);
                        }
                    }
                    other => {
                        if let Some(ev) = event::to_app_event(other) {
                            self.handle(ev);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    pub fn handle(&mut self, event: AppEvent) {
        let s = &mut self.state;

        // Help popup intercepts all events; only close keys pass through.
        if s.show_help {
            if matches!(event, AppEvent::Char('?') | AppEvent::Escape | AppEvent::Quit) {
                tracing::debug!("help popup closed");
                s.show_help = false;
            }
            return;
        }

        // Command mode intercepts all events.
        if s.focus == Focus::Command {
            match event {
                AppEvent::Escape => {
                    tracing::debug!("command bar cancelled");
                    s.command_bar.clear();
                    s.focus = s.prev_focus;
                }
                AppEvent::Enter => match Command::parse(&s.command_bar.input) {
                    Ok(cmd) => {
                        tracing::debug!(command = ?cmd, "executing command");
                        s.command_bar.clear();
                        s.focus = s.prev_focus;
                        self.execute_command(cmd);
                    }
                    Err(msg) if msg.is_empty() => {
                        s.command_bar.clear();
                        s.focus = s.prev_focus;
                    }
                    Err(msg) => {
                        // Bar stays open with the error
                        s.command_bar.error = Some(msg);
                    }
                },
                AppEvent::Quit => s.quit = true,
                other => s.command_bar.handle(&other),
            }
            return;
        }

        if s.focus == Focus::SearchForm && s.form_open {
            match event {
                AppEvent::Quit => s.quit = true,
                AppEvent::FocusNext => s.focus_next(),
                other => match s.form.handle(&other) {
                    Some(FormAction::Submit(criterion)) => self.submit(criterion),
                    Some(FormAction::Invalid(msg)) => s.notify(Severity::Error, msg),
                    Some(FormAction::Cancel) => {
                        tracing::debug!("search form cancelled");
                        s.close_form();
                    }
                    None => {}
                },
            }
            return;
        }

        match event {
            AppEvent::Char('?') => {
                tracing::debug!("help popup opened");
                s.show_help = true;
            }
            AppEvent::Char(':') => {
                tracing::debug!(prev_focus = ?s.focus, "entering command mode");
                s.prev_focus = s.focus;
                s.command_bar.clear();
                s.focus = Focus::Command;
            }
            AppEvent::Quit => {
                tracing::debug!("quit");
                s.quit = true;
            }
            AppEvent::OpenSearch => s.open_form(),
            AppEvent::ToggleTheme => {
                s.theme = s.theme.toggled();
                tracing::debug!(theme = %s.theme.kind, "theme toggled");
            }
            AppEvent::CloseViewer => s.close_viewer(),
            AppEvent::FocusNext => s.focus_next(),
            AppEvent::Escape => {
                if s.focus == Focus::Detail {
                    s.focus = Focus::Tree;
                }
            }
            // Page keys always scroll the event, even from the index
            AppEvent::ScrollUp | AppEvent::ScrollDown if s.viewer_open => {
                s.detail.handle(&event);
            }
            // Terminal resize is handled automatically by ratatui
            AppEvent::Resize(_, _) => {}
            other if s.viewer_open => self.dispatch_to_focused(other),
            _ => {}
        }
    }

    /// Start a search for `criterion` in the configured directory.
    fn submit(&mut self, criterion: SearchCriterion) {
        let s = &mut self.state;
        let request = SearchRequest::new(s.directory.clone(), criterion, s.limit);
        s.close_form();
        let generation = self.controller.search(request);
        tracing::debug!(generation, event_id = criterion.event_id, "search submitted");
    }

    /// Execute a parsed [`Command`] against the application state.
    fn execute_command(&mut self, cmd: Command) {
        let s = &mut self.state;
        match cmd {
            Command::Quit => s.quit = true,
            Command::Help => s.show_help = !s.show_help,
            Command::Search(criterion) => self.submit(criterion),
            Command::Limit(limit) => {
                s.limit = limit;
                s.notify(Severity::Info, format!("Limit set to {limit} events."));
            }
            Command::Theme(kind) => s.theme = Theme::load(kind),
        }
    }

    /// Route an event to the pane that owns the current focus.
    fn dispatch_to_focused(&mut self, event: AppEvent) {
        let s = &mut self.state;
        match s.focus {
            Focus::Tree => {
                if let Some(ordinal) = s.tree.handle(&event) {
                    match self.controller.record(ordinal) {
                        Some(record) => s.detail.show(ordinal, record),
                        None => tracing::warn!(ordinal, "selected record is no longer available"),
                    }
                }
            }
            Focus::Detail => s.detail.handle(&event),
            // Handled before dispatch, should not reach here
            Focus::SearchForm | Focus::Command => {}
        }
    }
}

/// Returns true when the current focus is on a text-input widget, meaning
/// alphabetic keys should produce characters rather than trigger shortcuts.
fn is_insert_mode(focus: Focus) -> bool {
    matches!(focus, Focus::SearchForm | Focus::Command)
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

pub fn draw(frame: &mut Frame, state: &AppState) {
    let area = frame.area();
    let theme = &state.theme;
    frame.render_widget(Block::default().style(theme.base), area);

    // Vertical: status bar | search form (when open) | body | notice line
    let form_height = if state.form_open { SearchForm::HEIGHT } else { 0 };
    let vert = Layout::default()
        .direction(LayoutDir::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(form_height),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .split(area);

    let directory = state.directory.display().to_string();
    frame.render_widget(
        StatusBar::new(&directory, state.search, state.tick / TICKS_PER_FRAME, theme),
        vert[0],
    );

    if state.form_open {
        frame.render_widget(
            SearchForm::new(&state.form, state.focus == Focus::SearchForm, theme),
            vert[1],
        );
    }

    if state.viewer_open {
        let pct = state.ui.index_pane_width_pct;
        let horiz = Layout::default()
            .direction(LayoutDir::Horizontal)
            .constraints([Constraint::Percentage(pct), Constraint::Fill(1)])
            .split(vert[2]);
        frame.render_widget(
            EventTree::new(&state.tree, state.focus == Focus::Tree, theme),
            horiz[0],
        );
        frame.render_widget(
            RecordView::new(&state.detail, state.focus == Focus::Detail, theme),
            horiz[1],
        );
    } else {
        let hint = match state.search.state {
            SearchState::Running => "searching ...",
            _ => "press s to search",
        };
        frame.render_widget(
            Paragraph::new(Line::styled(hint, theme.base.add_modifier(Modifier::DIM)))
                .centered()
                .block(Block::default().style(theme.base)),
            vert[2],
        );
    }

    let more = state.notices.len().saturating_sub(1);
    frame.render_widget(NoticeLine::new(state.notices.first(), more, theme), vert[3]);

    if state.show_help {
        frame.render_widget(HelpPopup::new(theme), area);
    }

    // Command bar overlays the bottom row of the screen
    if state.focus == Focus::Command {
        let cmd_area = Rect { y: area.bottom().saturating_sub(1), height: 1, ..area };
        frame.render_widget(CommandBar::new(&state.command_bar, theme), cmd_area);
        let col = state.command_bar.cursor_col(cmd_area);
        frame.set_cursor_position((col, cmd_area.y));
        return;
    }

    if state.focus == Focus::SearchForm && state.form_open && !state.show_help {
        let form = SearchForm::new(&state.form, true, theme);
        frame.set_cursor_position(form.cursor_position(vert[1]));
    }
}

// ---------------------------------------------------------------------------
// Terminal helpers
// ---------------------------------------------------------------------------

/// Restore the terminal when the UI thread panics. Search workers catch their
/// own panics and report them as failed searches, so the screen stays up and
/// their panics only go to the log.
fn install_panic_hook() {
    let ui_thread = std::thread::current().id();
    let original = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        if std::thread::current().id() != ui_thread {
            tracing::error!(%info, "background thread panicked");
            return;
        }
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original(info);
    }));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Direction;
    use evs_core::{
        DecodeError, DecoderHandle, FilePattern, Record, RecordDecoder, SearchEngine,
    };
    use pretty_assertions::assert_eq;
    use ratatui::backend::TestBackend;
    use serde_json::{json, Value};
    use std::path::Path;
    use std::sync::Arc;

    fn event(id: i64, second: u32) -> Value {
        json!({
            "Event": {
                "System": {
                    "EventID": id,
                    "TimeCreated": { "#attributes": {
                        "SystemTime": format!("2024-01-15T10:00:{second:02}.000000Z")
                    } }
                }
            }
        })
    }

    /// Serves the same records for every file it opens.
    struct StaticDecoder(Vec<Value>);

    struct StaticHandle<'a>(&'a [Value]);

    impl RecordDecoder for StaticDecoder {
        fn open(&self, _path: &Path) -> Result<Box<dyn DecoderHandle + '_>, DecodeError> {
            Ok(Box::new(StaticHandle(&self.0)))
        }
    }

    impl DecoderHandle for StaticHandle<'_> {
        fn records(&mut self) -> Box<dyn Iterator<Item = Result<Record, DecodeError>> + '_> {
            Box::new(self.0.iter().cloned().map(|v| Ok::<_, DecodeError>(Record::new(v))))
        }
    }

    fn config_for(dir: &Path) -> Config {
        let mut config = Config::defaults();
        config.search.directory = dir.to_path_buf();
        config
    }

    fn app_with(dir: &Path, records: Vec<Value>) -> App {
        let engine = SearchEngine::new(
            Arc::new(StaticDecoder(records)),
            FilePattern::new("*.jsonl").unwrap(),
        );
        let controller = SearchController::new(Arc::new(engine), tokio::runtime::Handle::current());
        App::new(&config_for(dir), controller).unwrap()
    }

    async fn wait_until_finished(app: &mut App) {
        for _ in 0..500 {
            app.controller.pump(&mut app.state);
            if app.state.search.state.is_finished() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("search did not finish");
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle(AppEvent::Char(c));
        }
    }

    fn clear_form(app: &mut App) {
        for _ in 0..app.state.form.input.len() {
            app.handle(AppEvent::Backspace);
        }
    }

    fn screen(state: &AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|frame| draw(frame, state)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn finished_report(records: Vec<Value>, state: SearchState) -> SearchReport {
        let request = SearchRequest::new("/logs", SearchCriterion::new(4624), SearchLimit::default());
        let mut report = SearchReport::failed(request, "unused");
        report.error = None;
        report.state = state;
        report.candidates = 1;
        report.files_scanned = 1;
        report.records = records.into_iter().map(Record::new).collect();
        report
    }

    // ── Consumer behaviour ─────────────────────────────────────────────────

    fn state() -> AppState {
        AppState::new(&Config::defaults(), SearchLimit::default(), Theme::default())
    }

    #[test]
    fn starts_with_search_form_focused_and_prefilled() {
        let s = state();
        assert_eq!(s.focus, Focus::SearchForm);
        assert!(s.form_open);
        assert_eq!(s.form.input, "4624");
        assert!(screen(&s).contains("Event ID: 4624"));
    }

    #[test]
    fn started_announces_search_and_hides_viewer() {
        let mut s = state();
        s.viewer_open = true;
        let request = SearchRequest::new("/logs", SearchCriterion::new(4625), SearchLimit::default());

        s.on_search_started(1, &request);

        assert_eq!(s.search.state, SearchState::Running);
        assert!(!s.viewer_open);
        assert_eq!(s.notices[0].text, "Starting search for event 4625 ...");
        assert!(screen(&s).contains("searching"));
    }

    #[test]
    fn finished_loads_tree_and_shows_first_record() {
        let mut s = state();
        s.form_open = false;
        let report = finished_report(vec![event(4624, 1), event(4624, 2)], SearchState::Completed);
        let index = evs_core::build_index(&report.records);

        s.on_search_finished(1, &report, &index);

        assert!(s.viewer_open);
        assert_eq!(s.focus, Focus::Tree);
        assert_eq!(s.tree.selected_ordinal(), Some(0));
        assert_eq!(s.detail.ordinal, Some(0));
        assert_eq!(s.search.results, 2);
        let text = screen(&s);
        assert!(text.contains("Events (2)"));
        assert!(text.contains("\"EventID\": 4624"));
    }

    #[test]
    fn empty_result_reports_no_events_and_keeps_viewer_closed() {
        let mut s = state();
        let report = finished_report(Vec::new(), SearchState::Completed);

        s.on_search_finished(1, &report, &[]);

        assert!(!s.viewer_open);
        assert_eq!(s.notices[0].text, "No events found.");
        assert_eq!(s.notices[0].severity, Severity::Warning);
    }

    #[test]
    fn truncated_result_warns_about_the_limit() {
        let mut s = state();
        let mut report = finished_report(vec![event(4624, 1)], SearchState::Truncated);
        report.request.limit = SearchLimit::new(1).unwrap();
        let index = evs_core::build_index(&report.records);

        s.on_search_finished(1, &report, &index);

        assert_eq!(
            s.notices[0].text,
            "Limit of 1 events reached, aborting search ..."
        );
    }

    #[test]
    fn progress_updates_live_match_count() {
        let mut s = state();
        s.directory = PathBuf::from("/logs");
        let request = SearchRequest::new("/logs", SearchCriterion::new(4624), SearchLimit::default());
        s.on_search_started(1, &request);
        s.on_search_progress(
            1,
            SearchProgress {
                files_done: 1,
                files_total: 2,
                matched: 17,
            },
        );
        assert!(screen(&s).contains("17 matches"));
    }

    // ── Key handling ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn submit_runs_search_and_navigation_switches_records() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.jsonl"), "").unwrap();
        let mut app = app_with(
            dir.path(),
            vec![event(4624, 1), event(4625, 2), event(4624, 3), event(4624, 4)],
        );

        app.handle(AppEvent::Enter);
        assert!(!app.state.form_open);
        wait_until_finished(&mut app).await;

        assert_eq!(app.state.search.state, SearchState::Completed);
        assert_eq!(app.state.search.results, 3);
        assert_eq!(app.state.focus, Focus::Tree);

        app.handle(AppEvent::TreeNav(Direction::Down));
        assert_eq!(app.state.detail.ordinal, Some(1));
        assert!(app
            .state
            .detail
            .lines
            .iter()
            .any(|l| l.contains("2024-01-15T10:00:03")));
    }

    #[tokio::test]
    async fn invalid_event_id_keeps_form_open_with_error_notice() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with(dir.path(), Vec::new());

        clear_form(&mut app);
        type_str(&mut app, "abc");
        app.handle(AppEvent::Enter);

        assert!(app.state.form_open);
        assert_eq!(app.state.focus, Focus::SearchForm);
        assert_eq!(app.state.notices[0].text, "Invalid event ID: abc");
        assert_eq!(app.state.notices[0].severity, Severity::Error);
        assert_eq!(app.controller.generation(), 0, "no search was started");
    }

    #[tokio::test]
    async fn open_search_when_open_reports_it() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with(dir.path(), Vec::new());
        app.state.focus = Focus::Tree;

        app.handle(AppEvent::OpenSearch);
        assert_eq!(app.state.notices[0].text, "Search form already open.");
        assert_eq!(app.state.focus, Focus::SearchForm);

        app.handle(AppEvent::Escape);
        assert!(!app.state.form_open);
        app.handle(AppEvent::OpenSearch);
        assert!(app.state.form_open);
        assert_eq!(app.state.notices.len(), 1);
    }

    #[tokio::test]
    async fn shortcut_letters_type_into_the_form() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with(dir.path(), Vec::new());
        let kind = app.state.theme.kind;

        // Mapped in insert mode, so these are plain characters
        app.handle(AppEvent::Char('d'));
        app.handle(AppEvent::Char('q'));
        assert_eq!(app.state.form.input, "4624dq");
        assert_eq!(app.state.theme.kind, kind);
        assert!(!app.state.quit);
    }

    #[tokio::test]
    async fn toggle_theme_and_quit_outside_the_form() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with(dir.path(), Vec::new());
        app.handle(AppEvent::Escape);

        app.handle(AppEvent::ToggleTheme);
        assert_eq!(app.state.theme.kind, ThemeKind::Light);
        app.handle(AppEvent::ToggleTheme);
        assert_eq!(app.state.theme.kind, ThemeKind::Dark);

        app.handle(AppEvent::Quit);
        assert!(app.state.quit);
    }

    #[tokio::test]
    async fn command_line_sets_limit_and_searches() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.jsonl"), "").unwrap();
        let mut app = app_with(dir.path(), vec![event(4625, 1), event(4625, 2)]);
        app.handle(AppEvent::Escape);

        app.handle(AppEvent::Char(':'));
        type_str(&mut app, "limit 1");
        app.handle(AppEvent::Enter);
        assert_eq!(app.state.limit, SearchLimit::new(1).unwrap());

        app.handle(AppEvent::Char(':'));
        type_str(&mut app, "search 4625");
        app.handle(AppEvent::Enter);
        wait_until_finished(&mut app).await;

        assert_eq!(app.state.search.state, SearchState::Truncated);
        assert_eq!(app.state.search.results, 1);
    }

    #[tokio::test]
    async fn bad_command_keeps_bar_open() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with(dir.path(), Vec::new());
        app.handle(AppEvent::Escape);

        app.handle(AppEvent::Char(':'));
        type_str(&mut app, "frobnicate");
        app.handle(AppEvent::Enter);
        assert_eq!(app.state.focus, Focus::Command);
        assert!(app.state.command_bar.error.is_some());

        app.handle(AppEvent::Escape);
        assert_eq!(app.state.focus, Focus::Tree);
    }

    #[tokio::test]
    async fn close_viewer_hides_results() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.jsonl"), "").unwrap();
        let mut app = app_with(dir.path(), vec![event(4624, 1)]);
        app.handle(AppEvent::Enter);
        wait_until_finished(&mut app).await;
        assert!(app.state.viewer_open);

        app.handle(AppEvent::CloseViewer);
        assert!(!app.state.viewer_open);
        assert!(screen(&app.state).contains("press s to search"));
    }
}
