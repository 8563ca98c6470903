use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as TermEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::io::project_io::{self, discover_project, load_project};
use crate::io::schedule_io::load_schedule;
use crate::io::storage::{atomic_write, load_preferences};
use crate::io::watcher::{FileEvent, PlannerWatcher};
use crate::model::classification::Classification;
use crate::model::schedule::DayKey;
use crate::model::{Event, Project};
use crate::ops::export::{ExportFormat, export_plan};
use crate::ops::filter::ViewFilter;
use crate::ops::import::{ImportFormat, import_plan};
use crate::ops::layout::{DayGrid, layout_day};
use crate::ops::stats::{PlanStats, compute_stats};
use crate::ops::store::ClassificationStore;

use super::input;
use super::render;
use super::theme::Theme;

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// Typing a file path to import
    Import,
}

/// Cursor over the grid: slot row and venue column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridCursor {
    pub slot: usize,
    pub venue: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// A transient message in the status row
#[derive(Debug, Clone)]
pub struct Notice {
    pub text: String,
    pub kind: NoticeKind,
    pub shown_at: Instant,
}

/// Main application state
pub struct App {
    pub project: Project,
    pub store: ClassificationStore,
    pub theme: Theme,
    /// Festival-wide venue columns
    pub venues: Vec<String>,
    /// Day tabs, in bucket order
    pub days: Vec<DayKey>,
    /// Index into `days`
    pub day: usize,
    pub cursor: GridCursor,
    /// First visible slot row
    pub scroll: usize,
    /// First visible venue column
    pub col_scroll: usize,
    pub filter: ViewFilter,
    pub mode: Mode,
    pub should_quit: bool,
    /// Help overlay visible
    pub show_help: bool,
    /// Identity of the event shown in the detail popup
    pub detail: Option<String>,
    /// Import prompt buffer
    pub import_input: String,
    pub notice: Option<Notice>,
    pub notice_ttl: Duration,
}

impl App {
    /// Build the grid state. The store starts empty; stored preferences are
    /// applied afterwards with [`App::apply_store`].
    pub fn new(project: Project) -> Self {
        let theme = Theme::from_config(&project.config.ui);
        let notice_ttl = Duration::from_secs(project.config.ui.notice_seconds());
        let venues = project.schedule.venues();
        let days = day_keys(&project);
        App {
            project,
            store: ClassificationStore::new(),
            theme,
            venues,
            days,
            day: 0,
            cursor: GridCursor::default(),
            scroll: 0,
            col_scroll: 0,
            filter: ViewFilter::Default,
            mode: Mode::Navigate,
            should_quit: false,
            show_help: false,
            detail: None,
            import_input: String::new(),
            notice: None,
            notice_ttl,
        }
    }

    pub fn apply_store(&mut self, store: ClassificationStore) {
        self.store = store;
    }

    /// Layout of the current day
    pub fn grid(&self) -> Option<DayGrid<'_>> {
        let bucket = self.project.schedule.day_buckets().into_iter().nth(self.day)?;
        Some(layout_day(&bucket, &self.venues))
    }

    pub fn status_of(&self, event: &Event) -> Option<Classification> {
        self.store.classification_of(&event.identity())
    }

    /// Is the event drawn under the current filter?
    pub fn is_shown(&self, event: &Event) -> bool {
        self.filter.shows(self.status_of(event))
    }

    /// The shown event whose block covers the cursor cell
    pub fn event_under_cursor(&self) -> Option<&Event> {
        let grid = self.grid()?;
        let (event, _) = grid.block_at(self.cursor.slot, self.cursor.venue)?;
        self.is_shown(event).then_some(event)
    }

    pub fn stats(&self) -> PlanStats {
        compute_stats(&self.project.schedule, &self.store)
    }

    // -----------------------------------------------------------------------
    // Notices
    // -----------------------------------------------------------------------

    pub fn notify(&mut self, text: impl Into<String>) {
        self.set_notice(text.into(), NoticeKind::Info);
    }

    pub fn notify_error(&mut self, text: impl Into<String>) {
        self.set_notice(text.into(), NoticeKind::Error);
    }

    fn set_notice(&mut self, text: String, kind: NoticeKind) {
        self.notice = Some(Notice {
            text,
            kind,
            shown_at: Instant::now(),
        });
    }

    /// Drop the notice once it has been shown for `notice_ttl`.
    pub fn expire_notice(&mut self, now: Instant) {
        if self
            .notice
            .as_ref()
            .is_some_and(|n| now.duration_since(n.shown_at) >= self.notice_ttl)
        {
            self.notice = None;
        }
    }

    // -----------------------------------------------------------------------
    // Movement
    // -----------------------------------------------------------------------

    fn slot_count(&self) -> usize {
        self.grid().map_or(0, |g| g.slots.len())
    }

    pub fn move_cursor(&mut self, d_slot: isize, d_venue: isize) {
        let slots = self.slot_count();
        let venues = self.venues.len();
        if slots == 0 || venues == 0 {
            return;
        }
        self.cursor.slot = self.cursor.slot.saturating_add_signed(d_slot).min(slots - 1);
        self.cursor.venue = self.cursor.venue.saturating_add_signed(d_venue).min(venues - 1);
    }

    pub fn jump_top(&mut self) {
        self.cursor.slot = 0;
    }

    pub fn jump_bottom(&mut self) {
        self.cursor.slot = self.slot_count().saturating_sub(1);
    }

    pub fn select_day(&mut self, day: usize) {
        if day >= self.days.len() || day == self.day {
            return;
        }
        self.day = day;
        self.cursor.slot = 0;
        self.scroll = 0;
    }

    pub fn next_day(&mut self) {
        if !self.days.is_empty() {
            self.select_day((self.day + 1) % self.days.len());
        }
    }

    pub fn prev_day(&mut self) {
        if !self.days.is_empty() {
            self.select_day((self.day + self.days.len() - 1) % self.days.len());
        }
    }

    pub fn cycle_filter(&mut self) {
        self.filter = self.filter.next();
        self.notify(format!("showing: {}", self.filter.label()));
    }

    // -----------------------------------------------------------------------
    // Plan edits
    // -----------------------------------------------------------------------

    /// Toggle the event under the cursor in `class`.
    pub fn toggle_current(&mut self, class: Classification) {
        let Some((id, title)) = self
            .event_under_cursor()
            .map(|e| (e.identity(), e.title.clone()))
        else {
            return;
        };
        match self.store.toggle(class, &id) {
            Ok(Some(class)) => self.notify(format!("{}: {}", class.name(), title)),
            Ok(None) => self.notify(format!("cleared: {}", title)),
            Err(e) => self.notify_error(e.to_string()),
        }
    }

    pub fn unhide_all(&mut self) {
        let count = self.store.ids(Classification::Hidden).len();
        match self.store.clear_hidden() {
            Ok(()) => self.notify(format!("unhid {} events", count)),
            Err(e) => self.notify_error(e.to_string()),
        }
    }

    pub fn toggle_detail(&mut self) {
        self.detail = match self.detail {
            Some(_) => None,
            None => self.event_under_cursor().map(Event::identity),
        };
    }

    /// Resolve a user-typed path against the project root.
    fn project_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project.root.join(path)
        }
    }

    /// Export the plan to the default file name in the project root.
    pub fn export(&mut self, format: ExportFormat) {
        let exported = match export_plan(
            format,
            &self.project.schedule,
            &self.store,
            self.project.config.festival.month,
        ) {
            Ok(exported) => exported,
            Err(e) => return self.notify_error(e.to_string()),
        };
        let name = format.default_file_name();
        let path = self.project_path(&name);
        if let Err(e) = atomic_write(&path, exported.content.as_bytes()) {
            return self.notify_error(format!("could not write {}: {}", name, e));
        }
        tracing::info!(path = %path.display(), count = exported.count, "exported plan");
        let mut text = format!("exported {} events to {}", exported.count, name);
        if !exported.skipped.is_empty() {
            text.push_str(&format!(" ({} skipped)", exported.skipped.len()));
        }
        self.notify(text);
    }

    pub fn start_import(&mut self) {
        self.mode = Mode::Import;
        self.import_input.clear();
    }

    pub fn cancel_import(&mut self) {
        self.mode = Mode::Navigate;
        self.import_input.clear();
    }

    /// Import the file named in the prompt, replacing the whole plan.
    pub fn finish_import(&mut self) {
        self.mode = Mode::Navigate;
        let input = std::mem::take(&mut self.import_input);
        let input = input.trim();
        if input.is_empty() {
            return;
        }
        let path = self.project_path(input);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => return self.notify_error(format!("could not read {}: {}", input, e)),
        };
        match import_plan(ImportFormat::for_path(&path), &text, &self.project.schedule, &mut self.store) {
            Ok(report) => {
                let c = report.imported;
                let mut text = format!(
                    "imported {} interested, {} selected, {} hidden",
                    c.interested, c.selected, c.hidden
                );
                if report.unmatched > 0 {
                    text.push_str(&format!(" ({} unmatched)", report.unmatched));
                }
                self.notify(text);
            }
            Err(e) => self.notify_error(format!("import failed: {}", e)),
        }
    }

    // -----------------------------------------------------------------------
    // External changes
    // -----------------------------------------------------------------------

    /// Re-read preferences written by another process.
    pub fn reload_preferences(&mut self) {
        let file = project_io::storage_file(&self.project);
        let prefs = load_preferences(&file, &self.project.config.festival.storage_key);
        if &prefs != self.store.snapshot() {
            tracing::debug!("preferences changed on disk");
            self.store.load(prefs);
        }
    }

    /// Re-read the schedule. A schedule that no longer parses leaves the
    /// loaded one in place.
    pub fn reload_schedule(&mut self) {
        match load_schedule(&self.project.schedule_path()) {
            Ok(schedule) => {
                self.project.schedule = schedule;
                self.venues = self.project.schedule.venues();
                self.days = day_keys(&self.project);
                self.day = self.day.min(self.days.len().saturating_sub(1));
                self.detail = None;
                self.move_cursor(0, 0);
                self.notify("schedule reloaded");
            }
            Err(e) => self.notify_error(e.to_string()),
        }
    }

    pub fn handle_file_event(&mut self, event: FileEvent) {
        match event {
            FileEvent::Preferences => self.reload_preferences(),
            FileEvent::Schedule => self.reload_schedule(),
        }
    }
}

fn day_keys(project: &Project) -> Vec<DayKey> {
    project
        .schedule
        .day_buckets()
        .into_iter()
        .map(|b| b.key)
        .collect()
}

/// Run the TUI application
pub fn run(project_dir: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let start = match project_dir {
        Some(dir) => std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?,
        None => std::env::current_dir()?,
    };
    let root = discover_project(&start)?;
    let project = load_project(&root)?;
    super::init_file_logging(&project);

    // Build the grid first, then apply stored preferences
    let mut app = App::new(project);
    let store = project_io::open_store(&app.project);
    app.apply_store(store);

    let watcher = match PlannerWatcher::start(&app.project.storage_path(), &app.project.schedule_path()) {
        Ok(w) => Some(w),
        Err(e) => {
            tracing::warn!(error = %e, "file watcher unavailable");
            None
        }
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app, watcher.as_ref());

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    watcher: Option<&PlannerWatcher>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))?
            && let TermEvent::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            input::handle_key(app, key);
        }

        if let Some(watcher) = watcher {
            for file_event in watcher.poll() {
                app.handle_file_event(file_event);
            }
        }
        app.expire_notice(Instant::now());

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
