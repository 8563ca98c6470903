use std::path::PathBuf;

use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

use crate::model::{Event, PlannerConfig, Project, Schedule};
use crate::tui::app::App;

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// Two days, two venues. Film A and Film B share Monday 12.
pub fn sample_events() -> Vec<Event> {
    let mut a = Event::timed("Film A", "Dilluns", "12", "10:00", 90, "Hall 1");
    a.movie = Some("Alpha".into());
    a.duration = Some("90'".into());
    a.sections = vec!["Oficial".into()];
    vec![
        a,
        Event::timed("Film B", "Dilluns", "12", "11:00", 60, "Hall 2"),
        Event::timed("Film C", "Dimarts", "13", "18:00", 120, "Hall 1"),
    ]
}

/// A project that lives nowhere on disk.
pub fn project_with_events(events: Vec<Event>) -> Project {
    let mut config = PlannerConfig::default();
    config.festival.name = "Sitges".into();
    Project {
        root: PathBuf::from("/tmp/festplan-test"),
        config,
        schedule: Schedule::new(events),
    }
}

/// An App with an in-memory store.
pub fn app_with_events(events: Vec<Event>) -> App {
    App::new(project_with_events(events))
}
