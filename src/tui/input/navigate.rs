use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::classification::Classification;
use crate::ops::export::ExportFormat;
use crate::tui::app::App;

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) {
    // Help overlay intercepts ? and Esc
    if app.show_help {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q')) {
            app.show_help = false;
        }
        return;
    }

    // Detail popup closes on Esc/Enter; other keys fall through
    if app.detail.is_some() && matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
        app.detail = None;
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if key.code == KeyCode::Char('c') || key.code == KeyCode::Char('q') {
            app.should_quit = true;
        }
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Esc => app.notice = None,

        // Grid movement
        KeyCode::Up | KeyCode::Char('k') => app.move_cursor(-1, 0),
        KeyCode::Down | KeyCode::Char('j') => app.move_cursor(1, 0),
        KeyCode::Left => app.move_cursor(0, -1),
        KeyCode::Right => app.move_cursor(0, 1),
        KeyCode::PageUp => app.move_cursor(-8, 0),
        KeyCode::PageDown => app.move_cursor(8, 0),
        KeyCode::Char('g') | KeyCode::Home => app.jump_top(),
        KeyCode::Char('G') | KeyCode::End => app.jump_bottom(),

        // Days
        KeyCode::Tab | KeyCode::Char(']') => app.next_day(),
        KeyCode::BackTab | KeyCode::Char('[') => app.prev_day(),
        KeyCode::Char(c @ '1'..='9') => app.select_day(c as usize - '1' as usize),

        // Plan
        KeyCode::Char('i') => app.toggle_current(Classification::Interested),
        KeyCode::Char('s') => app.toggle_current(Classification::Selected),
        KeyCode::Char('h') => app.toggle_current(Classification::Hidden),
        KeyCode::Char('u') => app.unhide_all(),
        KeyCode::Char('f') => app.cycle_filter(),
        KeyCode::Enter => app.toggle_detail(),

        // Files
        KeyCode::Char('e') => app.export(ExportFormat::Text),
        KeyCode::Char('E') => app.export(ExportFormat::Json),
        KeyCode::Char('c') => app.export(ExportFormat::Ics),
        KeyCode::Char('I') => app.start_import(),
        _ => {}
    }

    // The popup follows the cursor
    if app.detail.is_some() {
        app.detail = app.event_under_cursor().map(|e| e.identity());
    }
}
