use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::Event;
use crate::ops::layout::{CellText, DayGrid};
use crate::parse::time::minutes_to_time;
use crate::tui::app::App;
use crate::util::unicode::pad_to_width;

/// Width of the time column, including its trailing space
pub const TIME_COL_WIDTH: usize = 6;
/// Width of one venue column, including its leading separator
pub const VENUE_COL_WIDTH: usize = 22;

/// What one grid cell draws
#[derive(Debug, Clone, PartialEq)]
pub(super) struct CellView<'a> {
    /// Shown event whose block covers this cell
    pub event: Option<&'a Event>,
    pub text: String,
    /// First row of the block
    pub start: bool,
}

impl CellView<'_> {
    fn empty() -> Self {
        CellView {
            event: None,
            text: String::new(),
            start: false,
        }
    }
}

/// Cells of one venue column, top to bottom. A block is drawn over its
/// rendered span with one label per row; the status marker leads the first.
/// Events the filter excludes leave their cells empty.
pub(super) fn venue_column<'a>(grid: &DayGrid<'a>, venue: usize, app: &App) -> Vec<CellView<'a>> {
    (0..grid.slots.len())
        .map(|slot| match grid.block_at(slot, venue) {
            Some((event, row)) if app.is_shown(event) => {
                let cell_text = CellText::of(event);
                let labels = cell_text.lines();
                let text = match (row, labels.get(row)) {
                    (0, first) => {
                        let marker = app.status_of(event).map_or(" ", |c| c.symbol());
                        format!("{} {}", marker, first.copied().unwrap_or(""))
                    }
                    (_, Some(label)) => format!("  {}", label),
                    (_, None) => String::new(),
                };
                CellView {
                    event: Some(event),
                    text,
                    start: row == 0,
                }
            }
            _ => CellView::empty(),
        })
        .collect()
}

/// Keep `cursor` within the window `[offset, offset + len)`.
fn scroll_to(offset: usize, cursor: usize, len: usize) -> usize {
    if len == 0 {
        return cursor;
    }
    if cursor < offset {
        cursor
    } else if cursor >= offset + len {
        cursor + 1 - len
    } else {
        offset
    }
}

/// Render the current day's grid: time column plus one column per venue.
pub fn render_grid_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let bg = app.theme.background;
    let base = Style::default().fg(app.theme.text).bg(bg);

    let message = if app.project.schedule.is_empty() {
        Some("No events in the schedule")
    } else if app.grid().is_none_or(|g| g.slots.is_empty()) {
        Some("No timed events on this day")
    } else {
        None
    };
    if let Some(message) = message {
        let para = Paragraph::new(Line::from(Span::styled(
            format!(" {}", message),
            Style::default().fg(app.theme.dim).bg(bg),
        )))
        .style(base);
        frame.render_widget(para, area);
        return;
    }

    let rows = (area.height as usize).saturating_sub(1);
    let cols = ((area.width as usize).saturating_sub(TIME_COL_WIDTH) / VENUE_COL_WIDTH).max(1);
    app.scroll = scroll_to(app.scroll, app.cursor.slot, rows);
    app.col_scroll = scroll_to(app.col_scroll, app.cursor.venue, cols);

    let app = &*app;
    let Some(grid) = app.grid() else {
        return;
    };
    let focused = app.event_under_cursor();
    let venue_range = app.col_scroll..(app.col_scroll + cols).min(app.venues.len());
    let columns: Vec<Vec<CellView>> = venue_range
        .clone()
        .map(|v| venue_column(&grid, v, app))
        .collect();

    let sep_style = Style::default().fg(app.theme.dim).bg(bg);
    let mut lines: Vec<Line> = Vec::with_capacity(rows + 1);

    // Venue header
    let mut header = vec![Span::styled(" ".repeat(TIME_COL_WIDTH), base)];
    for v in venue_range.clone() {
        header.push(Span::styled("\u{2502}", sep_style));
        header.push(Span::styled(
            pad_to_width(&app.venues[v], VENUE_COL_WIDTH - 1),
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ));
    }
    lines.push(Line::from(header));

    let last = (app.scroll + rows).min(grid.slots.len());
    for slot in app.scroll..last {
        let is_cursor_row = slot == app.cursor.slot;
        let time_style = if is_cursor_row {
            Style::default().fg(app.theme.highlight).bg(bg)
        } else {
            Style::default().fg(app.theme.dim).bg(bg)
        };
        let mut spans = vec![Span::styled(
            format!("{:>5} ", minutes_to_time(grid.slots[slot])),
            time_style,
        )];

        for (col, v) in venue_range.clone().enumerate() {
            let cell = &columns[col][slot];
            let is_cursor = is_cursor_row && v == app.cursor.venue;
            let in_focus = match (cell.event, focused) {
                (Some(a), Some(b)) => std::ptr::eq(a, b),
                _ => false,
            };

            let mut style = match cell.event {
                Some(event) => Style::default()
                    .fg(app.theme.class_color(app.status_of(event)))
                    .bg(app.theme.block_bg),
                None => base,
            };
            if cell.start {
                style = style.add_modifier(Modifier::BOLD);
            }
            if in_focus || is_cursor {
                style = style.bg(app.theme.selection_bg);
            }

            spans.push(Span::styled("\u{2502}", sep_style));
            spans.push(Span::styled(pad_to_width(&cell.text, VENUE_COL_WIDTH - 1), style));
        }
        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines).style(base), area);
}
