use serde::Serialize;

use crate::model::Event;
use crate::model::classification::{Classification, Counts};
use crate::ops::filter::ViewFilter;
use crate::ops::layout::{CellText, DayGrid};
use crate::ops::store::ClassificationStore;
use crate::parse::time::{end_time, minutes_to_time};
use crate::util::unicode::pad_to_width;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct EventJson {
    /// 1-based position in the schedule, as accepted by `fp show`
    pub index: usize,
    pub id: String,
    pub title: String,
    pub day: String,
    pub day_name: String,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movie: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub movies: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub special_tags: Vec<String>,
    pub status: Option<Classification>,
}

#[derive(Serialize)]
pub struct DayJson {
    pub label: String,
    pub day: String,
    pub date: String,
    pub events: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_slot: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_slot: Option<String>,
}

#[derive(Serialize)]
pub struct ToggleJson {
    pub id: String,
    pub status: Option<Classification>,
}

#[derive(Serialize)]
pub struct ExportJson {
    pub format: String,
    pub path: String,
    pub count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
}

#[derive(Serialize)]
pub struct ImportJson {
    pub imported: Counts,
    pub replaced: Counts,
    pub unmatched: usize,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn event_to_json(index: usize, event: &Event, status: Option<Classification>) -> EventJson {
    EventJson {
        index,
        id: event.identity(),
        title: event.title.clone(),
        day: event.day.clone(),
        day_name: event.day_name().to_string(),
        date: event.date.to_string(),
        time: event.time.clone(),
        end: event_end(event),
        venue: event.venue.clone(),
        duration_minutes: event.duration_minutes,
        movie: event.movie.clone(),
        movies: event.movies.clone(),
        sections: event.sections.clone(),
        special_tags: event.special_tags.clone(),
        status,
    }
}

fn event_end(event: &Event) -> Option<String> {
    end_time(event.time.as_deref()?, event.minutes())
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

fn status_marker(status: Option<Classification>) -> &'static str {
    status.map_or(" ", Classification::symbol)
}

/// One `fp list` row: `  3 * Monday 12  10:00-11:30  Hall 1  Film A`
pub fn format_event_line(index: usize, event: &Event, status: Option<Classification>) -> String {
    let time = match (&event.time, event_end(event)) {
        (Some(start), Some(end)) => format!("{}-{}", start, end),
        (Some(start), None) => start.clone(),
        _ => "--:--".to_string(),
    };
    format!(
        "{:>4} {} {} {}  {:<11}  {}  {}",
        index,
        status_marker(status),
        event.day_name(),
        event.date,
        time,
        event.venue.as_deref().unwrap_or("-"),
        event.title
    )
}

/// Multi-line event detail, the same facts a hover card would show.
pub fn format_event_detail(event: &Event, status: Option<Classification>) -> Vec<String> {
    let mut lines = vec![event.title.clone()];
    let time = event.time.as_deref().unwrap_or("N/A");
    let end = event_end(event).unwrap_or_else(|| "N/A".to_string());
    lines.push(format!("Day: {} {}", event.day_name(), event.date));
    lines.push(format!("Time: {} - {}", time, end));
    lines.push(format!("Venue: {}", event.venue.as_deref().unwrap_or("N/A")));
    lines.push(format!("Duration: {}", event.duration.as_deref().unwrap_or("N/A")));
    if let Some(movie) = &event.movie
        && event.movies.is_empty()
    {
        lines.push(format!("Movie: {}", movie));
    }
    if !event.movies.is_empty() {
        lines.push("Movies:".to_string());
        for movie in &event.movies {
            lines.push(format!("  \u{2022} {}", movie));
        }
    }
    if !event.sections.is_empty() {
        lines.push(format!("Sections: {}", event.sections.join(", ")));
    }
    if !event.special_tags.is_empty() {
        lines.push(format!("Special: {}", event.special_tags.join(", ")));
    }
    lines.push(format!(
        "Status: {}",
        status.map_or("unmarked", Classification::name)
    ));
    lines.push(format!("ID: {}", event.identity()));
    lines
}

/// Width of one venue column in the text grid
pub const GRID_COLUMN_WIDTH: usize = 24;

/// Render one day as a plain-text table: a time column plus one column per
/// venue. An event's block shows its labels on consecutive rows, then `:`
/// for the rest of its rendered span. Events the filter excludes are left
/// blank.
pub fn render_text_grid(grid: &DayGrid<'_>, store: &ClassificationStore, filter: ViewFilter) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", grid.key.label()));
    if grid.slots.is_empty() {
        out.push_str("(no timed events)\n");
        return out;
    }

    out.push_str("      ");
    for venue in &grid.venues {
        out.push_str(" | ");
        out.push_str(&pad_to_width(venue, GRID_COLUMN_WIDTH));
    }
    out.push('\n');
    out.push_str(&"-".repeat(6 + grid.venues.len() * (GRID_COLUMN_WIDTH + 3)));
    out.push('\n');

    for (slot_idx, &slot) in grid.slots.iter().enumerate() {
        out.push_str(&format!("{:>5} ", minutes_to_time(slot)));
        for venue_idx in 0..grid.venues.len() {
            let text = match grid.block_at(slot_idx, venue_idx) {
                Some((event, row)) => {
                    let status = store.classification_of(&event.identity());
                    if filter.shows(status) {
                        block_line(event, status, row)
                    } else {
                        String::new()
                    }
                }
                None => String::new(),
            };
            out.push_str(" | ");
            out.push_str(&pad_to_width(&text, GRID_COLUMN_WIDTH));
        }
        out.push('\n');
    }
    out
}

fn block_line(event: &Event, status: Option<Classification>, row: usize) -> String {
    let cell_text = CellText::of(event);
    let labels = cell_text.lines();
    match (row, labels.get(row)) {
        (0, first) => format!("{} {}", status_marker(status), first.copied().unwrap_or("")),
        (_, Some(label)) => format!("  {}", label),
        (_, None) => "  :".to_string(),
    }
}
