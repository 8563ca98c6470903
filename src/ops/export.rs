use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, TimeZone, Utc};

use crate::model::classification::Classification;
use crate::model::{Event, Schedule};
use crate::ops::store::ClassificationStore;
use crate::parse::ics::{IcsOptions, serialize_ics};
use crate::parse::plan_json::serialize_plan_json;
use crate::parse::plan_text::serialize_plan_text;

/// Error type for export operations
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("no selected events to add to the calendar")]
    NothingSelected,
    #[error("no selected event has a usable date and time: {}", .0.join(", "))]
    NothingExportable(Vec<String>),
    #[error("could not encode plan: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Output format for a plan export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Text,
    Json,
    Ics,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Json => "json",
            ExportFormat::Ics => "ics",
        }
    }

    /// File name offered when the user does not pick one
    pub fn default_file_name(self) -> String {
        format!("my-festival-plan.{}", self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(ExportFormat::Text),
            "json" => Ok(ExportFormat::Json),
            "ics" | "ical" | "calendar" => Ok(ExportFormat::Ics),
            other => Err(format!(
                "unknown export format '{}' (expected: text, json, ics)",
                other
            )),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Text => "text",
            ExportFormat::Json => "json",
            ExportFormat::Ics => "ics",
        })
    }
}

/// A rendered export, not yet written anywhere
#[derive(Debug, Clone)]
pub struct Exported {
    pub format: ExportFormat,
    pub content: String,
    /// Number of events (or identities, for JSON) included
    pub count: usize,
    /// Events left out of a calendar export for lack of a date or time
    pub skipped: Vec<String>,
}

/// Schedule events in the given set, in schedule order
pub fn events_in<'a>(
    schedule: &'a Schedule,
    store: &ClassificationStore,
    class: Classification,
) -> Vec<&'a Event> {
    let ids = store.ids(class);
    schedule
        .events
        .iter()
        .filter(|e| ids.contains(&e.identity()))
        .collect()
}

/// Plain-text plan of interested, selected and hidden events.
pub fn export_text(schedule: &Schedule, store: &ClassificationStore) -> Exported {
    let count = Classification::EXPORT_ORDER
        .iter()
        .map(|&c| events_in(schedule, store, c).len())
        .sum();
    Exported {
        format: ExportFormat::Text,
        content: serialize_plan_text(schedule, store.snapshot()),
        count,
        skipped: Vec::new(),
    }
}

/// JSON plan carrying the raw identity sets.
pub fn export_json(
    store: &ClassificationStore,
    exported_at: DateTime<Utc>,
) -> Result<Exported, ExportError> {
    Ok(Exported {
        format: ExportFormat::Json,
        content: serialize_plan_json(store.snapshot(), exported_at)?,
        count: store.counts().total(),
        skipped: Vec::new(),
    })
}

/// Calendar of the selected events only. Fails when nothing in the loaded
/// schedule is selected, or when every selected event lacks a date or time.
pub fn export_ics<Tz: TimeZone>(
    schedule: &Schedule,
    store: &ClassificationStore,
    opts: &IcsOptions,
    tz: &Tz,
) -> Result<Exported, ExportError> {
    let selected = events_in(schedule, store, Classification::Selected);
    if selected.is_empty() {
        return Err(ExportError::NothingSelected);
    }
    let calendar = serialize_ics(&selected, opts, tz);
    if calendar.written == 0 {
        return Err(ExportError::NothingExportable(calendar.skipped));
    }
    Ok(Exported {
        format: ExportFormat::Ics,
        content: calendar.text,
        count: calendar.written,
        skipped: calendar.skipped,
    })
}

/// Render an export of the current plan as of now. Calendar events are
/// written in local time.
pub fn export_plan(
    format: ExportFormat,
    schedule: &Schedule,
    store: &ClassificationStore,
    festival_month: u32,
) -> Result<Exported, ExportError> {
    match format {
        ExportFormat::Text => Ok(export_text(schedule, store)),
        ExportFormat::Json => export_json(store, Utc::now()),
        ExportFormat::Ics => {
            let opts = IcsOptions::for_today(Local::now().date_naive(), festival_month, Utc::now());
            export_ics(schedule, store, &opts, &Local)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn schedule() -> Schedule {
        Schedule::new(vec![
            Event::timed("Film A", "Dilluns", "12", "10:00", 90, "Hall 1"),
            Event::timed("Film B", "Dilluns", "12", "11:00", 60, "Hall 2"),
        ])
    }

    fn opts() -> IcsOptions {
        IcsOptions::for_today(
            NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            10,
            Utc::now(),
        )
    }

    #[test]
    fn ics_with_nothing_selected_fails() {
        let schedule = schedule();
        let mut store = ClassificationStore::new();
        store.set_interested(&schedule.events[0].identity()).unwrap();
        let err = export_ics(&schedule, &store, &opts(), &Utc).unwrap_err();
        assert!(matches!(err, ExportError::NothingSelected));
    }

    #[test]
    fn ics_ignores_selected_ids_missing_from_schedule() {
        let schedule = schedule();
        let mut store = ClassificationStore::new();
        store.set_selected("Gone-09:00-Hall 3-Dilluns-12").unwrap();
        assert!(export_ics(&schedule, &store, &opts(), &Utc).is_err());
    }

    #[test]
    fn ics_fails_when_no_selected_event_can_be_written() {
        let mut schedule = schedule();
        schedule.events[0].time = None;
        let mut store = ClassificationStore::new();
        store.set_selected(&schedule.events[0].identity()).unwrap();
        let err = export_ics(&schedule, &store, &opts(), &Utc).unwrap_err();
        match err {
            ExportError::NothingExportable(titles) => assert_eq!(titles, vec!["Film A"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn ics_exports_only_selected() {
        let schedule = schedule();
        let mut store = ClassificationStore::new();
        store.set_selected(&schedule.events[1].identity()).unwrap();
        store.set_interested(&schedule.events[0].identity()).unwrap();
        let out = export_ics(&schedule, &store, &opts(), &Utc).unwrap();
        assert_eq!(out.count, 1);
        assert!(out.content.contains("SUMMARY:Film B"));
        assert!(!out.content.contains("SUMMARY:Film A"));
    }

    #[test]
    fn text_counts_exported_events() {
        let schedule = schedule();
        let mut store = ClassificationStore::new();
        store.set_hidden(&schedule.events[0].identity()).unwrap();
        store.set_selected(&schedule.events[1].identity()).unwrap();
        let out = export_text(&schedule, &store);
        assert_eq!(out.count, 2);
        assert!(out.content.starts_with("=== SELECTED EVENTS ==="));
    }

    #[test]
    fn format_names() {
        assert_eq!("TXT".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
        assert_eq!("ics".parse::<ExportFormat>().unwrap(), ExportFormat::Ics);
        assert!("pdf".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::Json.default_file_name(), "my-festival-plan.json");
    }

    #[test]
    fn export_plan_dispatches_on_format() {
        let schedule = schedule();
        let mut store = ClassificationStore::new();
        assert!(matches!(
            export_plan(ExportFormat::Ics, &schedule, &store, 10),
            Err(ExportError::NothingSelected)
        ));
        store.set_selected(&schedule.events[0].identity()).unwrap();
        let ics = export_plan(ExportFormat::Ics, &schedule, &store, 10).unwrap();
        assert!(ics.content.starts_with("BEGIN:VCALENDAR"));
        let json = export_plan(ExportFormat::Json, &schedule, &store, 10).unwrap();
        assert_eq!(json.count, 1);
    }
}
