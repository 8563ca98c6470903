use std::sync::OnceLock;

use regex::Regex;

use crate::model::classification::{Classification, Preferences};
use crate::model::{Event, Schedule};
use crate::parse::time::end_time;

/// Written when none of the three groups has any events
pub const EMPTY_PLAN_TEXT: &str = "No events in your plan yet.";

/// Separator line closing each record
const RECORD_END: &str = "---";

/// `=== INTERESTED EVENTS ===`
pub fn section_header(class: Classification) -> String {
    format!("=== {} EVENTS ===", class.label())
}

/// The `<day> <date> | <start>-<end> | <venue>` line of a record
pub fn listing_line(event: &Event) -> String {
    let start = event.time.as_deref().unwrap_or("");
    let end = event
        .time
        .as_deref()
        .and_then(|t| end_time(t, event.minutes()))
        .unwrap_or_default();
    format!(
        "{} {} | {}-{} | {}",
        event.day,
        event.date,
        start,
        end,
        event.venue.as_deref().unwrap_or("")
    )
}

fn record(event: &Event) -> String {
    format!(
        "{}\n{}\n{}\n{}",
        listing_line(event),
        event.title,
        event.movie.as_deref().unwrap_or("N/A"),
        RECORD_END
    )
}

/// Serialize the classified events as a human-readable plan.
///
/// Groups come in the order interested, selected, hidden; empty groups are
/// left out. Events inside a group follow schedule order. Records are
/// separated by one blank line and groups by two.
pub fn serialize_plan_text(schedule: &Schedule, prefs: &Preferences) -> String {
    let mut groups = Vec::new();
    for class in Classification::EXPORT_ORDER {
        let ids = prefs.set(class);
        let records: Vec<String> = schedule
            .events
            .iter()
            .filter(|e| ids.contains(&e.identity()))
            .map(record)
            .collect();
        if records.is_empty() {
            continue;
        }
        groups.push(format!("{}\n{}", section_header(class), records.join("\n\n")));
    }

    if groups.is_empty() {
        EMPTY_PLAN_TEXT.to_string()
    } else {
        groups.join("\n\n\n")
    }
}

/// One record read back from a text plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanListing {
    pub class: Classification,
    pub day: String,
    pub date: String,
    pub start: String,
    pub end: String,
    pub venue: String,
    pub title: String,
}

/// Result of scanning a text plan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPlan {
    /// Number of recognized `=== <LABEL> EVENTS ===` headers
    pub sections: usize,
    pub listings: Vec<PlanListing>,
}

fn header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^===\s*(\S+)\s+EVENTS\s*===").unwrap())
}

fn listing_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(.+?) (\S+) \| (\d{1,2}:\d{2})-(\d{1,2}:\d{2})? \| (.*)$").unwrap()
    })
}

/// Scan a text plan for section headers and records.
///
/// A record is a listing line immediately followed by a title line. Records
/// outside a known section, or whose listing line does not parse, are skipped.
pub fn parse_plan_text(text: &str) -> ParsedPlan {
    let lines: Vec<&str> = text.lines().map(|l| l.trim_end_matches('\r')).collect();
    let mut plan = ParsedPlan::default();
    let mut current: Option<Classification> = None;
    let mut idx = 0;

    while idx < lines.len() {
        let line = lines[idx];

        if let Some(caps) = header_re().captures(line) {
            current = Classification::from_label(&caps[1]);
            if current.is_some() {
                plan.sections += 1;
            }
            idx += 1;
            continue;
        }

        if let Some(class) = current
            && let Some(caps) = listing_re().captures(line)
            && let Some(title) = lines.get(idx + 1)
            && !title.trim().is_empty()
        {
            plan.listings.push(PlanListing {
                class,
                day: caps[1].to_string(),
                date: caps[2].to_string(),
                start: caps[3].to_string(),
                end: caps.get(4).map_or(String::new(), |m| m.as_str().to_string()),
                venue: caps[5].to_string(),
                title: title.to_string(),
            });
            idx += 2;
            continue;
        }

        idx += 1;
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn schedule() -> Schedule {
        let mut a = Event::timed("Film A", "Dilluns", "12", "10:00", 90, "Hall 1");
        a.movie = Some("The Long Night".into());
        let b = Event::timed("Film B", "Dilluns", 12, "11:00", 60, "Hall 2");
        let c = Event::timed("Shorts", "Dimarts", "13", "23:30", 95, "Hall 1");
        Schedule::new(vec![a, b, c])
    }

    fn prefs() -> Preferences {
        let s = schedule();
        let mut prefs = Preferences::default();
        prefs.interested.insert(s.events[0].identity());
        prefs.selected.insert(s.events[1].identity());
        prefs.selected.insert(s.events[2].identity());
        prefs
    }

    #[test]
    fn serializes_groups_in_fixed_order() {
        let text = serialize_plan_text(&schedule(), &prefs());
        insta::assert_snapshot!(text, @r"
        === INTERESTED EVENTS ===
        Dilluns 12 | 10:00-11:30 | Hall 1
        Film A
        The Long Night
        ---


        === SELECTED EVENTS ===
        Dilluns 12 | 11:00-12:00 | Hall 2
        Film B
        N/A
        ---

        Dimarts 13 | 23:30-01:05 | Hall 1
        Shorts
        N/A
        ---
        ");
    }

    #[test]
    fn empty_plan_gets_placeholder() {
        let text = serialize_plan_text(&schedule(), &Preferences::default());
        assert_eq!(text, EMPTY_PLAN_TEXT);
    }

    #[test]
    fn unknown_ids_are_not_exported() {
        let mut prefs = Preferences::default();
        prefs.hidden.insert("Ghost-10:00-Hall 9-Dilluns-12".into());
        assert_eq!(serialize_plan_text(&schedule(), &prefs), EMPTY_PLAN_TEXT);
    }

    #[test]
    fn parses_back_every_record() {
        let text = serialize_plan_text(&schedule(), &prefs());
        let plan = parse_plan_text(&text);
        assert_eq!(plan.sections, 2);
        assert_eq!(plan.listings.len(), 3);
        assert_eq!(
            plan.listings[0],
            PlanListing {
                class: Classification::Interested,
                day: "Dilluns".into(),
                date: "12".into(),
                start: "10:00".into(),
                end: "11:30".into(),
                venue: "Hall 1".into(),
                title: "Film A".into(),
            }
        );
        assert_eq!(plan.listings[2].class, Classification::Selected);
        assert_eq!(plan.listings[2].end, "01:05");
    }

    #[test]
    fn venues_with_spaces_and_pipes_in_titles() {
        let text = "=== HIDDEN EVENTS ===\nDiumenge 18 | 16:00-17:45 | Sala Tramuntana Gran\nA | B\nN/A\n---\n";
        let plan = parse_plan_text(text);
        assert_eq!(plan.listings.len(), 1);
        assert_eq!(plan.listings[0].venue, "Sala Tramuntana Gran");
        assert_eq!(plan.listings[0].title, "A | B");
    }

    #[test]
    fn records_outside_known_sections_are_skipped() {
        let text = "Dilluns 12 | 10:00-11:30 | Hall 1\nFilm A\n\n=== MAYBE EVENTS ===\nDilluns 12 | 10:00-11:30 | Hall 1\nFilm A\n";
        let plan = parse_plan_text(text);
        assert_eq!(plan.sections, 0);
        assert!(plan.listings.is_empty());
    }

    #[test]
    fn listing_without_title_is_skipped() {
        let text = "=== SELECTED EVENTS ===\nDilluns 12 | 10:00-11:30 | Hall 1\n\nnoise\n";
        let plan = parse_plan_text(text);
        assert_eq!(plan.sections, 1);
        assert!(plan.listings.is_empty());
    }

    #[test]
    fn tolerates_crlf_line_endings() {
        let text = serialize_plan_text(&schedule(), &prefs()).replace('\n', "\r\n");
        let plan = parse_plan_text(&text);
        assert_eq!(plan.listings.len(), 3);
        assert_eq!(plan.listings[1].title, "Film B");
    }
}
