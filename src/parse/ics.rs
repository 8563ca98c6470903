//! iCalendar (RFC 5545) output for selected events.
//!
//! The schedule only carries a weekday name and a day of the month, so the
//! month is pinned to the festival month and the year is guessed from today.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::model::Event;
use crate::parse::time::time_to_minutes;

/// Suffix appended to identities to form globally unique UIDs
pub const UID_SUFFIX: &str = "@festplan";

const PRODID: &str = "-//festplan//Festival Planner//EN";

/// Longest content line, in octets, before folding
const FOLD_AT: usize = 75;

/// Year the festival's next edition falls in: this year, or next year if
/// the festival month has already passed.
pub fn festival_year(today: NaiveDate, festival_month: u32) -> i32 {
    if today.month() > festival_month {
        today.year() + 1
    } else {
        today.year()
    }
}

/// Resolved calendar placement for ICS output
#[derive(Debug, Clone, Copy)]
pub struct IcsOptions {
    pub year: i32,
    pub month: u32,
    /// Written as `DTSTAMP` on every event
    pub stamp: DateTime<Utc>,
}

impl IcsOptions {
    /// Options for exporting today, using the year heuristic.
    pub fn for_today(today: NaiveDate, festival_month: u32, stamp: DateTime<Utc>) -> Self {
        IcsOptions {
            year: festival_year(today, festival_month),
            month: festival_month,
            stamp,
        }
    }
}

/// A rendered calendar plus the events that could not be dated
#[derive(Debug, Clone)]
pub struct IcsCalendar {
    pub text: String,
    pub written: usize,
    /// Titles of events skipped for lack of a usable date or time
    pub skipped: Vec<String>,
}

/// Escape TEXT property values.
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            other => out.push(other),
        }
    }
    out
}

/// Fold a content line at 75 octets; continuation lines start with a space.
pub fn fold_line(line: &str) -> String {
    if line.len() <= FOLD_AT {
        return line.to_string();
    }
    let mut out = String::with_capacity(line.len() + line.len() / FOLD_AT * 3);
    let mut budget = FOLD_AT;
    let mut used = 0;
    for c in line.chars() {
        let w = c.len_utf8();
        if used + w > budget {
            out.push_str("\r\n ");
            used = 0;
            budget = FOLD_AT - 1;
        }
        out.push(c);
        used += w;
    }
    out
}

fn format_utc(dt: &DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Multi-line summary used as the event DESCRIPTION (unescaped)
pub fn describe(event: &Event) -> String {
    let mut lines = Vec::new();
    if event.is_multi_movie() {
        lines.push("Movies:".to_string());
        for movie in &event.movies {
            lines.push(format!("- {}", movie));
        }
    } else if let Some(movie) = event.movie.as_deref().or(event.movies.first().map(String::as_str)) {
        lines.push(format!("Movie: {}", movie));
    }
    match (&event.duration, event.duration_minutes) {
        (Some(label), _) => lines.push(format!("Duration: {}", label)),
        (None, Some(m)) => lines.push(format!("Duration: {} min", m)),
        (None, None) => {}
    }
    if !event.sections.is_empty() {
        lines.push(format!("Sections: {}", event.sections.join(", ")));
    }
    if !event.special_tags.is_empty() {
        lines.push(format!("Special: {}", event.special_tags.join(", ")));
    }
    lines.join("\n")
}

/// Start and end in UTC, interpreting the schedule's wall-clock time in `tz`.
fn event_window<Tz: TimeZone>(
    event: &Event,
    opts: &IcsOptions,
    tz: &Tz,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let day = u32::try_from(event.date.as_number()?).ok()?;
    let date = NaiveDate::from_ymd_opt(opts.year, opts.month, day)?;
    let minutes = time_to_minutes(event.time.as_deref()?)?;
    let time = NaiveTime::from_hms_opt(minutes / 60 % 24, minutes % 60, 0)?;
    let local = tz.from_local_datetime(&date.and_time(time)).earliest()?;
    let start = local.with_timezone(&Utc);
    let end = start + Duration::minutes(i64::from(event.minutes()));
    Some((start, end))
}

/// Render `events` as a VCALENDAR document with CRLF line endings.
pub fn serialize_ics<Tz: TimeZone>(events: &[&Event], opts: &IcsOptions, tz: &Tz) -> IcsCalendar {
    let mut lines: Vec<String> = vec![
        "BEGIN:VCALENDAR".into(),
        "VERSION:2.0".into(),
        format!("PRODID:{}", PRODID),
        "CALSCALE:GREGORIAN".into(),
        "METHOD:PUBLISH".into(),
    ];
    let mut written = 0;
    let mut skipped = Vec::new();

    for event in events {
        let Some((start, end)) = event_window(event, opts, tz) else {
            tracing::warn!(title = %event.title, "skipping event without a usable date/time");
            skipped.push(event.title.clone());
            continue;
        };
        lines.push("BEGIN:VEVENT".into());
        lines.push(format!("UID:{}", escape_text(&format!("{}{}", event.identity(), UID_SUFFIX))));
        lines.push(format!("DTSTAMP:{}", format_utc(&opts.stamp)));
        lines.push(format!("DTSTART:{}", format_utc(&start)));
        lines.push(format!("DTEND:{}", format_utc(&end)));
        lines.push(format!("SUMMARY:{}", escape_text(&event.title)));
        if let Some(venue) = event.venue.as_deref() {
            lines.push(format!("LOCATION:{}", escape_text(venue)));
        }
        let description = describe(event);
        if !description.is_empty() {
            lines.push(format!("DESCRIPTION:{}", escape_text(&description)));
        }
        lines.push("END:VEVENT".into());
        written += 1;
    }
    lines.push("END:VCALENDAR".into());

    let mut text = String::new();
    for line in &lines {
        text.push_str(&fold_line(line));
        text.push_str("\r\n");
    }
    IcsCalendar {
        text,
        written,
        skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn opts() -> IcsOptions {
        IcsOptions {
            year: 2026,
            month: 10,
            stamp: Utc.with_ymd_and_hms(2026, 9, 1, 8, 0, 0).unwrap(),
        }
    }

    fn film() -> Event {
        let mut e = Event::timed("Film A; Director's cut", "Dilluns", "12", "10:00", 90, "Hall 1, Sitges");
        e.movie = Some("The Long Night".into());
        e.duration = Some("90'".into());
        e.sections = vec!["Oficial".into(), "Noves Visions".into()];
        e
    }

    #[test]
    fn year_rolls_over_after_festival_month() {
        let sept = NaiveDate::from_ymd_opt(2026, 9, 30).unwrap();
        let oct = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();
        let nov = NaiveDate::from_ymd_opt(2026, 11, 2).unwrap();
        assert_eq!(festival_year(sept, 10), 2026);
        assert_eq!(festival_year(oct, 10), 2026);
        assert_eq!(festival_year(nov, 10), 2027);
    }

    #[test]
    fn renders_one_vevent_per_event() {
        let e = film();
        let cal = serialize_ics(&[&e], &opts(), &Utc);
        assert_eq!(cal.written, 1);
        assert!(cal.text.starts_with("BEGIN:VCALENDAR\r\nVERSION:2.0\r\n"));
        assert!(cal.text.ends_with("END:VCALENDAR\r\n"));
        assert!(cal.text.contains("DTSTART:20261012T100000Z\r\n"));
        assert!(cal.text.contains("DTEND:20261012T113000Z\r\n"));
        assert!(cal.text.contains("DTSTAMP:20260901T080000Z\r\n"));
        assert!(cal.text.contains("SUMMARY:Film A\\; Director's cut\r\n"));
        assert!(cal.text.contains("LOCATION:Hall 1\\, Sitges\r\n"));
        assert!(cal.text.contains(&format!("UID:Film A\\; Director's cut-10:00-Hall 1\\, Sitges-Dilluns-12{}", UID_SUFFIX)));
    }

    #[test]
    fn converts_local_time_to_utc() {
        let e = film();
        let cest = FixedOffset::east_opt(2 * 3600).unwrap();
        let cal = serialize_ics(&[&e], &opts(), &cest);
        assert!(cal.text.contains("DTSTART:20261012T080000Z"));
    }

    #[test]
    fn end_rolls_into_next_day() {
        let e = Event::timed("Night", "Dissabte", 17, "23:30", 120, "Hall 1");
        let cal = serialize_ics(&[&e], &opts(), &Utc);
        assert!(cal.text.contains("DTEND:20261018T013000Z"));
    }

    #[test]
    fn description_lists_details() {
        let mut e = film();
        e.movie = None;
        e.movies = vec!["One".into(), "Two".into()];
        e.special_tags = vec!["Premiere".into()];
        assert_eq!(
            describe(&e),
            "Movies:\n- One\n- Two\nDuration: 90'\nSections: Oficial, Noves Visions\nSpecial: Premiere"
        );
        assert_eq!(
            escape_text(&describe(&e)),
            "Movies:\\n- One\\n- Two\\nDuration: 90'\\nSections: Oficial\\, Noves Visions\\nSpecial: Premiere"
        );
    }

    #[test]
    fn undated_events_are_skipped() {
        let mut e = film();
        e.date = "tba".into();
        let cal = serialize_ics(&[&e], &opts(), &Utc);
        assert_eq!(cal.written, 0);
        assert_eq!(cal.skipped, vec![e.title.clone()]);
        assert!(!cal.text.contains("BEGIN:VEVENT"));
    }

    #[test]
    fn long_lines_are_folded() {
        let line = format!("DESCRIPTION:{}", "x".repeat(200));
        let folded = fold_line(&line);
        let parts: Vec<&str> = folded.split("\r\n").collect();
        assert_eq!(parts[0].len(), 75);
        assert!(parts[1..].iter().all(|p| p.starts_with(' ') && p.len() <= 75));
        let unfolded: String = parts
            .iter()
            .enumerate()
            .map(|(i, p)| if i == 0 { *p } else { &p[1..] })
            .collect();
        assert_eq!(unfolded, line);
    }

    #[test]
    fn folding_respects_char_boundaries() {
        let line = "é".repeat(60);
        let folded = fold_line(&line);
        assert!(folded.split("\r\n").all(|p| p.len() <= 75));
    }
}
