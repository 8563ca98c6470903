use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Day-of-month as it appears in the schedule file.
///
/// The source data mixes numbers (`12`) and strings (`"12"`). The original
/// representation is kept so a load/save cycle writes the file back the
/// same way, while [`fmt::Display`] gives the single string form used by
/// identities and import matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventDate {
    Number(serde_json::Number),
    Text(String),
}

impl EventDate {
    /// Numeric value used for ordering day buckets.
    pub fn as_number(&self) -> Option<i64> {
        match self {
            EventDate::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            EventDate::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl Default for EventDate {
    fn default() -> Self {
        EventDate::Text(String::new())
    }
}

impl fmt::Display for EventDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Whole floats print without a fraction, so `12.0` and `12` key alike
            EventDate::Number(n) => match n.as_f64() {
                Some(v) if n.is_f64() && v.fract() == 0.0 && v.abs() < 1e15 => {
                    write!(f, "{}", v as i64)
                }
                _ => write!(f, "{}", n),
            },
            EventDate::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for EventDate {
    fn from(s: &str) -> Self {
        EventDate::Text(s.to_string())
    }
}

impl From<i64> for EventDate {
    fn from(n: i64) -> Self {
        EventDate::Number(n.into())
    }
}

impl From<i32> for EventDate {
    fn from(n: i32) -> Self {
        EventDate::Number(n.into())
    }
}

/// A single screening or session from the schedule file
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Event {
    /// Display name. The festival's own export calls this field `event`.
    #[serde(alias = "event")]
    pub title: String,
    /// Source-language weekday name (e.g. `Dilluns`)
    #[serde(default)]
    pub day: String,
    #[serde(default)]
    pub date: EventDate,
    /// Start time, `HH:MM`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    /// Raw duration label such as `95'`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(
        default,
        rename = "durationMinutes",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movie: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub movies: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub special_tags: Vec<String>,
}

impl Event {
    /// An event with every layout-relevant field present.
    pub fn timed(
        title: &str,
        day: &str,
        date: impl Into<EventDate>,
        time: &str,
        minutes: u32,
        venue: &str,
    ) -> Self {
        Event {
            title: title.to_string(),
            day: day.to_string(),
            date: date.into(),
            time: Some(time.to_string()),
            duration_minutes: Some(minutes),
            venue: Some(venue.to_string()),
            ..Default::default()
        }
    }

    /// Composite key naming this event across sessions:
    /// `title-time-venue-day-date`. Missing fields contribute an empty string.
    pub fn identity(&self) -> String {
        format!(
            "{}-{}-{}-{}-{}",
            self.title,
            self.time.as_deref().unwrap_or(""),
            self.venue.as_deref().unwrap_or(""),
            self.day,
            self.date
        )
    }

    /// Fill `duration_minutes` from a `N'` duration label when it is missing
    /// (or zero). Returns true if a value was written.
    pub fn backfill_duration(&mut self) -> bool {
        if self.duration_minutes.is_some_and(|m| m > 0) {
            return false;
        }
        match self.duration.as_deref().and_then(parse_duration_label) {
            Some(minutes) => {
                self.duration_minutes = Some(minutes);
                true
            }
            None => false,
        }
    }

    /// Duration for export purposes; absent means zero.
    pub fn minutes(&self) -> u32 {
        self.duration_minutes.unwrap_or(0)
    }

    pub fn is_multi_movie(&self) -> bool {
        self.movies.len() > 1
    }

    /// English display name for this event's day.
    pub fn day_name(&self) -> &str {
        english_day_name(&self.day)
    }
}

fn duration_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)'").unwrap())
}

/// Parse a duration label like `95'` (anywhere in the string) into minutes.
pub fn parse_duration_label(label: &str) -> Option<u32> {
    duration_re()
        .captures(label)
        .and_then(|caps| caps[1].parse().ok())
}

/// Map a Catalan weekday name to English, falling back to the input.
pub fn english_day_name(day: &str) -> &str {
    match day {
        "Dilluns" => "Monday",
        "Dimarts" => "Tuesday",
        "Dimecres" => "Wednesday",
        "Dijous" => "Thursday",
        "Divendres" => "Friday",
        "Dissabte" => "Saturday",
        "Diumenge" => "Sunday",
        other => other,
    }
}
