use std::fs;
use std::path::{Path, PathBuf};

use crate::model::{Event, Schedule};

/// Error type for loading the schedule file.
///
/// Always terminal: nothing is rendered without a schedule.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("could not read schedule {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse schedule {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Parse a schedule: a JSON array of event records.
pub fn parse_schedule(text: &str) -> Result<Schedule, serde_json::Error> {
    let events: Vec<Event> = serde_json::from_str(text)?;
    Ok(Schedule::new(events))
}

/// Read and parse the schedule file at `path`.
pub fn load_schedule(path: &Path) -> Result<Schedule, LoadError> {
    let text = fs::read_to_string(path).map_err(|e| LoadError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let schedule = parse_schedule(&text).map_err(|e| LoadError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    tracing::debug!(path = %path.display(), events = schedule.len(), "loaded schedule");
    Ok(schedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"[
  {"event": "Film A", "day": "Dilluns", "date": 12, "time": "10:00", "duration": "90'", "venue": "Hall 1", "movie": "Alpha"},
  {"title": "Film B", "day": "Dilluns", "date": "12", "time": "11:00", "durationMinutes": 60, "venue": "Hall 2"}
]"#;

    #[test]
    fn loads_mixed_records() {
        let schedule = parse_schedule(SAMPLE).unwrap();
        assert_eq!(schedule.len(), 2);
        assert_eq!(schedule.events[0].title, "Film A");
        assert_eq!(schedule.events[0].duration_minutes, Some(90));
        assert_eq!(schedule.events[1].duration_minutes, Some(60));
    }

    #[test]
    fn identity_survives_reserialization() {
        let schedule = parse_schedule(SAMPLE).unwrap();
        let text = serde_json::to_string(&schedule.events).unwrap();
        let again = parse_schedule(&text).unwrap();
        for (a, b) in schedule.events.iter().zip(&again.events) {
            assert_eq!(a.identity(), b.identity());
        }
        // number stays a number
        assert!(text.contains(r#""date":12"#));
        assert!(text.contains(r#""date":"12""#));
    }

    #[test]
    fn missing_file_names_the_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("data/schedule.json");
        let err = load_schedule(&path).unwrap_err();
        assert!(matches!(err, LoadError::ReadError { .. }));
        assert!(err.to_string().contains("schedule.json"));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("schedule.json");
        fs::write(&path, r#"{"events": []}"#).unwrap();
        assert!(matches!(load_schedule(&path), Err(LoadError::ParseError { .. })));
    }
}
