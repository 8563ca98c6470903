use indexmap::IndexMap;

use super::event::{Event, english_day_name};

/// Key of a day bucket: source day name plus day-of-month
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DayKey {
    pub day: String,
    pub date: String,
}

impl DayKey {
    pub fn of(event: &Event) -> Self {
        DayKey {
            day: event.day.clone(),
            date: event.date.to_string(),
        }
    }

    /// `Monday, 12`
    pub fn label(&self) -> String {
        format!("{}, {}", english_day_name(&self.day), self.date)
    }

    /// Does a user-supplied day selector (`12`, `Dilluns`, `Monday`,
    /// `Dilluns 12`) name this bucket?
    pub fn matches(&self, selector: &str) -> bool {
        let sel = selector.trim();
        sel == self.date
            || sel.eq_ignore_ascii_case(&self.day)
            || sel.eq_ignore_ascii_case(english_day_name(&self.day))
            || sel == format!("{} {}", self.day, self.date)
    }
}

/// All events sharing a day name and date
#[derive(Debug, Clone)]
pub struct DayBucket<'a> {
    pub key: DayKey,
    pub events: Vec<&'a Event>,
}

/// The loaded festival schedule
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    pub events: Vec<Event>,
}

impl Schedule {
    /// Build a schedule, backfilling `duration_minutes` from duration labels.
    pub fn new(mut events: Vec<Event>) -> Self {
        for event in &mut events {
            event.backfill_duration();
        }
        Schedule { events }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Group events by `(day, date)`, ordered by ascending numeric date.
    /// Ties keep first-appearance order; non-numeric dates sort last.
    pub fn day_buckets(&self) -> Vec<DayBucket<'_>> {
        let mut groups: IndexMap<DayKey, (Option<i64>, Vec<&Event>)> = IndexMap::new();
        for event in &self.events {
            groups
                .entry(DayKey::of(event))
                .or_insert_with(|| (event.date.as_number(), Vec::new()))
                .1
                .push(event);
        }

        let mut buckets: Vec<(Option<i64>, DayBucket<'_>)> = groups
            .into_iter()
            .map(|(key, (num, events))| (num, DayBucket { key, events }))
            .collect();
        buckets.sort_by_key(|(num, _)| num.unwrap_or(i64::MAX));
        buckets.into_iter().map(|(_, b)| b).collect()
    }

    /// Sorted, de-duplicated venue names across the whole schedule
    pub fn venues(&self) -> Vec<String> {
        let mut venues: Vec<String> = self
            .events
            .iter()
            .filter_map(|e| e.venue.as_deref())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect();
        venues.sort();
        venues.dedup();
        venues
    }

    pub fn find(&self, identity: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.identity() == identity)
    }

    /// Resolve a user reference: either a 1-based index as printed by
    /// `fp list`, or a full identity string.
    pub fn resolve(&self, reference: &str) -> Option<&Event> {
        if let Ok(n) = reference.trim().trim_start_matches('#').parse::<usize>()
            && n >= 1
            && let Some(event) = self.events.get(n - 1)
        {
            return Some(event);
        }
        self.find(reference)
    }

    /// Exact five-field lookup used by plain-text import
    pub fn find_by_listing(
        &self,
        day: &str,
        date: &str,
        time: &str,
        venue: &str,
        title: &str,
    ) -> Option<&Event> {
        self.events.iter().find(|e| {
            e.day == day
                && e.date.to_string() == date
                && e.time.as_deref().unwrap_or("") == time
                && e.venue.as_deref().unwrap_or("") == venue
                && e.title == title
        })
    }
}

impl From<Vec<Event>> for Schedule {
    fn from(events: Vec<Event>) -> Self {
        Schedule::new(events)
    }
}
