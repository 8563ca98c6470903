//! Time-grid layout for a single festival day.
//!
//! A day's axis is a list of 15-minute slot marks (minutes since midnight,
//! not wrapped at 24:00). Events are placed per venue at the first slot at
//! or after their start, and every slot they overlap is reserved so no other
//! event claims it. Everything here is pure: renderers take a [`DayGrid`]
//! and draw it however they like.

use crate::model::{DayBucket, DayKey, Event};
use crate::parse::time::{MINUTES_PER_DAY, time_to_minutes};
use crate::util::unicode::clip_label;

/// Width of one grid row in minutes
pub const SLOT_MINUTES: u32 = 15;

/// Round down to a slot boundary.
pub fn floor_to_slot(minutes: u32) -> u32 {
    minutes / SLOT_MINUTES * SLOT_MINUTES
}

/// First slot boundary strictly after `minutes`. The axis always ends with a
/// closing row after the last event ends, so an end of 12:00 yields 12:15.
pub fn ceil_to_slot(minutes: u32) -> u32 {
    (minutes / SLOT_MINUTES + 1) * SLOT_MINUTES
}

/// Latest minute an event may end and still be laid out (four days past the
/// day's midnight)
pub const MAX_EVENT_END: u32 = 4 * MINUTES_PER_DAY;

/// Start minute and duration of an event that has both a parseable time and
/// a known duration. Events ending past [`MAX_EVENT_END`] are left off the
/// grid.
fn timing(event: &Event) -> Option<(u32, u32)> {
    let start = time_to_minutes(event.time.as_deref()?)?;
    let duration = event.duration_minutes?;
    match start.checked_add(duration) {
        Some(end) if end <= MAX_EVENT_END => Some((start, duration)),
        _ => {
            tracing::warn!(
                title = %event.title,
                time = ?event.time,
                duration,
                "event runs too long to lay out, skipping"
            );
            None
        }
    }
}

/// Compute the slot axis for one day's events.
///
/// Only events with both a start time and a duration contribute; a zero
/// duration still contributes its start. Returns an empty axis when nothing
/// contributes.
pub fn compute_slots(events: &[&Event]) -> Vec<u32> {
    let mut bounds: Option<(u32, u32)> = None;
    for (start, duration) in events.iter().filter_map(|e| timing(e)) {
        let end = start + duration;
        bounds = Some(match bounds {
            None => (start, end),
            Some((lo, hi)) => (lo.min(start), hi.max(end)),
        });
    }

    match bounds {
        None => Vec::new(),
        Some((earliest, latest)) => (floor_to_slot(earliest)..=ceil_to_slot(latest))
            .step_by(SLOT_MINUTES as usize)
            .collect(),
    }
}

/// Number of rows an event's block covers when drawn: `ceil(duration / 15)`.
///
/// This can exceed the count of occupied slot marks when the event starts
/// between slots. Renderers size blocks with this value.
pub fn span_rows(event: &Event) -> usize {
    event.minutes().div_ceil(SLOT_MINUTES) as usize
}

/// What a renderer should draw in one grid cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    /// An event starts here
    Start(&'a Event),
    /// Reserved by an event that started in an earlier row
    Covered,
    Free,
}

/// Venue × slot occupancy for one day
#[derive(Debug, Clone, Default)]
pub struct Placement<'a> {
    /// `starts[slot][venue]`
    starts: Vec<Vec<Option<&'a Event>>>,
    /// `occupied[slot][venue]`
    occupied: Vec<Vec<bool>>,
}

impl<'a> Placement<'a> {
    /// Event starting at `(slot, venue)`, by index.
    pub fn event_at(&self, slot: usize, venue: usize) -> Option<&'a Event> {
        self.starts.get(slot)?.get(venue).copied().flatten()
    }

    pub fn is_occupied(&self, slot: usize, venue: usize) -> bool {
        self.occupied
            .get(slot)
            .and_then(|row| row.get(venue))
            .copied()
            .unwrap_or(false)
    }

    pub fn cell(&self, slot: usize, venue: usize) -> Cell<'a> {
        if let Some(event) = self.event_at(slot, venue) {
            Cell::Start(event)
        } else if self.is_occupied(slot, venue) {
            Cell::Covered
        } else {
            Cell::Free
        }
    }
}

/// Place events onto the grid defined by `slots` × `venues`.
///
/// An event needs a time, a duration and a venue listed in `venues`. It
/// lands on the first slot at or after its start (the first slot overall if
/// it starts after every slot, which the axis from [`compute_slots`] rules
/// out). Slots with `start <= s < end` are marked occupied. A later event
/// starting in the same cell replaces the earlier one; double-booked venues
/// are not reported.
pub fn place_events<'a>(events: &[&'a Event], slots: &[u32], venues: &[String]) -> Placement<'a> {
    let mut placement = Placement {
        starts: vec![vec![None; venues.len()]; slots.len()],
        occupied: vec![vec![false; venues.len()]; slots.len()],
    };
    if slots.is_empty() {
        return placement;
    }

    for &event in events {
        let Some((start, duration)) = timing(event) else {
            continue;
        };
        let Some(venue_idx) = event
            .venue
            .as_deref()
            .and_then(|v| venues.iter().position(|name| name == v))
        else {
            continue;
        };
        let end = start + duration;

        let start_idx = slots.iter().position(|&s| s >= start).unwrap_or(0);
        placement.starts[start_idx][venue_idx] = Some(event);

        for (slot_idx, &slot) in slots.iter().enumerate() {
            if slot >= start && slot < end {
                placement.occupied[slot_idx][venue_idx] = true;
            }
        }
    }

    placement
}

/// A fully laid-out day, ready for rendering
#[derive(Debug, Clone)]
pub struct DayGrid<'a> {
    pub key: DayKey,
    pub events: Vec<&'a Event>,
    pub slots: Vec<u32>,
    pub venues: Vec<String>,
    pub placement: Placement<'a>,
}

impl<'a> DayGrid<'a> {
    pub fn cell(&self, slot: usize, venue: usize) -> Cell<'a> {
        self.placement.cell(slot, venue)
    }

    /// The block drawn over `(slot, venue)`: the nearest event starting at
    /// or above `slot` in this venue, when its rendered span reaches `slot`.
    /// Returns the event and the row inside its block.
    pub fn block_at(&self, slot: usize, venue: usize) -> Option<(&'a Event, usize)> {
        let (start, event) = (0..=slot)
            .rev()
            .find_map(|s| self.placement.event_at(s, venue).map(|e| (s, e)))?;
        let row = slot - start;
        (row < span_rows(event).max(1)).then_some((event, row))
    }
}

/// Lay out one day bucket against the festival-wide venue list.
pub fn layout_day<'a>(bucket: &DayBucket<'a>, venues: &[String]) -> DayGrid<'a> {
    let slots = compute_slots(&bucket.events);
    let placement = place_events(&bucket.events, &slots, venues);
    DayGrid {
        key: bucket.key.clone(),
        events: bucket.events.clone(),
        slots,
        venues: venues.to_vec(),
        placement,
    }
}

/// Title limit for a grid cell
pub const CELL_TITLE_LIMIT: usize = 20;
/// Movie limit for a grid cell
pub const CELL_MOVIE_LIMIT: usize = 30;
/// First-section limit for a grid cell
pub const CELL_SECTION_LIMIT: usize = 12;

/// The short labels drawn inside an event's grid block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellText {
    pub title: String,
    /// Movie title, or `N movies` for multi-movie sessions
    pub movie: String,
    pub duration: String,
    /// First section only
    pub section: Option<String>,
}

impl CellText {
    pub fn of(event: &Event) -> Self {
        let movie = if event.is_multi_movie() {
            format!("{} movies", event.movies.len())
        } else {
            clip_label(event.movie.as_deref().unwrap_or(""), CELL_MOVIE_LIMIT)
        };
        CellText {
            title: clip_label(&event.title, CELL_TITLE_LIMIT),
            movie,
            duration: event.duration.clone().unwrap_or_default(),
            section: event
                .sections
                .first()
                .map(|s| clip_label(s, CELL_SECTION_LIMIT)),
        }
    }

    /// Non-empty labels, top to bottom
    pub fn lines(&self) -> Vec<&str> {
        [
            Some(self.title.as_str()),
            Some(self.movie.as_str()),
            Some(self.duration.as_str()),
            self.section.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|l| !l.is_empty())
        .collect()
    }
}
