use std::collections::HashSet;

use serde::Serialize;

use crate::model::Schedule;
use crate::model::classification::Classification;
use crate::ops::store::ClassificationStore;

/// Summary numbers shown above the grid and by `fp stats`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanStats {
    pub total_events: usize,
    /// Events not in the hidden set
    pub visible_events: usize,
    /// Events marked interested or selected
    pub plan_events: usize,
    pub selected_events: usize,
    /// Total running time of plan events, rounded to whole hours
    pub plan_hours: u32,
    pub plan_minutes: u32,
    pub days: usize,
    pub venues: usize,
}

/// Compute stats over the loaded schedule. Stored identities that match no
/// loaded event are not counted.
pub fn compute_stats(schedule: &Schedule, store: &ClassificationStore) -> PlanStats {
    let mut visible_events = 0;
    let mut plan_events = 0;
    let mut selected_events = 0;
    let mut plan_minutes = 0u32;
    let mut days = HashSet::new();
    let mut venues = HashSet::new();

    for event in &schedule.events {
        let id = event.identity();
        match store.classification_of(&id) {
            Some(Classification::Hidden) => {}
            class => {
                visible_events += 1;
                if class.is_some() {
                    plan_events += 1;
                    plan_minutes = plan_minutes.saturating_add(event.minutes());
                }
                if class == Some(Classification::Selected) {
                    selected_events += 1;
                }
            }
        }
        days.insert((event.day.as_str(), event.date.to_string()));
        if let Some(venue) = event.venue.as_deref().filter(|v| !v.is_empty()) {
            venues.insert(venue);
        }
    }

    PlanStats {
        total_events: schedule.len(),
        visible_events,
        plan_events,
        selected_events,
        plan_hours: plan_minutes.saturating_add(30) / 60,
        plan_minutes,
        days: days.len(),
        venues: venues.len(),
    }
}
