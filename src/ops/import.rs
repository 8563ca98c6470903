use std::path::Path;

use crate::model::Schedule;
use crate::model::classification::{Classification, Counts};
use crate::ops::store::{ClassificationStore, StoreError};
use crate::parse::plan_json::{PlanJsonError, parse_plan_json};
use crate::parse::plan_text::parse_plan_text;

/// Error type for import operations.
///
/// Format errors are raised before the store is touched.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("invalid plan file: {0}")]
    Json(#[from] PlanJsonError),
    #[error("invalid plan file: no \"=== ... EVENTS ===\" sections found")]
    NoSections,
    #[error("{0}")]
    Store(#[from] StoreError),
}

/// Plan file format, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Json,
    Text,
}

impl ImportFormat {
    /// `.json` (any case) is JSON; everything else is a text plan.
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ImportFormat::Json,
            _ => ImportFormat::Text,
        }
    }
}

/// Result of an import operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub format: ImportFormat,
    /// Sizes of the three sets after the import
    pub imported: Counts,
    /// Sizes of the sets that were replaced
    pub replaced: Counts,
    /// Text records that matched no loaded event
    pub unmatched: usize,
}

/// Import a plan file's contents, replacing the whole store.
pub fn import_plan(
    format: ImportFormat,
    text: &str,
    schedule: &Schedule,
    store: &mut ClassificationStore,
) -> Result<ImportReport, ImportError> {
    match format {
        ImportFormat::Json => import_json(text, store),
        ImportFormat::Text => import_text(text, schedule, store),
    }
}

/// Replace the store with the identity sets of a JSON plan.
pub fn import_json(text: &str, store: &mut ClassificationStore) -> Result<ImportReport, ImportError> {
    let plan = parse_plan_json(text)?;
    let replaced = store.counts();
    store.replace_all(plan.hidden, plan.interested, plan.selected)?;
    tracing::debug!(?replaced, imported = ?store.counts(), "imported JSON plan");
    Ok(ImportReport {
        format: ImportFormat::Json,
        imported: store.counts(),
        replaced,
        unmatched: 0,
    })
}

/// Replace the store with the events a text plan names.
///
/// Each record is matched against the loaded schedule on day, date, start
/// time, venue and title. Records that match nothing are dropped and counted.
pub fn import_text(
    text: &str,
    schedule: &Schedule,
    store: &mut ClassificationStore,
) -> Result<ImportReport, ImportError> {
    let plan = parse_plan_text(text);
    if plan.sections == 0 {
        return Err(ImportError::NoSections);
    }

    let mut hidden = Vec::new();
    let mut interested = Vec::new();
    let mut selected = Vec::new();
    let mut unmatched = 0;

    for listing in &plan.listings {
        let Some(event) = schedule.find_by_listing(
            &listing.day,
            &listing.date,
            &listing.start,
            &listing.venue,
            &listing.title,
        ) else {
            tracing::debug!(title = %listing.title, "no loaded event matches plan record");
            unmatched += 1;
            continue;
        };
        let target = match listing.class {
            Classification::Hidden => &mut hidden,
            Classification::Interested => &mut interested,
            Classification::Selected => &mut selected,
        };
        target.push(event.identity());
    }

    let replaced = store.counts();
    store.replace_all(hidden, interested, selected)?;
    Ok(ImportReport {
        format: ImportFormat::Text,
        imported: store.counts(),
        replaced,
        unmatched,
    })
}
