use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::classification::Preferences;

/// Format version written to and required from JSON plans
pub const PLAN_FORMAT_VERSION: &str = "1.0";

/// JSON plan document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDocument {
    pub version: String,
    pub export_date: String,
    pub interested: Vec<String>,
    pub selected: Vec<String>,
    pub hidden: Vec<String>,
}

impl PlanDocument {
    pub fn from_preferences(prefs: &Preferences, exported_at: DateTime<Utc>) -> Self {
        PlanDocument {
            version: PLAN_FORMAT_VERSION.to_string(),
            export_date: exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            interested: prefs.interested.iter().cloned().collect(),
            selected: prefs.selected.iter().cloned().collect(),
            hidden: prefs.hidden.iter().cloned().collect(),
        }
    }
}

/// Serialize the three sets as a pretty-printed JSON plan.
pub fn serialize_plan_json(
    prefs: &Preferences,
    exported_at: DateTime<Utc>,
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&PlanDocument::from_preferences(prefs, exported_at))
}

/// Why a JSON plan was rejected
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PlanJsonError {
    #[error("not valid JSON: {0}")]
    Syntax(String),
    #[error("plan must be a JSON object")]
    NotAnObject,
    #[error("missing \"version\" field")]
    MissingVersion,
    #[error("plan has neither \"interested\" nor \"selected\"")]
    NoPlanSets,
    #[error("\"{0}\" must be an array of strings")]
    BadSet(&'static str),
}

/// Sets read from a JSON plan. Missing sets come back empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedJsonPlan {
    pub version: String,
    pub interested: Vec<String>,
    pub selected: Vec<String>,
    pub hidden: Vec<String>,
}

/// Parse and validate a JSON plan.
///
/// Requires a `version` field and at least one of `interested` / `selected`.
/// `hidden` and `exportDate` are optional. The version value itself is not
/// checked against [`PLAN_FORMAT_VERSION`].
pub fn parse_plan_json(text: &str) -> Result<ParsedJsonPlan, PlanJsonError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| PlanJsonError::Syntax(e.to_string()))?;
    let obj = value.as_object().ok_or(PlanJsonError::NotAnObject)?;

    let version = match obj.get("version") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => return Err(PlanJsonError::MissingVersion),
        Some(other) => other.to_string(),
    };

    if !obj.contains_key("interested") && !obj.contains_key("selected") {
        return Err(PlanJsonError::NoPlanSets);
    }

    Ok(ParsedJsonPlan {
        version,
        interested: string_array(obj.get("interested"), "interested")?,
        selected: string_array(obj.get("selected"), "selected")?,
        hidden: string_array(obj.get("hidden"), "hidden")?,
    })
}

fn string_array(value: Option<&Value>, field: &'static str) -> Result<Vec<String>, PlanJsonError> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| {
                v.as_str()
                    .map(str::to_string)
                    .ok_or(PlanJsonError::BadSet(field))
            })
            .collect(),
        Some(_) => Err(PlanJsonError::BadSet(field)),
    }
}
