use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// How the user has marked an event. The three states are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Hidden,
    Interested,
    Selected,
}

impl Classification {
    /// Export order for plain-text plans
    pub const EXPORT_ORDER: [Classification; 3] = [
        Classification::Interested,
        Classification::Selected,
        Classification::Hidden,
    ];

    /// Upper-case label used in `=== <LABEL> EVENTS ===` headers
    pub fn label(self) -> &'static str {
        match self {
            Classification::Hidden => "HIDDEN",
            Classification::Interested => "INTERESTED",
            Classification::Selected => "SELECTED",
        }
    }

    pub fn from_label(label: &str) -> Option<Classification> {
        match label.trim().to_ascii_uppercase().as_str() {
            "HIDDEN" => Some(Classification::Hidden),
            "INTERESTED" => Some(Classification::Interested),
            "SELECTED" => Some(Classification::Selected),
            _ => None,
        }
    }

    /// Lower-case name, as used in JSON and messages
    pub fn name(self) -> &'static str {
        match self {
            Classification::Hidden => "hidden",
            Classification::Interested => "interested",
            Classification::Selected => "selected",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Classification::Hidden => "x",
            Classification::Interested => "*",
            Classification::Selected => "+",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Full tri-set snapshot, as persisted under the storage key
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub hidden: BTreeSet<String>,
    #[serde(default)]
    pub interested: BTreeSet<String>,
    #[serde(default)]
    pub selected: BTreeSet<String>,
}

impl Preferences {
    pub fn set(&self, class: Classification) -> &BTreeSet<String> {
        match class {
            Classification::Hidden => &self.hidden,
            Classification::Interested => &self.interested,
            Classification::Selected => &self.selected,
        }
    }

    pub fn counts(&self) -> Counts {
        Counts {
            hidden: self.hidden.len(),
            interested: self.interested.len(),
            selected: self.selected.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hidden.is_empty() && self.interested.is_empty() && self.selected.is_empty()
    }
}

/// Per-category sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Counts {
    pub hidden: usize,
    pub interested: usize,
    pub selected: usize,
}

impl Counts {
    pub fn total(&self) -> usize {
        self.hidden + self.interested + self.selected
    }
}
