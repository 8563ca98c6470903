use std::fmt;
use std::str::FromStr;

use crate::model::classification::Classification;

/// Which events a grid or list shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewFilter {
    /// Everything except hidden events
    #[default]
    Default,
    /// Only interested events
    Interested,
    /// Only selected events
    Selected,
    /// Everything, hidden events included
    RevealHidden,
}

impl ViewFilter {
    pub const ALL: [ViewFilter; 4] = [
        ViewFilter::Default,
        ViewFilter::Interested,
        ViewFilter::Selected,
        ViewFilter::RevealHidden,
    ];

    /// Is an event with this classification shown?
    pub fn shows(self, class: Option<Classification>) -> bool {
        match self {
            ViewFilter::Default => class != Some(Classification::Hidden),
            ViewFilter::Interested => class == Some(Classification::Interested),
            ViewFilter::Selected => class == Some(Classification::Selected),
            ViewFilter::RevealHidden => true,
        }
    }

    /// Next filter in the `f` key cycle
    pub fn next(self) -> ViewFilter {
        let idx = Self::ALL.iter().position(|&f| f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewFilter::Default => "all",
            ViewFilter::Interested => "interested",
            ViewFilter::Selected => "selected",
            ViewFilter::RevealHidden => "hidden",
        }
    }
}

impl fmt::Display for ViewFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ViewFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" | "default" => Ok(ViewFilter::Default),
            "interested" => Ok(ViewFilter::Interested),
            "selected" => Ok(ViewFilter::Selected),
            "hidden" | "reveal-hidden" => Ok(ViewFilter::RevealHidden),
            other => Err(format!(
                "unknown filter '{}' (expected: all, interested, selected, hidden)",
                other
            )),
        }
    }
}
