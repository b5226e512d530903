use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::states::{title_case, NORTHERN_STATES, SOUTHERN_STATES};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    /// Meteorological season of a calendar month. December belongs to the
    /// winter of its own year.
    pub fn from_month(month: u32) -> Self {
        match month {
            12 | 1 | 2 => Season::Winter,
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            _ => Season::Fall,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Region {
    Northern,
    Southern,
    Other,
}

impl Region {
    /// Region of a state name. The name is title-cased before lookup;
    /// anything in neither list, or no name at all, is `Other`.
    pub fn from_state(state: Option<&str>) -> Self {
        let Some(state) = state else {
            return Region::Other;
        };
        let state = title_case(state);
        if NORTHERN_STATES.contains(&state.as_str()) {
            Region::Northern
        } else if SOUTHERN_STATES.contains(&state.as_str()) {
            Region::Southern
        } else {
            Region::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Northern => "Northern",
            Region::Southern => "Southern",
            Region::Other => "Other",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
