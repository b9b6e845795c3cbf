//! Engine configuration.
//!
//! The only tunables are the semester anchor used for week parity and the
//! lookahead horizon of the nearest-lesson search. Alias tables are
//! configured separately through [`ParityAliases`](crate::parity::ParityAliases)
//! and [`DayAliases`](crate::day::DayAliases).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Minutes in one day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Default lookahead horizon of [`find_nearest`](crate::nearest::find_nearest).
pub const DEFAULT_LOOKAHEAD_MINUTES: u32 = MINUTES_PER_DAY;

/// Settings shared by every query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// First day of week 1 (an odd week).
    pub semester_start: NaiveDate,
    /// How far ahead the nearest-lesson search looks before falling back to
    /// the first lesson of the week.
    pub lookahead_minutes: u32,
}

impl EngineConfig {
    /// Config anchored at `semester_start` with the default horizon.
    pub fn with_semester_start(semester_start: NaiveDate) -> Self {
        Self {
            semester_start,
            ..Self::default()
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            // Monday, 2 September 2024: autumn semester, week 1.
            semester_start: NaiveDate::from_ymd_opt(2024, 9, 2).unwrap_or_default(),
            lookahead_minutes: DEFAULT_LOOKAHEAD_MINUTES,
        }
    }
}
