//! Academic week parity.
//!
//! The timetable runs on a two-week cycle counted from the semester start:
//! week 1 is odd, week 2 is even, and so on. The feed tags every lesson with
//! the code `"1"` (odd) or `"2"` (even); [`WeekParity`] is the closed form of
//! that tag used everywhere past the feed boundary.
//!
//! Free-form parity expressions ("odd", "нечетная", "ч", "2", ...) are
//! normalized by a [`ParityResolver`] against an injected [`ParityAliases`]
//! table. Resolution never fails: an unrecognized expression falls back to
//! the parity of the reference date, and [`ParityResolution::Defaulted`]
//! lets strict callers tell that apart from a real match.

use std::sync::LazyLock;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::EngineConfig;

/// Which half of the two-week cycle a week belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekParity {
    Odd,
    Even,
}

impl WeekParity {
    /// The feed's tag for this parity (`"1"` or `"2"`).
    pub fn code(self) -> &'static str {
        match self {
            WeekParity::Odd => "1",
            WeekParity::Even => "2",
        }
    }

    /// Parse a feed tag. Anything but `"1"`/`"2"` is an untagged lesson.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "1" => Some(WeekParity::Odd),
            "2" => Some(WeekParity::Even),
            _ => None,
        }
    }

    /// Parity of a 1-based week number.
    pub fn from_week_number(week_number: i64) -> Self {
        if week_number % 2 == 1 {
            WeekParity::Odd
        } else {
            WeekParity::Even
        }
    }

    /// The other half of the cycle.
    pub fn flip(self) -> Self {
        match self {
            WeekParity::Odd => WeekParity::Even,
            WeekParity::Even => WeekParity::Odd,
        }
    }
}

/// Compute the parity of the week containing `date`.
///
/// Dates before `semester_start` are treated as week 1.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use timetable_engine::parity::{parity_for_date, WeekParity};
///
/// let start = NaiveDate::from_ymd_opt(2024, 9, 2).unwrap();
/// assert_eq!(parity_for_date(start, start), WeekParity::Odd);
/// let next_week = NaiveDate::from_ymd_opt(2024, 9, 9).unwrap();
/// assert_eq!(parity_for_date(next_week, start), WeekParity::Even);
/// ```
pub fn parity_for_date(date: NaiveDate, semester_start: NaiveDate) -> WeekParity {
    let days_elapsed = (date - semester_start).num_days().max(0);
    WeekParity::from_week_number(days_elapsed / 7 + 1)
}

// ── Alias tables ────────────────────────────────────────────────────────────

const ODD_ALIASES: &[&str] = &["odd", "odd_week", "нечетная", "нечётная", "нечет", "н", "1"];
const EVEN_ALIASES: &[&str] = &["even", "even_week", "четная", "чётная", "чет", "ч", "2"];

static DEFAULT_ALIASES: LazyLock<ParityAliases> = LazyLock::new(ParityAliases::default);

/// Lowercased spellings accepted for each parity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParityAliases {
    odd: Vec<String>,
    even: Vec<String>,
}

impl ParityAliases {
    pub fn new<I, S>(odd: I, even: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fold = |aliases: I| {
            aliases
                .into_iter()
                .map(|a| a.as_ref().trim().to_lowercase())
                .collect::<Vec<String>>()
        };
        Self {
            odd: fold(odd),
            even: fold(even),
        }
    }

    /// The built-in table, constructed once per process.
    pub fn global() -> &'static ParityAliases {
        &DEFAULT_ALIASES
    }

    /// Look up an already trimmed and lowercased expression.
    fn lookup(&self, folded: &str) -> Option<WeekParity> {
        if self.odd.iter().any(|a| a == folded) {
            Some(WeekParity::Odd)
        } else if self.even.iter().any(|a| a == folded) {
            Some(WeekParity::Even)
        } else {
            None
        }
    }
}

impl Default for ParityAliases {
    fn default() -> Self {
        Self::new(ODD_ALIASES.iter(), EVEN_ALIASES.iter())
    }
}

// ── Resolution ──────────────────────────────────────────────────────────────

/// Outcome of normalizing a parity expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "parity", rename_all = "snake_case")]
pub enum ParityResolution {
    /// Empty input: no parity constraint.
    Unconstrained,
    /// The expression matched an alias.
    Recognized(WeekParity),
    /// The expression matched nothing; this is the reference week's parity.
    Defaulted(WeekParity),
}

impl ParityResolution {
    /// The lenient constraint: `Defaulted` behaves like a real answer.
    pub fn constraint(&self) -> Option<WeekParity> {
        match *self {
            ParityResolution::Unconstrained => None,
            ParityResolution::Recognized(p) | ParityResolution::Defaulted(p) => Some(p),
        }
    }

    pub fn is_recognized(&self) -> bool {
        matches!(self, ParityResolution::Recognized(_))
    }
}

/// Normalizes parity expressions against an alias table.
#[derive(Debug, Clone, Copy)]
pub struct ParityResolver<'a> {
    aliases: &'a ParityAliases,
    semester_start: NaiveDate,
}

impl<'a> ParityResolver<'a> {
    pub fn new(aliases: &'a ParityAliases, semester_start: NaiveDate) -> Self {
        Self {
            aliases,
            semester_start,
        }
    }

    /// Classify `expression`, using `today` for the unrecognized fallback.
    pub fn classify(&self, expression: &str, today: NaiveDate) -> ParityResolution {
        let folded = expression.trim().to_lowercase();
        if folded.is_empty() {
            return ParityResolution::Unconstrained;
        }
        match self.aliases.lookup(&folded) {
            Some(parity) => ParityResolution::Recognized(parity),
            None => {
                let parity = parity_for_date(today, self.semester_start);
                warn!(
                    expression = %expression.trim(),
                    fallback = parity.code(),
                    "unrecognized week parity, assuming current week"
                );
                ParityResolution::Defaulted(parity)
            }
        }
    }

    /// Lenient normalization: `None` only for empty input.
    pub fn normalize(&self, expression: &str, today: NaiveDate) -> Option<WeekParity> {
        self.classify(expression, today).constraint()
    }
}

/// Resolve a parity expression with the built-in aliases.
///
/// Empty input yields `None` (no constraint). Unrecognized input yields the
/// parity of `reference_date`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use timetable_engine::{resolve_week_parity, EngineConfig, WeekParity};
///
/// let config = EngineConfig::default();
/// let today = NaiveDate::from_ymd_opt(2024, 9, 4).unwrap();
/// assert_eq!(resolve_week_parity(" Четная ", today, &config), Some(WeekParity::Even));
/// assert_eq!(resolve_week_parity("", today, &config), None);
/// assert_eq!(resolve_week_parity("whatever", today, &config), Some(WeekParity::Odd));
/// ```
pub fn resolve_week_parity(
    expression: &str,
    reference_date: NaiveDate,
    config: &EngineConfig,
) -> Option<WeekParity> {
    ParityResolver::new(ParityAliases::global(), config.semester_start)
        .normalize(expression, reference_date)
}
