//! Weekday normalization.
//!
//! The feed labels days with uppercase Russian names in inconsistent casing.
//! Filters arrive as digits, English or Russian names, or abbreviations.
//! [`DayResolver`] folds all of them into one [`Day`] so comparisons happen
//! against a single canonical form.
//!
//! Resolution order (first match wins):
//!
//! 1. a digit `0`–`6` (0 = Monday)
//! 2. an English full name
//! 3. a Russian full name, any case
//! 4. an already canonical uppercase name
//! 5. an abbreviation (`пн`…`вс`, `mon`…`sun`)
//! 6. otherwise the input is echoed upper-cased and matches no canonical day

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// A day of the teaching week, Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    /// 0 = Monday … 6 = Sunday.
    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Option<Day> {
        Day::ALL.get(usize::from(index)).copied()
    }

    /// The feed's label for this day.
    pub fn canonical_name(self) -> &'static str {
        match self {
            Day::Monday => "ПОНЕДЕЛЬНИК",
            Day::Tuesday => "ВТОРНИК",
            Day::Wednesday => "СРЕДА",
            Day::Thursday => "ЧЕТВЕРГ",
            Day::Friday => "ПЯТНИЦА",
            Day::Saturday => "СУББОТА",
            Day::Sunday => "ВОСКРЕСЕНЬЕ",
        }
    }

    pub fn english_name(self) -> &'static str {
        match self {
            Day::Monday => "monday",
            Day::Tuesday => "tuesday",
            Day::Wednesday => "wednesday",
            Day::Thursday => "thursday",
            Day::Friday => "friday",
            Day::Saturday => "saturday",
            Day::Sunday => "sunday",
        }
    }

    /// The following day, wrapping Sunday to Monday.
    pub fn succ(self) -> Day {
        Day::ALL[(usize::from(self.index()) + 1) % 7]
    }

    /// Whole days from `self` forward to `other` (0–6).
    pub fn days_until(self, other: Day) -> u32 {
        (u32::from(other.index()) + 7 - u32::from(self.index())) % 7
    }
}

impl From<Weekday> for Day {
    fn from(weekday: Weekday) -> Self {
        Day::ALL[weekday.num_days_from_monday() as usize]
    }
}

impl From<Day> for Weekday {
    fn from(day: Day) -> Self {
        match day {
            Day::Monday => Weekday::Mon,
            Day::Tuesday => Weekday::Tue,
            Day::Wednesday => Weekday::Wed,
            Day::Thursday => Weekday::Thu,
            Day::Friday => Weekday::Fri,
            Day::Saturday => Weekday::Sat,
            Day::Sunday => Weekday::Sun,
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

// ── Alias tables ────────────────────────────────────────────────────────────

const RUSSIAN_NAMES: [(&str, Day); 7] = [
    ("понедельник", Day::Monday),
    ("вторник", Day::Tuesday),
    ("среда", Day::Wednesday),
    ("четверг", Day::Thursday),
    ("пятница", Day::Friday),
    ("суббота", Day::Saturday),
    ("воскресенье", Day::Sunday),
];

const ABBREVIATIONS: [(&str, Day); 14] = [
    ("пн", Day::Monday),
    ("вт", Day::Tuesday),
    ("ср", Day::Wednesday),
    ("чт", Day::Thursday),
    ("пт", Day::Friday),
    ("сб", Day::Saturday),
    ("вс", Day::Sunday),
    ("mon", Day::Monday),
    ("tue", Day::Tuesday),
    ("wed", Day::Wednesday),
    ("thu", Day::Thursday),
    ("fri", Day::Friday),
    ("sat", Day::Saturday),
    ("sun", Day::Sunday),
];

static DEFAULT_ALIASES: LazyLock<DayAliases> = LazyLock::new(DayAliases::default);

/// Lowercased lookup tables for weekday expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayAliases {
    foreign: HashMap<String, Day>,
    native: HashMap<String, Day>,
    abbreviations: HashMap<String, Day>,
}

impl DayAliases {
    pub fn new<I, S>(foreign: I, native: I, abbreviations: I) -> Self
    where
        I: IntoIterator<Item = (S, Day)>,
        S: AsRef<str>,
    {
        let fold = |entries: I| {
            entries
                .into_iter()
                .map(|(name, day)| (name.as_ref().trim().to_lowercase(), day))
                .collect::<HashMap<String, Day>>()
        };
        Self {
            foreign: fold(foreign),
            native: fold(native),
            abbreviations: fold(abbreviations),
        }
    }

    /// The built-in tables, constructed once per process.
    pub fn global() -> &'static DayAliases {
        &DEFAULT_ALIASES
    }
}

impl Default for DayAliases {
    fn default() -> Self {
        let foreign: Vec<(&str, Day)> = Day::ALL.iter().map(|d| (d.english_name(), *d)).collect();
        Self::new(foreign, RUSSIAN_NAMES.to_vec(), ABBREVIATIONS.to_vec())
    }
}

// ── Resolution ──────────────────────────────────────────────────────────────

/// Outcome of normalizing a day expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "day", rename_all = "snake_case")]
pub enum DayResolution {
    /// Empty input: no day constraint.
    Unconstrained,
    Recognized(Day),
    /// Not a known day. Holds the input upper-cased.
    Unrecognized(String),
}

impl DayResolution {
    pub fn day(&self) -> Option<Day> {
        match self {
            DayResolution::Recognized(day) => Some(*day),
            _ => None,
        }
    }

    /// The normalized label: canonical name, upper-cased echo, or empty.
    pub fn label(&self) -> String {
        match self {
            DayResolution::Unconstrained => String::new(),
            DayResolution::Recognized(day) => day.canonical_name().to_string(),
            DayResolution::Unrecognized(echo) => echo.clone(),
        }
    }
}

/// Normalizes day expressions against an alias table.
#[derive(Debug, Clone, Copy)]
pub struct DayResolver<'a> {
    aliases: &'a DayAliases,
}

impl<'a> DayResolver<'a> {
    pub fn new(aliases: &'a DayAliases) -> Self {
        Self { aliases }
    }

    pub fn classify(&self, expression: &str) -> DayResolution {
        let trimmed = expression.trim();
        if trimmed.is_empty() {
            return DayResolution::Unconstrained;
        }
        let folded = trimmed.to_lowercase();
        let upper = trimmed.to_uppercase();

        let found = parse_digit(&folded)
            .or_else(|| self.aliases.foreign.get(&folded).copied())
            .or_else(|| self.aliases.native.get(&folded).copied())
            // Canonical labels are accepted even when a table omits them.
            .or_else(|| Day::ALL.into_iter().find(|d| d.canonical_name() == upper))
            .or_else(|| self.aliases.abbreviations.get(&folded).copied());

        match found {
            Some(day) => DayResolution::Recognized(day),
            None => DayResolution::Unrecognized(upper),
        }
    }

    pub fn resolve(&self, expression: &str) -> Option<Day> {
        self.classify(expression).day()
    }
}

fn parse_digit(s: &str) -> Option<Day> {
    match s.as_bytes() {
        [d @ b'0'..=b'6'] => Day::from_index(d - b'0'),
        _ => None,
    }
}

/// Resolve a day expression with the built-in aliases.
///
/// # Examples
///
/// ```
/// use timetable_engine::{resolve_day_name, Day};
///
/// assert_eq!(resolve_day_name("3"), Some(Day::Thursday));
/// assert_eq!(resolve_day_name("thursday"), Some(Day::Thursday));
/// assert_eq!(resolve_day_name("Четверг"), Some(Day::Thursday));
/// assert_eq!(resolve_day_name("someday"), None);
/// ```
pub fn resolve_day_name(expression: &str) -> Option<Day> {
    DayResolver::new(DayAliases::global()).resolve(expression)
}

/// Normalize a day expression to its label form (see [`DayResolution::label`]).
pub fn normalize_day_name(expression: &str) -> String {
    DayResolver::new(DayAliases::global())
        .classify(expression)
        .label()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(s: &str) -> DayResolution {
        DayResolver::new(DayAliases::global()).classify(s)
    }

    #[test]
    fn test_digits() {
        for (i, day) in Day::ALL.iter().enumerate() {
            assert_eq!(resolve_day_name(&i.to_string()), Some(*day));
        }
    }

    #[test]
    fn test_digit_out_of_range() {
        assert_eq!(classify("7"), DayResolution::Unrecognized("7".into()));
        assert_eq!(classify("10"), DayResolution::Unrecognized("10".into()));
    }

    #[test]
    fn test_english_names_any_case() {
        assert_eq!(resolve_day_name("monday"), Some(Day::Monday));
        assert_eq!(resolve_day_name("Wednesday"), Some(Day::Wednesday));
        assert_eq!(resolve_day_name("SUNDAY"), Some(Day::Sunday));
    }

    #[test]
    fn test_russian_names_any_case() {
        assert_eq!(resolve_day_name("вторник"), Some(Day::Tuesday));
        assert_eq!(resolve_day_name("Пятница"), Some(Day::Friday));
        assert_eq!(resolve_day_name("СУББОТА"), Some(Day::Saturday));
    }

    #[test]
    fn test_abbreviations() {
        assert_eq!(resolve_day_name("пн"), Some(Day::Monday));
        assert_eq!(resolve_day_name("ЧТ"), Some(Day::Thursday));
        assert_eq!(resolve_day_name("вс"), Some(Day::Sunday));
        assert_eq!(resolve_day_name("mon"), Some(Day::Monday));
        assert_eq!(resolve_day_name("Fri"), Some(Day::Friday));
    }

    #[test]
    fn test_digit_english_and_russian_converge() {
        let a = resolve_day_name("3");
        let b = resolve_day_name("thursday");
        let c = resolve_day_name("четверг");
        assert_eq!(a, Some(Day::Thursday));
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(Day::Thursday.index(), 3);
    }

    #[test]
    fn test_unrecognized_echoes_upper_case() {
        assert_eq!(classify(" someday "), DayResolution::Unrecognized("SOMEDAY".into()));
        assert_eq!(normalize_day_name("завтра"), "ЗАВТРА");
    }

    #[test]
    fn test_unrecognized_echo_matches_no_canonical_name() {
        let echo = normalize_day_name("tomorrow");
        assert!(Day::ALL.iter().all(|d| d.canonical_name() != echo));
    }

    #[test]
    fn test_empty_is_unconstrained() {
        assert_eq!(classify(""), DayResolution::Unconstrained);
        assert_eq!(classify("  "), DayResolution::Unconstrained);
        assert_eq!(normalize_day_name(""), "");
    }

    #[test]
    fn test_canonical_name_is_idempotent() {
        for day in Day::ALL {
            assert_eq!(normalize_day_name(day.canonical_name()), day.canonical_name());
            let once = normalize_day_name(day.english_name());
            assert_eq!(normalize_day_name(&once), once);
        }
    }

    #[test]
    fn test_canonical_names_accepted_without_native_table() {
        let aliases = DayAliases::new(Vec::<(&str, Day)>::new(), Vec::new(), Vec::new());
        let resolver = DayResolver::new(&aliases);
        assert_eq!(resolver.resolve("СРЕДА"), Some(Day::Wednesday));
        assert_eq!(resolver.resolve("среда"), Some(Day::Wednesday));
        assert_eq!(resolver.resolve("wednesday"), None);
        assert_eq!(resolver.resolve("2"), Some(Day::Wednesday));
    }

    #[test]
    fn test_injected_abbreviation() {
        let aliases = DayAliases::new(Vec::new(), Vec::new(), vec![("Mi", Day::Wednesday)]);
        assert_eq!(DayResolver::new(&aliases).resolve("mi"), Some(Day::Wednesday));
    }

    #[test]
    fn test_weekday_round_trip() {
        for day in Day::ALL {
            assert_eq!(Day::from(Weekday::from(day)), day);
        }
        assert_eq!(Day::from(Weekday::Sun), Day::Sunday);
    }

    #[test]
    fn test_succ_wraps() {
        assert_eq!(Day::Monday.succ(), Day::Tuesday);
        assert_eq!(Day::Sunday.succ(), Day::Monday);
    }

    #[test]
    fn test_days_until() {
        assert_eq!(Day::Tuesday.days_until(Day::Tuesday), 0);
        assert_eq!(Day::Tuesday.days_until(Day::Thursday), 2);
        assert_eq!(Day::Sunday.days_until(Day::Monday), 1);
        assert_eq!(Day::Thursday.days_until(Day::Tuesday), 5);
    }

    #[test]
    fn test_from_index_bounds() {
        assert_eq!(Day::from_index(0), Some(Day::Monday));
        assert_eq!(Day::from_index(6), Some(Day::Sunday));
        assert_eq!(Day::from_index(7), None);
    }

    #[test]
    fn test_display_is_canonical() {
        assert_eq!(Day::Friday.to_string(), "ПЯТНИЦА");
    }
}
