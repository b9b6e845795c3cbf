//! The flattened lesson record.

use chrono::{NaiveTime, Timelike};
use serde::Serialize;

use crate::day::{Day, DayAliases, DayResolver};
use crate::parity::WeekParity;

/// One scheduled occurrence, tagged with its day and week parity.
///
/// Created once from the feed and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lesson {
    /// Day index assigned by the feed (0 = Monday), when its key was a digit 0–6.
    pub day_index: Option<u8>,
    /// The feed's label for the day, trimmed but otherwise verbatim.
    pub day_name: String,
    /// `None` for lessons recorded without a parity tag.
    pub week_parity: Option<WeekParity>,
    pub start_time: String,
    pub end_time: String,
    /// Minutes since local midnight. Malformed times are 0.
    pub start_minutes: u32,
    pub end_minutes: u32,
    pub subject: String,
    pub teacher: String,
    pub room: String,
    pub form: String,
    pub subject_type: String,
}

impl Lesson {
    /// A lesson on `day` with canonical day tags and no parity.
    pub fn on(day: Day, start_time: &str, end_time: &str) -> Self {
        Self {
            day_index: Some(day.index()),
            day_name: day.canonical_name().to_string(),
            week_parity: None,
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
            start_minutes: parse_clock_minutes(start_time),
            end_minutes: parse_clock_minutes(end_time),
            subject: String::new(),
            teacher: String::new(),
            room: String::new(),
            form: String::new(),
            subject_type: String::new(),
        }
    }

    pub fn with_parity(mut self, parity: WeekParity) -> Self {
        self.week_parity = Some(parity);
        self
    }

    pub fn with_subject(mut self, subject: &str) -> Self {
        self.subject = subject.to_string();
        self
    }

    /// Resolve the stored day label to a canonical day.
    pub fn resolved_day(&self, aliases: &DayAliases) -> Option<Day> {
        DayResolver::new(aliases).resolve(&self.day_name)
    }

    /// Case-insensitive comparison of the stored label with `label`.
    pub fn has_day_label(&self, label: &str) -> bool {
        self.day_name.trim().to_uppercase() == label
    }
}

/// Parse an `HH:MM` (or `HH:MM:SS`) wall-clock string into minutes since midnight.
///
/// Anything unparseable is 0.
pub fn parse_clock_minutes(s: &str) -> u32 {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map(|t| t.hour() * 60 + t.minute())
        .unwrap_or(0)
}

/// Lessons ordered by `(day, start)`, stable in source order.
///
/// Lessons whose day label does not resolve sort last.
pub fn chronological_order(lessons: &[Lesson], aliases: &DayAliases) -> Vec<Lesson> {
    let mut keyed: Vec<(u8, u32, &Lesson)> = lessons
        .iter()
        .map(|l| {
            let day = l.resolved_day(aliases).map_or(u8::MAX, Day::index);
            (day, l.start_minutes, l)
        })
        .collect();
    keyed.sort_by_key(|(day, start, _)| (*day, *start));
    keyed.into_iter().map(|(_, _, l)| l.clone()).collect()
}
