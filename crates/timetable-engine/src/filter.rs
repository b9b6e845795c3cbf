//! Lesson selection by week parity and day.
//!
//! Filtering preserves source order and never fails: an empty match set is a
//! meaningful answer that callers may react to (the "today" view retries
//! without a parity constraint, for example).

use serde::Serialize;
use tracing::debug;

use crate::day::{Day, DayAliases, DayResolution};
use crate::lesson::Lesson;
use crate::parity::WeekParity;

/// A normalized day constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum DayConstraint {
    /// Match lessons on this day, by feed index or by resolved label.
    Day(Day),
    /// Match lessons by the feed-assigned day index.
    Index(u8),
    /// Match lessons whose upper-cased label equals this string. Used for
    /// unrecognized expressions, which match no canonical label.
    Label(String),
}

impl DayConstraint {
    /// Lenient conversion of a day resolution; `None` means unconstrained.
    pub fn from_resolution(resolution: &DayResolution) -> Option<Self> {
        match resolution {
            DayResolution::Unconstrained => None,
            DayResolution::Recognized(day) => Some(DayConstraint::Day(*day)),
            DayResolution::Unrecognized(echo) => Some(DayConstraint::Label(echo.clone())),
        }
    }

    pub fn matches(&self, lesson: &Lesson) -> bool {
        self.matches_with(lesson, DayAliases::global())
    }

    /// Like [`matches`](Self::matches), resolving labels against `aliases`.
    pub fn matches_with(&self, lesson: &Lesson, aliases: &DayAliases) -> bool {
        match self {
            DayConstraint::Day(day) => {
                lesson.day_index == Some(day.index()) || lesson.resolved_day(aliases) == Some(*day)
            }
            DayConstraint::Index(index) => lesson.day_index == Some(*index),
            DayConstraint::Label(label) => lesson.has_day_label(label),
        }
    }
}

/// A query's constraints after normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedFilter {
    pub week_parity: Option<WeekParity>,
    pub day: Option<DayConstraint>,
}

impl ResolvedFilter {
    pub fn new(week_parity: Option<WeekParity>, day: Option<DayConstraint>) -> Self {
        Self { week_parity, day }
    }

    /// The same filter without its parity constraint.
    pub fn without_parity(&self) -> Self {
        Self {
            week_parity: None,
            day: self.day.clone(),
        }
    }

    pub fn matches(&self, lesson: &Lesson) -> bool {
        let parity_ok = self
            .week_parity
            .is_none_or(|p| lesson.week_parity == Some(p));
        let day_ok = self.day.as_ref().is_none_or(|d| d.matches(lesson));
        parity_ok && day_ok
    }
}

/// Lessons selected by a filter, plus the counts callers use to decide
/// whether to relax it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub lessons: Vec<Lesson>,
    pub total_matches: usize,
    pub total_lessons: usize,
}

impl MatchResult {
    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }
}

/// Select the lessons matching `filter`, in source order.
pub fn apply_filter(lessons: &[Lesson], filter: &ResolvedFilter) -> MatchResult {
    let selected: Vec<Lesson> = lessons
        .iter()
        .filter(|l| filter.matches(l))
        .cloned()
        .collect();

    debug!(
        week_parity = ?filter.week_parity,
        day = ?filter.day,
        total = lessons.len(),
        matched = selected.len(),
        "filtered lessons"
    );

    MatchResult {
        total_matches: selected.len(),
        total_lessons: lessons.len(),
        lessons: selected,
    }
}

/// Select lessons by optional parity and day constraints.
///
/// # Examples
///
/// ```
/// use timetable_engine::{filter_lessons, Day, Lesson, WeekParity};
///
/// let lessons = vec![
///     Lesson::on(Day::Monday, "08:00", "09:30").with_parity(WeekParity::Odd),
///     Lesson::on(Day::Monday, "09:50", "11:20").with_parity(WeekParity::Even),
/// ];
/// let result = filter_lessons(&lessons, Some(WeekParity::Odd), None);
/// assert_eq!(result.total_matches, 1);
/// assert_eq!(result.total_lessons, 2);
/// ```
pub fn filter_lessons(
    lessons: &[Lesson],
    week_parity: Option<WeekParity>,
    day: Option<DayConstraint>,
) -> MatchResult {
    apply_filter(lessons, &ResolvedFilter::new(week_parity, day))
}
