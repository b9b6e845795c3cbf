//! Nearest upcoming lesson.
//!
//! Every candidate is placed on a single linear scale relative to the
//! reference instant:
//!
//! - same day: `start − now` (lessons that already started are skipped)
//! - `d` days ahead: `d × 1440 + start`
//!
//! The smallest distance wins; equal distances prefer fewer days ahead, and
//! after that the earlier lesson in source order. Search starts from the
//! lookahead horizon, so a lesson is only reported when its distance is
//! inside it. Otherwise the first lesson of the week is returned as a
//! fallback.

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::Serialize;
use tracing::debug;

use crate::config::{EngineConfig, MINUTES_PER_DAY};
use crate::day::{Day, DayAliases};
use crate::lesson::{chronological_order, Lesson};

/// Outcome of a nearest-lesson search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NearestLesson {
    /// A lesson within the lookahead horizon.
    Upcoming {
        lesson: Lesson,
        day: Day,
        /// 0 = today, 1 = tomorrow, ...
        days_ahead: u32,
        /// Wall-clock minutes from the reference instant to the lesson start.
        minutes_until: u32,
    },
    /// Nothing inside the horizon (today and tomorrow are free with the
    /// default horizon); this is the week's first lesson by `(day, start)`.
    FirstOfWeek { lesson: Lesson },
    /// The lesson set was empty.
    NoLessons,
}

impl NearestLesson {
    pub fn lesson(&self) -> Option<&Lesson> {
        match self {
            NearestLesson::Upcoming { lesson, .. } | NearestLesson::FirstOfWeek { lesson } => {
                Some(lesson)
            }
            NearestLesson::NoLessons => None,
        }
    }

    /// Whether the search fell back to the first lesson of the week.
    pub fn none_today_or_tomorrow(&self) -> bool {
        matches!(self, NearestLesson::FirstOfWeek { .. })
    }
}

/// Finds the nearest lesson against a day alias table and a horizon.
#[derive(Debug, Clone, Copy)]
pub struct NearestResolver<'a> {
    aliases: &'a DayAliases,
    lookahead_minutes: u32,
}

struct Candidate {
    position: usize,
    day: Day,
    days_ahead: u32,
    distance: u32,
}

impl<'a> NearestResolver<'a> {
    pub fn new(aliases: &'a DayAliases, lookahead_minutes: u32) -> Self {
        Self {
            aliases,
            lookahead_minutes,
        }
    }

    /// Search `lessons` (normally the current week's set) relative to `reference`.
    pub fn find(&self, lessons: &[Lesson], reference: NaiveDateTime) -> NearestLesson {
        if lessons.is_empty() {
            debug!("no lessons this week");
            return NearestLesson::NoLessons;
        }

        let today = Day::from(reference.weekday());
        let now_minutes = reference.hour() * 60 + reference.minute();

        let mut best_distance = self.lookahead_minutes;
        let mut best_days_ahead = 7;
        let mut best: Option<Candidate> = None;

        for (position, lesson) in lessons.iter().enumerate() {
            let Some(day) = lesson.resolved_day(self.aliases) else {
                debug!(day_name = %lesson.day_name, "skipping lesson with unresolved day");
                continue;
            };

            let days_ahead = today.days_until(day);
            let distance = if days_ahead == 0 {
                // Starting exactly now still counts as upcoming.
                match lesson.start_minutes.checked_sub(now_minutes) {
                    Some(d) => d,
                    None => continue,
                }
            } else {
                days_ahead * MINUTES_PER_DAY + lesson.start_minutes
            };

            if distance < best_distance
                || (distance == best_distance && days_ahead < best_days_ahead)
            {
                best_distance = distance;
                best_days_ahead = days_ahead;
                best = Some(Candidate {
                    position,
                    day,
                    days_ahead,
                    distance,
                });
            }
        }

        match best {
            Some(c) => {
                let lesson = lessons[c.position].clone();
                let minutes_until = if c.days_ahead == 0 {
                    c.distance
                } else {
                    c.distance - now_minutes
                };
                debug!(
                    day = %c.day,
                    days_ahead = c.days_ahead,
                    minutes_until,
                    "nearest lesson found"
                );
                NearestLesson::Upcoming {
                    lesson,
                    day: c.day,
                    days_ahead: c.days_ahead,
                    minutes_until,
                }
            }
            None => {
                let ordered = chronological_order(lessons, self.aliases);
                debug!(
                    horizon = self.lookahead_minutes,
                    "nothing within horizon, falling back to first lesson of the week"
                );
                match ordered.into_iter().next() {
                    Some(lesson) => NearestLesson::FirstOfWeek { lesson },
                    None => NearestLesson::NoLessons,
                }
            }
        }
    }
}

/// Find the nearest lesson with the built-in day aliases.
///
/// `reference` is read once by the caller (local wall-clock time) and used
/// for both the day and the time of day.
pub fn find_nearest(
    lessons: &[Lesson],
    reference: NaiveDateTime,
    config: &EngineConfig,
) -> NearestLesson {
    NearestResolver::new(DayAliases::global(), config.lookahead_minutes).find(lessons, reference)
}
