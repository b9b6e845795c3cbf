//! # timetable-engine
//!
//! Deterministic university timetable lookup.
//!
//! Given the flattened lesson list of a group and a filter expressed in one of
//! many natural-language or numeric forms, the engine normalizes the filter,
//! selects matching lessons and finds the nearest upcoming lesson relative to
//! a caller-supplied instant. Nothing here reads the clock or does I/O.
//!
//! ## Modules
//!
//! - [`parity`] — Week parity for a date; parity expression normalization
//! - [`day`] — Weekday expression normalization
//! - [`filter`] — Lesson selection by parity and day
//! - [`nearest`] — Nearest upcoming lesson with week wraparound and fallback
//! - [`lesson`] — The lesson record, clock parsing, chronological ordering
//! - [`feed`] — Raw feed JSON → flat lesson list
//! - [`query`] — today / tomorrow / week / day / nearest views for one group
//! - [`config`] — Semester anchor and lookahead horizon
//! - [`error`] — Error types

pub mod config;
pub mod day;
pub mod error;
pub mod feed;
pub mod filter;
pub mod lesson;
pub mod nearest;
pub mod parity;
pub mod query;

pub use config::EngineConfig;
pub use day::{normalize_day_name, resolve_day_name, Day, DayAliases, DayResolution, DayResolver};
pub use error::TimetableError;
pub use feed::ScheduleFeed;
pub use filter::{apply_filter, filter_lessons, DayConstraint, MatchResult, ResolvedFilter};
pub use lesson::{parse_clock_minutes, Lesson};
pub use nearest::{find_nearest, NearestLesson, NearestResolver};
pub use parity::{
    parity_for_date, resolve_week_parity, ParityAliases, ParityResolution, ParityResolver,
    WeekParity,
};
pub use query::{
    DayLessons, DaySchedule, FilteredSchedule, GroupTimetable, NearestReport, QueryResolution,
    ScheduleQuery, WeekSchedule,
};
