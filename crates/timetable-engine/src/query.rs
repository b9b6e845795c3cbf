//! Per-command views over one group's lessons.
//!
//! Each view takes the reference instant as a value: callers read the clock
//! once per request so the day and the time of day always agree.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::config::EngineConfig;
use crate::day::{Day, DayAliases, DayResolution, DayResolver};
use crate::error::Result;
use crate::feed::ScheduleFeed;
use crate::filter::{apply_filter, DayConstraint, MatchResult, ResolvedFilter};
use crate::lesson::{chronological_order, Lesson};
use crate::nearest::{NearestLesson, NearestResolver};
use crate::parity::{parity_for_date, ParityAliases, ParityResolution, ParityResolver, WeekParity};

/// A raw request: group plus optional parity and day expressions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleQuery {
    pub group: String,
    pub week: Option<String>,
    pub day: Option<String>,
}

/// Both halves of a normalized [`ScheduleQuery`], kept in tri-state form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryResolution {
    pub week: ParityResolution,
    pub day: DayResolution,
}

impl QueryResolution {
    /// The lenient filter: unrecognized input still constrains.
    pub fn filter(&self) -> ResolvedFilter {
        ResolvedFilter::new(
            self.week.constraint(),
            DayConstraint::from_resolution(&self.day),
        )
    }
}

impl ScheduleQuery {
    pub fn new(group: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            ..Self::default()
        }
    }

    pub fn with_week(mut self, expression: impl Into<String>) -> Self {
        self.week = Some(expression.into());
        self
    }

    pub fn with_day(mut self, expression: impl Into<String>) -> Self {
        self.day = Some(expression.into());
        self
    }

    /// Normalize both expressions; `today` feeds the parity fallback.
    pub fn resolve(&self, today: NaiveDate, config: &EngineConfig) -> QueryResolution {
        let parity = ParityResolver::new(ParityAliases::global(), config.semester_start);
        let days = DayResolver::new(DayAliases::global());
        QueryResolution {
            week: parity.classify(self.week.as_deref().unwrap_or(""), today),
            day: days.classify(self.day.as_deref().unwrap_or("")),
        }
    }
}

/// Lessons grouped under one day heading, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayLessons {
    /// `None` when the feed label is not a known day.
    pub day: Option<Day>,
    pub day_name: String,
    pub lessons: Vec<Lesson>,
}

/// The `today` / `tomorrow` views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaySchedule {
    pub group: String,
    pub date: NaiveDate,
    pub day: Day,
    pub week_parity: WeekParity,
    /// The parity-filtered set was empty, so lessons of any parity are shown.
    pub parity_relaxed: bool,
    #[serde(flatten)]
    pub matches: MatchResult,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekSchedule {
    pub group: String,
    pub week_parity: WeekParity,
    pub total_matches: usize,
    pub total_lessons: usize,
    pub days: Vec<DayLessons>,
}

/// Result of an explicit day + week query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilteredSchedule {
    pub group: String,
    pub resolution: QueryResolution,
    #[serde(flatten)]
    pub matches: MatchResult,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NearestReport {
    pub group: String,
    pub week_parity: WeekParity,
    pub nearest: NearestLesson,
}

/// One group's full lesson list plus the configuration to query it with.
#[derive(Debug, Clone)]
pub struct GroupTimetable {
    group: String,
    lessons: Vec<Lesson>,
    config: EngineConfig,
}

impl GroupTimetable {
    pub fn new(group: impl Into<String>, lessons: Vec<Lesson>, config: EngineConfig) -> Self {
        Self {
            group: group.into(),
            lessons,
            config,
        }
    }

    pub fn from_feed(feed: &ScheduleFeed, group: &str, config: EngineConfig) -> Result<Self> {
        Ok(Self::new(group, feed.lessons_for(group)?, config))
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn parity_on(&self, date: NaiveDate) -> WeekParity {
        parity_for_date(date, self.config.semester_start)
    }

    /// Lessons for the reference date.
    ///
    /// When nothing matches the current parity the parity constraint is
    /// dropped, which surfaces lessons recorded without a parity tag.
    pub fn today(&self, now: NaiveDateTime) -> DaySchedule {
        self.day_schedule(now.date(), true)
    }

    /// Lessons for the next teaching day: Sunday rolls forward to Monday.
    pub fn tomorrow(&self, now: NaiveDateTime) -> DaySchedule {
        let mut date = now.date() + Duration::days(1);
        if Day::from(date.weekday()) == Day::Sunday {
            date += Duration::days(1);
        }
        self.day_schedule(date, false)
    }

    fn day_schedule(&self, date: NaiveDate, relax_parity: bool) -> DaySchedule {
        let day = Day::from(date.weekday());
        let week_parity = self.parity_on(date);
        let filter = ResolvedFilter::new(Some(week_parity), Some(DayConstraint::Day(day)));

        let mut matches = apply_filter(&self.lessons, &filter);
        let mut parity_relaxed = false;
        if relax_parity && matches.is_empty() {
            matches = apply_filter(&self.lessons, &filter.without_parity());
            parity_relaxed = true;
        }

        DaySchedule {
            group: self.group.clone(),
            date,
            day,
            week_parity,
            parity_relaxed,
            matches,
        }
    }

    /// The current week's lessons grouped by day, ordered by `(day, start)`.
    pub fn week(&self, now: NaiveDateTime) -> WeekSchedule {
        let week_parity = self.parity_on(now.date());
        let matches = apply_filter(&self.lessons, &ResolvedFilter::new(Some(week_parity), None));
        let aliases = DayAliases::global();

        let mut days: Vec<DayLessons> = Vec::new();
        for lesson in chronological_order(&matches.lessons, aliases) {
            let heading = lesson.day_name.trim().to_uppercase();
            match days.last_mut() {
                Some(group) if group.day_name == heading => group.lessons.push(lesson),
                _ => days.push(DayLessons {
                    day: lesson.resolved_day(aliases),
                    day_name: heading,
                    lessons: vec![lesson],
                }),
            }
        }

        WeekSchedule {
            group: self.group.clone(),
            week_parity,
            total_matches: matches.total_matches,
            total_lessons: matches.total_lessons,
            days,
        }
    }

    /// Lessons matching free-form day and week expressions.
    pub fn select(&self, query: &ScheduleQuery, now: NaiveDateTime) -> FilteredSchedule {
        let resolution = query.resolve(now.date(), &self.config);
        let matches = apply_filter(&self.lessons, &resolution.filter());
        FilteredSchedule {
            group: self.group.clone(),
            resolution,
            matches,
        }
    }

    /// The nearest upcoming lesson of the current week.
    pub fn nearest(&self, now: NaiveDateTime) -> NearestReport {
        let week_parity = self.parity_on(now.date());
        let current = apply_filter(&self.lessons, &ResolvedFilter::new(Some(week_parity), None));
        let nearest = NearestResolver::new(DayAliases::global(), self.config.lookahead_minutes)
            .find(&current.lessons, now);
        NearestReport {
            group: self.group.clone(),
            week_parity,
            nearest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Semester starts Monday 2026-02-09: the week of 2026-02-16 is even.
    fn config() -> EngineConfig {
        EngineConfig::with_semester_start(NaiveDate::from_ymd_opt(2026, 2, 9).unwrap())
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn lesson(day: Day, start: &str, parity: Option<WeekParity>, subject: &str) -> Lesson {
        let l = Lesson::on(day, start, "23:00").with_subject(subject);
        match parity {
            Some(p) => l.with_parity(p),
            None => l,
        }
    }

    fn timetable() -> GroupTimetable {
        use WeekParity::{Even, Odd};
        GroupTimetable::new(
            "4352",
            vec![
                lesson(Day::Monday, "09:50", Some(Even), "mon-even-late"),
                lesson(Day::Monday, "08:00", Some(Even), "mon-even"),
                lesson(Day::Monday, "08:00", Some(Odd), "mon-odd"),
                lesson(Day::Tuesday, "11:40", None, "tue-untagged"),
                lesson(Day::Wednesday, "13:40", Some(Odd), "wed-odd"),
                lesson(Day::Saturday, "10:00", Some(Even), "sat-even"),
            ],
            config(),
        )
    }

    fn subjects(lessons: &[Lesson]) -> Vec<&str> {
        lessons.iter().map(|l| l.subject.as_str()).collect()
    }

    #[test]
    fn test_today_filters_by_current_parity() {
        let view = timetable().today(at(2026, 2, 16, 7, 0));
        assert_eq!(view.day, Day::Monday);
        assert_eq!(view.week_parity, WeekParity::Even);
        assert!(!view.parity_relaxed);
        assert_eq!(subjects(&view.matches.lessons), ["mon-even-late", "mon-even"]);
    }

    #[test]
    fn test_today_relaxes_parity_when_empty() {
        let view = timetable().today(at(2026, 2, 17, 7, 0));
        assert_eq!(view.day, Day::Tuesday);
        assert!(view.parity_relaxed);
        assert_eq!(subjects(&view.matches.lessons), ["tue-untagged"]);
    }

    #[test]
    fn test_today_empty_day_stays_empty() {
        let view = timetable().today(at(2026, 2, 20, 7, 0));
        assert_eq!(view.day, Day::Friday);
        assert!(view.parity_relaxed);
        assert!(view.matches.is_empty());
        assert_eq!(view.matches.total_lessons, 6);
    }

    #[test]
    fn test_tomorrow_uses_target_date_parity() {
        // Sunday 2026-02-15 is the last day of an odd week; Monday is even.
        let view = timetable().tomorrow(at(2026, 2, 14, 12, 0));
        assert_eq!(view.date, NaiveDate::from_ymd_opt(2026, 2, 16).unwrap());
        assert_eq!(view.day, Day::Monday);
        assert_eq!(view.week_parity, WeekParity::Even);
        assert_eq!(subjects(&view.matches.lessons), ["mon-even-late", "mon-even"]);
    }

    #[test]
    fn test_tomorrow_from_sunday_is_monday() {
        let view = timetable().tomorrow(at(2026, 2, 22, 12, 0));
        assert_eq!(view.day, Day::Monday);
        assert_eq!(view.date, NaiveDate::from_ymd_opt(2026, 2, 23).unwrap());
        assert_eq!(view.week_parity, WeekParity::Odd);
        assert_eq!(subjects(&view.matches.lessons), ["mon-odd"]);
    }

    #[test]
    fn test_tomorrow_does_not_relax_parity() {
        let view = timetable().tomorrow(at(2026, 2, 16, 12, 0));
        assert_eq!(view.day, Day::Tuesday);
        assert!(!view.parity_relaxed);
        assert!(view.matches.is_empty());
    }

    #[test]
    fn test_week_groups_by_day_in_order() {
        let view = timetable().week(at(2026, 2, 18, 12, 0));
        assert_eq!(view.week_parity, WeekParity::Even);
        assert_eq!(view.total_matches, 3);
        assert_eq!(view.total_lessons, 6);
        assert_eq!(view.days.len(), 2);
        assert_eq!(view.days[0].day, Some(Day::Monday));
        assert_eq!(view.days[0].day_name, "ПОНЕДЕЛЬНИК");
        assert_eq!(subjects(&view.days[0].lessons), ["mon-even", "mon-even-late"]);
        assert_eq!(view.days[1].day, Some(Day::Saturday));
    }

    #[test]
    fn test_select_with_aliases() {
        let query = ScheduleQuery::new("4352").with_day("monday").with_week("нечет");
        let view = timetable().select(&query, at(2026, 2, 16, 7, 0));
        assert_eq!(view.resolution.week, ParityResolution::Recognized(WeekParity::Odd));
        assert_eq!(view.resolution.day, DayResolution::Recognized(Day::Monday));
        assert_eq!(subjects(&view.matches.lessons), ["mon-odd"]);
    }

    #[test]
    fn test_select_unrecognized_week_defaults_to_current() {
        let query = ScheduleQuery::new("4352").with_day("пн").with_week("любая");
        let view = timetable().select(&query, at(2026, 2, 16, 7, 0));
        assert_eq!(view.resolution.week, ParityResolution::Defaulted(WeekParity::Even));
        assert_eq!(subjects(&view.matches.lessons), ["mon-even-late", "mon-even"]);
    }

    #[test]
    fn test_select_unrecognized_day_matches_nothing() {
        let query = ScheduleQuery::new("4352").with_day("someday");
        let view = timetable().select(&query, at(2026, 2, 16, 7, 0));
        assert_eq!(view.resolution.day, DayResolution::Unrecognized("SOMEDAY".into()));
        assert!(view.matches.is_empty());
    }

    #[test]
    fn test_select_without_expressions_returns_all() {
        let view = timetable().select(&ScheduleQuery::new("4352"), at(2026, 2, 16, 7, 0));
        assert_eq!(view.resolution.week, ParityResolution::Unconstrained);
        assert_eq!(view.matches.total_matches, 6);
    }

    #[test]
    fn test_nearest_uses_current_week_only() {
        // Monday 09:00 of an even week: the odd 08:00 lesson is ignored and
        // the even 08:00 one has passed.
        let report = timetable().nearest(at(2026, 2, 16, 9, 0));
        assert_eq!(report.week_parity, WeekParity::Even);
        match report.nearest {
            NearestLesson::Upcoming {
                lesson,
                minutes_until,
                ..
            } => {
                assert_eq!(lesson.subject, "mon-even-late");
                assert_eq!(minutes_until, 50);
            }
            other => panic!("expected upcoming, got {other:?}"),
        }
    }

    #[test]
    fn test_nearest_falls_back_within_current_week() {
        let report = timetable().nearest(at(2026, 2, 18, 12, 0));
        assert!(report.nearest.none_today_or_tomorrow());
        assert_eq!(report.nearest.lesson().unwrap().subject, "mon-even");
    }

    #[test]
    fn test_nearest_no_lessons() {
        let empty = GroupTimetable::new("1", Vec::new(), config());
        let report = empty.nearest(at(2026, 2, 16, 9, 0));
        assert_eq!(report.nearest, NearestLesson::NoLessons);
    }

    #[test]
    fn test_views_agree_on_abbreviated_and_blank_labels() {
        let feed = ScheduleFeed::from_json(
            r#"{"7": {"days": {
                "0": {"name": "пн", "lessons": [
                    {"start_time": "10:00", "end_time": "11:30", "week": "2", "name": "abbr"}]},
                "1": {"name": "", "lessons": [
                    {"start_time": "12:00", "end_time": "13:30", "week": "2", "name": "blank"}]}
            }}}"#,
        )
        .unwrap();
        let timetable = GroupTimetable::from_feed(&feed, "7", config()).unwrap();
        let now = at(2026, 2, 16, 9, 0);

        let today = timetable.today(now);
        assert!(!today.parity_relaxed);
        assert_eq!(subjects(&today.matches.lessons), ["abbr"]);
        assert_eq!(
            timetable.nearest(now).nearest.lesson().map(|l| l.subject.as_str()),
            Some("abbr")
        );

        let tomorrow = timetable.tomorrow(now);
        assert_eq!(tomorrow.day, Day::Tuesday);
        assert_eq!(subjects(&tomorrow.matches.lessons), ["blank"]);
    }

    #[test]
    fn test_day_schedule_serializes_flat() {
        let json = serde_json::to_value(timetable().today(at(2026, 2, 16, 7, 0))).unwrap();
        assert_eq!(json["group"], "4352");
        assert_eq!(json["day"], "monday");
        assert_eq!(json["week_parity"], "even");
        assert_eq!(json["total_matches"], 2);
        assert!(json["lessons"].is_array());
    }
}
