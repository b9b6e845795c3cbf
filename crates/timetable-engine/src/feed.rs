//! Feed adaptation: nested group → day → lessons JSON into flat [`Lesson`]s.
//!
//! The upstream feed is a JSON object keyed by group id:
//!
//! ```json
//! {
//!   "4352": {
//!     "days": {
//!       "0": {
//!         "name": "ПОНЕДЕЛЬНИК",
//!         "lessons": [
//!           { "start_time": "08:00", "end_time": "09:30", "week": "1",
//!             "name": "Math", "teacher": "Ivanov", "room": "5427",
//!             "form": "standard", "subjectType": "Lecture" }
//!         ]
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! Fetching the document is the caller's job. This module only parses and
//! flattens it, attaching the day key and label to every lesson. Day entries
//! are visited in document order. Scalar fields tolerate numbers and nulls;
//! malformed day entries or lessons are skipped rather than failing the group.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{Result, TimetableError};
use crate::lesson::{parse_clock_minutes, Lesson};
use crate::parity::WeekParity;

/// A parsed feed document.
#[derive(Debug, Clone, Default)]
pub struct ScheduleFeed {
    groups: Map<String, Value>,
}

/// One group's entry, days still raw.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawGroup {
    #[serde(default)]
    pub days: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDay {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default)]
    pub lessons: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLesson {
    #[serde(default, deserialize_with = "lenient_string")]
    pub start_time: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub end_time: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub week: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub teacher: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub room: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub form: String,
    #[serde(default, rename = "subjectType", deserialize_with = "lenient_string")]
    pub subject_type: String,
}

impl ScheduleFeed {
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(groups) => Ok(Self { groups }),
            other => Err(TimetableError::InvalidFeed(format!(
                "expected an object keyed by group, got {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn group_ids(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn group(&self, group: &str) -> Result<RawGroup> {
        let value = self
            .groups
            .get(group)
            .ok_or_else(|| TimetableError::UnknownGroup(group.to_string()))?;
        RawGroup::deserialize(value)
            .map_err(|e| TimetableError::InvalidFeed(format!("group '{group}': {e}")))
    }

    /// All lessons of `group`, flattened.
    pub fn lessons_for(&self, group: &str) -> Result<Vec<Lesson>> {
        let lessons = flatten_group(&self.group(group)?);
        debug!(group, total = lessons.len(), "flattened group lessons");
        Ok(lessons)
    }
}

/// Flatten a group's day map into tagged lessons, in document order.
pub fn flatten_group(group: &RawGroup) -> Vec<Lesson> {
    let mut lessons = Vec::new();
    for (key, value) in &group.days {
        let day = match RawDay::deserialize(value) {
            Ok(day) => day,
            Err(e) => {
                warn!(day_key = %key, error = %e, "skipping malformed day entry");
                continue;
            }
        };
        let day_index = parse_day_key(key);
        let day_name = day.name.trim().to_string();
        for raw in &day.lessons {
            match RawLesson::deserialize(raw) {
                Ok(raw) => lessons.push(to_lesson(raw, day_index, &day_name)),
                Err(e) => warn!(day_key = %key, error = %e, "skipping malformed lesson"),
            }
        }
    }
    lessons
}

fn to_lesson(raw: RawLesson, day_index: Option<u8>, day_name: &str) -> Lesson {
    Lesson {
        day_index,
        day_name: day_name.to_string(),
        week_parity: WeekParity::from_code(&raw.week),
        start_minutes: parse_clock_minutes(&raw.start_time),
        end_minutes: parse_clock_minutes(&raw.end_time),
        start_time: raw.start_time,
        end_time: raw.end_time,
        subject: raw.name,
        teacher: raw.teacher,
        room: raw.room,
        form: raw.form,
        subject_type: raw.subject_type,
    }
}

fn parse_day_key(key: &str) -> Option<u8> {
    key.trim().parse::<u8>().ok().filter(|i| *i < 7)
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
