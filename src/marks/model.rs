use std::fmt;

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::id::{number_or_text, RecordId};

pub const MAX_MARK: i32 = 100;

/// One subject score owned by a student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mark {
    pub id: RecordId,
    pub student_id: RecordId,
    pub subject_name: String,
    #[serde(deserialize_with = "number_or_text")]
    pub subject_mark: i32,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

impl Mark {
    pub fn grade(&self) -> Grade {
        Grade::from_mark(self.subject_mark)
    }

    /// Calendar day of the last change, shown in the "Last Updated" column.
    pub fn updated_on(&self) -> Option<Date> {
        self.updated_at.map(|t| t.date())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkInput {
    pub student_id: RecordId,
    pub subject_name: String,
    pub subject_mark: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkUpdate {
    pub subject_name: String,
    pub subject_mark: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_mark(mark: i32) -> Self {
        match mark {
            m if m >= 90 => Grade::A,
            m if m >= 80 => Grade::B,
            m if m >= 70 => Grade::C,
            m if m >= 60 => Grade::D,
            _ => Grade::F,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mean score; zero when there are no marks.
pub fn average_mark(marks: &[Mark]) -> f64 {
    if marks.is_empty() {
        return 0.0;
    }
    let total: i64 = marks.iter().map(|m| i64::from(m.subject_mark)).sum();
    total as f64 / marks.len() as f64
}

/// Average as displayed: two decimals, or a bare `0` for an empty list.
pub fn format_average(marks: &[Mark]) -> String {
    if marks.is_empty() {
        return "0".to_string();
    }
    format!("{:.2}", average_mark(marks))
}
