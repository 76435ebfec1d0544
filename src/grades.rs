use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use log::warn;

use crate::data::model::HeatRecord;
use crate::time;

/// Sentinel grade assigned when no schedule window covers a heat's start.
/// A missing join key never fails the pipeline; tables render the dash
/// as-is.
pub const UNKNOWN_GRADE: &str = "-";

/// Column names of the variable-schedule table (article code whose trailing
/// five characters are the steel grade, plus the validity window).
const ARTICLE_COLUMN: &str = "CodArtic";
const WINDOW_START_COLUMN: &str = "FecInici";
const WINDOW_END_COLUMN: &str = "FecFinal";

const SECS_PER_HOUR: i64 = 3_600;

// ---------------------------------------------------------------------------
// GradeSchedule – hour-truncated timestamp → steel grade
// ---------------------------------------------------------------------------

/// Secondary join table mapping a heat's time window to a steel grade.
///
/// The schedule export lists article codes with validity windows; each
/// window is expanded to one entry per hour so that lookups reduce to a
/// single map probe on the hour-truncated start instant.
#[derive(Debug, Clone, Default)]
pub struct GradeSchedule {
    by_hour: BTreeMap<i64, String>,
}

impl GradeSchedule {
    /// Build the schedule from parsed variable-table rows. Rows with an
    /// unparseable window or missing article code are skipped with a
    /// warning; they never abort the build.
    pub fn from_records(records: &[HeatRecord]) -> Self {
        let mut by_hour = BTreeMap::new();

        for (i, rec) in records.iter().enumerate() {
            let Some(code) = rec.text(ARTICLE_COLUMN) else {
                warn!("schedule row {i}: missing {ARTICLE_COLUMN}, skipped");
                continue;
            };
            let grade = trailing_grade(&code);

            let start = rec.get(WINDOW_START_COLUMN).and_then(time::normalize);
            let end = rec.get(WINDOW_END_COLUMN).and_then(time::normalize);
            let (Some(start), Some(end)) = (start, end) else {
                warn!("schedule row {i} ({code}): unparseable window, skipped");
                continue;
            };
            if end < start {
                warn!("schedule row {i} ({code}): inverted window, skipped");
                continue;
            }

            let first = start.timestamp().div_euclid(SECS_PER_HOUR);
            let last = end.timestamp().div_euclid(SECS_PER_HOUR);
            for hour in first..=last {
                by_hour.insert(hour, grade.clone());
            }
        }

        GradeSchedule { by_hour }
    }

    /// Steel grade in effect at `instant`, keyed by the truncated hour.
    /// Returns [`UNKNOWN_GRADE`] when no window covers it.
    pub fn grade_at(&self, instant: DateTime<Utc>) -> &str {
        let hour = instant.timestamp().div_euclid(SECS_PER_HOUR);
        self.by_hour
            .get(&hour)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_GRADE)
    }

    pub fn is_empty(&self) -> bool {
        self.by_hour.is_empty()
    }
}

/// The steel grade is the trailing five characters of the article code;
/// shorter codes are used whole.
fn trailing_grade(code: &str) -> String {
    let chars: Vec<char> = code.chars().collect();
    if chars.len() <= 5 {
        code.to_string()
    } else {
        chars[chars.len() - 5..].iter().collect()
    }
}
