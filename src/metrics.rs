use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::data::model::{FurnaceProfile, HeatRecord};
use crate::grades::GradeSchedule;
use crate::time;

// ---------------------------------------------------------------------------
// Improvement – derived metrics for one heat
// ---------------------------------------------------------------------------

/// Derived improvement of the optimized prediction over the original
/// (operator) values. Positive percent = consumption reduced; negative =
/// got worse. Values are not clamped: > 100 % or arbitrarily negative
/// results are legitimate outputs, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Improvement {
    /// Total with the sub-measurement swapped for its optimized value:
    /// `total − original_sub + optimized_sub`.
    pub optimized_total: f64,
    /// `total − optimized_total` (= `original_sub − optimized_sub`).
    pub absolute: f64,
    /// `absolute / total × 100`.
    pub percent: f64,
}

/// Compute the improvement metrics from a measurement triple.
///
/// All inputs are validated before any arithmetic: a missing or non-finite
/// value, or a zero total, yields `None` — callers must be able to tell
/// "no improvement" (0.0) from "unknown" (`None`), and NaN/∞ must never be
/// stored.
pub fn improvement(
    total: Option<f64>,
    original_sub: Option<f64>,
    optimized_sub: Option<f64>,
) -> Option<Improvement> {
    let (total, original_sub, optimized_sub) = (total?, original_sub?, optimized_sub?);
    if !total.is_finite() || !original_sub.is_finite() || !optimized_sub.is_finite() {
        return None;
    }
    if total == 0.0 {
        return None;
    }
    let optimized_total = total - original_sub + optimized_sub;
    let absolute = total - optimized_total;
    Some(Improvement {
        optimized_total,
        absolute,
        percent: absolute / total * 100.0,
    })
}

// ---------------------------------------------------------------------------
// HeatSummary – a record enriched for filtering and display
// ---------------------------------------------------------------------------

/// One heat with its typed fields resolved through a [`FurnaceProfile`] and
/// the derived metrics attached. The raw record is retained for table
/// rendering.
#[derive(Debug, Clone)]
pub struct HeatSummary {
    pub heat_id: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub grade: Option<String>,
    pub family: Option<String>,
    /// Status flag: 1 = optimized, anything else = pending.
    pub optimized: bool,
    pub total: Option<f64>,
    pub original_sub: Option<f64>,
    pub optimized_sub: Option<f64>,
    pub improvement: Option<Improvement>,
    /// Improvement percentage carried verbatim by the export, when present.
    pub reported_pct: Option<f64>,
    pub record: HeatRecord,
}

impl HeatSummary {
    /// Improvement percentage used for range filtering and statistics:
    /// the computed metric, falling back to the export's own column when
    /// the measurement triple was incomplete.
    pub fn improvement_percent(&self) -> Option<f64> {
        self.improvement
            .as_ref()
            .map(|imp| imp.percent)
            .or(self.reported_pct)
    }

    /// Absolute improvement in the measured unit, same fallback rules as
    /// [`improvement_percent`](Self::improvement_percent) except an export
    /// percentage cannot stand in for an absolute value.
    pub fn improvement_absolute(&self) -> Option<f64> {
        self.improvement.as_ref().map(|imp| imp.absolute)
    }
}

/// Enrich one raw record: resolve typed fields per the profile, join the
/// steel grade through the schedule when the export does not carry one, and
/// attach the derived metrics.
pub fn enrich(
    record: &HeatRecord,
    profile: &FurnaceProfile,
    schedule: Option<&GradeSchedule>,
) -> HeatSummary {
    let start = record.get(profile.start_column).and_then(time::normalize);
    let end = profile
        .end_column
        .and_then(|col| record.get(col))
        .and_then(time::normalize)
        .or(start);

    let grade = match profile.grade_column {
        Some(col) => record.text(col),
        // Grade comes from the variable schedule, keyed by the start hour.
        None => match (schedule, start) {
            (Some(sched), Some(start)) => Some(sched.grade_at(start).to_string()),
            _ => None,
        },
    };

    let family = profile.family_column.and_then(|col| record.text(col));
    let heat_id = profile.heat_column.and_then(|col| record.text(col));
    let optimized = profile
        .status_column
        .and_then(|col| record.numeric(col))
        .map(|v| v == 1.0)
        .unwrap_or(false);

    let original_sub = profile.original_column.and_then(|col| record.numeric(col));
    let optimized_sub = profile.optimized_column.and_then(|col| record.numeric(col));
    // Without a total column the original sub-measurement doubles as the
    // total, which reduces the substitution formula to the direct pair
    // form (original − optimized) / original.
    let total = match profile.total_column {
        Some(col) => record.numeric(col),
        None => original_sub,
    };

    let reported_pct = profile
        .reported_pct_column
        .and_then(|col| record.numeric(col))
        .filter(|v| v.is_finite());

    HeatSummary {
        heat_id,
        start,
        end,
        grade,
        family,
        optimized,
        total,
        original_sub,
        optimized_sub,
        improvement: improvement(total, original_sub, optimized_sub),
        reported_pct,
        record: record.clone(),
    }
}

/// Enrich a whole dataset slice, preserving row order.
pub fn enrich_all(
    records: &[HeatRecord],
    profile: &FurnaceProfile,
    schedule: Option<&GradeSchedule>,
) -> Vec<HeatSummary> {
    records
        .iter()
        .map(|rec| enrich(rec, profile, schedule))
        .collect()
}
