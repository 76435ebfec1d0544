use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::metrics::HeatSummary;

// ---------------------------------------------------------------------------
// FilterCriteria – one filter form submission
// ---------------------------------------------------------------------------

/// Conjunction of independent predicates over enriched heats. Every axis
/// defaults to "no restriction": empty categorical sets accept everything
/// (never reject-all), absent bounds are open, and the status flag only
/// restricts, never inverts.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    /// Inclusive lower bound on the heat's start instant.
    pub date_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the heat's end instant.
    pub date_to: Option<DateTime<Utc>>,
    /// Accepted steel grades; empty = all.
    pub grades: BTreeSet<String>,
    /// Accepted product families; empty = all.
    pub families: BTreeSet<String>,
    /// Accepted heat ids; empty = all.
    pub heats: BTreeSet<String>,
    /// Inclusive bounds on the improvement percentage. `None` = open; a
    /// blank form field maps here, not to zero.
    pub improvement_min: Option<f64>,
    pub improvement_max: Option<f64>,
    /// When true only optimized (status == 1) heats pass; when false all
    /// do. "Show only optimized" is opt-in; there is no inverse mode.
    pub optimized_only: bool,
}

impl FilterCriteria {
    /// True when no axis restricts anything; filtering is the identity.
    pub fn is_unrestricted(&self) -> bool {
        self.date_from.is_none()
            && self.date_to.is_none()
            && self.grades.is_empty()
            && self.families.is_empty()
            && self.heats.is_empty()
            && self.improvement_min.is_none()
            && self.improvement_max.is_none()
            && !self.optimized_only
    }

    fn has_improvement_bound(&self) -> bool {
        self.improvement_min.is_some() || self.improvement_max.is_some()
    }
}

/// Map a free-text numeric bound from a form field to a criteria bound.
/// Blank or unparseable input degrades to "no restriction on that side".
pub fn parse_bound(input: &str) -> Option<f64> {
    match input.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Predicate application
// ---------------------------------------------------------------------------

/// Whether one enriched heat passes every predicate of `criteria`.
pub fn matches(summary: &HeatSummary, criteria: &FilterCriteria) -> bool {
    // Date window: a heat without a parseable instant is an exclusion
    // candidate only while the corresponding bound is active.
    if let Some(from) = criteria.date_from {
        match summary.start {
            Some(start) if start >= from => {}
            _ => return false,
        }
    }
    if let Some(to) = criteria.date_to {
        match summary.end {
            Some(end) if end <= to => {}
            _ => return false,
        }
    }

    if !criteria.grades.is_empty() {
        match &summary.grade {
            Some(grade) if criteria.grades.contains(grade) => {}
            _ => return false,
        }
    }
    if !criteria.families.is_empty() {
        match &summary.family {
            Some(family) if criteria.families.contains(family) => {}
            _ => return false,
        }
    }
    if !criteria.heats.is_empty() {
        match &summary.heat_id {
            Some(id) if criteria.heats.contains(id) => {}
            _ => return false,
        }
    }

    if criteria.has_improvement_bound() {
        // Unknown improvement cannot satisfy an active range.
        let Some(pct) = summary.improvement_percent() else {
            return false;
        };
        if pct < criteria.improvement_min.unwrap_or(f64::NEG_INFINITY) {
            return false;
        }
        if pct > criteria.improvement_max.unwrap_or(f64::INFINITY) {
            return false;
        }
    }

    if criteria.optimized_only && !summary.optimized {
        return false;
    }

    true
}

/// Apply the criteria to an enriched heat sequence: order-preserving,
/// non-mutating. Unrestricted criteria returns the input unchanged.
pub fn apply(summaries: &[HeatSummary], criteria: &FilterCriteria) -> Vec<HeatSummary> {
    summaries
        .iter()
        .filter(|sum| matches(sum, criteria))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{FieldValue, FurnaceProfile, HeatRecord};
    use crate::metrics::enrich;
    use chrono::TimeZone;

    fn heat(id: i64, serial: f64, grade: &str, status: i64, orig: f64, opt: f64) -> HeatSummary {
        let rec = HeatRecord::new(
            [
                ("colada".to_string(), FieldValue::Integer(id)),
                ("fecha_colada".to_string(), FieldValue::Float(serial)),
                ("grado_acero".to_string(), FieldValue::String(grade.into())),
                ("familia".to_string(), FieldValue::String("F1".into())),
                ("Status".to_string(), FieldValue::Integer(status)),
                ("kwh_total".to_string(), FieldValue::Float(1000.0)),
                ("kwh_tap4_original".to_string(), FieldValue::Float(orig)),
                ("kwh_tap4_optimo".to_string(), FieldValue::Float(opt)),
            ]
            .into_iter()
            .collect(),
        );
        enrich(&rec, &FurnaceProfile::eaf(), None)
    }

    fn sample() -> Vec<HeatSummary> {
        vec![
            heat(1, 45_000.0, "G1", 1, 100.0, 80.0),  // +2 %
            heat(2, 45_001.0, "G2", 1, 100.0, 120.0), // −2 %
            heat(3, 45_002.0, "G1", 0, 100.0, 90.0),  // +1 %, pending
        ]
    }

    #[test]
    fn unrestricted_criteria_is_identity() {
        let heats = sample();
        let criteria = FilterCriteria::default();
        assert!(criteria.is_unrestricted());
        let out = apply(&heats, &criteria);
        assert_eq!(out.len(), heats.len());
        let ids: Vec<_> = out.iter().map(|h| h.heat_id.clone()).collect();
        assert_eq!(
            ids,
            heats.iter().map(|h| h.heat_id.clone()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn conjunction_of_predicates() {
        let criteria = FilterCriteria {
            grades: ["G1".to_string()].into(),
            optimized_only: true,
            ..Default::default()
        };
        let out = apply(&sample(), &criteria);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].heat_id.as_deref(), Some("1"));
        // Every survivor passes each predicate individually.
        for sum in &out {
            assert!(criteria.grades.contains(sum.grade.as_deref().unwrap()));
            assert!(sum.optimized);
        }
    }

    #[test]
    fn empty_category_set_accepts_all() {
        let criteria = FilterCriteria {
            grades: BTreeSet::new(),
            ..Default::default()
        };
        assert_eq!(apply(&sample(), &criteria).len(), 3);
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let criteria = FilterCriteria {
            date_from: Some(Utc.with_ymd_and_hms(2023, 3, 15, 0, 0, 0).unwrap()),
            date_to: Some(Utc.with_ymd_and_hms(2023, 3, 16, 0, 0, 0).unwrap()),
            ..Default::default()
        };
        let out = apply(&sample(), &criteria);
        // serials 45 000 and 45 001 fall on the bounds, 45 002 is past.
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn active_date_bound_excludes_invalid_dates() {
        let mut heats = sample();
        heats[0].start = None;
        heats[0].end = None;
        let criteria = FilterCriteria {
            date_from: Some(Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()),
            ..Default::default()
        };
        let out = apply(&heats, &criteria);
        assert_eq!(out.len(), 2);
        // Without the bound the record is retained.
        assert_eq!(apply(&heats, &FilterCriteria::default()).len(), 3);
    }

    #[test]
    fn improvement_range_excludes_unknown_only_when_active() {
        let mut heats = sample();
        heats[1].improvement = None;
        heats[1].reported_pct = None;
        let ranged = FilterCriteria {
            improvement_min: Some(0.0),
            ..Default::default()
        };
        let out = apply(&heats, &ranged);
        assert_eq!(out.len(), 2); // unknown excluded, both positives kept
        assert_eq!(apply(&heats, &FilterCriteria::default()).len(), 3);
    }

    #[test]
    fn status_flag_restricts_never_inverts() {
        let only = FilterCriteria {
            optimized_only: true,
            ..Default::default()
        };
        assert_eq!(apply(&sample(), &only).len(), 2);
        // optimized_only = false shows everything, not only pending.
        let all = FilterCriteria {
            optimized_only: false,
            ..Default::default()
        };
        assert_eq!(apply(&sample(), &all).len(), 3);
    }

    #[test]
    fn blank_bound_input_degrades_to_open() {
        assert_eq!(parse_bound(""), None);
        assert_eq!(parse_bound("   "), None);
        assert_eq!(parse_bound("abc"), None);
        assert_eq!(parse_bound("-2.5"), Some(-2.5));
    }

    #[test]
    fn criteria_deserializes_from_json() {
        let criteria: FilterCriteria = serde_json::from_str(
            r#"{"grades": ["G1"], "improvement_min": 0.5, "optimized_only": true}"#,
        )
        .unwrap();
        assert!(criteria.grades.contains("G1"));
        assert_eq!(criteria.improvement_min, Some(0.5));
        assert!(criteria.optimized_only);
        assert_eq!(criteria.date_from, None);
    }
}
