use log::info;

use crate::data::filter::{self, FilterCriteria};
use crate::data::model::{FurnaceDataset, FurnaceProfile};
use crate::grades::GradeSchedule;
use crate::metrics::{self, HeatSummary};
use crate::stats::{self, IntervalBin, Summary};

// ---------------------------------------------------------------------------
// AnalysisSession – one load-filter-aggregate cycle of state
// ---------------------------------------------------------------------------

/// Explicit pipeline state for a single analysis session: the loaded
/// dataset, its furnace profile, the optional grade schedule, the current
/// criteria and the cached filtered subset. Callers thread this through
/// their code instead of reading results out of a shared store.
pub struct AnalysisSession {
    profile: FurnaceProfile,
    dataset: FurnaceDataset,
    schedule: Option<GradeSchedule>,
    criteria: FilterCriteria,
    /// All heats, enriched (recomputed on dataset/schedule change).
    summaries: Vec<HeatSummary>,
    /// Heats passing the current criteria (recomputed on every change).
    filtered: Vec<HeatSummary>,
}

impl AnalysisSession {
    pub fn new(profile: FurnaceProfile) -> Self {
        AnalysisSession {
            profile,
            dataset: FurnaceDataset::default(),
            schedule: None,
            criteria: FilterCriteria::default(),
            summaries: Vec::new(),
            filtered: Vec::new(),
        }
    }

    /// Ingest a newly loaded export; criteria reset to unrestricted so the
    /// whole dataset shows by default.
    pub fn set_dataset(&mut self, dataset: FurnaceDataset) {
        info!(
            "loaded {} heats for furnace profile {}",
            dataset.len(),
            self.profile.name
        );
        self.dataset = dataset;
        self.criteria = FilterCriteria::default();
        self.reenrich();
    }

    /// Attach (or replace) the variable schedule used for the grade join.
    pub fn set_schedule(&mut self, schedule: GradeSchedule) {
        self.schedule = Some(schedule);
        self.reenrich();
    }

    /// Apply a filter form submission.
    pub fn apply_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.refilter();
    }

    /// Back to the unrestricted view.
    pub fn reset(&mut self) {
        self.apply_criteria(FilterCriteria::default());
    }

    fn reenrich(&mut self) {
        self.summaries =
            metrics::enrich_all(&self.dataset.records, &self.profile, self.schedule.as_ref());
        self.refilter();
    }

    fn refilter(&mut self) {
        self.filtered = filter::apply(&self.summaries, &self.criteria);
        info!(
            "filter pass: {} of {} heats",
            self.filtered.len(),
            self.summaries.len()
        );
    }

    pub fn dataset(&self) -> &FurnaceDataset {
        &self.dataset
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Heats passing the current criteria, enriched, in file order. Feeds
    /// the table-rendering collaborator.
    pub fn filtered(&self) -> &[HeatSummary] {
        &self.filtered
    }

    /// Summary statistics over the known improvement percentages of the
    /// filtered subset. `None` when nothing remains or every improvement is
    /// unknown — an expected "no data" state.
    pub fn improvement_summary(&self) -> Option<Summary> {
        let percents: Vec<f64> = self
            .filtered
            .iter()
            .filter_map(HeatSummary::improvement_percent)
            .collect();
        stats::summarize(&percents)
    }

    /// Original-vs-optimized sub-measurement distribution of the filtered
    /// subset. Feeds the stacked histogram collaborator.
    pub fn consumption_distribution(&self, bin_count: usize) -> Vec<IntervalBin> {
        let original: Vec<f64> = self
            .filtered
            .iter()
            .filter_map(|h| h.original_sub)
            .collect();
        let optimized: Vec<f64> = self
            .filtered
            .iter()
            .filter_map(|h| h.optimized_sub)
            .collect();
        stats::distribution(&original, &optimized, bin_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_csv_reader;

    const EXPORT: &str = "\
colada,fecha_colada,grado_acero,familia,Status,kwh_total,kwh_tap4_original,kwh_tap4_optimo
7001,45000.25,G1,F1,1,500,50,40
7002,45001.5,G2,F1,1,500,50,60
7003,45002.75,G1,F2,1,500,,40
";

    fn session() -> AnalysisSession {
        let mut s = AnalysisSession::new(FurnaceProfile::eaf());
        s.set_dataset(load_csv_reader(EXPORT.as_bytes()).unwrap());
        s
    }

    #[test]
    fn loads_show_everything_by_default() {
        let s = session();
        assert_eq!(s.filtered().len(), 3);
        assert!(s.criteria().is_unrestricted());
    }

    #[test]
    fn optimized_with_positive_improvement_scenario() {
        // Three heats: +2 %, −2 %, and unknown (missing sub-measurement).
        // Optimized-only plus improvement ≥ 0 must keep exactly the first.
        let mut s = session();
        s.apply_criteria(FilterCriteria {
            optimized_only: true,
            improvement_min: Some(0.0),
            ..Default::default()
        });
        let out = s.filtered();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].heat_id.as_deref(), Some("7001"));
        assert_eq!(out[0].improvement_percent(), Some(2.0));
    }

    #[test]
    fn improvement_summary_skips_unknowns() {
        let s = session();
        let summary = s.improvement_summary().unwrap();
        // known percents are +2 and −2
        assert_eq!(summary.mean, 0.0);
        assert_eq!(summary.min, -2.0);
        assert_eq!(summary.max, 2.0);
        assert_eq!(summary.stddev, 2.0);
    }

    #[test]
    fn empty_filter_result_reports_no_data() {
        let mut s = session();
        s.apply_criteria(FilterCriteria {
            grades: ["G9".to_string()].into(),
            ..Default::default()
        });
        assert!(s.filtered().is_empty());
        assert_eq!(s.improvement_summary(), None);
        assert!(s.consumption_distribution(10).is_empty());
    }

    #[test]
    fn reset_restores_the_unrestricted_view() {
        let mut s = session();
        s.apply_criteria(FilterCriteria {
            optimized_only: true,
            improvement_min: Some(1.0),
            ..Default::default()
        });
        assert_eq!(s.filtered().len(), 1);
        s.reset();
        assert_eq!(s.filtered().len(), 3);
    }

    #[test]
    fn distribution_feeds_from_the_filtered_subset() {
        let mut s = session();
        s.apply_criteria(FilterCriteria {
            grades: ["G1".to_string()].into(),
            ..Default::default()
        });
        // G1 heats: originals [50] (one missing), optimized [40, 40].
        let bins = s.consumption_distribution(2);
        assert_eq!(bins.len(), 2);
        let counted_a: usize = bins.iter().map(|b| b.only_a + b.overlap).sum();
        let counted_b: usize = bins.iter().map(|b| b.only_b + b.overlap).sum();
        assert_eq!(counted_a, 1);
        assert_eq!(counted_b, 2);
    }
}
