use serde::Serialize;

// ---------------------------------------------------------------------------
// IntervalBin – one stacked-histogram bucket
// ---------------------------------------------------------------------------

/// One interval of the shared-range distribution, with the counts of the
/// two series decomposed for stacked rendering.
///
/// `overlap = min(count_a, count_b)` is a count coincidence, not a join on
/// record identity: it says how many bars of the two series stack on top of
/// each other in this bucket, not that those heats are the same ones. This
/// approximation is what the charts have always shown and is kept on
/// purpose. `total = only_a + overlap + only_b` always holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntervalBin {
    pub label: String,
    pub range_start: f64,
    pub range_end: f64,
    pub only_a: usize,
    pub only_b: usize,
    pub overlap: usize,
    pub total: usize,
}

/// Bin two numeric series into `bin_count` equal-width intervals over their
/// pooled `[min, max]` range and decompose each bucket's counts.
///
/// Intervals are half-open `[start, end)` except the last, which is closed
/// so the maximum value is counted instead of silently dropped. Degenerate
/// inputs follow a fixed policy: an empty pool yields no bins; a pool where
/// every value is identical yields a single bin holding everything.
pub fn distribution(series_a: &[f64], series_b: &[f64], bin_count: usize) -> Vec<IntervalBin> {
    let pool = series_a.iter().chain(series_b).copied();
    let (mut min, mut max) = (f64::INFINITY, f64::NEG_INFINITY);
    let mut seen = false;
    for v in pool.filter(|v| v.is_finite()) {
        seen = true;
        min = min.min(v);
        max = max.max(v);
    }
    if !seen || bin_count == 0 {
        return Vec::new();
    }
    if min == max {
        let count_a = series_a.iter().filter(|v| **v == min).count();
        let count_b = series_b.iter().filter(|v| **v == min).count();
        return vec![make_bin(min, max, count_a, count_b)];
    }

    let width = (max - min) / bin_count as f64;
    (0..bin_count)
        .map(|i| {
            let start = min + i as f64 * width;
            let end = min + (i + 1) as f64 * width;
            let last = i == bin_count - 1;
            let in_range = |v: f64| v >= start && (v < end || (last && v <= end));
            let count_a = series_a.iter().filter(|v| in_range(**v)).count();
            let count_b = series_b.iter().filter(|v| in_range(**v)).count();
            make_bin(start, end, count_a, count_b)
        })
        .collect()
}

fn make_bin(start: f64, end: f64, count_a: usize, count_b: usize) -> IntervalBin {
    let overlap = count_a.min(count_b);
    let only_a = count_a - overlap;
    let only_b = count_b - overlap;
    IntervalBin {
        label: format!("{:.0}-{:.0}", start, end),
        range_start: start,
        range_end: end,
        only_a,
        only_b,
        overlap,
        total: only_a + overlap + only_b,
    }
}

// ---------------------------------------------------------------------------
// Summary statistics
// ---------------------------------------------------------------------------

/// Mean, extrema and population standard deviation (divisor N) of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub stddev: f64,
}

/// Summarize a numeric series. Empty input is an expected UI state (empty
/// filter result) and reports as `None`, never a division by zero.
pub fn summarize(values: &[f64]) -> Option<Summary> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    let (mut min, mut max) = (f64::INFINITY, f64::NEG_INFINITY);
    for v in values {
        min = min.min(*v);
        max = max.max(*v);
    }
    Some(Summary {
        mean,
        min,
        max,
        stddev: variance.sqrt(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_of_constant_series() {
        let s = summarize(&[10.0, 10.0, 10.0, 10.0]).unwrap();
        assert_eq!(s.mean, 10.0);
        assert_eq!(s.min, 10.0);
        assert_eq!(s.max, 10.0);
        assert_eq!(s.stddev, 0.0);
    }

    #[test]
    fn summary_uses_population_stddev() {
        let s = summarize(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(s.mean, 3.0);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 5.0);
        assert!((s.stddev - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn summary_of_empty_series_is_none() {
        assert_eq!(summarize(&[]), None);
    }

    #[test]
    fn overlap_is_count_minimum_per_bin() {
        let a = [1.0, 1.0, 2.0, 9.0];
        let b = [1.0, 2.0, 2.0, 2.0, 9.0];
        for bin in distribution(&a, &b, 4) {
            let count_a = bin.only_a + bin.overlap;
            let count_b = bin.only_b + bin.overlap;
            assert_eq!(bin.overlap, count_a.min(count_b));
            assert_eq!(bin.total, bin.only_a + bin.overlap + bin.only_b);
        }
    }

    #[test]
    fn last_bin_is_closed_at_the_maximum() {
        let a = [0.0, 5.0, 10.0];
        let bins = distribution(&a, &[], 2);
        assert_eq!(bins.len(), 2);
        // 10.0 lands on the final upper bound and must be counted.
        let last = bins.last().unwrap();
        assert_eq!(last.only_a + last.overlap, 2); // 5.0 and 10.0
        let counted: usize = bins.iter().map(|b| b.only_a + b.overlap).sum();
        assert_eq!(counted, a.len());
    }

    #[test]
    fn interior_bins_are_half_open() {
        let a = [0.0, 5.0, 10.0, 20.0];
        let bins = distribution(&a, &[], 4);
        // 5.0 sits on the boundary between bin 0 [0,5) and bin 1 [5,10).
        assert_eq!(bins[0].only_a, 1);
        assert_eq!(bins[1].only_a, 1);
    }

    #[test]
    fn identical_values_collapse_to_a_single_bin() {
        let bins = distribution(&[3.0, 3.0], &[3.0], 10);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].overlap, 1);
        assert_eq!(bins[0].only_a, 1);
        assert_eq!(bins[0].only_b, 0);
        assert_eq!(bins[0].total, 2);
    }

    #[test]
    fn empty_series_produce_no_bins() {
        assert!(distribution(&[], &[], 10).is_empty());
        assert!(distribution(&[1.0], &[], 0).is_empty());
    }

    #[test]
    fn bins_span_the_pooled_range() {
        let a = [100.0, 200.0];
        let b = [50.0, 400.0];
        let bins = distribution(&a, &b, 10);
        assert_eq!(bins.len(), 10);
        assert_eq!(bins[0].range_start, 50.0);
        assert_eq!(bins[9].range_end, 400.0);
    }
}
