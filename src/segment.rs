//! Segmentation of a series at user-declared split points.
//!
//! A split at index `s` ends the current segment at `s` and starts the next
//! at `s + 1`. Segments partition the series with no gaps or overlaps, and
//! each gets its own independently estimated baseline, limits, and signals.
//!
//! The user's baseline-count override applies to the first segment only:
//! the initial "before" period is the one deliberately truncated, while
//! every re-baselined segment after a split uses its own full extent.
//!
//! Recomputation is always total. Any change to data, splits, or baseline
//! count recomputes every segment from scratch; segment statistics are a
//! linear scan, so a fresh deterministic recompute is cheaper to reason
//! about than incremental update.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::baseline::{BaselineStats, ChartKind};
use crate::limits::{ControlLimits, MovingRangeLimits};
use crate::signals::{SignalDetector, SignalSet};

/// A contiguous inclusive index range `[start, end]` over the full series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// First global index of the segment.
    pub start: usize,
    /// Last global index of the segment (inclusive).
    pub end: usize,
}

impl Segment {
    /// Number of points in the segment. Never zero: a segment always
    /// contains at least one point by construction.
    pub fn point_count(&self) -> usize {
        self.end - self.start + 1
    }
}

/// Everything computed for one segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentAnalysis {
    /// The segment's extent over the full series.
    pub segment: Segment,
    /// Baseline statistics (center, sigma, average moving range).
    pub stats: BaselineStats,
    /// Individuals-chart limits. `None` in run-chart mode.
    pub limits: Option<ControlLimits>,
    /// Moving-range chart limits. `None` in run-chart mode.
    pub mr_limits: Option<MovingRangeLimits>,
    /// Signals detected over the segment's full extent.
    pub signals: SignalSet,
}

impl SegmentAnalysis {
    /// `true` when no special-cause signal fired in this segment.
    pub fn is_stable(&self) -> bool {
        self.signals.is_stable()
    }
}

/// Validate raw split indices against a series of length `n`.
///
/// Indices at or past `n - 1` are dropped (a split after the last point
/// would create an empty trailing segment); the survivors are sorted
/// ascending and de-duplicated.
pub fn normalize_splits(splits: &[usize], n: usize) -> Vec<usize> {
    let mut valid: Vec<usize> = splits
        .iter()
        .copied()
        .filter(|&s| n >= 2 && s <= n - 2)
        .collect();
    valid.sort_unstable();
    valid.dedup();
    valid
}

/// Derive segment boundaries from normalized split indices.
///
/// With no splits this is a single segment spanning the whole series.
pub fn segment_bounds(splits: &[usize], n: usize) -> Vec<Segment> {
    let mut segments = Vec::with_capacity(splits.len() + 1);
    let mut start = 0;
    for &split in splits {
        segments.push(Segment { start, end: split });
        start = split + 1;
    }
    segments.push(Segment { start, end: n - 1 });
    segments
}

/// Run the full per-segment pipeline: baseline estimation, control limits,
/// and signal detection for every segment in order.
///
/// `baseline_count` is honored for the first segment only; later segments
/// always use their full extent as baseline. Raw `splits` may be unsorted,
/// duplicated, or out of range; they are normalized first.
///
/// # Panics
///
/// Panics if `values` is empty. Callers enforce the series minimums before
/// segmenting.
pub fn analyze_segments(
    values: &[f64],
    splits: &[usize],
    baseline_count: Option<usize>,
    kind: ChartKind,
    detector: &SignalDetector,
) -> Vec<SegmentAnalysis> {
    assert!(!values.is_empty(), "cannot segment an empty series");

    let splits = normalize_splits(splits, values.len());
    let bounds = segment_bounds(&splits, values.len());
    debug!(
        segments = bounds.len(),
        points = values.len(),
        "segmenting series"
    );

    bounds
        .into_iter()
        .enumerate()
        .map(|(i, segment)| {
            let segment_values = &values[segment.start..=segment.end];
            let override_count = if i == 0 { baseline_count } else { None };
            let stats = BaselineStats::compute(segment_values, override_count, kind);

            let (limits, mr_limits) = match kind {
                ChartKind::Xmr => (
                    Some(ControlLimits::from_stats(&stats)),
                    Some(MovingRangeLimits::new(stats.avg_moving_range)),
                ),
                ChartKind::Run => (None, None),
            };

            let signals = detector.check(segment_values, stats.center, limits.as_ref());
            SegmentAnalysis {
                segment,
                stats,
                limits,
                mr_limits,
                signals,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn detector() -> SignalDetector {
        SignalDetector::default()
    }

    // --- Split normalization ---

    #[test]
    fn splits_sorted_and_deduplicated() {
        assert_eq!(normalize_splits(&[7, 3, 3, 5], 10), vec![3, 5, 7]);
    }

    #[test]
    fn split_at_last_index_rejected() {
        // n - 1 = 9 would create an empty trailing segment.
        assert_eq!(normalize_splits(&[9, 4], 10), vec![4]);
        assert_eq!(normalize_splits(&[15], 10), Vec::<usize>::new());
    }

    #[test]
    fn split_at_n_minus_two_is_last_valid() {
        assert_eq!(normalize_splits(&[8], 10), vec![8]);
    }

    // --- Boundary derivation ---

    #[test]
    fn zero_splits_is_one_full_segment() {
        assert_eq!(segment_bounds(&[], 10), vec![Segment { start: 0, end: 9 }]);
    }

    #[test]
    fn splits_partition_without_gaps_or_overlaps() {
        let segments = segment_bounds(&[2, 6], 10);
        assert_eq!(
            segments,
            vec![
                Segment { start: 0, end: 2 },
                Segment { start: 3, end: 6 },
                Segment { start: 7, end: 9 },
            ]
        );
        // Partition property: consecutive segments abut exactly.
        for pair in segments.windows(2) {
            assert_eq!(pair[0].end + 1, pair[1].start);
        }
        assert_eq!(segments.iter().map(Segment::point_count).sum::<usize>(), 10);
    }

    #[test]
    fn single_point_segments_allowed() {
        let segments = segment_bounds(&[0], 5);
        assert_eq!(segments[0], Segment { start: 0, end: 0 });
        assert_eq!(segments[0].point_count(), 1);
    }

    // --- Per-segment pipeline ---

    #[test]
    fn zero_splits_matches_unsegmented_analysis() {
        let values: Vec<f64> = vec![5.0, 7.0, 6.0, 8.0, 5.5, 7.2, 6.1, 6.8, 5.9, 7.4, 6.3, 6.9];
        let segmented = analyze_segments(&values, &[], Some(6), ChartKind::Xmr, &detector());
        assert_eq!(segmented.len(), 1);

        let stats = BaselineStats::compute(&values, Some(6), ChartKind::Xmr);
        assert_eq!(segmented[0].stats, stats);
        assert_eq!(segmented[0].limits, Some(ControlLimits::from_stats(&stats)));
        let signals = detector().check(&values, stats.center, segmented[0].limits.as_ref());
        assert_eq!(segmented[0].signals, signals);
    }

    #[test]
    fn each_segment_estimated_independently() {
        // A clear level shift at the split: each side is constant-ish.
        let values = [1.0, 1.2, 0.8, 1.0, 1.1, 9.0, 9.2, 8.8, 9.0, 9.1];
        let result = analyze_segments(&values, &[4], None, ChartKind::Xmr, &detector());
        assert_eq!(result.len(), 2);
        assert!((result[0].stats.center - 1.02).abs() < 0.01);
        assert!((result[1].stats.center - 9.02).abs() < 0.01);
    }

    #[test]
    fn baseline_override_applies_to_first_segment_only() {
        let values: Vec<f64> = (1..=20).map(f64::from).collect();
        let result = analyze_segments(&values, &[9], Some(4), ChartKind::Xmr, &detector());
        assert_eq!(result[0].stats.baseline_count_used, 4);
        // Second segment uses its full extent, not the override.
        assert_eq!(result[1].stats.baseline_count_used, 10);
        assert!((result[0].stats.center - 2.5).abs() < EPS);
        assert!((result[1].stats.center - 15.5).abs() < EPS);
    }

    #[test]
    fn run_chart_segments_carry_no_limits() {
        let values = [1.0, 2.0, 3.0, 2.0, 1.0, 2.0];
        let result = analyze_segments(&values, &[], None, ChartKind::Run, &detector());
        assert_eq!(result[0].limits, None);
        assert_eq!(result[0].mr_limits, None);
        assert!(result[0].signals.beyond_limits.is_empty());
    }

    #[test]
    fn signal_indices_are_segment_relative() {
        // Second segment: eight points above its own center would be a run,
        // but here the shift segment is stable around its new center.
        let mut values = vec![1.0; 6];
        values.extend([5.0, 5.2, 4.8, 5.1, 4.9, 5.0]);
        let result = analyze_segments(&values, &[5], None, ChartKind::Xmr, &detector());
        assert!(result[1].is_stable());
    }

    #[test]
    fn out_of_range_splits_fall_back_to_single_segment() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let result = analyze_segments(&values, &[4, 99], None, ChartKind::Xmr, &detector());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].segment, Segment { start: 0, end: 4 });
    }

    #[test]
    fn recompute_is_deterministic() {
        let values: Vec<f64> = (1..=15).map(f64::from).collect();
        let a = analyze_segments(&values, &[6], Some(4), ChartKind::Xmr, &detector());
        let b = analyze_segments(&values, &[6], Some(4), ChartKind::Xmr, &detector());
        assert_eq!(a, b);
    }
}
