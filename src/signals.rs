//! Special-cause signal detection.
//!
//! Three independent rules run over a segment's full value series against
//! its baseline-derived center line:
//!
//! 1. **Beyond limits** — a point outside the 3-sigma control limits.
//!    Suppressed entirely when sigma is zero or no limits exist (run
//!    charts): with zero dispersion every distinct value would be "outside".
//! 2. **Long run** — 8 or more consecutive points strictly on one side of
//!    the center line. Points exactly on the center belong to no side and
//!    terminate any run. Every member of a qualifying run is flagged.
//! 3. **Trend** — 6 or more consecutive points each strictly above (or each
//!    strictly below) its predecessor. Ties reset both direction counters.
//!    Reported once per segment, not per point.
//!
//! All rules scan the whole segment, including points past the baseline;
//! the center they compare against comes from the baseline alone.
//!
//! # References
//!
//! - Western Electric (1956). *Statistical Quality Control Handbook*.
//! - Perla, Provost & Murray (2011). "The run chart: a simple analytical
//!   tool for learning from variation in healthcare processes",
//!   *BMJ Quality & Safety* 20(1), pp. 46-51.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::limits::ControlLimits;

/// Minimum run length for the one-side-of-center rule.
pub const DEFAULT_RUN_LENGTH: usize = 8;

/// Minimum point count for the monotonic trend rule.
pub const DEFAULT_TREND_LENGTH: usize = 6;

/// Signals detected in one segment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignalSet {
    /// Indices (segment-relative) of points outside the control limits.
    pub beyond_limits: BTreeSet<usize>,
    /// Indices (segment-relative) of points belonging to a long run.
    pub long_run: BTreeSet<usize>,
    /// Whether a sustained monotonic trend was found anywhere in the segment.
    pub has_trend: bool,
}

impl SignalSet {
    /// `true` when no rule fired: common-cause variation only.
    pub fn is_stable(&self) -> bool {
        self.beyond_limits.is_empty() && self.long_run.is_empty() && !self.has_trend
    }

    /// Human-readable descriptions of the triggered signals, for summary
    /// panels. Empty when the segment is stable.
    pub fn descriptions(&self, detector: &SignalDetector) -> Vec<String> {
        let mut out = Vec::new();
        if !self.beyond_limits.is_empty() {
            out.push(format!(
                "{} point(s) beyond the control limits",
                self.beyond_limits.len()
            ));
        }
        if !self.long_run.is_empty() {
            out.push(format!(
                "a run of {} or more points on one side of the center line",
                detector.run_length
            ));
        }
        if self.has_trend {
            out.push(format!(
                "a trend of {} or more points all rising or all falling",
                detector.trend_length
            ));
        }
        out
    }
}

/// Configurable rule thresholds for signal detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalDetector {
    /// Minimum number of consecutive same-side points to flag a run.
    pub run_length: usize,
    /// Minimum number of monotonically moving points to flag a trend.
    pub trend_length: usize,
}

impl Default for SignalDetector {
    fn default() -> Self {
        Self {
            run_length: DEFAULT_RUN_LENGTH,
            trend_length: DEFAULT_TREND_LENGTH,
        }
    }
}

/// Which side of the center line a point sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Above,
    Below,
    On,
}

impl Side {
    fn of(value: f64, center: f64) -> Self {
        if value > center {
            Side::Above
        } else if value < center {
            Side::Below
        } else {
            Side::On
        }
    }
}

impl SignalDetector {
    /// Apply all three rules to one segment's values.
    ///
    /// `limits` is `None` for run charts; the beyond-limits rule then never
    /// fires. Indices in the returned [`SignalSet`] are relative to the
    /// start of `values`.
    pub fn check(&self, values: &[f64], center: f64, limits: Option<&ControlLimits>) -> SignalSet {
        SignalSet {
            beyond_limits: self.check_beyond_limits(values, limits),
            long_run: self.check_long_run(values, center),
            has_trend: self.check_trend(values),
        }
    }

    /// Rule 1: points outside UCL/LCL, only when sigma is positive.
    fn check_beyond_limits(
        &self,
        values: &[f64],
        limits: Option<&ControlLimits>,
    ) -> BTreeSet<usize> {
        let mut flagged = BTreeSet::new();
        let Some(limits) = limits else {
            return flagged;
        };
        if !limits.has_dispersion() {
            return flagged;
        }
        for (i, &v) in values.iter().enumerate() {
            if v > limits.ucl || v < limits.lcl {
                flagged.insert(i);
            }
        }
        flagged
    }

    /// Rule 2: maximal same-side runs of at least `run_length` points.
    ///
    /// Every member of a qualifying run is flagged, not just the point that
    /// completes it.
    fn check_long_run(&self, values: &[f64], center: f64) -> BTreeSet<usize> {
        let mut flagged = BTreeSet::new();
        let mut run_start = 0;
        let mut run_side = Side::On;

        let close_run = |flagged: &mut BTreeSet<usize>, start: usize, end: usize, side: Side| {
            if side != Side::On && end - start >= self.run_length {
                flagged.extend(start..end);
            }
        };

        for (i, &v) in values.iter().enumerate() {
            let side = Side::of(v, center);
            if side != run_side {
                close_run(&mut flagged, run_start, i, run_side);
                run_start = i;
                run_side = side;
            }
        }
        close_run(&mut flagged, run_start, values.len(), run_side);
        flagged
    }

    /// Rule 3: a monotonic run of at least `trend_length` points anywhere in
    /// the segment. Equal consecutive values reset both counters.
    fn check_trend(&self, values: &[f64]) -> bool {
        if values.len() < self.trend_length {
            return false;
        }
        let mut inc_run = 1_usize;
        let mut dec_run = 1_usize;
        for w in values.windows(2) {
            if w[1] > w[0] {
                inc_run += 1;
                dec_run = 1;
            } else if w[1] < w[0] {
                dec_run += 1;
                inc_run = 1;
            } else {
                inc_run = 1;
                dec_run = 1;
            }
            if inc_run >= self.trend_length || dec_run >= self.trend_length {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> SignalDetector {
        SignalDetector::default()
    }

    // --- Beyond limits ---

    #[test]
    fn points_outside_limits_flagged() {
        let limits = ControlLimits::new(10.0, 1.0);
        let values = [10.0, 13.5, 9.8, 6.2, 10.1];
        let signals = detector().check(&values, 10.0, Some(&limits));
        assert_eq!(signals.beyond_limits, BTreeSet::from([1, 3]));
        assert!(!signals.is_stable());
    }

    #[test]
    fn point_exactly_on_limit_not_flagged() {
        let limits = ControlLimits::new(10.0, 1.0);
        let values = [13.0, 7.0, 10.0];
        let signals = detector().check(&values, 10.0, Some(&limits));
        assert!(signals.beyond_limits.is_empty());
    }

    #[test]
    fn zero_sigma_suppresses_beyond_limits() {
        let limits = ControlLimits::new(10.0, 0.0);
        // Every value differs from center; none may be flagged.
        let values = [9.0, 11.0, 12.0, 8.0];
        let signals = detector().check(&values, 10.0, Some(&limits));
        assert!(signals.beyond_limits.is_empty());
    }

    #[test]
    fn run_chart_without_limits_never_flags_beyond() {
        let values = [100.0, -100.0, 100.0, -100.0];
        let signals = detector().check(&values, 0.0, None);
        assert!(signals.beyond_limits.is_empty());
    }

    // --- Long run ---

    #[test]
    fn eight_above_center_flags_whole_run() {
        let values = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 9.0];
        let signals = detector().check(&values, 0.0, None);
        // All nine points are strictly above center 0, so the whole run
        // qualifies, including the leading eight.
        for i in 0..8 {
            assert!(signals.long_run.contains(&i), "index {i} should be flagged");
        }
    }

    #[test]
    fn alternating_pattern_flags_nothing() {
        let values: Vec<f64> = (0..16).map(|i| if i % 2 == 0 { 6.0 } else { 4.0 }).collect();
        let signals = detector().check(&values, 5.0, None);
        assert!(signals.long_run.is_empty());
    }

    #[test]
    fn seven_on_one_side_not_enough() {
        let values = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, -1.0];
        let signals = detector().check(&values, 0.0, None);
        assert!(signals.long_run.is_empty());
    }

    #[test]
    fn point_on_center_breaks_run() {
        // Seven above, one exactly on center, then seven above again:
        // two runs of 7, neither long enough.
        let mut values = vec![1.0; 7];
        values.push(0.0);
        values.extend(vec![1.0; 7]);
        let signals = detector().check(&values, 0.0, None);
        assert!(signals.long_run.is_empty());
    }

    #[test]
    fn run_below_center_also_flagged() {
        let values = vec![-2.0; 8];
        let signals = detector().check(&values, 0.0, None);
        assert_eq!(signals.long_run.len(), 8);
    }

    #[test]
    fn two_separate_long_runs_both_flagged() {
        let mut values = vec![1.0; 8];
        values.push(0.0);
        values.extend(vec![-1.0; 8]);
        let signals = detector().check(&values, 0.0, None);
        assert_eq!(signals.long_run.len(), 16);
        assert!(!signals.long_run.contains(&8));
    }

    // --- Trend ---

    #[test]
    fn six_strictly_increasing_is_trend() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        assert!(detector().check(&values, 3.5, None).has_trend);
    }

    #[test]
    fn six_strictly_decreasing_is_trend() {
        let values = [6.0, 5.0, 4.0, 3.0, 2.0, 1.0];
        assert!(detector().check(&values, 3.5, None).has_trend);
    }

    #[test]
    fn tie_resets_trend_counter() {
        // The repeated 2.0 resets both counters; no run of 6 survives.
        let values = [1.0, 2.0, 2.0, 3.0, 4.0, 5.0];
        assert!(!detector().check(&values, 3.0, None).has_trend);
    }

    #[test]
    fn five_points_not_a_trend() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!(!detector().check(&values, 3.0, None).has_trend);
    }

    #[test]
    fn trend_found_mid_segment() {
        let values = [5.0, 4.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 2.0];
        assert!(detector().check(&values, 3.5, None).has_trend);
    }

    #[test]
    fn direction_change_resets_counters() {
        let values = [1.0, 2.0, 3.0, 2.0, 3.0, 4.0, 3.0, 4.0, 5.0];
        assert!(!detector().check(&values, 3.0, None).has_trend);
    }

    // --- Stability and descriptions ---

    #[test]
    fn stable_when_no_rule_fires() {
        let limits = ControlLimits::new(5.0, 1.0);
        let values = [5.2, 4.8, 5.1, 4.9, 5.3, 4.7, 5.0];
        let signals = detector().check(&values, 5.0, Some(&limits));
        assert!(signals.is_stable());
        assert!(signals.descriptions(&detector()).is_empty());
    }

    #[test]
    fn descriptions_name_each_triggered_rule() {
        let limits = ControlLimits::new(0.0, 0.1);
        let values: Vec<f64> = (1..=9).map(f64::from).collect();
        let signals = detector().check(&values, 0.0, Some(&limits));
        let descriptions = signals.descriptions(&detector());
        assert_eq!(descriptions.len(), 3);
        assert!(descriptions[0].contains("beyond"));
        assert!(descriptions[1].contains("run"));
        assert!(descriptions[2].contains("trend"));
    }

    #[test]
    fn custom_thresholds_respected() {
        let detector = SignalDetector {
            run_length: 3,
            trend_length: 4,
        };
        let values = [1.0, 1.5, 2.0, 2.5];
        let signals = detector.check(&values, 0.0, None);
        assert_eq!(signals.long_run.len(), 4);
        assert!(signals.has_trend);
    }
}
