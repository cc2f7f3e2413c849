//! Centering and dispersion estimation over a segment's baseline.
//!
//! The baseline is the leading subset of a segment used to estimate the
//! center line and process dispersion. Dispersion comes from the average
//! moving range of consecutive baseline values, unbiased by the d2 constant
//! for ranges of width 2.
//!
//! # References
//!
//! - Wheeler, D.J. & Chambers, D.S. (1992). *Understanding Statistical
//!   Process Control*, 2nd ed.
//! - ASTM E2587 — Standard Practice for Use of Control Charts

use serde::{Deserialize, Serialize};

use crate::stats;

/// d2 constant for moving ranges of width 2: sigma-hat = MR-bar / 1.128.
pub const MR_D2: f64 = 1.128;

/// Which centering statistic a chart uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// Run chart: center is the baseline median; no control limits.
    Run,
    /// XmR (individuals / moving range) chart: center is the baseline mean,
    /// sigma is estimated from the average moving range.
    Xmr,
}

/// Statistics computed once per segment from its baseline subset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaselineStats {
    /// Center line: median (run chart) or mean (XmR).
    pub center: f64,
    /// Estimated process standard deviation, `avg_moving_range / 1.128`.
    /// Zero exactly when all consecutive baseline values are equal.
    pub sigma: f64,
    /// Mean of `|v[i] - v[i-1]|` over consecutive baseline values; zero if
    /// the baseline has fewer than two points.
    pub avg_moving_range: f64,
    /// Number of leading observations actually used as the baseline.
    pub baseline_count_used: usize,
}

impl BaselineStats {
    /// Compute baseline statistics for one segment.
    ///
    /// If `baseline_count` is `Some(b)` with `b >= 2`, the baseline is the
    /// first `min(b, values.len())` observations; otherwise the whole
    /// segment is the baseline. A requested count larger than the segment is
    /// clamped, never an error.
    ///
    /// Deterministic, pure function of its inputs.
    ///
    /// # Panics
    ///
    /// Panics if `values` is empty. Segments always contain at least one
    /// observation by construction.
    pub fn compute(values: &[f64], baseline_count: Option<usize>, kind: ChartKind) -> Self {
        assert!(!values.is_empty(), "segment must contain at least one observation");

        let count = match baseline_count {
            Some(b) if b >= 2 => b.min(values.len()),
            _ => values.len(),
        };
        let baseline = &values[..count];

        let center = match kind {
            ChartKind::Run => stats::median(baseline),
            ChartKind::Xmr => stats::mean(baseline),
        }
        .expect("baseline is non-empty");

        let moving_ranges: Vec<f64> = baseline.windows(2).map(|w| (w[1] - w[0]).abs()).collect();
        let avg_moving_range = stats::mean(&moving_ranges).unwrap_or(0.0);
        let sigma = avg_moving_range / MR_D2;

        Self {
            center,
            sigma,
            avg_moving_range,
            baseline_count_used: count,
        }
    }
}
