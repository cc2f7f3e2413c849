//! Control limit derivation from a segment's center and sigma.
//!
//! Limits are a pure function of `(center, sigma)`. When sigma is zero the
//! 3-sigma limits still compute (collapsing onto the center line) but the
//! sigma bands are not meaningful and the beyond-limits rule is suppressed
//! by the signal detector — zero dispersion would otherwise flag any
//! distinct value.

use serde::{Deserialize, Serialize};

use crate::baseline::BaselineStats;

/// D4 constant for the moving-range chart upper limit (width-2 ranges).
pub const MR_D4: f64 = 3.268;

/// Center line, 3-sigma control limits, and 1/2-sigma bands for an
/// individuals chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlLimits {
    /// Center line (baseline mean).
    pub center: f64,
    /// Estimated process standard deviation.
    pub sigma: f64,
    /// Upper control limit, `center + 3 sigma`.
    pub ucl: f64,
    /// Lower control limit, `center - 3 sigma`.
    pub lcl: f64,
    /// One sigma above center.
    pub sigma1_up: f64,
    /// One sigma below center.
    pub sigma1_down: f64,
    /// Two sigma above center.
    pub sigma2_up: f64,
    /// Two sigma below center.
    pub sigma2_down: f64,
}

impl ControlLimits {
    /// Derive limits from a center line and sigma estimate.
    pub fn new(center: f64, sigma: f64) -> Self {
        Self {
            center,
            sigma,
            ucl: center + 3.0 * sigma,
            lcl: center - 3.0 * sigma,
            sigma1_up: center + sigma,
            sigma1_down: center - sigma,
            sigma2_up: center + 2.0 * sigma,
            sigma2_down: center - 2.0 * sigma,
        }
    }

    /// Derive limits from computed baseline statistics.
    pub fn from_stats(stats: &BaselineStats) -> Self {
        Self::new(stats.center, stats.sigma)
    }

    /// Whether the sigma bands and beyond-limits rule are meaningful.
    pub fn has_dispersion(&self) -> bool {
        self.sigma > 0.0
    }
}

/// Reference lines for the moving-range chart.
///
/// The MR chart lower limit is always zero for width-2 moving ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovingRangeLimits {
    /// Center line: the average moving range.
    pub center: f64,
    /// Upper control limit, `avg_mr * 3.268`.
    pub ucl: f64,
    /// Lower control limit, always 0.
    pub lcl: f64,
}

impl MovingRangeLimits {
    /// Derive moving-range chart limits from the average moving range.
    pub fn new(avg_moving_range: f64) -> Self {
        Self {
            center: avg_moving_range,
            ucl: avg_moving_range * MR_D4,
            lcl: 0.0,
        }
    }
}
