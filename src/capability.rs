//! Process capability: probability of meeting a target.
//!
//! Given a stable segment's mean and sigma, capability is the one-sided
//! normal tail probability of future values landing on the right side of
//! the target. The estimator itself does not check stability — callers must
//! not surface a capability figure for a segment flagged unstable, because
//! the mean/sigma of an unstable process do not predict its future.
//!
//! # References
//!
//! - Abramowitz, M. & Stegun, I.A. (1964). *Handbook of Mathematical
//!   Functions*, formula 26.2.17.
//! - Montgomery (2019), *Introduction to Statistical Quality Control*,
//!   8th ed., Chapter 8.

use serde::{Deserialize, Serialize};

/// Which side of the target counts as meeting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Values at or above the target are good (e.g. attendance rates).
    AtOrAbove,
    /// Values at or below the target are good (e.g. waiting times).
    AtOrBelow,
}

/// A computed capability estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapabilityResult {
    /// Probability of meeting the target, in `[0, 1]`.
    pub probability: f64,
    /// Standardized distance of the target from the mean,
    /// `(target - mean) / sigma`.
    pub z_score: f64,
}

/// Standard normal CDF via Abramowitz & Stegun 26.2.17.
///
/// Absolute error is below 7.5e-8 everywhere, which is far tighter than
/// anything a capability headline needs.
pub fn standard_normal_cdf(z: f64) -> f64 {
    // Rational polynomial in t = 1 / (1 + p|z|), weighted by the normal pdf.
    const P: f64 = 0.231_641_9;
    const B1: f64 = 0.319_381_530;
    const B2: f64 = -0.356_563_782;
    const B3: f64 = 1.781_477_937;
    const B4: f64 = -1.821_255_978;
    const B5: f64 = 1.330_274_429;

    let x = z.abs();
    let t = 1.0 / (1.0 + P * x);
    let pdf = (-0.5 * x * x).exp() / (2.0 * std::f64::consts::PI).sqrt();
    let poly = t * (B1 + t * (B2 + t * (B3 + t * (B4 + t * B5))));
    let upper_tail = pdf * poly;
    if z >= 0.0 {
        1.0 - upper_tail
    } else {
        upper_tail
    }
}

/// Estimate the probability of meeting `target` for a process with the
/// given stable `mean` and `sigma`.
///
/// Returns `None` when any input is non-finite or `sigma <= 0` — a
/// degenerate dispersion means there is no distribution to integrate.
pub fn estimate(
    mean: f64,
    sigma: f64,
    target: f64,
    direction: Direction,
) -> Option<CapabilityResult> {
    if !mean.is_finite() || !sigma.is_finite() || !target.is_finite() || sigma <= 0.0 {
        return None;
    }
    let z_score = (target - mean) / sigma;
    let probability = match direction {
        Direction::AtOrAbove => 1.0 - standard_normal_cdf(z_score),
        Direction::AtOrBelow => standard_normal_cdf(z_score),
    };
    Some(CapabilityResult {
        probability,
        z_score,
    })
}
