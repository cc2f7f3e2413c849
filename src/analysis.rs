//! The analysis façade: one synchronous call from raw rows to a complete
//! result.
//!
//! [`analyze`] replaces the event-driven, globally mutable flow of a
//! chart-rendering front end with a pure function: the caller owns the
//! request, receives a freshly computed [`AnalysisResult`], and is
//! responsible for routing it to whatever plotting or summary surface it
//! has. Recomputation is always total — a new call supersedes the previous
//! result wholesale.
//!
//! Reference-line outputs are emitted as arrays aligned to the global point
//! index, `None` outside the owning segment, so a plotting surface can draw
//! them without knowing anything about segmentation.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::baseline::ChartKind;
use crate::capability::{self, CapabilityResult, Direction};
use crate::error::AnalysisError;
use crate::observation::{build_series, AxisMode, Row};
use crate::segment::{analyze_segments, Segment, SegmentAnalysis};
use crate::signals::SignalDetector;

/// Minimum number of valid observations for an XmR chart.
pub const MIN_OBSERVATIONS_XMR: usize = 12;

/// An improvement target and which side of it counts as success.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// The target value.
    pub value: f64,
    /// Which side of the target is good.
    pub direction: Direction,
}

/// Everything needed for one analysis run.
///
/// Immutable input; nothing in the engine mutates or retains it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Raw rows from the tabular data source.
    pub rows: Vec<Row>,
    /// Column holding the position (date or point name).
    pub position_column: String,
    /// Column holding the measured value.
    pub value_column: String,
    /// How positions are interpreted.
    pub axis: AxisMode,
    /// Run chart or XmR chart.
    pub chart: ChartKind,
    /// Optional baseline override for the first segment; ignored unless >= 2.
    #[serde(default)]
    pub baseline_count: Option<usize>,
    /// Indices after which a new segment begins. May be unsorted, duplicated,
    /// or out of range; invalid entries are dropped.
    #[serde(default)]
    pub splits: Vec<usize>,
    /// Optional capability target.
    #[serde(default)]
    pub target: Option<Target>,
    /// Signal rule thresholds.
    #[serde(default)]
    pub detector: SignalDetector,
}

/// Plot-ready series: parallel arrays aligned to the global point index.
///
/// Reference lines are `None` outside their segment, and `None` everywhere
/// for lines that are not drawn (run-chart limits, sigma bands of a
/// zero-dispersion segment).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    /// Observed values in plot order.
    pub values: Vec<f64>,
    /// Axis label per point (ISO date or point name).
    pub labels: Vec<String>,
    /// Per-point flag: outside the owning segment's control limits.
    pub beyond_limits: Vec<bool>,
    /// Center line per point.
    pub center_line: Vec<Option<f64>>,
    /// Upper control limit per point.
    pub ucl_line: Vec<Option<f64>>,
    /// Lower control limit per point.
    pub lcl_line: Vec<Option<f64>>,
    /// One sigma above center.
    pub sigma1_up_line: Vec<Option<f64>>,
    /// One sigma below center.
    pub sigma1_down_line: Vec<Option<f64>>,
    /// Two sigma above center.
    pub sigma2_up_line: Vec<Option<f64>>,
    /// Two sigma below center.
    pub sigma2_down_line: Vec<Option<f64>>,
    /// Moving ranges `|v[i] - v[i-1]|`, length `n - 1`.
    pub moving_ranges: Vec<f64>,
    /// Moving-range chart center line, aligned to `moving_ranges`.
    pub mr_center_line: Vec<Option<f64>>,
    /// Moving-range chart upper limit, aligned to `moving_ranges`.
    pub mr_ucl_line: Vec<Option<f64>>,
    /// Moving-range chart lower limit (zero), aligned to `moving_ranges`.
    pub mr_lcl_line: Vec<Option<f64>>,
}

/// Per-segment summary fields for the textual panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentSummary {
    /// The segment's extent over the full series.
    pub segment: Segment,
    /// Number of points in the segment.
    pub point_count: usize,
    /// Leading observations used to estimate center and sigma.
    pub baseline_count_used: usize,
    /// Center line value.
    pub center: f64,
    /// Estimated process standard deviation.
    pub sigma: f64,
    /// Average moving range of the baseline.
    pub avg_moving_range: f64,
    /// Upper control limit. `None` on run charts.
    pub ucl: Option<f64>,
    /// Lower control limit. `None` on run charts.
    pub lcl: Option<f64>,
    /// `true` when no special-cause signal fired.
    pub stable: bool,
    /// Descriptions of the triggered signals, empty when stable.
    pub signals: Vec<String>,
    /// Capability against the request target. `None` without a target, with
    /// zero sigma, or — hard usage contract — when the segment is unstable.
    pub capability: Option<CapabilityResult>,
}

/// The complete output of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Plot-ready series and reference lines.
    pub series: ChartSeries,
    /// Per-segment summaries, in series order.
    pub segments: Vec<SegmentSummary>,
    /// Headline capability for the last period: present only when a target
    /// is set and the last segment is stable.
    pub headline_capability: Option<CapabilityResult>,
}

/// Run a full analysis: parse rows, segment, estimate, detect, summarize.
///
/// # Errors
///
/// - [`AnalysisError::InvalidColumnSelection`] if either chosen column is
///   missing from the first row.
/// - [`AnalysisError::InsufficientData`] if fewer than 5 valid observations
///   remain after parsing, or fewer than 12 for an XmR chart.
pub fn analyze(request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
    let observations = build_series(
        &request.rows,
        &request.position_column,
        &request.value_column,
        request.axis,
    )?;
    if request.chart == ChartKind::Xmr && observations.len() < MIN_OBSERVATIONS_XMR {
        return Err(AnalysisError::InsufficientData {
            required: MIN_OBSERVATIONS_XMR,
            found: observations.len(),
        });
    }

    let values: Vec<f64> = observations.iter().map(|o| o.value).collect();
    let labels: Vec<String> = observations.iter().map(|o| o.label.clone()).collect();
    debug!(
        points = values.len(),
        chart = ?request.chart,
        splits = request.splits.len(),
        "running analysis"
    );

    let analyses = analyze_segments(
        &values,
        &request.splits,
        request.baseline_count,
        request.chart,
        &request.detector,
    );

    let series = assemble_series(values, labels, &analyses);
    let segments: Vec<SegmentSummary> = analyses
        .iter()
        .map(|a| summarize_segment(a, request.target, &request.detector))
        .collect();

    // The headline figure is the last period's capability; the per-segment
    // summary has already applied the stability gate.
    let headline_capability = segments.last().and_then(|s| s.capability);

    Ok(AnalysisResult {
        series,
        segments,
        headline_capability,
    })
}

/// Flatten per-segment results into global plot arrays.
fn assemble_series(
    values: Vec<f64>,
    labels: Vec<String>,
    analyses: &[SegmentAnalysis],
) -> ChartSeries {
    let n = values.len();
    let mut beyond_limits = vec![false; n];
    let mut center_line = vec![None; n];
    let mut ucl_line = vec![None; n];
    let mut lcl_line = vec![None; n];
    let mut sigma1_up_line = vec![None; n];
    let mut sigma1_down_line = vec![None; n];
    let mut sigma2_up_line = vec![None; n];
    let mut sigma2_down_line = vec![None; n];

    let moving_ranges: Vec<f64> = values.windows(2).map(|w| (w[1] - w[0]).abs()).collect();
    let mut mr_center_line = vec![None; moving_ranges.len()];
    let mut mr_ucl_line = vec![None; moving_ranges.len()];
    let mut mr_lcl_line = vec![None; moving_ranges.len()];

    for analysis in analyses {
        let seg = analysis.segment;
        for i in seg.start..=seg.end {
            center_line[i] = Some(analysis.stats.center);
        }
        if let Some(limits) = &analysis.limits {
            if limits.has_dispersion() {
                for i in seg.start..=seg.end {
                    ucl_line[i] = Some(limits.ucl);
                    lcl_line[i] = Some(limits.lcl);
                    sigma1_up_line[i] = Some(limits.sigma1_up);
                    sigma1_down_line[i] = Some(limits.sigma1_down);
                    sigma2_up_line[i] = Some(limits.sigma2_up);
                    sigma2_down_line[i] = Some(limits.sigma2_down);
                }
            }
        }
        for &rel in &analysis.signals.beyond_limits {
            beyond_limits[seg.start + rel] = true;
        }
        if let Some(mr_limits) = &analysis.mr_limits {
            // A moving range at index j spans points j and j+1; only ranges
            // fully inside the segment get its reference lines.
            for j in seg.start..seg.end {
                mr_center_line[j] = Some(mr_limits.center);
                mr_ucl_line[j] = Some(mr_limits.ucl);
                mr_lcl_line[j] = Some(mr_limits.lcl);
            }
        }
    }

    ChartSeries {
        values,
        labels,
        beyond_limits,
        center_line,
        ucl_line,
        lcl_line,
        sigma1_up_line,
        sigma1_down_line,
        sigma2_up_line,
        sigma2_down_line,
        moving_ranges,
        mr_center_line,
        mr_ucl_line,
        mr_lcl_line,
    }
}

/// Build the textual summary for one segment, applying the capability
/// stability gate.
fn summarize_segment(
    analysis: &SegmentAnalysis,
    target: Option<Target>,
    detector: &SignalDetector,
) -> SegmentSummary {
    let stable = analysis.is_stable();
    let capability = match target {
        // Capability from an unstable period is meaningless; never compute it.
        Some(t) if stable => {
            capability::estimate(analysis.stats.center, analysis.stats.sigma, t.value, t.direction)
        }
        _ => None,
    };
    SegmentSummary {
        segment: analysis.segment,
        point_count: analysis.segment.point_count(),
        baseline_count_used: analysis.stats.baseline_count_used,
        center: analysis.stats.center,
        sigma: analysis.stats.sigma,
        avg_moving_range: analysis.stats.avg_moving_range,
        ucl: analysis.limits.map(|l| l.ucl),
        lcl: analysis.limits.map(|l| l.lcl),
        stable,
        signals: analysis.signals.descriptions(detector),
        capability,
    }
}
