//! # spc-engine
//!
//! Statistical process control for sequences of individual observations:
//! run charts, XmR (individuals / moving range) charts, series segmentation
//! at declared change points, and process capability against a target.
//!
//! The engine is the statistical core of an improvement-charting tool. File
//! ingestion, column pickers, chart rendering, and export are external
//! collaborators: they hand in raw rows and receive plot-ready arrays and
//! textual summaries back.
//!
//! ## Modules
//!
//! - [`observation`] — Raw tabular rows to ordered, validated observations
//! - [`baseline`] — Center and dispersion estimation over a baseline subset
//! - [`limits`] — Control limits and sigma bands from center and sigma
//! - [`signals`] — Special-cause rules: beyond limits, long runs, trends
//! - [`segment`] — Independent per-segment analysis at declared split points
//! - [`capability`] — Probability of meeting a target from stable mean/sigma
//! - [`analysis`] — The `analyze(request) -> result` façade
//! - [`stats`] — Mean and median helpers
//! - [`error`] — Reported error conditions
//!
//! ## Design Philosophy
//!
//! - **Pure and total**: every analysis is a deterministic, synchronous
//!   function of its request; any input change recomputes everything
//! - **Degenerate states are values, not errors**: zero dispersion and
//!   ungated capability requests come back as `None`, never panics
//! - **One stringly-typed boundary**: all raw-cell handling lives in
//!   [`observation`]; everything downstream is typed
//!
//! ## Example
//!
//! ```
//! use spc_engine::{analyze, AnalysisRequest, AxisMode, CellValue, ChartKind, Row, SignalDetector};
//!
//! let rows: Vec<Row> = (1..=12)
//!     .map(|i| {
//!         Row::from([
//!             ("Week".to_string(), CellValue::Text(format!("Week {i}"))),
//!             ("Value".to_string(), CellValue::Number(if i % 2 == 0 { 10.2 } else { 9.8 })),
//!         ])
//!     })
//!     .collect();
//!
//! let request = AnalysisRequest {
//!     rows,
//!     position_column: "Week".to_string(),
//!     value_column: "Value".to_string(),
//!     axis: AxisMode::Sequential,
//!     chart: ChartKind::Xmr,
//!     baseline_count: None,
//!     splits: Vec::new(),
//!     target: None,
//!     detector: SignalDetector::default(),
//! };
//!
//! let result = analyze(&request).unwrap();
//! assert!(result.segments[0].stable);
//! ```

pub mod analysis;
pub mod baseline;
pub mod capability;
pub mod error;
pub mod limits;
pub mod observation;
pub mod segment;
pub mod signals;
pub mod stats;

pub use analysis::{
    analyze, AnalysisRequest, AnalysisResult, ChartSeries, SegmentSummary, Target,
    MIN_OBSERVATIONS_XMR,
};
pub use baseline::{BaselineStats, ChartKind};
pub use capability::{CapabilityResult, Direction};
pub use error::AnalysisError;
pub use limits::{ControlLimits, MovingRangeLimits};
pub use observation::{AxisMode, CellValue, Observation, Position, Row, MIN_OBSERVATIONS};
pub use segment::{Segment, SegmentAnalysis};
pub use signals::{SignalDetector, SignalSet};
