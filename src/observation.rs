//! Building ordered numeric observations from raw tabular rows.
//!
//! This module is the boundary where stringly-typed tabular data (whatever a
//! CSV parser or spreadsheet reader produced) becomes a typed, ordered
//! series. All duck-typed cell access happens here; everything downstream
//! works on plain `f64` values and totally ordered positions.
//!
//! Rows with an unparseable position or value are silently dropped — only
//! the aggregate count matters, and fewer than [`MIN_OBSERVATIONS`] valid
//! rows aborts the run with [`AnalysisError::InsufficientData`].

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Minimum number of valid observations for any chart.
pub const MIN_OBSERVATIONS: usize = 5;

/// A raw cell value as produced by an external tabular data source.
///
/// Untagged so that JSON rows (`{"Date": "2024-01-03", "Value": 12.5}`)
/// deserialize directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// A numeric cell.
    Number(f64),
    /// A textual cell.
    Text(String),
    /// An empty or null cell.
    Null,
}

impl CellValue {
    /// The cell's trimmed text form, or `None` for null/blank cells.
    fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Number(n) => Some(n.to_string()),
            CellValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            CellValue::Null => None,
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

/// One raw row: column name to cell value.
pub type Row = BTreeMap<String, CellValue>;

/// How positions are interpreted when building a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisMode {
    /// Positions are dates parsed from the position column; the series is
    /// sorted ascending by date.
    Temporal,
    /// Positions are 0-based row indices; original row order is kept.
    Sequential,
}

/// A totally ordered position along the series axis.
///
/// A single series uses one variant throughout, chosen by [`AxisMode`];
/// variants are never mixed within a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    /// Calendar date (temporal mode).
    Date(NaiveDate),
    /// Row index (sequential mode).
    Index(usize),
}

/// One validated observation: a position, a finite value, and a label for
/// the plotting surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Position along the ordering axis.
    pub position: Position,
    /// The measured value. Always finite.
    pub value: f64,
    /// Axis label text (ISO date or point name).
    pub label: String,
}

/// Datetime formats tried by the fallback date parser, most specific first.
const FALLBACK_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Date-only formats tried by the fallback date parser.
const FALLBACK_DATE_FORMATS: &[&str] = &["%Y/%m/%d", "%d %B %Y", "%B %d, %Y"];

/// Parse a position cell as a calendar date.
///
/// Accepted, in order:
/// 1. ISO `YYYY-MM-DD`, with any time suffix (`T...` or ` ...`) ignored.
/// 2. Day-first `DD/MM/YYYY` or `DD-MM-YYYY`; 2-digit years add 2000.
/// 3. A fallback pass over RFC 3339 and a handful of common formats.
///
/// Returns `None` for anything unparseable; the caller drops the row.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    // ISO date, possibly with a time suffix we ignore. Only taken when the
    // leading component is a 4-digit year: chrono's %Y accepts shorter
    // years, which would swallow day-first dates like "05-03-24".
    let date_part = trimmed
        .split_once('T')
        .or_else(|| trimmed.split_once(' '))
        .map_or(trimmed, |(date, _)| date);
    let has_four_digit_year = date_part.split('-').next().is_some_and(|y| y.len() == 4);
    if has_four_digit_year {
        if let Ok(date) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
            return Some(date);
        }
    }

    if let Some(date) = parse_day_first(date_part) {
        return Some(date);
    }

    // Fallback pass for anything else that still looks like a date.
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }
    for fmt in FALLBACK_DATETIME_FORMATS {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in FALLBACK_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(date);
        }
    }
    None
}

/// Day-first `DD/MM/YYYY` or `DD-MM-YYYY`, 2- or 4-digit year.
///
/// Parsed by hand rather than with chrono's `%y`, whose century pivot
/// (69 → 1969) does not match the add-2000 convention used here.
fn parse_day_first(raw: &str) -> Option<NaiveDate> {
    let sep = if raw.contains('/') { '/' } else { '-' };
    let parts: Vec<&str> = raw.split(sep).collect();
    if parts.len() != 3 {
        return None;
    }
    let day: u32 = parts[0].trim().parse().ok()?;
    let month: u32 = parts[1].trim().parse().ok()?;
    let mut year: i32 = parts[2].trim().parse().ok()?;
    if parts[2].trim().len() <= 2 {
        year += 2000;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse a value cell to a finite `f64`.
///
/// Numeric cells pass through; text cells are trimmed and may carry a
/// trailing `%` (stripped, e.g. `"55.17%"` → `55.17`). Non-finite results
/// and null cells return `None`.
pub fn parse_value(cell: &CellValue) -> Option<f64> {
    let value = match cell {
        CellValue::Number(n) => *n,
        CellValue::Text(s) => {
            let trimmed = s.trim();
            let numeric = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
            numeric.parse::<f64>().ok()?
        }
        CellValue::Null => return None,
    };
    if value.is_finite() {
        Some(value)
    } else {
        None
    }
}

/// Build an ordered series of observations from raw rows.
///
/// `position_column` and `value_column` must be keys of the first row, or
/// the run aborts with [`AnalysisError::InvalidColumnSelection`]. Rows whose
/// position (temporal mode only) or value fail to parse are dropped; if
/// fewer than [`MIN_OBSERVATIONS`] valid observations remain, the run
/// aborts with [`AnalysisError::InsufficientData`].
///
/// Temporal series are sorted ascending by date; sequential series keep
/// their original row order.
pub fn build_series(
    rows: &[Row],
    position_column: &str,
    value_column: &str,
    axis: AxisMode,
) -> Result<Vec<Observation>, AnalysisError> {
    if rows.is_empty() {
        return Err(AnalysisError::InsufficientData {
            required: MIN_OBSERVATIONS,
            found: 0,
        });
    }

    let first = &rows[0];
    for column in [position_column, value_column] {
        if !first.contains_key(column) {
            return Err(AnalysisError::InvalidColumnSelection {
                column: column.to_string(),
            });
        }
    }

    let mut series = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        let Some(value) = row.get(value_column).and_then(parse_value) else {
            continue;
        };
        let position_cell = row.get(position_column);
        match axis {
            AxisMode::Temporal => {
                let Some(date) = position_cell
                    .and_then(CellValue::as_text)
                    .and_then(|text| parse_date(&text))
                else {
                    continue;
                };
                series.push(Observation {
                    position: Position::Date(date),
                    value,
                    label: date.format("%Y-%m-%d").to_string(),
                });
            }
            AxisMode::Sequential => {
                let label = position_cell
                    .and_then(CellValue::as_text)
                    .unwrap_or_else(|| format!("Point {}", index + 1));
                series.push(Observation {
                    position: Position::Index(index),
                    value,
                    label,
                });
            }
        }
    }

    if axis == AxisMode::Temporal {
        series.sort_by_key(|obs| obs.position);
    }

    if series.len() < MIN_OBSERVATIONS {
        return Err(AnalysisError::InsufficientData {
            required: MIN_OBSERVATIONS,
            found: series.len(),
        });
    }
    Ok(series)
}
