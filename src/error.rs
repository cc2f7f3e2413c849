//! Reported error conditions for an analysis run.
//!
//! Only conditions that abort an analysis outright are errors. Recognized
//! degenerate states — zero dispersion, a capability request against an
//! unstable period — are ordinary values (`Option`/flags) that callers
//! branch on, not errors.

use thiserror::Error;

/// Conditions that abort an analysis before any result is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// Too few valid observations survived row parsing.
    ///
    /// Run charts need at least 5 points; XmR charts need at least 12.
    #[error("not enough valid data points after parsing: need at least {required}, got {found}")]
    InsufficientData {
        /// Minimum number of observations for the requested chart.
        required: usize,
        /// Valid observations actually available.
        found: usize,
    },

    /// The chosen position or value column is missing from the input rows.
    #[error("column {column:?} is not present in the input rows")]
    InvalidColumnSelection {
        /// The column name that was requested but not found.
        column: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_message_names_counts() {
        let err = AnalysisError::InsufficientData {
            required: 5,
            found: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains('5'), "message should name the minimum: {msg}");
        assert!(msg.contains('3'), "message should name the actual count: {msg}");
    }

    #[test]
    fn invalid_column_message_names_column() {
        let err = AnalysisError::InvalidColumnSelection {
            column: "Date".to_string(),
        };
        assert!(err.to_string().contains("Date"));
    }
}
