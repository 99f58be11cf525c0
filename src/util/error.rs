//! Error types for detnms.

use thiserror::Error;

/// Result alias for detnms operations.
pub type DetNmsResult<T> = std::result::Result<T, DetNmsError>;

/// Errors that can occur while decoding or suppressing predictions.
///
/// Every variant describes a contract violation at the call boundary; the
/// crate has no transient failure modes and never retries.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DetNmsError {
    /// A prediction row does not have the `4 + num_classes` layout.
    #[error("malformed prediction: row {row} has width {got}, expected {expected}")]
    MalformedPrediction {
        /// Index of the offending row.
        row: usize,
        /// Expected row width (`4 + num_classes`).
        expected: usize,
        /// Actual row width.
        got: usize,
    },
    /// A numeric parameter is outside its valid range.
    #[error("invalid parameter {name}={value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
    /// A class index has no entry in the label table.
    #[error("class index {class_index} out of range for {num_labels} labels")]
    UnknownClass {
        class_index: usize,
        num_labels: usize,
    },
}

impl DetNmsError {
    /// Builds an `InvalidParameter` error for a threshold outside `[0, 1]`.
    pub(crate) fn threshold(name: &'static str, value: f64) -> Self {
        Self::InvalidParameter {
            name,
            value,
            reason: "must lie in [0, 1]",
        }
    }
}

/// Checks that a threshold lies in the closed unit interval.
///
/// NaN is rejected because it is not contained in any range.
pub(crate) fn check_unit_interval(name: &'static str, value: f64) -> DetNmsResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(DetNmsError::threshold(name, value))
    }
}

#[cfg(test)]
mod tests {
    use super::{check_unit_interval, DetNmsError};

    #[test]
    fn unit_interval_bounds_are_inclusive() {
        assert!(check_unit_interval("t", 0.0).is_ok());
        assert!(check_unit_interval("t", 1.0).is_ok());
        assert_eq!(
            check_unit_interval("t", -0.01),
            Err(DetNmsError::threshold("t", -0.01))
        );
        assert!(check_unit_interval("t", f64::NAN).is_err());
    }

    #[test]
    fn malformed_prediction_message_names_row() {
        let err = DetNmsError::MalformedPrediction {
            row: 3,
            expected: 7,
            got: 6,
        };
        assert_eq!(
            err.to_string(),
            "malformed prediction: row 3 has width 6, expected 7"
        );
    }
}
