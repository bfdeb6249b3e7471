//! Error types for the simple-rs crate.

/// Error type for all fallible operations in the simple-rs crate.
///
/// Every variant is a caller-input validation failure detected at call
/// entry; no partial profile is ever produced alongside an error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimpleError {
    /// Returned when the subsequence length is zero or longer than the
    /// shortest participating sequence (this covers empty sequences).
    #[error("subsequence length must be in 1..={max}, got {subseq_len}")]
    InvalidWindowLength {
        /// The requested subsequence length.
        subseq_len: usize,
        /// Length of the shortest participating sequence.
        max: usize,
    },

    /// Returned when two sequences that must share a feature axis do not.
    #[error("dimension mismatch: {left} vs {right} feature dimensions")]
    DimensionMismatch {
        /// Dimension count of the first sequence.
        left: usize,
        /// Dimension count of the second sequence.
        right: usize,
    },

    /// Returned when raw data cannot be shaped into `ndim × length`.
    #[error("invalid sequence shape: {reason}")]
    InvalidShape {
        /// What was wrong with the data.
        reason: String,
    },

    /// Returned when a distance matrix does not agree with its label vectors.
    #[error("distance matrix is {rows}x{cols} but labels are {test_labels} test, {train_labels} train")]
    ShapeMismatch {
        /// Number of rows in the distance matrix.
        rows: usize,
        /// Number of columns in the first offending row.
        cols: usize,
        /// Number of test labels.
        test_labels: usize,
        /// Number of training labels.
        train_labels: usize,
    },

    /// Returned when a test item's label never occurs among the training labels.
    #[error("test item {row} has no relevant training item")]
    NoRelevantItem {
        /// Row index of the test item.
        row: usize,
    },

    /// Returned when an evaluation or batch call receives no items.
    #[error("no items provided")]
    EmptyInput,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SimpleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_invalid_window_length() {
        let e = SimpleError::InvalidWindowLength {
            subseq_len: 9,
            max: 8,
        };
        assert_eq!(e.to_string(), "subsequence length must be in 1..=8, got 9");
    }

    #[test]
    fn error_dimension_mismatch() {
        let e = SimpleError::DimensionMismatch { left: 12, right: 20 };
        assert_eq!(
            e.to_string(),
            "dimension mismatch: 12 vs 20 feature dimensions"
        );
    }

    #[test]
    fn error_no_relevant_item() {
        let e = SimpleError::NoRelevantItem { row: 3 };
        assert_eq!(e.to_string(), "test item 3 has no relevant training item");
    }

    #[test]
    fn error_is_std_error() {
        fn assert_impl<T: std::error::Error>() {}
        assert_impl::<SimpleError>();
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<SimpleError>();
    }
}
