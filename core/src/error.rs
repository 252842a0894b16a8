use crate::types::RejectionReason;
use thiserror::Error;

/// Result type for triage operations
pub type Result<T> = std::result::Result<T, TriageError>;

/// Error types for triage operations
///
/// Quality rejections of a single image are not errors: they are reported
/// through [`crate::TriageOutcome::Rejected`]. Only a rejected image inside
/// a batch aborts processing with [`TriageError::BatchRejected`].
#[derive(Error, Debug)]
pub enum TriageError {
    /// Pixel buffer cannot be analysed (zero area, size mismatch, non-finite values)
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Configuration file could not be interpreted
    #[error("Config error: {0}")]
    ConfigError(String),

    /// Reference annotation data could not be interpreted
    #[error("Annotation error: {0}")]
    AnnotationError(String),

    /// One image of a batch failed quality validation; the whole batch is void
    #[error("Batch rejected: image {} of {total} failed validation ({reason})", .index + 1)]
    BatchRejected {
        index: usize,
        total: usize,
        reason: RejectionReason,
    },

    /// Image decoding error
    #[error("Image error: {0}")]
    ImageError(String),

    /// CSV reading error
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<image::ImageError> for TriageError {
    fn from(e: image::ImageError) -> Self {
        TriageError::ImageError(format!("{}", e))
    }
}

impl TriageError {
    /// Returns whether this error indicates a caller or pipeline bug
    /// rather than a data problem
    pub fn is_malformed_input(&self) -> bool {
        matches!(self, TriageError::MalformedInput(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_rejected_message_is_one_based() {
        let err = TriageError::BatchRejected {
            index: 1,
            total: 4,
            reason: RejectionReason::InsufficientContrast,
        };
        assert_eq!(
            err.to_string(),
            "Batch rejected: image 2 of 4 failed validation (insufficient contrast)"
        );
    }

    #[test]
    fn test_malformed_input_is_distinct() {
        assert!(TriageError::MalformedInput("zero area".into()).is_malformed_input());
        assert!(!TriageError::AnnotationError("bad".into()).is_malformed_input());
    }
}
