//! Error types for the training-data pipeline

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while preparing training data
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Invalid input parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Audio decoding error
    #[error("Decoding error: {0}")]
    DecodingError(String),

    /// Processing error during extraction or labelling
    #[error("Processing error: {0}")]
    ProcessingError(String),

    /// Numerical error (non-finite values, degenerate statistics, etc.)
    #[error("Numerical error: {0}")]
    NumericalError(String),

    /// Corpus manifest is missing; aborts a batch run
    #[error("No manifest.json found at {}", .0.display())]
    MissingManifest(PathBuf),

    /// Stage index is missing; aborts a batch run
    #[error("No index.json found at {}", .0.display())]
    MissingIndex(PathBuf),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON document
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed YAML configuration
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Array archive could not be read or written
    #[error("Archive error: {0}")]
    Archive(String),
}

impl PipelineError {
    /// True for errors that must abort a whole corpus run rather than skip one recording
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PipelineError::MissingManifest(_) | PipelineError::MissingIndex(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(PipelineError::MissingManifest(PathBuf::from("x/manifest.json")).is_fatal());
        assert!(PipelineError::MissingIndex(PathBuf::from("x/index.json")).is_fatal());
        assert!(!PipelineError::InvalidInput("bad".to_string()).is_fatal());
        assert!(!PipelineError::DecodingError("bad".to_string()).is_fatal());
    }

    #[test]
    fn test_display_mentions_path() {
        let err = PipelineError::MissingIndex(PathBuf::from("data/features/index.json"));
        assert!(err.to_string().contains("data/features/index.json"));
    }
}
