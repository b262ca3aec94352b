//! Error handling for the resume ranker

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResumeRankerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Failed to extract text from '{}': {reason}", path.display())]
    Extraction { path: PathBuf, reason: String },

    #[error("Model initialization error: {0}")]
    ModelInitialization(String),

    #[error("Skill dictionary could not be loaded: {0}")]
    DictionaryLoad(String),

    #[error("{0} used before fit() was called")]
    NotFitted(&'static str),

    #[error("Embedding generation error: {0}")]
    Embedding(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),
}

pub type Result<T> = std::result::Result<T, ResumeRankerError>;

/// The embedding crate reports load failures through anyhow
impl From<anyhow::Error> for ResumeRankerError {
    fn from(err: anyhow::Error) -> Self {
        ResumeRankerError::ModelInitialization(format!("{:#}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_error_names_file() {
        let err = ResumeRankerError::Extraction {
            path: PathBuf::from("broken.pdf"),
            reason: "no text layer".to_string(),
        };
        assert!(err.to_string().contains("broken.pdf"));
        assert!(err.to_string().contains("no text layer"));
    }

    #[test]
    fn test_model_errors_map_to_initialization() {
        let err: ResumeRankerError = anyhow::anyhow!("missing tokenizer.json").into();
        assert!(matches!(err, ResumeRankerError::ModelInitialization(_)));
        assert!(err.to_string().contains("tokenizer.json"));
    }
}
