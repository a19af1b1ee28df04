//! Error types for the evaluator.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our custom error.
pub type Result<T> = std::result::Result<T, RagEvalError>;

/// Errors that can occur while scoring RAG outputs.
///
/// Configuration errors abort a whole batch; anything recoverable at the
/// level of a single example (unparseable judge output, degenerate input)
/// becomes an undefined score instead and never surfaces here.
#[derive(Error, Debug)]
pub enum RagEvalError {
    /// Error reading or writing files.
    #[error("I/O error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The dataset file does not exist.
    #[error("Dataset not found at '{0}'")]
    DatasetNotFound(PathBuf),

    /// Dataset columns have different row counts.
    #[error("Column '{column}' has {actual} rows, expected {expected}")]
    ColumnMismatch {
        column: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A metric was asked to score a dataset lacking a column it needs.
    #[error("Metric '{metric}' requires the '{column}' column")]
    MissingColumn {
        metric: &'static str,
        column: &'static str,
    },

    /// Embedding vectors of different dimensions were compared.
    #[error("Embedding dimension mismatch: query has {expected}, candidate {index} has {actual}")]
    DimensionMismatch {
        expected: usize,
        actual: usize,
        index: usize,
    },

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// LLM API error.
    #[error("LLM API error: {0}")]
    LlmApi(String),

    /// Embedding API error.
    #[error("Embedding API error: {0}")]
    EmbeddingApi(String),

    /// LLM response parsing error.
    #[error("Failed to parse LLM response: {0}")]
    LlmParse(String),

    /// HTTP request error.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Error during serialization/deserialization.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RagEvalError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<reqwest::Error> for RagEvalError {
    fn from(err: reqwest::Error) -> Self {
        RagEvalError::Http(err.to_string())
    }
}

impl From<serde_json::Error> for RagEvalError {
    fn from(err: serde_json::Error) -> Self {
        RagEvalError::LlmParse(err.to_string())
    }
}
