use thiserror::Error;

use super::validator::PayloadValidationError;
use crate::errors::DatabaseError;

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] diesel::result::Error),

    #[error("Database error: {0}")]
    DatabaseConnectionError(#[from] DatabaseError),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Inference error: {0}")]
    InferenceError(String),

    #[error("Embedding error: {0}")]
    EmbeddingError(String),

    #[error("Invalid inference payload: {0}")]
    PayloadValidation(#[from] PayloadValidationError),

    #[error("Context source error: {0}")]
    ContextError(String),

    #[error("Invalid analysis data: {0}")]
    InvalidData(String),
}
