use thiserror::Error;

use crate::errors::DatabaseError;

pub type Result<T> = std::result::Result<T, JobError>;

#[derive(Error, Debug)]
pub enum JobError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] diesel::result::Error),

    #[error("Database error: {0}")]
    DatabaseConnectionError(#[from] DatabaseError),

    #[error("Job record not found: {0}")]
    NotFound(String),

    #[error("Invalid job data: {0}")]
    InvalidData(String),
}
