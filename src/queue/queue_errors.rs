use thiserror::Error;

use crate::errors::DatabaseError;

pub type Result<T> = std::result::Result<T, QueueError>;

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] diesel::result::Error),

    #[error("Database error: {0}")]
    DatabaseConnectionError(#[from] DatabaseError),

    #[error("Queue entry not found: {0}")]
    NotFound(String),

    #[error("Invalid queue data: {0}")]
    InvalidData(String),
}
