use thiserror::Error;

use crate::errors::DatabaseError;

pub type Result<T> = std::result::Result<T, SnapshotError>;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] diesel::result::Error),

    #[error("Database error: {0}")]
    DatabaseConnectionError(#[from] DatabaseError),

    #[error("Pagination aborted for basket {basket_id} on {as_of} at offset {offset}: {source}")]
    PaginationAborted {
        basket_id: String,
        as_of: chrono::NaiveDate,
        offset: i64,
        #[source]
        source: Box<SnapshotError>,
    },

    #[error("Invalid snapshot data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),
}
