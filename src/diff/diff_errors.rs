use thiserror::Error;

use crate::snapshots::SnapshotError;

pub type Result<T> = std::result::Result<T, DiffError>;

#[derive(Error, Debug)]
pub enum DiffError {
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("Invalid diff input: {0}")]
    InvalidData(String),
}
