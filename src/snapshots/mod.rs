pub mod retriever;
pub mod snapshots_errors;
pub mod snapshots_model;
pub mod snapshots_repository;

// Re-export the main public entry points and types
pub use retriever::PaginatedRetriever;
pub use snapshots_errors::{Result, SnapshotError};
pub use snapshots_model::HoldingsSnapshot;
pub use snapshots_repository::{SnapshotRepository, SnapshotRepositoryTrait};
