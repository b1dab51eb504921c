pub mod queue_errors;
pub mod queue_model;
pub mod queue_repository;
pub mod queue_service;
pub mod skip_model;
pub mod skip_repository;
pub mod skip_service;

// Re-export the main public entry points and types
pub use queue_errors::{QueueError, Result};
pub use queue_model::{AnalysisKind, AnalysisQueueEntry, EnqueueOutcome, QueueStatus};
pub use queue_repository::{QueueRepository, QueueRepositoryTrait};
pub use queue_service::{AnalysisUniverse, PopulationSummary, QueueService, QueueServiceTrait};
pub use skip_model::{SkipAddedBy, SkipListEntry, SkipPolicy};
pub use skip_repository::{SkipListRepository, SkipListRepositoryTrait};
pub use skip_service::{SkipListService, SkipListServiceTrait};

#[cfg(test)]
pub(crate) mod tests;
