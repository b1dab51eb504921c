pub mod analysis_job;
pub mod diff_job;
pub mod jobs_errors;
pub mod jobs_model;
pub mod jobs_repository;

// Re-export the main public entry points and types
pub use analysis_job::AnalysisJobService;
pub use diff_job::{DiffJobService, DiffJobSummary};
pub use jobs_errors::{JobError, Result};
pub use jobs_model::{GuardOutcome, JobExecutionRecord, JobStatus};
pub use jobs_repository::{JobExecutionRepository, JobExecutionRepositoryTrait};

#[cfg(test)]
pub(crate) mod tests;
