use chrono::Utc;
use log::info;
use std::sync::Arc;
use std::time::Duration;

use super::jobs_model::{GuardOutcome, JobStatus};
use super::jobs_repository::JobExecutionRepositoryTrait;
use crate::analysis::{AnalysisOrchestrator, OrchestratorSummary};
use crate::constants::ANALYSIS_JOB_NAME;
use crate::errors::Result;

/// Scheduler entry point for the queue-draining analysis pass.
pub struct AnalysisJobService {
    guard: Arc<dyn JobExecutionRepositoryTrait + Send + Sync>,
    orchestrator: Arc<AnalysisOrchestrator>,
}

impl AnalysisJobService {
    pub fn new(
        guard: Arc<dyn JobExecutionRepositoryTrait + Send + Sync>,
        orchestrator: Arc<AnalysisOrchestrator>,
    ) -> Self {
        Self {
            guard,
            orchestrator,
        }
    }

    /// Drains the queue under `budget`. Returns `None` when another analysis
    /// pass is already running.
    pub async fn run(&self, budget: Duration) -> Result<Option<OrchestratorSummary>> {
        let target_date = Utc::now().date_naive();

        let record = match self
            .guard
            .try_begin(ANALYSIS_JOB_NAME, target_date, "default")?
        {
            GuardOutcome::Started(record) => record,
            GuardOutcome::AlreadyRunning => {
                info!("Analysis job already running; skipping");
                return Ok(None);
            }
        };

        let outcome = self.orchestrator.run(budget).await;

        match &outcome {
            Ok(_) => {
                self.guard
                    .finish(&record.id, JobStatus::Success, None, Utc::now())?;
            }
            Err(e) => {
                self.guard.finish(
                    &record.id,
                    JobStatus::Failed,
                    Some(&e.to_string()),
                    Utc::now(),
                )?;
            }
        }

        outcome.map(Some)
    }
}
