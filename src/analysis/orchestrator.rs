use chrono::{Duration as ChronoDuration, Utc};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::analysis_model::{is_fresh, AnalysisResult};
use super::context_aggregator::ContextAggregator;
use super::inference::{EmbeddingProviderTrait, InferenceOptions, InferenceProviderTrait};
use super::prompts::build_prompt;
use super::results_repository::AnalysisResultRepositoryTrait;
use super::validator::validate_payload;
use crate::constants::ANALYSIS_FRESHNESS_HOURS;
use crate::errors::Result;
use crate::queue::{AnalysisQueueEntry, QueueRepositoryTrait, SkipListServiceTrait};

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub freshness_window: ChronoDuration,
    pub inference_options: InferenceOptions,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            freshness_window: ChronoDuration::hours(ANALYSIS_FRESHNESS_HOURS),
            inference_options: InferenceOptions::default(),
        }
    }
}

/// Counts for one orchestrator pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrchestratorSummary {
    pub processed: usize,
    pub completed: usize,
    pub failed: usize,
    pub skipped_quarantined: usize,
    pub skipped_fresh: usize,
    pub elapsed_ms: u64,
}

/// Drains the analysis queue under a wall-clock budget.
///
/// Single-worker cooperative loop: the budget is checked before each entry
/// is started; an entry already dispatched to inference runs to completion
/// rather than being interrupted mid-call. Entries left pending at budget
/// exhaustion are picked up by the next scheduled pass.
pub struct AnalysisOrchestrator {
    queue: Arc<dyn QueueRepositoryTrait + Send + Sync>,
    skip_list: Arc<dyn SkipListServiceTrait + Send + Sync>,
    results: Arc<dyn AnalysisResultRepositoryTrait + Send + Sync>,
    context: Arc<ContextAggregator>,
    inference: Arc<dyn InferenceProviderTrait + Send + Sync>,
    embeddings: Arc<dyn EmbeddingProviderTrait + Send + Sync>,
    config: OrchestratorConfig,
}

impl AnalysisOrchestrator {
    pub fn new(
        queue: Arc<dyn QueueRepositoryTrait + Send + Sync>,
        skip_list: Arc<dyn SkipListServiceTrait + Send + Sync>,
        results: Arc<dyn AnalysisResultRepositoryTrait + Send + Sync>,
        context: Arc<ContextAggregator>,
        inference: Arc<dyn InferenceProviderTrait + Send + Sync>,
        embeddings: Arc<dyn EmbeddingProviderTrait + Send + Sync>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            queue,
            skip_list,
            results,
            context,
            inference,
            embeddings,
            config,
        }
    }

    pub async fn run(&self, budget: Duration) -> Result<OrchestratorSummary> {
        let started = Instant::now();
        let mut summary = OrchestratorSummary::default();

        loop {
            if started.elapsed() >= budget {
                info!(
                    "Analysis budget exhausted after {} entries; {} still pending",
                    summary.processed,
                    self.queue.pending_count()?
                );
                break;
            }

            let Some(entry) = self.queue.dequeue_next()? else {
                break;
            };
            summary.processed += 1;

            // Gating consumes no meaningful budget: quarantined or fresh
            // entities are closed out without touching inference. They still
            // walk the normal pending -> in_progress -> completed states.
            if !entry.is_manual {
                let now = Utc::now();
                if self.skip_list.is_skipped(&entry.target_key, now)? {
                    self.queue.mark_in_progress(&entry.id)?;
                    self.queue.mark_completed(&entry.id)?;
                    summary.skipped_quarantined += 1;
                    continue;
                }
                let last_success = self
                    .results
                    .last_success_at(&entry.target_key, entry.kind)?;
                if is_fresh(last_success, now, self.config.freshness_window) {
                    self.queue.mark_in_progress(&entry.id)?;
                    self.queue.mark_completed(&entry.id)?;
                    summary.skipped_fresh += 1;
                    continue;
                }
            }

            let entry = self.queue.mark_in_progress(&entry.id)?;

            match self.process_entry(&entry).await {
                Ok(result) => {
                    self.queue.mark_completed(&entry.id)?;
                    summary.completed += 1;
                    info!(
                        "Analyzed {} {} ({} sentiment, confidence {:.2})",
                        entry.kind.as_str(),
                        entry.target_key,
                        result.sentiment.as_str(),
                        result.confidence
                    );
                }
                Err(e) => {
                    error!(
                        "Analysis failed for {} {}: {}",
                        entry.kind.as_str(),
                        entry.target_key,
                        e
                    );
                    self.queue.mark_failed(&entry.id, &e.to_string())?;
                    summary.failed += 1;

                    let consecutive = self
                        .queue
                        .count_consecutive_failures(entry.kind, &entry.target_key)?;
                    if let Some(quarantined) = self.skip_list.record_failure(
                        &entry.target_key,
                        &e.to_string(),
                        consecutive,
                        Utc::now(),
                    )? {
                        warn!(
                            "{} quarantined after {} consecutive failures",
                            quarantined.entity_key, quarantined.failure_count
                        );
                    }
                }
            }
        }

        summary.elapsed_ms = started.elapsed().as_millis() as u64;
        info!(
            "Orchestrator pass: {} processed, {} completed, {} failed, {} quarantine-skipped, {} fresh-skipped in {}ms",
            summary.processed,
            summary.completed,
            summary.failed,
            summary.skipped_quarantined,
            summary.skipped_fresh,
            summary.elapsed_ms
        );

        Ok(summary)
    }

    async fn process_entry(&self, entry: &AnalysisQueueEntry) -> Result<AnalysisResult> {
        let as_of = Utc::now().date_naive();

        let context = self
            .context
            .build_context(entry.kind, &entry.target_key, as_of)
            .await?;

        let prompt = build_prompt(entry.kind, &entry.target_key, &context.text);
        let payload = self
            .inference
            .infer(&prompt, &self.config.inference_options)
            .await?;

        let parsed = validate_payload(&payload)
            .map_err(crate::analysis::AnalysisError::PayloadValidation)?;

        let embedding = self.embeddings.embed(&parsed.summary).await?;

        let result = AnalysisResult::from_parsed(
            &entry.target_key,
            entry.kind,
            as_of,
            parsed,
            context.text,
            Some(embedding),
            context.source_counts,
        );

        Ok(self.results.upsert(result)?)
    }
}
