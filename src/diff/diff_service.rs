use chrono::NaiveDate;
use log::{debug, info};
use std::sync::Arc;

use super::diff_engine::DiffEngine;
use super::diff_model::{BasketChangeReport, ChangesetClass};
use super::noise_classifier::NoiseClassifier;
use super::significance::SignificanceFilter;
use crate::errors::Result;
use crate::snapshots::{PaginatedRetriever, SnapshotRepositoryTrait};

/// Trait defining the public interface of the diff pipeline.
pub trait DiffServiceTrait: Send + Sync {
    /// Runs the full pipeline for one basket/date: exhaustive retrieval of
    /// the current and previous snapshots, diffing, noise classification and
    /// significance filtering.
    ///
    /// Returns `None` when the basket has no earlier snapshot to compare
    /// against (first observation day).
    fn diff_basket(&self, basket_id: &str, as_of: NaiveDate) -> Result<Option<BasketChangeReport>>;
}

pub struct DiffService {
    repository: Arc<dyn SnapshotRepositoryTrait + Send + Sync>,
    retriever: PaginatedRetriever,
    engine: DiffEngine,
    noise_classifier: NoiseClassifier,
    significance_filter: SignificanceFilter,
}

impl DiffService {
    pub fn new(repository: Arc<dyn SnapshotRepositoryTrait + Send + Sync>) -> Self {
        Self {
            retriever: PaginatedRetriever::new(repository.clone()),
            repository,
            engine: DiffEngine::new(),
            noise_classifier: NoiseClassifier::default(),
            significance_filter: SignificanceFilter::default(),
        }
    }

    pub fn with_components(
        repository: Arc<dyn SnapshotRepositoryTrait + Send + Sync>,
        retriever: PaginatedRetriever,
        engine: DiffEngine,
        noise_classifier: NoiseClassifier,
        significance_filter: SignificanceFilter,
    ) -> Self {
        Self {
            repository,
            retriever,
            engine,
            noise_classifier,
            significance_filter,
        }
    }
}

impl DiffServiceTrait for DiffService {
    fn diff_basket(&self, basket_id: &str, as_of: NaiveDate) -> Result<Option<BasketChangeReport>> {
        let previous_as_of = match self.repository.previous_date_before(basket_id, as_of)? {
            Some(date) => date,
            None => {
                info!(
                    "No earlier snapshot for basket {} before {}; skipping diff",
                    basket_id, as_of
                );
                return Ok(None);
            }
        };

        let current = self.retriever.fetch_all(basket_id, as_of)?;
        let previous = self.retriever.fetch_all(basket_id, previous_as_of)?;
        debug!(
            "Diffing basket {}: {} rows on {} vs {} rows on {}",
            basket_id,
            current.len(),
            as_of,
            previous.len(),
            previous_as_of
        );

        let deltas = self.engine.diff(&current, &previous);
        let total_deltas = deltas.len();

        let (classified_noise, significant) = match self.noise_classifier.classify(&deltas) {
            ChangesetClass::Noise => {
                info!(
                    "Basket {} changeset on {} classified as systematic adjustment; discarding {} deltas",
                    basket_id, as_of, total_deltas
                );
                (true, Vec::new())
            }
            ChangesetClass::Signal(deltas) => (false, self.significance_filter.filter(deltas)),
        };

        info!(
            "Basket {} on {}: {} deltas, {} significant{}",
            basket_id,
            as_of,
            total_deltas,
            significant.len(),
            if classified_noise { " (noise)" } else { "" }
        );

        Ok(Some(BasketChangeReport {
            basket_id: basket_id.to_string(),
            as_of,
            previous_as_of,
            current_count: current.len(),
            previous_count: previous.len(),
            total_deltas,
            classified_noise,
            significant,
        }))
    }
}
