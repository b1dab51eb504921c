use chrono::NaiveDate;
use log::debug;
use std::sync::Arc;

use super::snapshots_errors::{Result, SnapshotError};
use super::snapshots_model::HoldingsSnapshot;
use super::snapshots_repository::SnapshotRepositoryTrait;
use crate::constants::SNAPSHOT_PAGE_SIZE;

/// Exhaustively fetches a basket's full holdings set for one date, stepping
/// through the repository's page-capped read interface.
///
/// A transport error mid-pagination aborts the whole fetch. Returning fewer
/// rows than exist would turn every missing previous-day row into a spurious
/// NEW position downstream, so partial results are never surfaced.
pub struct PaginatedRetriever {
    repository: Arc<dyn SnapshotRepositoryTrait + Send + Sync>,
    page_size: i64,
}

impl PaginatedRetriever {
    pub fn new(repository: Arc<dyn SnapshotRepositoryTrait + Send + Sync>) -> Self {
        Self {
            repository,
            page_size: SNAPSHOT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(
        repository: Arc<dyn SnapshotRepositoryTrait + Send + Sync>,
        page_size: i64,
    ) -> Self {
        debug_assert!(page_size > 0);
        Self {
            repository,
            page_size,
        }
    }

    /// Returns every row for the basket/date, issuing ceil(N / page_size)
    /// page requests and stopping on the first short page.
    pub fn fetch_all(&self, basket_id: &str, as_of: NaiveDate) -> Result<Vec<HoldingsSnapshot>> {
        let mut all_rows: Vec<HoldingsSnapshot> = Vec::new();
        let mut offset: i64 = 0;

        loop {
            let page = self
                .repository
                .get_holdings_page(basket_id, as_of, self.page_size, offset)
                .map_err(|e| SnapshotError::PaginationAborted {
                    basket_id: basket_id.to_string(),
                    as_of,
                    offset,
                    source: Box::new(e),
                })?;

            let page_len = page.len() as i64;
            all_rows.extend(page);

            if page_len < self.page_size {
                break;
            }
            offset += self.page_size;
        }

        debug!(
            "Fetched {} holdings rows for basket {} on {}",
            all_rows.len(),
            basket_id,
            as_of
        );

        Ok(all_rows)
    }
}
