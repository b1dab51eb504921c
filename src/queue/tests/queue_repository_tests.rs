#[cfg(test)]
mod tests {
    use crate::constants::{PRIORITY_DEFAULT, PRIORITY_PORTFOLIO_HELD};
    use crate::db::create_test_pool;
    use crate::queue::queue_model::{AnalysisKind, AnalysisQueueEntry, QueueStatus};
    use crate::queue::queue_repository::{QueueRepository, QueueRepositoryTrait};

    fn repo() -> QueueRepository {
        QueueRepository::new(create_test_pool())
    }

    #[test]
    fn duplicate_enqueue_for_active_key_is_rejected_keeping_original_priority() {
        let repo = repo();

        let first = AnalysisQueueEntry::new(AnalysisKind::Instrument, "NVDA", PRIORITY_DEFAULT, false);
        assert!(repo.enqueue(first).unwrap().is_inserted());

        // A later request at higher priority does not displace the live entry.
        let second = AnalysisQueueEntry::new(
            AnalysisKind::Instrument,
            "NVDA",
            PRIORITY_PORTFOLIO_HELD,
            false,
        );
        assert!(!repo.enqueue(second).unwrap().is_inserted());

        let active = repo
            .find_active(AnalysisKind::Instrument, "NVDA")
            .unwrap()
            .unwrap();
        assert_eq!(active.priority, PRIORITY_DEFAULT);
        assert_eq!(repo.pending_count().unwrap(), 1);
    }

    #[test]
    fn same_key_different_kind_is_not_a_duplicate() {
        let repo = repo();

        let a = AnalysisQueueEntry::new(AnalysisKind::Instrument, "X", PRIORITY_DEFAULT, false);
        let b = AnalysisQueueEntry::new(AnalysisKind::BasketGroup, "X", PRIORITY_DEFAULT, false);

        assert!(repo.enqueue(a).unwrap().is_inserted());
        assert!(repo.enqueue(b).unwrap().is_inserted());
    }

    #[test]
    fn key_can_be_enqueued_again_after_completion() {
        let repo = repo();

        let entry = AnalysisQueueEntry::new(AnalysisKind::Instrument, "TSLA", PRIORITY_DEFAULT, false);
        let id = entry.id.clone();
        assert!(repo.enqueue(entry).unwrap().is_inserted());

        repo.mark_in_progress(&id).unwrap();
        repo.mark_completed(&id).unwrap();

        let again = AnalysisQueueEntry::new(AnalysisKind::Instrument, "TSLA", PRIORITY_DEFAULT, false);
        assert!(repo.enqueue(again).unwrap().is_inserted());
    }

    #[test]
    fn dequeue_orders_by_priority_then_fifo() {
        let repo = repo();

        let low = AnalysisQueueEntry::new(AnalysisKind::Instrument, "LOW", 100, false);
        let mut high_old = AnalysisQueueEntry::new(AnalysisKind::Instrument, "HIGH_OLD", 300, false);
        let mut high_new = AnalysisQueueEntry::new(AnalysisKind::Instrument, "HIGH_NEW", 300, false);

        // Force a deterministic creation order within the same priority.
        high_old.created_at = high_old.created_at - chrono::Duration::seconds(60);
        high_new.created_at = high_new.created_at + chrono::Duration::seconds(60);

        repo.enqueue(low).unwrap();
        repo.enqueue(high_new).unwrap();
        repo.enqueue(high_old).unwrap();

        let first = repo.dequeue_next().unwrap().unwrap();
        assert_eq!(first.target_key, "HIGH_OLD");
        repo.mark_in_progress(&first.id).unwrap();
        repo.mark_completed(&first.id).unwrap();

        let second = repo.dequeue_next().unwrap().unwrap();
        assert_eq!(second.target_key, "HIGH_NEW");
        repo.mark_in_progress(&second.id).unwrap();
        repo.mark_completed(&second.id).unwrap();

        let third = repo.dequeue_next().unwrap().unwrap();
        assert_eq!(third.target_key, "LOW");
    }

    #[test]
    fn mark_in_progress_requires_a_pending_entry() {
        let repo = repo();

        let entry = AnalysisQueueEntry::new(AnalysisKind::Instrument, "AMD", PRIORITY_DEFAULT, false);
        let id = entry.id.clone();
        repo.enqueue(entry).unwrap();

        let started = repo.mark_in_progress(&id).unwrap();
        assert_eq!(started.status, QueueStatus::InProgress);
        assert!(started.started_at.is_some());

        // A second claim on the same entry fails: it is no longer pending.
        assert!(repo.mark_in_progress(&id).is_err());
    }

    #[test]
    fn mark_failed_records_error_and_increments_retry_count() {
        let repo = repo();

        let entry = AnalysisQueueEntry::new(AnalysisKind::Instrument, "MSFT", PRIORITY_DEFAULT, false);
        let id = entry.id.clone();
        repo.enqueue(entry).unwrap();
        repo.mark_in_progress(&id).unwrap();
        repo.mark_failed(&id, "provider timeout").unwrap();

        assert_eq!(
            repo.count_consecutive_failures(AnalysisKind::Instrument, "MSFT")
                .unwrap(),
            1
        );
    }

    #[test]
    fn consecutive_failures_reset_at_the_most_recent_completion() {
        let repo = repo();

        let run = |error: Option<&str>| {
            let entry =
                AnalysisQueueEntry::new(AnalysisKind::Instrument, "INTC", PRIORITY_DEFAULT, false);
            let id = entry.id.clone();
            repo.enqueue(entry).unwrap();
            repo.mark_in_progress(&id).unwrap();
            match error {
                Some(e) => repo.mark_failed(&id, e).unwrap(),
                None => repo.mark_completed(&id).unwrap(),
            }
            // Terminal ordering is by completed_at; keep the stamps distinct.
            std::thread::sleep(std::time::Duration::from_millis(5));
        };

        run(Some("boom"));
        run(Some("boom"));
        run(None);
        run(Some("boom"));

        assert_eq!(
            repo.count_consecutive_failures(AnalysisKind::Instrument, "INTC")
                .unwrap(),
            1
        );
    }
}
