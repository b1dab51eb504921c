#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use std::sync::Arc;

    use crate::db::create_test_pool;
    use crate::queue::skip_model::{SkipAddedBy, SkipPolicy};
    use crate::queue::skip_repository::{SkipListRepository, SkipListRepositoryTrait};
    use crate::queue::skip_service::{SkipListService, SkipListServiceTrait};

    fn service() -> SkipListService {
        SkipListService::new(Arc::new(SkipListRepository::new(create_test_pool())))
    }

    #[test]
    fn below_threshold_failures_do_not_quarantine() {
        let service = service();
        let now = Utc::now();

        assert!(service
            .record_failure("BADCO", "timeout", 1, now)
            .unwrap()
            .is_none());
        assert!(service
            .record_failure("BADCO", "timeout", 2, now)
            .unwrap()
            .is_none());
        assert!(!service.is_skipped("BADCO", now).unwrap());
    }

    #[test]
    fn third_consecutive_failure_quarantines_forever() {
        let service = service();
        let now = Utc::now();

        let entry = service
            .record_failure("BADCO", "malformed payload", 3, now)
            .unwrap()
            .expect("threshold reached");

        assert_eq!(entry.failure_count, 3);
        assert_eq!(entry.policy, SkipPolicy::Forever);
        assert_eq!(entry.added_by, SkipAddedBy::System);
        assert!(service.is_skipped("BADCO", now).unwrap());
        assert!(service.is_skipped("BADCO", now + Duration::days(365)).unwrap());
    }

    #[test]
    fn further_failures_refresh_the_existing_entry() {
        let service = service();
        let now = Utc::now();

        service.record_failure("BADCO", "first", 3, now).unwrap();
        let later = now + Duration::hours(1);
        let refreshed = service
            .record_failure("BADCO", "second", 4, later)
            .unwrap()
            .expect("still quarantined");

        assert_eq!(refreshed.failure_count, 4);
        assert_eq!(refreshed.reason, "second");
        assert_eq!(service.all_entries().unwrap().len(), 1);
    }

    #[test]
    fn until_policy_expires_on_its_own() {
        let pool = create_test_pool();
        let repo = Arc::new(SkipListRepository::new(pool));
        let service = SkipListService::new(repo.clone());
        let now = Utc::now();

        // Operator-entered timed quarantine.
        let entry = crate::queue::skip_model::SkipListEntry {
            entity_key: "PAUSED".to_string(),
            reason: "pending corporate action".to_string(),
            failure_count: 0,
            first_failed_at: now,
            last_failed_at: now,
            policy: SkipPolicy::Until(now + Duration::days(7)),
            added_by: SkipAddedBy::Operator("ops".to_string()),
            notes: None,
            created_at: now,
            updated_at: now,
        };
        repo.upsert(entry).unwrap();

        assert!(service.is_skipped("PAUSED", now).unwrap());
        assert!(service
            .is_skipped("PAUSED", now + Duration::days(6))
            .unwrap());
        assert!(!service
            .is_skipped("PAUSED", now + Duration::days(8))
            .unwrap());
    }

    #[test]
    fn clear_lifts_the_quarantine() {
        let service = service();
        let now = Utc::now();

        service.record_failure("BADCO", "boom", 3, now).unwrap();
        assert!(service.is_skipped("BADCO", now).unwrap());

        service.clear("BADCO").unwrap();
        assert!(!service.is_skipped("BADCO", now).unwrap());
        assert!(service.all_entries().unwrap().is_empty());
    }

    #[test]
    fn unknown_key_is_never_skipped() {
        let service = service();
        assert!(!service.is_skipped("UNKNOWN", Utc::now()).unwrap());
    }
}
