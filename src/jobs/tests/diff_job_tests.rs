#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    use crate::db::create_test_pool;
    use crate::diff::DiffService;
    use crate::jobs::diff_job::DiffJobService;
    use crate::jobs::jobs_repository::{JobExecutionRepository, JobExecutionRepositoryTrait};
    use crate::queue::queue_repository::{QueueRepository, QueueRepositoryTrait};
    use crate::queue::skip_repository::SkipListRepository;
    use crate::queue::skip_service::SkipListService;
    use crate::diff::BasketChangeReport;
    use crate::queue::{
        AnalysisKind, AnalysisUniverse, EnqueueOutcome, PopulationSummary, QueueService,
        QueueServiceTrait,
    };
    use crate::snapshots::{HoldingsSnapshot, SnapshotRepository, SnapshotRepositoryTrait};

    struct Fixture {
        guard: Arc<JobExecutionRepository>,
        snapshots: Arc<SnapshotRepository>,
        queue_repo: Arc<QueueRepository>,
        job: DiffJobService,
    }

    fn fixture() -> Fixture {
        let pool = create_test_pool();
        let guard = Arc::new(JobExecutionRepository::new(pool.clone()));
        let snapshots = Arc::new(SnapshotRepository::new(pool.clone()));
        let queue_repo = Arc::new(QueueRepository::new(pool.clone()));
        let skip_service = Arc::new(SkipListService::new(Arc::new(SkipListRepository::new(
            pool.clone(),
        ))));
        let results = Arc::new(crate::analysis::AnalysisResultRepository::new(pool));
        let queue_service = Arc::new(QueueService::new(
            queue_repo.clone(),
            skip_service,
            results,
        ));
        let diff = Arc::new(DiffService::new(snapshots.clone()));
        let job = DiffJobService::new(guard.clone(), snapshots.clone(), diff, queue_service);
        Fixture {
            guard,
            snapshots,
            queue_repo,
            job,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, d).unwrap()
    }

    fn seed(f: &Fixture, basket: &str, as_of: NaiveDate, holdings: &[(&str, Decimal)]) {
        let rows: Vec<HoldingsSnapshot> = holdings
            .iter()
            .map(|(symbol, shares)| {
                HoldingsSnapshot::new(basket, as_of, symbol, &format!("{} Inc", symbol), *shares)
            })
            .collect();
        f.snapshots.save_snapshots(&rows).unwrap();
    }

    #[test]
    fn diff_job_populates_the_queue_from_significant_changes() {
        let f = fixture();

        seed(
            &f,
            "ARKK",
            day(23),
            &[("NVDA", dec!(10000)), ("TSLA", dec!(5000))],
        );
        seed(
            &f,
            "ARKK",
            day(24),
            &[("NVDA", dec!(16000)), ("TSLA", dec!(5000))],
        );

        let summary = f
            .job
            .run(day(24), &AnalysisUniverse::default())
            .unwrap()
            .expect("run should not be skipped");

        assert_eq!(summary.baskets_seen, 1);
        assert_eq!(summary.baskets_diffed, 1);
        assert_eq!(summary.baskets_failed, 0);
        // One basket-group entry plus the NVDA instrument entry; the
        // unchanged TSLA row produces nothing.
        assert_eq!(summary.entries_enqueued, 2);
        assert!(f
            .queue_repo
            .find_active(AnalysisKind::Instrument, "NVDA")
            .unwrap()
            .is_some());
        assert!(f
            .queue_repo
            .find_active(AnalysisKind::Instrument, "TSLA")
            .unwrap()
            .is_none());
        assert!(f
            .queue_repo
            .find_active(AnalysisKind::BasketGroup, "ARKK@2026-08-24")
            .unwrap()
            .is_some());
    }

    #[test]
    fn first_observation_day_diffs_nothing() {
        let f = fixture();

        seed(&f, "ARKK", day(24), &[("NVDA", dec!(10000))]);

        let summary = f
            .job
            .run(day(24), &AnalysisUniverse::default())
            .unwrap()
            .unwrap();

        assert_eq!(summary.baskets_seen, 1);
        assert_eq!(summary.baskets_without_history, 1);
        assert_eq!(summary.entries_enqueued, 0);
    }

    #[test]
    fn rerun_on_the_same_date_does_not_duplicate_queue_entries() {
        let f = fixture();

        seed(&f, "ARKK", day(23), &[("NVDA", dec!(10000))]);
        seed(&f, "ARKK", day(24), &[("NVDA", dec!(16000))]);

        f.job.run(day(24), &AnalysisUniverse::default()).unwrap();
        let second = f
            .job
            .run(day(24), &AnalysisUniverse::default())
            .unwrap()
            .unwrap();

        assert_eq!(second.entries_enqueued, 0);
        assert_eq!(f.queue_repo.pending_count().unwrap(), 2);
    }

    #[test]
    fn concurrent_run_for_the_same_date_is_skipped() {
        let f = fixture();

        // Hold the slot open as if another worker were mid-run.
        let outcome = f.guard.try_begin("basket_diff", day(24), "all").unwrap();
        assert!(matches!(
            outcome,
            crate::jobs::jobs_model::GuardOutcome::Started(_)
        ));

        let result = f.job.run(day(24), &AnalysisUniverse::default()).unwrap();
        assert!(result.is_none());
    }

    struct UnavailableQueueService;

    impl QueueServiceTrait for UnavailableQueueService {
        fn request_manual(
            &self,
            _kind: AnalysisKind,
            _target_key: &str,
        ) -> crate::errors::Result<EnqueueOutcome> {
            unimplemented!("not used by diff job tests")
        }

        fn populate_from_report(
            &self,
            _report: &BasketChangeReport,
            _universe: &AnalysisUniverse,
            _now: chrono::DateTime<chrono::Utc>,
        ) -> crate::errors::Result<PopulationSummary> {
            Err(crate::errors::Error::Unexpected(
                "queue backend unavailable".to_string(),
            ))
        }
    }

    #[test]
    fn population_failure_is_isolated_per_basket() {
        let pool = create_test_pool();
        let guard = Arc::new(JobExecutionRepository::new(pool.clone()));
        let snapshots = Arc::new(SnapshotRepository::new(pool));
        let diff = Arc::new(DiffService::new(snapshots.clone()));
        let job = DiffJobService::new(
            guard.clone(),
            snapshots.clone(),
            diff,
            Arc::new(UnavailableQueueService),
        );

        let seed_direct = |as_of: NaiveDate, shares: Decimal| {
            snapshots
                .save_snapshots(&[HoldingsSnapshot::new(
                    "ARKK", as_of, "NVDA", "NVDA Inc", shares,
                )])
                .unwrap();
        };
        seed_direct(day(23), dec!(10000));
        seed_direct(day(24), dec!(16000));

        let summary = job
            .run(day(24), &AnalysisUniverse::default())
            .unwrap()
            .expect("run should not be skipped");

        assert_eq!(summary.baskets_diffed, 1);
        assert_eq!(summary.baskets_failed, 1);
        assert_eq!(summary.entries_enqueued, 0);

        // The run itself still closes as a success.
        let recent = guard.recent_for_job("basket_diff", 1).unwrap();
        assert_eq!(
            recent[0].status,
            crate::jobs::jobs_model::JobStatus::Success
        );
    }

    #[test]
    fn empty_date_completes_with_nothing_to_do() {
        let f = fixture();

        let summary = f
            .job
            .run(day(24), &AnalysisUniverse::default())
            .unwrap()
            .unwrap();

        assert_eq!(summary.baskets_seen, 0);
        assert_eq!(summary.entries_enqueued, 0);
    }
}
