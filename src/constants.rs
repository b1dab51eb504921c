/// Page size used by the paginated snapshot retriever.
pub const SNAPSHOT_PAGE_SIZE: i64 = 1000;

/// Minimum absolute share change for a delta to be reported.
pub const MIN_SHARE_CHANGE: &str = "1000";

/// Minimum absolute percent change for a delta to be reported.
pub const MIN_PERCENT_CHANGE: &str = "0.5";

/// Fraction of deltas that must fall in one percent bucket for a changeset
/// to be treated as a systematic adjustment.
pub const NOISE_CLUSTER_RATIO: &str = "0.8";

/// Largest percent magnitude a systematic adjustment bucket may have.
pub const NOISE_MAX_MAGNITUDE: &str = "2.0";

/// Consecutive failures before an entity is quarantined.
pub const SKIP_LIST_FAILURE_THRESHOLD: i32 = 3;

/// Hours before a successful analysis of the same entity may be repeated
/// by a non-manual request.
pub const ANALYSIS_FRESHNESS_HOURS: i64 = 24;

/// Lookback window for context assembly, in days.
pub const CONTEXT_LOOKBACK_DAYS: i64 = 90;

/// Per-source row caps for context assembly.
pub const MAX_BASKET_MENTIONS: usize = 50;
pub const MAX_LEGISLATOR_TRADES: usize = 30;
pub const MAX_PRIOR_NARRATIVES: usize = 10;
pub const MAX_PRICE_POINTS: usize = 90;

/// Queue priority tiers, highest first.
pub const PRIORITY_MANUAL: i32 = 1000;
pub const PRIORITY_PORTFOLIO_HELD: i32 = 300;
pub const PRIORITY_WATCHLIST: i32 = 200;
pub const PRIORITY_DEFAULT: i32 = 100;

/// Hours after which a RUNNING job execution record is considered stale
/// and may be taken over.
pub const JOB_STALE_AFTER_HOURS: i64 = 6;

/// Job names used by the scheduler entry points.
pub const DIFF_JOB_NAME: &str = "basket_diff";
pub const ANALYSIS_JOB_NAME: &str = "entity_analysis";
