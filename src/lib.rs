pub mod db;

pub mod analysis;
pub mod diff;
pub mod jobs;
pub mod queue;
pub mod snapshots;

pub mod constants;
pub mod errors;
pub mod schema;

pub use errors::{Error, Result};
pub use jobs::{AnalysisJobService, DiffJobService};
