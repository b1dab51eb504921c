pub mod diff_engine;
pub mod diff_errors;
pub mod diff_model;
pub mod diff_service;
pub mod noise_classifier;
pub mod significance;

// Re-export the main public entry points and types
pub use diff_engine::DiffEngine;
pub use diff_errors::{DiffError, Result};
pub use diff_model::{BasketChangeReport, ChangesetClass, DeltaKind, HoldingsDelta};
pub use diff_service::{DiffService, DiffServiceTrait};
pub use noise_classifier::{NoiseClassifier, NoiseConfig};
pub use significance::{SignificanceConfig, SignificanceFilter};

#[cfg(test)]
pub(crate) mod tests;
