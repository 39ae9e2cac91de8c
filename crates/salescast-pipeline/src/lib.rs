//! Salescast pipeline - feature building, training, evaluation, inference.
//!
//! The artifact store (salescast-store) owns the directory layout; this
//! crate fills it: the dataset/feature builder over SQLite, the model
//! backend seam with its default least-squares implementation, the metrics
//! calculator, the plot renderer, and the two consumers of all of the
//! above - the training orchestrator and the recompute-on-read inference
//! paths.

pub mod dataset;
pub mod features;
pub mod inference;
pub mod metrics;
pub mod model;
pub mod plots;
pub mod runner;

pub use dataset::FeatureStore;
pub use features::FeatureBuilder;
pub use inference::{deployed_predictions, experiment_predictions, predict_range, PredictionsReport};
pub use model::{default_backend, LinearBackend, ModelBackend};
pub use runner::{run_batch, run_experiment, ExperimentOutcome, ProjectConfig};
