//! Salescast artifact store - directory-addressed experiment records.
//!
//! Every experiment gets an isolated directory tree under
//! `<root>/experiments/<execution>/<id>`; promotion copies one experiment's
//! tree into the single `<root>/deployed_models` slot.

pub mod catalog;
pub mod deploy;
pub mod paths;
pub mod record;

pub use catalog::{deployment_description, list_executions, list_experiments};
pub use deploy::{deploy, DeployOutcome};
pub use paths::ExperimentPaths;
pub use record::ExperimentRecord;
