//! Salescast HTTP services and CLI glue.
//!
//! Two thin JSON services sit on top of the artifact store and pipeline:
//! the experiment service (browsing and promotion) and the deployed-model
//! service (inference against the single deployed slot).

pub mod config;
pub mod deploy_api;
pub mod experiment_api;
pub mod state;

pub use config::ServerConfig;
pub use state::{ApiError, AppState};
