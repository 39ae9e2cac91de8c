//! Error types for Salescast

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid experiment params: {0}")]
    InvalidParams(String),

    #[error("data error: {0}")]
    Data(String),

    #[error("training error: {0}")]
    Training(String),

    #[error("deployment failed: {source_dir} -> {dest_dir}: {reason}")]
    DeployFailed {
        source_dir: String,
        dest_dir: String,
        reason: String,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn invalid_params(reason: impl Into<String>) -> Self {
        Self::InvalidParams(reason.into())
    }

    pub fn data(message: impl Into<String>) -> Self {
        Self::Data(message.into())
    }

    pub fn training(message: impl Into<String>) -> Self {
        Self::Training(message.into())
    }

    pub fn deploy_failed(
        source_dir: impl Into<String>,
        dest_dir: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::DeployFailed {
            source_dir: source_dir.into(),
            dest_dir: dest_dir.into(),
            reason: reason.into(),
        }
    }

    /// True for errors the batch loop converts into a skip instead of a failure.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InvalidParams(_) | Self::NotFound(_))
    }
}
