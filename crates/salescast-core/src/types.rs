//! Core types for Salescast

use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Experiment identifier - cheaply cloneable
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct ExperimentId(Arc<str>);

impl ExperimentId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(Arc::from(s.into()))
    }

    /// Generate a fresh id. Uuid v4 carries 122 random bits, so collisions
    /// across executions are negligible.
    pub fn generate() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ExperimentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ExperimentId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for ExperimentId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Inclusive training/validation date windows for one experiment.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelParams {
    pub train_start_dt: NaiveDate,
    pub train_end_dt: NaiveDate,
    pub validation_start_dt: NaiveDate,
    pub validation_end_dt: NaiveDate,
}

/// Configuration for one experiment, supplied as JSON by the caller.
///
/// Unknown keys are carried through `extra` so the params file written next
/// to the model round-trips the caller's input.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExperimentParams {
    pub name: String,
    pub description: String,
    pub model_type: String,
    /// Name of the row-identifier column in the feature table.
    pub id: String,
    /// Name of the label column.
    pub target: String,
    /// Ordered feature column names.
    pub features: Vec<String>,
    pub model_params: ModelParams,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// The seven keys a params object must carry to be trainable.
pub const REQUIRED_PARAM_KEYS: [&str; 7] = [
    "name",
    "description",
    "model_type",
    "id",
    "target",
    "features",
    "model_params",
];

impl ExperimentParams {
    /// Parse and validate a params object. A missing or null required key
    /// makes the whole object invalid; the batch loop skips such entries.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| Error::invalid_params("params must be a JSON object"))?;
        for key in REQUIRED_PARAM_KEYS {
            match obj.get(key) {
                None | Some(serde_json::Value::Null) => {
                    return Err(Error::invalid_params(format!("missing key `{key}`")));
                }
                Some(_) => {}
            }
        }
        serde_json::from_value(value)
            .map_err(|e| Error::invalid_params(format!("malformed params: {e}")))
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| Error::invalid_params(format!("params is not valid JSON: {e}")))?;
        Self::from_value(value)
    }
}

/// Five standard regression metrics for one data split.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct RegressionMetrics {
    pub mean_absolute_error: f64,
    pub root_mean_squared_error: f64,
    pub r2: f64,
    pub root_mean_squared_log_error: f64,
    pub mean_absolute_percentage_error: f64,
}

/// One row of the per-experiment metrics file: train and validation metric
/// pairs plus the experiment's name and description.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MetricsRow {
    #[serde(rename = "EXPERIMENT_NAME")]
    pub experiment_name: String,
    #[serde(rename = "EXPERIMENT_DESC")]
    pub experiment_desc: String,
    #[serde(rename = "TRAIN_MAE")]
    pub train_mae: f64,
    #[serde(rename = "TRAIN_RMSE")]
    pub train_rmse: f64,
    #[serde(rename = "TRAIN_R2")]
    pub train_r2: f64,
    #[serde(rename = "TRAIN_RMSLE")]
    pub train_rmsle: f64,
    #[serde(rename = "TRAIN_MAPE")]
    pub train_mape: f64,
    #[serde(rename = "VALID_MAE")]
    pub valid_mae: f64,
    #[serde(rename = "VALID_RMSE")]
    pub valid_rmse: f64,
    #[serde(rename = "VALID_R2")]
    pub valid_r2: f64,
    #[serde(rename = "VALID_RMSLE")]
    pub valid_rmsle: f64,
    #[serde(rename = "VALID_MAPE")]
    pub valid_mape: f64,
}

impl MetricsRow {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        train: RegressionMetrics,
        valid: RegressionMetrics,
    ) -> Self {
        Self {
            experiment_name: name.into(),
            experiment_desc: description.into(),
            train_mae: train.mean_absolute_error,
            train_rmse: train.root_mean_squared_error,
            train_r2: train.r2,
            train_rmsle: train.root_mean_squared_log_error,
            train_mape: train.mean_absolute_percentage_error,
            valid_mae: valid.mean_absolute_error,
            valid_rmse: valid.root_mean_squared_error,
            valid_r2: valid.r2,
            valid_rmsle: valid.root_mean_squared_log_error,
            valid_mape: valid.mean_absolute_percentage_error,
        }
    }
}
