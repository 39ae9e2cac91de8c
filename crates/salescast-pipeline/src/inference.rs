//! Serving-side prediction paths.
//!
//! These are recompute-on-read: every call rebuilds the feature tables from
//! the experiment's stored date ranges and reloads the persisted artifact.
//! Nothing is cached, so reads pay the full feature+inference cost in
//! exchange for always reflecting what is on disk.

use crate::features::FeatureBuilder;
use crate::model::{default_backend, ModelBackend, PREDICTED_COLUMN};
use crate::runner::ProjectConfig;
use crate::FeatureStore;
use chrono::NaiveDate;
use salescast_core::{DataTable, Error, ExperimentParams, Result};
use salescast_store::ExperimentRecord;
use serde::Serialize;
use serde_json::{json, Value};

/// Train and validation predictions projected to
/// `[id column, target, predicted]` rows.
#[derive(Debug, Serialize)]
pub struct PredictionsReport {
    pub train: Vec<Value>,
    pub valid: Vec<Value>,
}

/// Predictions for one stored experiment.
pub fn experiment_predictions(
    config: &ProjectConfig,
    execution: &str,
    experiment_id: &str,
) -> Result<PredictionsReport> {
    let record = ExperimentRecord::for_experiment(&config.root, execution, experiment_id);
    record_predictions(config, &record)
}

/// Predictions for the deployed slot.
pub fn deployed_predictions(config: &ProjectConfig) -> Result<PredictionsReport> {
    let record = ExperimentRecord::deployed(&config.root);
    record_predictions(config, &record)
}

fn record_predictions(
    config: &ProjectConfig,
    record: &ExperimentRecord,
) -> Result<PredictionsReport> {
    let params = record.read_params()?;
    let builder = builder_for(config)?;
    let (train, valid) = builder.model_tables(&params.model_params)?;

    let backend = default_backend();
    let model_file = record.model_file();
    let train_predicted = backend.predict(&model_file, &train)?;
    let valid_predicted = backend.predict(&model_file, &valid)?;

    Ok(PredictionsReport {
        train: project_rows(&train, &params, &train_predicted)?,
        valid: project_rows(&valid, &params, &valid_predicted)?,
    })
}

/// Run the deployed model over an inference window. A missing end date
/// means a single-day prediction.
pub fn predict_range(
    config: &ProjectConfig,
    start: NaiveDate,
    end: Option<NaiveDate>,
) -> Result<Vec<Value>> {
    let end = end.unwrap_or(start);
    let record = ExperimentRecord::deployed(&config.root);
    let params = record.read_params()?;

    let builder = builder_for(config)?;
    let table = builder.inference_table(start, end)?;
    let predicted = default_backend().predict(&record.model_file(), &table)?;

    Ok(table
        .dates()
        .iter()
        .zip(&predicted)
        .map(|(date, p)| {
            let mut row = serde_json::Map::new();
            row.insert(params.id.clone(), Value::String(date.to_string()));
            row.insert(PREDICTED_COLUMN.to_string(), json!(p));
            Value::Object(row)
        })
        .collect())
}

fn builder_for(config: &ProjectConfig) -> Result<FeatureBuilder> {
    let store = FeatureStore::open(&config.db_path)?;
    FeatureBuilder::from_store(&store)
}

fn project_rows(
    table: &DataTable,
    params: &ExperimentParams,
    predicted: &[f64],
) -> Result<Vec<Value>> {
    let actual = table
        .column(&params.target)
        .ok_or_else(|| Error::data(format!("missing target column `{}`", params.target)))?;
    Ok(table
        .dates()
        .iter()
        .zip(actual)
        .zip(predicted)
        .map(|((date, a), p)| {
            let mut row = serde_json::Map::new();
            row.insert(params.id.clone(), Value::String(date.to_string()));
            row.insert(params.target.clone(), json!(a));
            row.insert(PREDICTED_COLUMN.to_string(), json!(p));
            Value::Object(row)
        })
        .collect())
}
