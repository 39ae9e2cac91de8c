//! The training orchestrator: runs a batch of experiments end to end.
//!
//! A batch is driven by a YAML manifest mapping experiment names to params
//! file paths. Entries are processed in manifest order and independently;
//! a bad params file or a failed training run is logged and skipped, never
//! fatal to the batch.

use crate::features::FeatureBuilder;
use crate::metrics::regression_metrics;
use crate::model::{default_backend, ModelBackend};
use crate::plots::render_line_plot;
use crate::FeatureStore;
use salescast_core::{DataTable, Error, ExperimentId, ExperimentParams, MetricsRow, Result};
use salescast_store::{ExperimentPaths, ExperimentRecord};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

#[derive(Clone, Debug)]
pub struct ProjectConfig {
    /// Project root holding `experiments/`, `logs/` and `deployed_models/`.
    pub root: PathBuf,
    /// SQLite database with the transactions/stores/oil/holidays sources.
    pub db_path: PathBuf,
}

/// What happened to one manifest entry.
#[derive(Debug)]
pub enum ExperimentOutcome {
    Completed {
        name: String,
        id: ExperimentId,
        metrics: MetricsRow,
    },
    Skipped {
        name: String,
        reason: String,
    },
    Failed {
        name: String,
        error: Error,
    },
}

/// Run every experiment named in the YAML manifest at `manifest_path`.
/// Params paths in the manifest are resolved relative to the project root.
pub fn run_batch(
    config: &ProjectConfig,
    execution: &str,
    manifest_path: &Path,
) -> Result<Vec<ExperimentOutcome>> {
    let raw = fs::read_to_string(manifest_path).map_err(|e| {
        Error::Config(format!(
            "cannot read experiments manifest {}: {e}",
            manifest_path.display()
        ))
    })?;
    let manifest: serde_yaml::Mapping = serde_yaml::from_str(&raw)
        .map_err(|e| Error::Config(format!("malformed experiments manifest: {e}")))?;

    let mut outcomes = Vec::with_capacity(manifest.len());
    for (key, value) in &manifest {
        let name = key.as_str().unwrap_or("<non-string key>").to_string();
        let Some(params_path) = value.as_str() else {
            warn!(entry = %name, "manifest value is not a path, skipping");
            outcomes.push(ExperimentOutcome::Skipped {
                name,
                reason: "manifest value is not a path".to_string(),
            });
            continue;
        };

        let params = match load_params(&config.root.join(params_path)) {
            Ok(params) => params,
            Err(e) => {
                warn!(entry = %name, error = %e, "invalid experiment params, skipping");
                outcomes.push(ExperimentOutcome::Skipped {
                    name,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        info!(experiment = %params.name, "experiment executing");
        match run_experiment(config, execution, &params) {
            Ok((id, metrics)) => outcomes.push(ExperimentOutcome::Completed {
                name,
                id,
                metrics,
            }),
            Err(e) if e.is_recoverable() => {
                warn!(entry = %name, error = %e, "experiment skipped");
                outcomes.push(ExperimentOutcome::Skipped {
                    name,
                    reason: e.to_string(),
                });
            }
            Err(e) => {
                error!(entry = %name, error = %e, "experiment failed, continuing batch");
                outcomes.push(ExperimentOutcome::Failed { name, error: e });
            }
        }
    }
    Ok(outcomes)
}

fn load_params(path: &Path) -> Result<ExperimentParams> {
    if !path.exists() {
        return Err(Error::invalid_params(format!(
            "params file {} does not exist",
            path.display()
        )));
    }
    ExperimentParams::from_json_str(&fs::read_to_string(path)?)
}

/// Train one experiment end to end and persist its record.
pub fn run_experiment(
    config: &ProjectConfig,
    execution: &str,
    params: &ExperimentParams,
) -> Result<(ExperimentId, MetricsRow)> {
    let id = ExperimentId::generate();
    let paths = ExperimentPaths::resolve(&config.root, execution, id.as_str());
    paths.provision()?;

    let store = FeatureStore::open(&config.db_path)?;
    let builder = FeatureBuilder::from_store(&store)?;
    let (train, valid) = builder.model_tables(&params.model_params)?;

    let backend = default_backend();
    backend.fit(
        &train,
        &params.features,
        &params.target,
        &paths.model_file(),
        &paths.training_log_file(),
    )?;

    // Predictions go through the artifact on disk, not the fitted handle;
    // a model that does not survive serialization must fail here.
    let train_predicted = backend.predict(&paths.model_file(), &train)?;
    let valid_predicted = backend.predict(&paths.model_file(), &valid)?;

    let train_metrics = regression_metrics(
        table_target(&train, &params.target)?,
        &train_predicted,
    )?;
    let valid_metrics = regression_metrics(
        table_target(&valid, &params.target)?,
        &valid_predicted,
    )?;

    // Plot failures are diagnostic-only: log and keep the record.
    if let Err(e) = render_line_plot(
        &paths.train_plot_file(),
        &[table_target(&train, &params.target)?, &train_predicted],
    ) {
        warn!(error = %e, "train plot rendering failed");
    }
    if let Err(e) = render_line_plot(
        &paths.valid_plot_file(),
        &[table_target(&valid, &params.target)?, &valid_predicted],
    ) {
        warn!(error = %e, "validation plot rendering failed");
    }

    let row = MetricsRow::new(&params.name, &params.description, train_metrics, valid_metrics);
    let record = ExperimentRecord::at(&paths.experiment_dir);
    record.write_metrics(&row)?;
    record.write_params(params)?;

    info!(
        execution,
        id = %id,
        valid_rmse = row.valid_rmse,
        "experiment completed"
    );
    Ok((id, row))
}

fn table_target<'a>(table: &'a DataTable, target: &str) -> Result<&'a [f64]> {
    table
        .column(target)
        .ok_or_else(|| Error::data(format!("missing target column `{target}`")))
}
