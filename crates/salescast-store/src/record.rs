//! Reading and writing the files that make up one experiment record.
//!
//! A record is a directory holding `experiment_params.json`,
//! `model_metrics.csv`, `models/` and `plots/`. The same layout is used for
//! the per-experiment directories and for the deployed slot, so one handle
//! type serves both.

use crate::paths::{
    ExperimentPaths, METRICS_FILE, MODELS_SUBDIR, MODEL_FILE, PARAMS_FILE,
};
use salescast_core::{Error, ExperimentParams, MetricsRow, Result};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug)]
pub struct ExperimentRecord {
    dir: PathBuf,
}

impl ExperimentRecord {
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn for_experiment(root: impl AsRef<Path>, execution: &str, experiment_id: &str) -> Self {
        let paths = ExperimentPaths::resolve(root, execution, experiment_id);
        Self::at(paths.experiment_dir)
    }

    pub fn deployed(root: impl AsRef<Path>) -> Self {
        Self::at(ExperimentPaths::deployed_slot(root))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn params_file(&self) -> PathBuf {
        self.dir.join(PARAMS_FILE)
    }

    pub fn metrics_file(&self) -> PathBuf {
        self.dir.join(METRICS_FILE)
    }

    pub fn model_file(&self) -> PathBuf {
        self.dir.join(MODELS_SUBDIR).join(MODEL_FILE)
    }

    /// A directory with a models/plots subtree but no params file is an
    /// in-progress or failed run; reporting must treat it as absent.
    pub fn is_complete(&self) -> bool {
        self.params_file().exists()
    }

    /// Persist the params object verbatim, pretty-printed. Written only
    /// after training completes, which is what marks the record complete.
    pub fn write_params(&self, params: &ExperimentParams) -> Result<()> {
        let json = serde_json::to_string_pretty(params)?;
        fs::write(self.params_file(), json)?;
        Ok(())
    }

    pub fn read_params(&self) -> Result<ExperimentParams> {
        let path = self.params_file();
        if !path.exists() {
            return Err(Error::not_found(format!(
                "experiment params file {}",
                path.display()
            )));
        }
        let raw = fs::read_to_string(&path)?;
        ExperimentParams::from_json_str(&raw)
    }

    /// Write a fresh metrics file with this run's single row.
    pub fn write_metrics(&self, row: &MetricsRow) -> Result<()> {
        let mut writer = csv::Writer::from_path(self.metrics_file())
            .map_err(|e| Error::data(format!("cannot create metrics file: {e}")))?;
        writer
            .serialize(row)
            .and_then(|_| writer.flush().map_err(csv::Error::from))
            .map_err(|e| Error::data(format!("cannot write metrics row: {e}")))?;
        Ok(())
    }

    pub fn read_metrics(&self) -> Result<MetricsRow> {
        let path = self.metrics_file();
        if !path.exists() {
            return Err(Error::not_found(format!(
                "metrics file {}",
                path.display()
            )));
        }
        let mut reader = csv::Reader::from_path(&path)
            .map_err(|e| Error::data(format!("cannot open metrics file: {e}")))?;
        let mut rows = reader.deserialize::<MetricsRow>();
        match rows.next() {
            Some(row) => row.map_err(|e| Error::data(format!("malformed metrics row: {e}"))),
            None => Err(Error::data(format!("metrics file {} is empty", path.display()))),
        }
    }
}
