//! Path resolution and provisioning for experiment artifact trees.

use salescast_core::Result;
use std::fs;
use std::path::{Path, PathBuf};

pub const EXPERIMENTS_DIR: &str = "experiments";
pub const LOGS_DIR: &str = "logs";
pub const DEPLOYED_DIR: &str = "deployed_models";
pub const MODELS_SUBDIR: &str = "models";
pub const PLOTS_SUBDIR: &str = "plots";

pub const PARAMS_FILE: &str = "experiment_params.json";
pub const METRICS_FILE: &str = "model_metrics.csv";
pub const DESCRIPTION_FILE: &str = "deployment_desc.txt";
pub const MODEL_FILE: &str = "model.json";
pub const TRAINING_LOG_FILE: &str = "training_log.csv";
pub const TRAIN_PLOT_FILE: &str = "train_plot.png";
pub const VALID_PLOT_FILE: &str = "valid_plot.png";

/// The directory bundle for one (execution, experiment) pair.
///
/// Resolution is pure: the same inputs always yield the same bundle, which
/// is what makes repeated provisioning and promotion checks cheap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExperimentPaths {
    pub experiment_dir: PathBuf,
    pub model_dir: PathBuf,
    pub plots_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub deployed_dir: PathBuf,
}

impl ExperimentPaths {
    pub fn resolve(root: impl AsRef<Path>, execution: &str, experiment_id: &str) -> Self {
        let root = root.as_ref();
        let experiment_dir = root.join(EXPERIMENTS_DIR).join(execution).join(experiment_id);
        Self {
            model_dir: experiment_dir.join(MODELS_SUBDIR),
            plots_dir: experiment_dir.join(PLOTS_SUBDIR),
            logs_dir: root.join(LOGS_DIR).join(execution).join(experiment_id),
            deployed_dir: root.join(DEPLOYED_DIR),
            experiment_dir,
        }
    }

    /// The fixed deployed slot for a project root, independent of any
    /// execution or experiment.
    pub fn deployed_slot(root: impl AsRef<Path>) -> PathBuf {
        root.as_ref().join(DEPLOYED_DIR)
    }

    /// Create every directory in the bundle. Existing directories are a
    /// no-op, so repeated provisioning for the same id is safe; parents are
    /// created before children.
    pub fn provision(&self) -> Result<()> {
        for dir in [
            &self.experiment_dir,
            &self.model_dir,
            &self.plots_dir,
            &self.logs_dir,
            &self.deployed_dir,
        ] {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    pub fn params_file(&self) -> PathBuf {
        self.experiment_dir.join(PARAMS_FILE)
    }

    pub fn metrics_file(&self) -> PathBuf {
        self.experiment_dir.join(METRICS_FILE)
    }

    pub fn model_file(&self) -> PathBuf {
        self.model_dir.join(MODEL_FILE)
    }

    pub fn training_log_file(&self) -> PathBuf {
        self.logs_dir.join(TRAINING_LOG_FILE)
    }

    pub fn train_plot_file(&self) -> PathBuf {
        self.plots_dir.join(TRAIN_PLOT_FILE)
    }

    pub fn valid_plot_file(&self) -> PathBuf {
        self.plots_dir.join(VALID_PLOT_FILE)
    }
}
