//! Read-only listings over the experiments tree and the deployed slot.

use crate::paths::{ExperimentPaths, DESCRIPTION_FILE, EXPERIMENTS_DIR};
use salescast_core::{Error, Result};
use std::fs;
use std::path::Path;

fn subdirectories(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Err(Error::not_found(format!("directory {}", dir.display())));
    }
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Names of every execution that has at least one provisioned experiment.
pub fn list_executions(root: impl AsRef<Path>) -> Result<Vec<String>> {
    subdirectories(&root.as_ref().join(EXPERIMENTS_DIR))
}

/// Experiment ids nested under one execution.
pub fn list_experiments(root: impl AsRef<Path>, execution: &str) -> Result<Vec<String>> {
    subdirectories(&root.as_ref().join(EXPERIMENTS_DIR).join(execution))
}

/// The free-text description written by the last successful promotion.
pub fn deployment_description(root: impl AsRef<Path>) -> Result<String> {
    let path = ExperimentPaths::deployed_slot(root).join(DESCRIPTION_FILE);
    if !path.exists() {
        return Err(Error::not_found("no model has been deployed".to_string()));
    }
    Ok(fs::read_to_string(path)?)
}
