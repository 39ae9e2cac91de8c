//! Promotion of one experiment's artifact tree into the deployed slot.

use crate::paths::{ExperimentPaths, DESCRIPTION_FILE};
use salescast_core::{Error, Result};
use std::fs;
use std::path::Path;
use tracing::{info, warn};
use walkdir::WalkDir;

/// Result of a promotion attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeployOutcome {
    Success,
    /// Validation found source files missing at the destination. The partial
    /// copy is left in place for operator inspection; nothing is rolled back.
    Failed { missing: Vec<String> },
}

impl DeployOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Copy the experiment tree into the deployed slot and verify the copy.
///
/// The copy is an accumulating merge: same-named destination files are
/// overwritten, but files left behind by an earlier deployment are never
/// removed. With a single deployed slot that is arguably a bug (stale
/// artifacts can outlive the model they belong to); it is kept deliberately
/// because downstream readers may rely on it. Re-running with the same
/// source is idempotent.
pub fn deploy(
    root: impl AsRef<Path>,
    execution: &str,
    experiment_id: &str,
    description: &str,
) -> Result<DeployOutcome> {
    let paths = ExperimentPaths::resolve(&root, execution, experiment_id);
    let source = &paths.experiment_dir;
    let dest = &paths.deployed_dir;

    if !source.is_dir() {
        return Err(Error::not_found(format!(
            "experiment directory {}",
            source.display()
        )));
    }

    copy_tree(source, dest).map_err(|e| {
        Error::deploy_failed(
            source.display().to_string(),
            dest.display().to_string(),
            e.to_string(),
        )
    })?;

    let missing = missing_at_destination(source, dest)?;
    if !missing.is_empty() {
        warn!(
            source = %source.display(),
            dest = %dest.display(),
            ?missing,
            "deployment validation failed"
        );
        return Ok(DeployOutcome::Failed { missing });
    }

    fs::write(dest.join(DESCRIPTION_FILE), description)?;
    info!(
        execution,
        experiment_id,
        dest = %dest.display(),
        "experiment promoted to deployed slot"
    );
    Ok(DeployOutcome::Success)
}

/// Recursively copy every file under `source` into `dest`, creating
/// destination subdirectories as needed and overwriting same-named files.
pub fn copy_tree(source: &Path, dest: &Path) -> Result<()> {
    for entry in WalkDir::new(source) {
        let entry = entry.map_err(|e| Error::data(format!("walk failed: {e}")))?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| Error::data(format!("path outside source tree: {e}")))?;
        let target = dest.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Relative paths of source files without a same-named destination file.
/// Existence only; contents are not compared.
pub fn missing_at_destination(source: &Path, dest: &Path) -> Result<Vec<String>> {
    let mut missing = Vec::new();
    for entry in WalkDir::new(source) {
        let entry = entry.map_err(|e| Error::data(format!("walk failed: {e}")))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| Error::data(format!("path outside source tree: {e}")))?;
        if !dest.join(relative).exists() {
            missing.push(relative.display().to_string());
        }
    }
    Ok(missing)
}
