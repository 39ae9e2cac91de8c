//! The model backend seam and its default least-squares implementation.
//!
//! `fit` trains on a table and persists the artifact; `predict` always
//! reloads the persisted artifact from disk. Inference never reuses an
//! in-memory handle, so a model that cannot survive serialization fails at
//! training time instead of in production.

use chrono::Utc;
use salescast_core::{DataTable, Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

pub const PREDICTED_COLUMN: &str = "predicted";

pub trait ModelBackend {
    /// Train on `table` and write the model artifact to `artifact_path` and
    /// the raw training log to `log_path`.
    fn fit(
        &self,
        table: &DataTable,
        features: &[String],
        target: &str,
        artifact_path: &Path,
        log_path: &Path,
    ) -> Result<()>;

    /// Reload the artifact at `artifact_path` and predict one value per row.
    fn predict(&self, artifact_path: &Path, table: &DataTable) -> Result<Vec<f64>>;
}

/// The backend every experiment trains with today. The `model_type` param
/// is recorded with the experiment but not dispatched on; backend selection
/// is the trainer's concern, like an AutoML library picking its own
/// estimator.
pub fn default_backend() -> LinearBackend {
    LinearBackend
}

/// Ordinary least squares with an intercept, solved by Gaussian elimination
/// over the normal equations.
pub struct LinearBackend;

/// The persisted artifact: fitted weights plus the feature order they were
/// fitted against.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LinearModel {
    pub model_type: String,
    pub features: Vec<String>,
    pub intercept: f64,
    pub weights: Vec<f64>,
}

impl LinearModel {
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::not_found(format!(
                "model artifact {}",
                path.display()
            )));
        }
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn predict(&self, table: &DataTable) -> Result<Vec<f64>> {
        let rows = table.matrix(&self.features)?;
        Ok(rows
            .iter()
            .map(|row| {
                self.intercept
                    + row
                        .iter()
                        .zip(&self.weights)
                        .map(|(x, w)| x * w)
                        .sum::<f64>()
            })
            .collect())
    }
}

impl ModelBackend for LinearBackend {
    fn fit(
        &self,
        table: &DataTable,
        features: &[String],
        target: &str,
        artifact_path: &Path,
        log_path: &Path,
    ) -> Result<()> {
        let y = table
            .column(target)
            .ok_or_else(|| Error::data(format!("missing target column `{target}`")))?;
        let rows = table.matrix(features)?;
        if rows.len() <= features.len() {
            return Err(Error::training(format!(
                "{} rows is too few to fit {} features",
                rows.len(),
                features.len()
            )));
        }

        let coefficients = fit_least_squares(&rows, y)?;
        let (intercept, weights) = coefficients.split_first().expect("intercept present");
        let model = LinearModel {
            model_type: "linear_ols".to_string(),
            features: features.to_vec(),
            intercept: *intercept,
            weights: weights.to_vec(),
        };
        model.save(artifact_path)?;

        let residual_rmse = {
            let predicted = model.predict(table)?;
            let mse = y
                .iter()
                .zip(&predicted)
                .map(|(a, p)| (a - p).powi(2))
                .sum::<f64>()
                / y.len() as f64;
            mse.sqrt()
        };
        write_training_log(log_path, table.len(), features.len(), target, residual_rmse)?;
        debug!(
            rows = table.len(),
            features = features.len(),
            residual_rmse,
            "fitted least-squares model"
        );
        Ok(())
    }

    fn predict(&self, artifact_path: &Path, table: &DataTable) -> Result<Vec<f64>> {
        LinearModel::load(artifact_path)?.predict(table)
    }
}

/// Solve `min ||Xw - y||` with an implicit leading intercept column.
/// Returns `[intercept, w_0, .., w_{k-1}]`.
fn fit_least_squares(rows: &[Vec<f64>], y: &[f64]) -> Result<Vec<f64>> {
    let k = rows.first().map(|r| r.len()).unwrap_or(0) + 1;
    // Normal equations: (X^T X) w = X^T y, with x_0 = 1 per row.
    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for (row, &target) in rows.iter().zip(y) {
        for i in 0..k {
            let xi = if i == 0 { 1.0 } else { row[i - 1] };
            xty[i] += xi * target;
            for j in 0..k {
                let xj = if j == 0 { 1.0 } else { row[j - 1] };
                xtx[i][j] += xi * xj;
            }
        }
    }
    solve(xtx, xty)
}

/// Gaussian elimination with partial pivoting.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .expect("non-empty range");
        if a[pivot][col].abs() < 1e-12 {
            return Err(Error::training(
                "singular design matrix: features are linearly dependent",
            ));
        }
        a.swap(col, pivot);
        b.swap(col, pivot);
        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }
    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Ok(x)
}

fn write_training_log(
    log_path: &Path,
    rows: usize,
    features: usize,
    target: &str,
    residual_rmse: f64,
) -> Result<()> {
    let mut writer = csv::Writer::from_path(log_path)
        .map_err(|e| Error::training(format!("cannot create training log: {e}")))?;
    writer
        .write_record(["TIMESTAMP", "ROWS", "FEATURES", "TARGET", "RESIDUAL_RMSE"])
        .and_then(|_| {
            writer.write_record([
                Utc::now().to_rfc3339(),
                rows.to_string(),
                features.to_string(),
                target.to_string(),
                residual_rmse.to_string(),
            ])
        })
        .and_then(|_| writer.flush().map_err(csv::Error::from))
        .map_err(|e| Error::training(format!("cannot write training log: {e}")))?;
    Ok(())
}
