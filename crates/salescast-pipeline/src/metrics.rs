//! Regression metrics over ground truth and predicted series.

use salescast_core::{Error, RegressionMetrics, Result};

/// Compute the five standard regression metrics for one split.
pub fn regression_metrics(actual: &[f64], predicted: &[f64]) -> Result<RegressionMetrics> {
    if actual.len() != predicted.len() || actual.is_empty() {
        return Err(Error::data(
            "actual and predicted series must have the same non-zero length",
        ));
    }
    Ok(RegressionMetrics {
        mean_absolute_error: mae(actual, predicted),
        root_mean_squared_error: mse(actual, predicted).sqrt(),
        r2: r2(actual, predicted),
        root_mean_squared_log_error: msle(actual, predicted).sqrt(),
        mean_absolute_percentage_error: mape(actual, predicted),
    })
}

fn mae(actual: &[f64], predicted: &[f64]) -> f64 {
    mean(actual.iter().zip(predicted).map(|(a, p)| (a - p).abs()))
}

fn mse(actual: &[f64], predicted: &[f64]) -> f64 {
    mean(actual.iter().zip(predicted).map(|(a, p)| (a - p).powi(2)))
}

fn r2(actual: &[f64], predicted: &[f64]) -> f64 {
    let actual_mean = mean(actual.iter().copied());
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    let ss_tot: f64 = actual.iter().map(|a| (a - actual_mean).powi(2)).sum();
    if ss_tot == 0.0 {
        // Constant target: perfect predictions score 1, everything else 0.
        if ss_res == 0.0 {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - ss_res / ss_tot
    }
}

/// Mean squared log error over ln(1+x). Negative values are clamped to
/// zero so a model that undershoots into negatives still gets a score.
fn msle(actual: &[f64], predicted: &[f64]) -> f64 {
    mean(
        actual
            .iter()
            .zip(predicted)
            .map(|(a, p)| (a.max(0.0).ln_1p() - p.max(0.0).ln_1p()).powi(2)),
    )
}

fn mape(actual: &[f64], predicted: &[f64]) -> f64 {
    mean(
        actual
            .iter()
            .zip(predicted)
            .map(|(a, p)| (a - p).abs() / a.abs().max(f64::EPSILON)),
    )
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in values {
        sum += v;
        count += 1;
    }
    sum / count as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn perfect_predictions() {
        let actual = [1.0, 2.0, 3.0];
        let m = regression_metrics(&actual, &actual).unwrap();
        assert!(close(m.mean_absolute_error, 0.0));
        assert!(close(m.root_mean_squared_error, 0.0));
        assert!(close(m.r2, 1.0));
        assert!(close(m.root_mean_squared_log_error, 0.0));
        assert!(close(m.mean_absolute_percentage_error, 0.0));
    }

    #[test]
    fn hand_computed_values() {
        let actual = [2.0, 4.0, 6.0];
        let predicted = [1.0, 4.0, 8.0];
        let m = regression_metrics(&actual, &predicted).unwrap();
        assert!(close(m.mean_absolute_error, 1.0));
        // mse = (1 + 0 + 4) / 3
        assert!(close(m.root_mean_squared_error, (5.0_f64 / 3.0).sqrt()));
        // ss_res = 5, ss_tot = 8
        assert!(close(m.r2, 1.0 - 5.0 / 8.0));
        // mape = (0.5 + 0 + 1/3) / 3
        assert!(close(m.mean_absolute_percentage_error, (0.5 + 1.0 / 3.0) / 3.0));
    }

    #[test]
    fn rmsle_clamps_negatives() {
        let actual = [1.0];
        let predicted = [-5.0];
        let m = regression_metrics(&actual, &predicted).unwrap();
        // ln1p(1) vs ln1p(0)
        assert!(close(m.root_mean_squared_log_error, 2.0_f64.ln()));
    }

    #[test]
    fn length_mismatch_is_an_error() {
        assert!(regression_metrics(&[1.0], &[1.0, 2.0]).is_err());
        assert!(regression_metrics(&[], &[]).is_err());
    }
}
