//! Integration tests for the artifact store: path resolution, provisioning,
//! records, promotion, and catalog listings.

use salescast_core::{Error, ExperimentParams, MetricsRow, RegressionMetrics};
use salescast_store::deploy::missing_at_destination;
use salescast_store::{deploy, list_executions, list_experiments};
use salescast_store::{deployment_description, ExperimentPaths, ExperimentRecord};
use std::fs;
use std::path::Path;

fn sample_params() -> ExperimentParams {
    ExperimentParams::from_json_str(
        r#"{
            "name": "daily-sales",
            "description": "baseline linear model",
            "model_type": "linear",
            "id": "date",
            "target": "sales",
            "features": ["dcoilwtico", "day_of_week", "onpromotion"],
            "model_params": {
                "train_start_dt": "2017-01-01",
                "train_end_dt": "2017-06-30",
                "validation_start_dt": "2017-07-01",
                "validation_end_dt": "2017-07-31"
            }
        }"#,
    )
    .unwrap()
}

fn sample_metrics() -> RegressionMetrics {
    RegressionMetrics {
        mean_absolute_error: 1.5,
        root_mean_squared_error: 2.0,
        r2: 0.9,
        root_mean_squared_log_error: 0.1,
        mean_absolute_percentage_error: 0.05,
    }
}

fn write_fake_artifacts(dir: &Path) {
    fs::create_dir_all(dir.join("models")).unwrap();
    fs::create_dir_all(dir.join("plots")).unwrap();
    fs::write(dir.join("models/model.json"), b"{}").unwrap();
    fs::write(dir.join("plots/train_plot.png"), b"png").unwrap();
    fs::write(dir.join("experiment_params.json"), b"{}").unwrap();
}

// ===========================================================================
// Path resolution
// ===========================================================================

#[test]
fn resolve_is_deterministic() {
    let a = ExperimentPaths::resolve("/proj", "run1", "abc123");
    let b = ExperimentPaths::resolve("/proj", "run1", "abc123");
    assert_eq!(a, b);
}

#[test]
fn resolve_produces_fixed_layout() {
    let paths = ExperimentPaths::resolve("/proj", "run1", "abc123");
    assert_eq!(
        paths.experiment_dir,
        Path::new("/proj/experiments/run1/abc123")
    );
    assert_eq!(
        paths.model_dir,
        Path::new("/proj/experiments/run1/abc123/models")
    );
    assert_eq!(
        paths.plots_dir,
        Path::new("/proj/experiments/run1/abc123/plots")
    );
    assert_eq!(paths.logs_dir, Path::new("/proj/logs/run1/abc123"));
    assert_eq!(paths.deployed_dir, Path::new("/proj/deployed_models"));
}

#[test]
fn deployed_slot_is_independent_of_experiment() {
    let a = ExperimentPaths::resolve("/proj", "run1", "abc");
    let b = ExperimentPaths::resolve("/proj", "run2", "def");
    assert_eq!(a.deployed_dir, b.deployed_dir);
    assert_eq!(ExperimentPaths::deployed_slot("/proj"), a.deployed_dir);
}

#[test]
fn provision_is_idempotent() {
    let tmp = tempfile::tempdir().unwrap();
    let paths = ExperimentPaths::resolve(tmp.path(), "run1", "exp1");
    paths.provision().unwrap();
    paths.provision().unwrap();
    assert!(paths.experiment_dir.is_dir());
    assert!(paths.model_dir.is_dir());
    assert!(paths.plots_dir.is_dir());
    assert!(paths.logs_dir.is_dir());
    assert!(paths.deployed_dir.is_dir());
}

// ===========================================================================
// Experiment record
// ===========================================================================

#[test]
fn params_round_trip_preserves_all_keys() {
    let tmp = tempfile::tempdir().unwrap();
    let record = ExperimentRecord::at(tmp.path());
    let params = sample_params();
    record.write_params(&params).unwrap();
    let back = record.read_params().unwrap();
    assert_eq!(params, back);
    assert_eq!(
        back.features,
        vec!["dcoilwtico", "day_of_week", "onpromotion"]
    );
}

#[test]
fn extra_params_keys_survive_round_trip() {
    let tmp = tempfile::tempdir().unwrap();
    let record = ExperimentRecord::at(tmp.path());
    let mut params = sample_params();
    params
        .extra
        .insert("notes".to_string(), serde_json::json!("tuned by hand"));
    record.write_params(&params).unwrap();
    let back = record.read_params().unwrap();
    assert_eq!(back.extra.get("notes"), Some(&serde_json::json!("tuned by hand")));
}

#[test]
fn read_params_missing_is_not_found() {
    let tmp = tempfile::tempdir().unwrap();
    let record = ExperimentRecord::at(tmp.path());
    assert!(matches!(record.read_params(), Err(Error::NotFound(_))));
}

#[test]
fn metrics_round_trip() {
    let tmp = tempfile::tempdir().unwrap();
    let record = ExperimentRecord::at(tmp.path());
    let row = MetricsRow::new("exp", "desc", sample_metrics(), sample_metrics());
    record.write_metrics(&row).unwrap();
    let back = record.read_metrics().unwrap();
    assert_eq!(row, back);
}

#[test]
fn metrics_header_uses_train_valid_columns() {
    let tmp = tempfile::tempdir().unwrap();
    let record = ExperimentRecord::at(tmp.path());
    let row = MetricsRow::new("exp", "desc", sample_metrics(), sample_metrics());
    record.write_metrics(&row).unwrap();
    let raw = fs::read_to_string(record.metrics_file()).unwrap();
    let header = raw.lines().next().unwrap();
    assert_eq!(
        header,
        "EXPERIMENT_NAME,EXPERIMENT_DESC,TRAIN_MAE,TRAIN_RMSE,TRAIN_R2,TRAIN_RMSLE,TRAIN_MAPE,\
         VALID_MAE,VALID_RMSE,VALID_R2,VALID_RMSLE,VALID_MAPE"
    );
}

#[test]
fn missing_metrics_is_not_found_even_when_directory_exists() {
    let tmp = tempfile::tempdir().unwrap();
    let paths = ExperimentPaths::resolve(tmp.path(), "run1", "exp1");
    paths.provision().unwrap();
    let record = ExperimentRecord::for_experiment(tmp.path(), "run1", "exp1");
    assert!(matches!(record.read_metrics(), Err(Error::NotFound(_))));
}

#[test]
fn provisioned_but_untrained_record_is_incomplete() {
    let tmp = tempfile::tempdir().unwrap();
    let paths = ExperimentPaths::resolve(tmp.path(), "run1", "exp1");
    paths.provision().unwrap();
    let record = ExperimentRecord::for_experiment(tmp.path(), "run1", "exp1");
    assert!(!record.is_complete());
    record.write_params(&sample_params()).unwrap();
    assert!(record.is_complete());
}

// ===========================================================================
// Promotion
// ===========================================================================

#[test]
fn deploy_copies_every_file_and_writes_description() {
    let tmp = tempfile::tempdir().unwrap();
    let paths = ExperimentPaths::resolve(tmp.path(), "run1", "exp1");
    paths.provision().unwrap();
    write_fake_artifacts(&paths.experiment_dir);

    let outcome = deploy(tmp.path(), "run1", "exp1", "first deploy").unwrap();
    assert!(outcome.is_success());

    let slot = ExperimentPaths::deployed_slot(tmp.path());
    assert!(slot.join("models/model.json").exists());
    assert!(slot.join("plots/train_plot.png").exists());
    assert!(slot.join("experiment_params.json").exists());
    assert_eq!(
        fs::read_to_string(slot.join("deployment_desc.txt")).unwrap(),
        "first deploy"
    );
}

#[test]
fn deploy_twice_is_idempotent() {
    let tmp = tempfile::tempdir().unwrap();
    let paths = ExperimentPaths::resolve(tmp.path(), "run1", "exp1");
    paths.provision().unwrap();
    write_fake_artifacts(&paths.experiment_dir);

    assert!(deploy(tmp.path(), "run1", "exp1", "v1").unwrap().is_success());
    assert!(deploy(tmp.path(), "run1", "exp1", "v1").unwrap().is_success());

    let slot = ExperimentPaths::deployed_slot(tmp.path());
    let entries: Vec<_> = walk_files(&slot);
    assert_eq!(
        entries,
        vec![
            "deployment_desc.txt".to_string(),
            "experiment_params.json".to_string(),
            "models/model.json".to_string(),
            "plots/train_plot.png".to_string(),
        ]
    );
}

#[test]
fn deploy_merges_and_keeps_stale_destination_files() {
    let tmp = tempfile::tempdir().unwrap();
    let paths = ExperimentPaths::resolve(tmp.path(), "run1", "exp1");
    paths.provision().unwrap();
    // Source without plots; destination pre-seeded with an unrelated model.
    fs::create_dir_all(paths.experiment_dir.join("models")).unwrap();
    fs::write(paths.experiment_dir.join("experiment_params.json"), b"{}").unwrap();
    let slot = ExperimentPaths::deployed_slot(tmp.path());
    fs::create_dir_all(slot.join("models")).unwrap();
    fs::write(slot.join("models/model.json"), b"stale").unwrap();

    let outcome = deploy(tmp.path(), "run1", "exp1", "merge").unwrap();
    assert!(outcome.is_success());
    // Merge semantics: the stale file survives.
    assert_eq!(fs::read(slot.join("models/model.json")).unwrap(), b"stale");
}

#[test]
fn validation_rejects_partial_copy() {
    let tmp = tempfile::tempdir().unwrap();
    let source = tmp.path().join("src");
    let dest = tmp.path().join("dst");
    fs::create_dir_all(source.join("models")).unwrap();
    fs::create_dir_all(&dest).unwrap();
    fs::write(source.join("experiment_params.json"), b"{}").unwrap();
    fs::write(source.join("models/model.json"), b"{}").unwrap();
    fs::write(dest.join("experiment_params.json"), b"{}").unwrap();

    let missing = missing_at_destination(&source, &dest).unwrap();
    assert_eq!(missing, vec!["models/model.json".to_string()]);
}

#[test]
fn deploy_unknown_experiment_is_not_found() {
    let tmp = tempfile::tempdir().unwrap();
    let result = deploy(tmp.path(), "run1", "nope", "desc");
    assert!(matches!(result, Err(Error::NotFound(_))));
}

// ===========================================================================
// Catalog
// ===========================================================================

#[test]
fn list_executions_and_experiments() {
    let tmp = tempfile::tempdir().unwrap();
    ExperimentPaths::resolve(tmp.path(), "run1", "a").provision().unwrap();
    ExperimentPaths::resolve(tmp.path(), "run1", "b").provision().unwrap();
    ExperimentPaths::resolve(tmp.path(), "run2", "c").provision().unwrap();

    assert_eq!(list_executions(tmp.path()).unwrap(), vec!["run1", "run2"]);
    assert_eq!(list_experiments(tmp.path(), "run1").unwrap(), vec!["a", "b"]);
    assert!(matches!(
        list_experiments(tmp.path(), "run3"),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn deployment_description_requires_a_deploy() {
    let tmp = tempfile::tempdir().unwrap();
    assert!(matches!(
        deployment_description(tmp.path()),
        Err(Error::NotFound(_))
    ));

    let paths = ExperimentPaths::resolve(tmp.path(), "run1", "exp1");
    paths.provision().unwrap();
    write_fake_artifacts(&paths.experiment_dir);
    deploy(tmp.path(), "run1", "exp1", "live model").unwrap();
    assert_eq!(deployment_description(tmp.path()).unwrap(), "live model");
}

fn walk_files(dir: &Path) -> Vec<String> {
    let mut files: Vec<String> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(dir)
                .unwrap()
                .display()
                .to_string()
        })
        .collect();
    files.sort();
    files
}
