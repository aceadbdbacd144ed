use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use cardiorisk_config::CardioConfig;
use cardiorisk_features::{FeatureOrder, PatientRecord};
use cardiorisk_model::ModelArtifact;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

const BLOOD_PRESSURE: [&str; 2] = ["ap_hi", "bp_diff"];

/// Synthetic cohort where hypertension (ap_hi >= 140) means disease.
fn write_dataset(path: &Path, rows: usize) {
    let mut csv = String::from("id;age;gender;height;weight;ap_hi;ap_lo;cholesterol;gluc;smoke;alco;active;cardio\n");
    for i in 0..rows {
        let age_days = 365 * (35 + (i % 30)) + (i % 200);
        let gender = 1 + (i % 2);
        let height = 155 + (i % 30);
        let weight = 55.0 + (i % 40) as f64;
        let ap_hi = 100 + (i * 7) % 80;
        let ap_lo = 65 + (i % 25);
        let cholesterol = 1 + (i % 3);
        let gluc = 1 + (i / 3) % 3;
        let smoke = u8::from(i % 5 == 0);
        let alco = u8::from(i % 7 == 0);
        let active = u8::from(i % 3 != 0);
        let cardio = u8::from(ap_hi >= 140);
        writeln!(
            csv,
            "{i};{age_days};{gender};{height};{weight:.1};{ap_hi};{ap_lo};{cholesterol};{gluc};{smoke};{alco};{active};{cardio}"
        )
        .unwrap();
    }
    // One outlier that must be filtered
    writeln!(csv, "{rows};18000;1;160;60.0;900;80;1;1;0;0;1;1").unwrap();
    std::fs::write(path, csv).unwrap();
}

fn config(dir: &Path, skip_search: bool) -> CardioConfig {
    let mut config = CardioConfig::default();
    config.artifacts.dir = dir.join("artifacts");
    config.training.dataset = dir.join("cardio_train.csv");
    config.training.epochs = 150;
    config.training.learning_rate = 0.1;
    config.training.skip_grid_search = skip_search;
    config.training.skip_explain = skip_search;
    config.validate().unwrap();
    config
}

fn temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("cardio-train-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn load(config: &CardioConfig) -> ModelArtifact {
    let a = &config.artifacts;
    ModelArtifact::from_bytes(
        &std::fs::read(a.model_path()).unwrap(),
        &std::fs::read(a.scaler_path()).unwrap(),
        &std::fs::read(a.features_path()).unwrap(),
    )
    .unwrap()
}

fn patient(ap_hi: i64) -> PatientRecord {
    PatientRecord::from_json(&json!({
        "age": 50, "gender": 1, "height": 165, "weight": 70,
        "ap_hi": ap_hi, "ap_lo": 80, "cholesterol": 1, "gluc": 1,
        "smoke": 0, "alco": 0, "active": 1
    }))
    .unwrap()
}

#[test]
fn quick_run_produces_loadable_artifacts() {
    let dir = temp_dir();
    write_dataset(&dir.join("cardio_train.csv"), 300);
    let config = config(&dir, true);

    let report = cardiorisk_train::run(&config).unwrap();

    assert_eq!(report.rows.read, 301);
    assert_eq!(report.rows.filtered, 1);
    assert_eq!(report.train_size + report.test_size, 300);
    assert!((59..=61).contains(&report.test_size), "test size {}", report.test_size);
    assert!(report.grid_search.is_none());
    assert!(report.attribution.is_none());
    assert!(report.test.accuracy > 0.85, "accuracy {}", report.test.accuracy);
    // ap_hi and bp_diff carry the same signal
    assert!(BLOOD_PRESSURE.contains(&report.coefficients[0].feature));

    let features: Vec<String> =
        serde_json::from_slice(&std::fs::read(config.artifacts.features_path()).unwrap()).unwrap();
    assert_eq!(features, FeatureOrder::canonical().names());

    let metrics: Value =
        serde_json::from_slice(&std::fs::read(config.artifacts.report_path()).unwrap()).unwrap();
    assert!(metrics["test"]["f1"].is_number());

    let artifact = load(&config);
    assert_eq!(artifact.scaler().width(), 11);
    assert_eq!(artifact.predict(&patient(170)).unwrap().prediction, 1);
    assert_eq!(artifact.predict(&patient(110)).unwrap().prediction, 0);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn full_run_searches_and_explains() {
    let dir = temp_dir();
    write_dataset(&dir.join("cardio_train.csv"), 150);
    let config = config(&dir, false);

    let report = cardiorisk_train::run(&config).unwrap();

    let grid = report.grid_search.as_ref().unwrap();
    assert_eq!(grid.len(), 9);
    assert!(report.hyperparameters.searched);
    assert_eq!(report.hyperparameters.learning_rate, grid[0].learning_rate);

    let attribution = report.attribution.as_ref().unwrap();
    assert_eq!(attribution.len(), 18);
    assert!(BLOOD_PRESSURE.contains(&attribution[0].feature));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_dataset_is_an_error() {
    let dir = temp_dir();
    let config = config(&dir, true);
    let err = cardiorisk_train::run(&config).unwrap_err();
    assert!(err.to_string().contains("Failed to open dataset"));
    let _ = std::fs::remove_dir_all(&dir);
}
