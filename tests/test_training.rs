//! End-to-end tests for the training run

use churnsight::error::ChurnError;
use churnsight::evaluation::roc_auc;
use churnsight::models::CandidateKind;
use churnsight::pipeline::{
    coerce_numeric, load_and_clean_data, run_training, run_training_with, stratified_split,
    take_labels, take_rows, FittedPipeline, TrainingConfig, TrainingEvent,
};
use churnsight::report::{TrainingSummary, EVALUATION_COLUMNS};
use polars::prelude::*;
use std::path::Path;
use tempfile::TempDir;

#[path = "common/mod.rs"]
mod common;

fn config_for(dir: &Path) -> TrainingConfig {
    TrainingConfig {
        base_dir: dir.to_path_buf(),
        output_dir: dir.to_path_buf(),
        skip_plot: true,
        ..TrainingConfig::default()
    }
}

#[test]
fn test_training_writes_all_outputs() {
    let temp_dir = TempDir::new().unwrap();
    common::write_default_dataset(temp_dir.path(), 300, 21);
    let config = config_for(temp_dir.path());

    let artifacts = run_training(&config).unwrap();

    assert_eq!(artifacts.n_rows, 300);
    assert_eq!(artifacts.test_rows, 60);
    assert_eq!(artifacts.train_rows, 240);
    assert!(artifacts.model_path.is_file());
    assert!(artifacts.report_path.is_file());
    assert!(artifacts.summary_path.is_file());
    assert!(artifacts.plot_path.is_none());
    assert_eq!(artifacts.model_path, temp_dir.path().join("models/best_model_pipeline.bin"));

    // Evaluation report: one row per candidate, fixed columns
    let report = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(artifacts.report_path.clone()))
        .unwrap()
        .finish()
        .unwrap();
    assert_eq!(report.get_column_names(), &EVALUATION_COLUMNS);
    assert_eq!(report.height(), CandidateKind::ALL.len());
    let models: Vec<String> = report
        .column("model")
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .flatten()
        .map(String::from)
        .collect();
    assert_eq!(
        models,
        vec!["LogisticRegression", "RandomForest", "GradientBoosting"]
    );

    // Best model has the highest ROC AUC, first wins ties
    let best = artifacts.best();
    for (i, r) in artifacts.outcome.results.iter().enumerate() {
        assert!(r.metrics.roc_auc <= best.metrics.roc_auc);
        if r.metrics.roc_auc == best.metrics.roc_auc {
            assert!(i >= artifacts.outcome.best_index);
        }
    }
    assert_eq!(artifacts.pipeline.model_name(), best.model.name());

    // Summary JSON names the same winner
    let json = std::fs::read_to_string(&artifacts.summary_path).unwrap();
    let summary: TrainingSummary = serde_json::from_str(&json).unwrap();
    assert_eq!(summary.best_model, best.model.name());
    assert_eq!(summary.models.len(), 3);
    assert_eq!(summary.metadata.test_rows, 60);
}

#[test]
fn test_saved_pipeline_matches_in_memory() {
    let temp_dir = TempDir::new().unwrap();
    common::write_default_dataset(temp_dir.path(), 240, 4);
    let artifacts = run_training(&config_for(temp_dir.path())).unwrap();

    let reloaded = FittedPipeline::load(&artifacts.model_path).unwrap();
    let mut frame = common::create_telco_dataframe(25, 99)
        .drop_many(["Churn", "customerID"]);
    let coerced = coerce_numeric(frame.column("TotalCharges").unwrap()).unwrap();
    frame.with_column(coerced).unwrap();

    let before = artifacts.pipeline.predict_proba(&frame).unwrap();
    let after = reloaded.predict_proba(&frame).unwrap();
    for (a, b) in before.iter().zip(&after) {
        assert!((a - b).abs() < 1e-9);
    }
    assert_eq!(
        artifacts.pipeline.predict(&frame).unwrap(),
        reloaded.predict(&frame).unwrap()
    );
}

#[test]
fn test_held_out_auc_scores_refitted_pipeline() {
    let temp_dir = TempDir::new().unwrap();
    let path = common::write_default_dataset(temp_dir.path(), 240, 13);
    let config = config_for(temp_dir.path());
    let artifacts = run_training(&config).unwrap();

    // Rebuild the held-out rows the run scored
    let cleaned = load_and_clean_data(&path, config.infer_schema_length).unwrap();
    let (features, labels) = cleaned.features_and_labels().unwrap();
    let split = stratified_split(&labels, config.test_size, config.random_state).unwrap();
    let x_test = take_rows(&features, &split.test_indices).unwrap();
    let y_test = take_labels(&labels, &split.test_indices);

    let scores = artifacts.pipeline.predict_proba(&x_test).unwrap();
    let expected = roc_auc(&y_test, &scores).unwrap();
    assert!((artifacts.held_out_roc_auc - expected).abs() < 1e-12);
    assert!((0.0..=1.0).contains(&artifacts.held_out_roc_auc));
    assert_eq!(artifacts.roc.first().map(|p| (p.fpr, p.tpr)), Some((0.0, 0.0)));
}

#[test]
fn test_training_is_deterministic() {
    let first_dir = TempDir::new().unwrap();
    let second_dir = TempDir::new().unwrap();
    common::write_default_dataset(first_dir.path(), 200, 8);
    common::write_default_dataset(second_dir.path(), 200, 8);

    let first = run_training(&config_for(first_dir.path())).unwrap();
    let second = run_training(&config_for(second_dir.path())).unwrap();

    assert_eq!(first.outcome.best_index, second.outcome.best_index);
    for (a, b) in first.outcome.results.iter().zip(&second.outcome.results) {
        assert_eq!(a.model, b.model);
        assert_eq!(a.metrics.roc_auc, b.metrics.roc_auc);
        assert_eq!(a.metrics.accuracy, b.metrics.accuracy);
    }
    assert_eq!(
        first.pipeline.selected_feature_names(),
        second.pipeline.selected_feature_names()
    );
}

#[test]
fn test_events_follow_stage_order() {
    let temp_dir = TempDir::new().unwrap();
    common::write_default_dataset(temp_dir.path(), 150, 2);

    let mut started = Vec::new();
    let mut evaluated = Vec::new();
    run_training_with(&config_for(temp_dir.path()), |event| match event {
        TrainingEvent::StageStarted(title) => started.push(title.to_string()),
        TrainingEvent::CandidateEvaluated(r) => evaluated.push(r.model),
        TrainingEvent::StageFinished(_) => {}
    })
    .unwrap();

    assert_eq!(started.first().map(String::as_str), Some("Loading dataset"));
    assert_eq!(started.last().map(String::as_str), Some("Writing artifacts"));
    assert_eq!(evaluated, CandidateKind::ALL.to_vec());
}

#[test]
fn test_missing_dataset_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let config = TrainingConfig {
        data_path: Some(temp_dir.path().join("absent.csv")),
        ..config_for(temp_dir.path())
    };

    match run_training(&config) {
        Err(ChurnError::DataNotFound { .. }) => {
            assert!(!temp_dir.path().join("models").exists());
            assert!(!temp_dir.path().join("reports").exists());
        }
        // A Downloads copy on the host machine is a legitimate hit
        Err(other) => panic!("unexpected error: {}", other),
        Ok(a) => assert!(!a.dataset_path.starts_with(temp_dir.path())),
    }
}

#[test]
fn test_single_class_dataset_fails_split() {
    let temp_dir = TempDir::new().unwrap();
    let mut df = common::create_telco_dataframe(60, 3);
    let all_no = Column::new("Churn".into(), vec!["No"; 60]);
    df.with_column(all_no).unwrap();
    common::write_csv(&mut df, &temp_dir.path().join("data/Telco_Customer_Churn_Dataset.csv"));

    let err = run_training(&config_for(temp_dir.path())).unwrap_err();
    assert!(matches!(err, ChurnError::Split(_)), "got {:?}", err);
    assert!(!temp_dir.path().join("models").exists());
}
