//! Integration tests for split, preprocessing, selection and the fitted pipeline

use churnsight::models::CandidateKind;
use churnsight::pipeline::{
    clean_dataset, stratified_split, take_labels, take_rows, FittedPipeline, LabelVocabulary,
    PreprocessorSpec, SelectKBest, MAX_SELECTED_FEATURES,
};
use polars::prelude::*;

#[path = "common/mod.rs"]
mod common;

fn prepared(rows: usize) -> (DataFrame, Vec<i32>) {
    let raw = common::create_telco_dataframe(rows, 11);
    let cleaned = clean_dataset(raw, &LabelVocabulary::default()).unwrap();
    cleaned.features_and_labels().unwrap()
}

#[test]
fn test_column_partition_matches_telco_schema() {
    let (features, _) = prepared(50);
    let spec = PreprocessorSpec::from_frame(&features);

    assert_eq!(
        spec.numeric,
        vec!["SeniorCitizen", "tenure", "MonthlyCharges", "TotalCharges"]
    );
    assert_eq!(spec.categorical.len(), 15);
    assert!(spec.categorical.contains(&"Contract".to_string()));
}

#[test]
fn test_split_preserves_class_ratio() {
    let (_, labels) = prepared(400);
    let split = stratified_split(&labels, 0.2, 42).unwrap();

    assert_eq!(split.train_len() + split.test_len(), 400);
    assert_eq!(split.test_len(), 80);

    let positives = labels.iter().filter(|&&l| l == 1).count() as f64 / 400.0;
    let test_labels = take_labels(&labels, &split.test_indices);
    let test_positives =
        test_labels.iter().filter(|&&l| l == 1).count() as f64 / test_labels.len() as f64;
    assert!(
        (positives - test_positives).abs() < 0.02,
        "overall {:.3} vs test {:.3}",
        positives,
        test_positives
    );
}

#[test]
fn test_preprocessor_is_fitted_on_training_rows_only() {
    let (features, labels) = prepared(200);
    let split = stratified_split(&labels, 0.25, 5).unwrap();
    let x_train = take_rows(&features, &split.train_indices).unwrap();
    let x_test = take_rows(&features, &split.test_indices).unwrap();

    let spec = PreprocessorSpec::from_frame(&features);
    let preprocessor = spec.fit(&x_train).unwrap();

    let encoded_train = preprocessor.transform(&x_train).unwrap();
    let encoded_test = preprocessor.transform(&x_test).unwrap();
    assert_eq!(encoded_train.ncols(), preprocessor.n_features_out());
    assert_eq!(encoded_test.ncols(), preprocessor.n_features_out());
    assert!(encoded_test.iter().all(|v| v.is_finite()));

    // Scaled training columns are centred
    let tenure = encoded_train.column(1);
    let mean = tenure.sum() / tenure.len() as f64;
    assert!(mean.abs() < 1e-9);
}

#[test]
fn test_selector_keeps_at_most_twenty() {
    let (features, labels) = prepared(200);
    let spec = PreprocessorSpec::from_frame(&features);
    let preprocessor = spec.fit(&features).unwrap();
    let encoded = preprocessor.transform(&features).unwrap();

    let selector = SelectKBest::fit(&encoded, &labels).unwrap();
    assert!(encoded.ncols() > MAX_SELECTED_FEATURES);
    assert_eq!(selector.k, MAX_SELECTED_FEATURES);
    assert_eq!(selector.transform(&encoded).unwrap().ncols(), MAX_SELECTED_FEATURES);

    let names = selector.selected_names(&preprocessor.feature_names());
    assert!(names.iter().any(|n| n.starts_with("cat__Contract_")));
}

#[test]
fn test_fitted_pipeline_scores_unseen_rows() {
    let (features, labels) = prepared(240);
    let split = stratified_split(&labels, 0.2, 42).unwrap();
    let x_train = take_rows(&features, &split.train_indices).unwrap();
    let x_test = take_rows(&features, &split.test_indices).unwrap();
    let y_train = take_labels(&labels, &split.train_indices);

    let spec = PreprocessorSpec::from_frame(&features);
    let pipeline =
        FittedPipeline::fit(&spec, CandidateKind::LogisticRegression, 42, &x_train, &y_train)
            .unwrap();

    let predictions = pipeline.predict(&x_test).unwrap();
    let probabilities = pipeline.predict_proba(&x_test).unwrap();
    assert_eq!(predictions.len(), x_test.height());
    for (label, p) in predictions.iter().zip(&probabilities) {
        assert!((0.0..=1.0).contains(p));
        assert_eq!(*label, i32::from(*p >= 0.5));
    }
}

#[test]
fn test_unseen_category_encodes_to_zeros() {
    let (features, labels) = prepared(120);
    let spec = PreprocessorSpec::from_frame(&features);
    let pipeline =
        FittedPipeline::fit(&spec, CandidateKind::LogisticRegression, 1, &features, &labels)
            .unwrap();

    let mut record = common::sample_customer();
    record.payment_method = "Crypto".to_string();
    let frame = record.to_frame().unwrap();

    let encoded = pipeline.preprocessor().transform(&frame).unwrap();
    let names = pipeline.preprocessor().feature_names();
    for (j, name) in names.iter().enumerate() {
        if name.starts_with("cat__PaymentMethod_") {
            assert_eq!(encoded[[0, j]], 0.0, "{} should be inactive", name);
        }
    }
    assert_eq!(pipeline.predict(&frame).unwrap().len(), 1);
}
