//! End-to-end training run: load, split, compare candidates, refit, persist

use std::path::PathBuf;
use std::time::Instant;

use polars::prelude::DataFrame;

use super::fitted::{FittedPipeline, MODELS_DIR, MODEL_FILE_NAME};
use super::loader::{find_data_file, load_and_clean_data, DEFAULT_INFER_SCHEMA_LENGTH};
use super::preprocess::PreprocessorSpec;
use super::selection::SelectKBest;
use super::split::{stratified_split, take_labels, take_rows, DEFAULT_RANDOM_STATE, DEFAULT_TEST_SIZE};
use crate::error::{ChurnError, Result};
use crate::evaluation::{roc_auc, roc_curve, train_and_evaluate, ModelResult, RocPoint, TrainingOutcome};
use crate::models::CandidateKind;
use crate::report::{
    write_evaluation_report, write_roc_plot, write_training_summary, TrainingSummary,
    EVALUATION_REPORT_FILE, FIGURES_DIR, REPORTS_DIR, ROC_PLOT_FILE, SUMMARY_FILE,
};

/// Settings for one training run
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    pub data_path: Option<PathBuf>,
    /// Root the default dataset locations are resolved against
    pub base_dir: PathBuf,
    /// Root that receives `models/` and `reports/`
    pub output_dir: PathBuf,
    pub test_size: f64,
    pub random_state: u64,
    pub skip_plot: bool,
    pub infer_schema_length: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            base_dir: PathBuf::from("."),
            output_dir: PathBuf::from("."),
            test_size: DEFAULT_TEST_SIZE,
            random_state: DEFAULT_RANDOM_STATE,
            skip_plot: false,
            infer_schema_length: DEFAULT_INFER_SCHEMA_LENGTH,
        }
    }
}

impl TrainingConfig {
    pub fn model_path(&self) -> PathBuf {
        self.output_dir.join(MODELS_DIR).join(MODEL_FILE_NAME)
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.output_dir.join(REPORTS_DIR)
    }

    pub fn evaluation_report_path(&self) -> PathBuf {
        self.reports_dir().join(EVALUATION_REPORT_FILE)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.reports_dir().join(SUMMARY_FILE)
    }

    pub fn roc_plot_path(&self) -> PathBuf {
        self.reports_dir().join(FIGURES_DIR).join(ROC_PLOT_FILE)
    }
}

/// Progress notifications emitted while a run advances
#[derive(Debug)]
pub enum TrainingEvent<'a> {
    StageStarted(&'a str),
    StageFinished(&'a str),
    CandidateEvaluated(&'a ModelResult),
}

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct TrainingArtifacts {
    pub dataset_path: PathBuf,
    pub n_rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub dropped_rows: usize,
    pub outcome: TrainingOutcome,
    pub pipeline: FittedPipeline,
    pub roc: Vec<RocPoint>,
    /// ROC AUC of the refitted pipeline on the held-out rows
    pub held_out_roc_auc: f64,
    pub model_path: PathBuf,
    pub report_path: PathBuf,
    pub summary_path: PathBuf,
    pub plot_path: Option<PathBuf>,
}

impl TrainingArtifacts {
    pub fn best(&self) -> &ModelResult {
        self.outcome.best()
    }
}

pub fn run_training(config: &TrainingConfig) -> Result<TrainingArtifacts> {
    run_training_with(config, |_| {})
}

/// Run the full training workflow.
///
/// Nothing is written until every stage has succeeded.
pub fn run_training_with(
    config: &TrainingConfig,
    mut on_event: impl FnMut(TrainingEvent<'_>),
) -> Result<TrainingArtifacts> {
    let run_start = Instant::now();

    on_event(TrainingEvent::StageStarted("Loading dataset"));
    let dataset_path = find_data_file(config.data_path.as_deref(), &config.base_dir)?;
    let cleaned = load_and_clean_data(&dataset_path, config.infer_schema_length)?;
    let (features, labels) = cleaned.features_and_labels()?;
    on_event(TrainingEvent::StageFinished("Dataset loaded"));

    on_event(TrainingEvent::StageStarted("Splitting train/test"));
    let split = stratified_split(&labels, config.test_size, config.random_state)?;
    let x_train = take_rows(&features, &split.train_indices)?;
    let x_test = take_rows(&features, &split.test_indices)?;
    let y_train = take_labels(&labels, &split.train_indices);
    let y_test = take_labels(&labels, &split.test_indices);
    tracing::info!(
        train_rows = split.train_len(),
        test_rows = split.test_len(),
        seed = config.random_state,
        "Stratified split"
    );
    on_event(TrainingEvent::StageFinished("Split complete"));

    on_event(TrainingEvent::StageStarted("Preprocessing and selecting features"));
    let spec = PreprocessorSpec::from_frame(&features);
    let preprocessor = spec.fit(&x_train)?;
    let encoded_train = preprocessor.transform(&x_train)?;
    let encoded_test = preprocessor.transform(&x_test)?;
    let selector = SelectKBest::fit(&encoded_train, &y_train)?;
    let selected_train = selector.transform(&encoded_train)?;
    let selected_test = selector.transform(&encoded_test)?;
    tracing::info!(
        numeric = spec.numeric.len(),
        categorical = spec.categorical.len(),
        encoded = preprocessor.n_features_out(),
        selected = selector.k,
        "Features prepared"
    );
    on_event(TrainingEvent::StageFinished("Features prepared"));

    on_event(TrainingEvent::StageStarted("Training candidate models"));
    let outcome = train_and_evaluate(
        &CandidateKind::ALL,
        config.random_state,
        &selected_train,
        &y_train,
        &selected_test,
        &y_test,
        |result| on_event(TrainingEvent::CandidateEvaluated(result)),
    )?;
    let best_kind = outcome.best().model;
    tracing::info!(
        model = best_kind.name(),
        roc_auc = outcome.best().metrics.roc_auc,
        "Best model selected"
    );
    on_event(TrainingEvent::StageFinished("Candidates evaluated"));

    on_event(TrainingEvent::StageStarted("Refitting best pipeline"));
    let pipeline = FittedPipeline::fit(&spec, best_kind, config.random_state, &x_train, &y_train)?;
    let (roc, held_out_roc_auc) = held_out_roc(&pipeline, &x_test, &y_test)?;
    on_event(TrainingEvent::StageFinished("Best pipeline refitted"));

    on_event(TrainingEvent::StageStarted("Writing artifacts"));
    let model_path = config.model_path();
    pipeline.save(&model_path)?;

    let report_path = config.evaluation_report_path();
    write_evaluation_report(&outcome.results, &report_path)?;

    let summary = TrainingSummary::new(
        &dataset_path,
        features.height(),
        split.train_len(),
        split.test_len(),
        config.random_state,
        pipeline.selected_feature_names(),
        &outcome,
    );
    let summary_path = config.summary_path();
    write_training_summary(&summary, &summary_path)?;

    let plot_path = if config.skip_plot {
        None
    } else {
        let path = config.roc_plot_path();
        match write_roc_plot(&roc, best_kind.name(), held_out_roc_auc, &path) {
            Ok(()) => Some(path),
            // Diagnostic only: a render failure keeps the other outputs
            Err(e) => {
                tracing::warn!(error = %e, "ROC figure not written");
                None
            }
        }
    };
    on_event(TrainingEvent::StageFinished("Artifacts written"));

    tracing::info!(
        elapsed_secs = run_start.elapsed().as_secs_f64(),
        model_path = %model_path.display(),
        "Training run complete"
    );

    Ok(TrainingArtifacts {
        dataset_path,
        n_rows: features.height(),
        train_rows: split.train_len(),
        test_rows: split.test_len(),
        dropped_rows: cleaned.labels.dropped,
        outcome,
        pipeline,
        roc,
        held_out_roc_auc,
        model_path,
        report_path,
        summary_path,
        plot_path,
    })
}

fn held_out_roc(
    pipeline: &FittedPipeline,
    x_test: &DataFrame,
    y_test: &[i32],
) -> Result<(Vec<RocPoint>, f64)> {
    let scores = pipeline.predict_proba(x_test)?;
    let curve = roc_curve(y_test, &scores)?;
    let auc = roc_auc(y_test, &scores).ok_or_else(|| {
        ChurnError::Evaluation("held-out ROC AUC is undefined for a single class".to_string())
    })?;
    Ok((curve, auc))
}

