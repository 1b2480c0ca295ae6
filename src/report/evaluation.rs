//! Per-model evaluation report written as CSV

use std::path::Path;

use polars::prelude::*;

use super::ensure_parent_dir;
use crate::error::Result;
use crate::evaluation::ModelResult;

/// Column order of the evaluation report
pub const EVALUATION_COLUMNS: [&str; 6] = ["model", "accuracy", "precision", "recall", "f1", "roc_auc"];

/// One row per candidate, in evaluation order
pub fn evaluation_frame(results: &[ModelResult]) -> Result<DataFrame> {
    let metric = |f: fn(&ModelResult) -> f64| results.iter().map(f).collect::<Vec<f64>>();

    let df = df! {
        "model" => results.iter().map(|r| r.model.name()).collect::<Vec<_>>(),
        "accuracy" => metric(|r| r.metrics.accuracy),
        "precision" => metric(|r| r.metrics.precision),
        "recall" => metric(|r| r.metrics.recall),
        "f1" => metric(|r| r.metrics.f1),
        "roc_auc" => metric(|r| r.metrics.roc_auc),
    }?;
    Ok(df)
}

/// Write the evaluation report, replacing any previous run's file
pub fn write_evaluation_report(results: &[ModelResult], path: &Path) -> Result<()> {
    let mut df = evaluation_frame(results)?;
    ensure_parent_dir(path)?;
    let mut file = std::fs::File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(&mut df)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::ClassificationMetrics;
    use crate::models::CandidateKind;
    use std::time::Duration;

    #[test]
    fn test_report_has_one_row_per_model() {
        let results: Vec<ModelResult> = CandidateKind::ALL
            .iter()
            .enumerate()
            .map(|(i, &model)| ModelResult {
                model,
                metrics: ClassificationMetrics {
                    accuracy: 0.8,
                    precision: 0.6,
                    recall: 0.5,
                    f1: 0.55,
                    roc_auc: 0.8 + i as f64 / 100.0,
                },
                fit_time: Duration::from_millis(5),
            })
            .collect();

        let df = evaluation_frame(&results).unwrap();
        assert_eq!(df.shape(), (3, 6));
        let names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        assert_eq!(names, EVALUATION_COLUMNS);

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("reports").join("model_evaluation_report.csv");
        write_evaluation_report(&results, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("model,accuracy,precision,recall,f1,roc_auc"));
        assert_eq!(content.lines().count(), 4);
    }
}
