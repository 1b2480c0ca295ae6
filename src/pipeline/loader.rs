//! Dataset discovery, loading and cleaning for the churn dataset

use std::path::{Path, PathBuf};

use polars::prelude::*;

use super::target::{count_labels, normalize_labels, LabelCounts, LabelVocabulary, LABEL_COLUMN};
use crate::error::{ChurnError, Result};

/// File name of the dataset in the project layout
pub const DATASET_FILE_NAME: &str = "Telco_Customer_Churn_Dataset.csv";

/// File name a browser gives the dataset on a repeated download (two spaces before `(1)`)
pub const DOWNLOADED_FILE_NAME: &str = "Telco_Customer_Churn_Dataset  (1).csv";

/// Charges column that arrives as text with blank cells
pub const CHARGES_COLUMN: &str = "TotalCharges";

/// Identifier columns; the first one present is dropped
pub const ID_COLUMNS: [&str; 3] = ["customerID", "CustomerID", "customer_id"];

/// Default number of rows used for CSV schema inference
pub const DEFAULT_INFER_SCHEMA_LENGTH: usize = 10000;

/// Dataset after cleaning, with the label column as Int32 0/1
#[derive(Debug, Clone)]
pub struct CleanedDataset {
    pub frame: DataFrame,
    pub labels: LabelCounts,
    pub dropped_id_column: Option<String>,
}

impl CleanedDataset {
    /// Split into the feature matrix and the integer label vector
    pub fn features_and_labels(&self) -> Result<(DataFrame, Vec<i32>)> {
        let labels: Vec<i32> = self
            .frame
            .column(LABEL_COLUMN)?
            .i32()?
            .into_iter()
            .map(|v| v.unwrap_or_default())
            .collect();
        let features = self.frame.drop(LABEL_COLUMN)?;
        Ok((features, labels))
    }
}

/// Candidate dataset paths in precedence order.
///
/// 1. the explicit path, if provided
/// 2. `<base>/data/Telco_Customer_Churn_Dataset.csv`
/// 3. `<base>/Telco_Customer_Churn_Dataset.csv`
/// 4. the user's Downloads directory
pub fn dataset_candidates(user_path: Option<&Path>, base_dir: &Path) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(path) = user_path {
        candidates.push(path.to_path_buf());
    }

    candidates.push(base_dir.join("data").join(DATASET_FILE_NAME));
    candidates.push(base_dir.join(DATASET_FILE_NAME));

    if let Some(downloads) = dirs::download_dir() {
        candidates.push(downloads.join(DOWNLOADED_FILE_NAME));
    }

    candidates
}

/// Return the first existing dataset candidate
pub fn find_data_file(user_path: Option<&Path>, base_dir: &Path) -> Result<PathBuf> {
    let candidates = dataset_candidates(user_path, base_dir);
    candidates
        .iter()
        .find(|c| c.is_file())
        .cloned()
        .ok_or(ChurnError::DataNotFound { tried: candidates })
}

/// Load a dataset from a file (CSV or Parquet based on extension)
pub fn load_dataset(path: &Path, infer_schema_length: usize) -> Result<DataFrame> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    // 0 means full table scan
    let schema_length = if infer_schema_length == 0 {
        None
    } else {
        Some(infer_schema_length)
    };

    let lf = match extension.as_str() {
        "csv" => LazyCsvReader::new(path)
            .with_infer_schema_length(schema_length)
            .finish()?,
        "parquet" => LazyFrame::scan_parquet(path, Default::default())?,
        _ => {
            return Err(ChurnError::Schema(format!(
                "Unsupported file format: {}. Supported formats: csv, parquet",
                extension
            )))
        }
    };

    Ok(lf.collect()?)
}

/// Parse a numeric-looking token; blanks, invalid and non-finite tokens become `None`
pub fn parse_numeric(token: &str) -> Option<f64> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Coerce a column to Float64, turning non-numeric tokens into nulls
pub fn coerce_numeric(col: &Column) -> Result<Column> {
    let values: Vec<Option<f64>> = match col.dtype() {
        DataType::String => col
            .str()?
            .into_iter()
            .map(|v| v.and_then(parse_numeric))
            .collect(),
        dt if dt.is_primitive_numeric() => {
            let cast = col.cast(&DataType::Float64)?;
            cast.f64()?
                .into_iter()
                .map(|v| v.filter(|x| x.is_finite()))
                .collect()
        }
        _ => {
            let cast = col.cast(&DataType::String)?;
            cast.str()?
                .into_iter()
                .map(|v| v.and_then(parse_numeric))
                .collect()
        }
    };

    Ok(Column::new(col.name().clone(), values))
}

/// Clean a raw churn frame.
///
/// Coerces the charges column to numeric, drops the first identifier column
/// found, and normalizes the label to Int32 0/1. Rows whose label cannot be
/// resolved are dropped.
pub fn clean_dataset(mut df: DataFrame, vocabulary: &LabelVocabulary) -> Result<CleanedDataset> {
    let column_names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();

    if column_names.iter().any(|c| c == CHARGES_COLUMN) {
        let coerced = coerce_numeric(df.column(CHARGES_COLUMN)?)?;
        df.with_column(coerced)?;
    }

    let dropped_id_column = ID_COLUMNS
        .iter()
        .find(|id| column_names.iter().any(|c| c == *id))
        .map(|id| id.to_string());
    if let Some(id_col) = &dropped_id_column {
        df = df.drop(id_col)?;
    }

    if !column_names.iter().any(|c| c == LABEL_COLUMN) {
        return Err(ChurnError::Schema(format!(
            "No '{}' column found in dataset. Available columns: {:?}",
            LABEL_COLUMN, column_names
        )));
    }

    let labels = normalize_labels(df.column(LABEL_COLUMN)?, vocabulary)?;
    let counts = count_labels(&labels);

    if counts.dropped > 0 {
        tracing::warn!(
            dropped = counts.dropped,
            "Dropping rows with an unresolvable '{}' label",
            LABEL_COLUMN
        );
        let mask: BooleanChunked = labels.iter().map(|l| l.is_some()).collect();
        df = df.filter(&mask)?;
    }

    let kept: Vec<i32> = labels.into_iter().flatten().collect();
    df.with_column(Column::new(LABEL_COLUMN.into(), kept))?;

    Ok(CleanedDataset {
        frame: df,
        labels: counts,
        dropped_id_column,
    })
}

/// Load and clean the dataset at `path`
pub fn load_and_clean_data(path: &Path, infer_schema_length: usize) -> Result<CleanedDataset> {
    let df = load_dataset(path, infer_schema_length)?;
    tracing::info!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "Dataset loaded"
    );
    clean_dataset(df, &LabelVocabulary::default())
}
