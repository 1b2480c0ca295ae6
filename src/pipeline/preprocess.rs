//! Column-typed preprocessing: numeric and categorical branches
//!
//! Numeric columns are median-imputed and standardized. Categorical columns are
//! imputed with their most frequent value and one-hot encoded. The output
//! matrix holds the numeric block first and the categorical block second, in
//! the column order frozen at fit time.

use std::collections::{BTreeMap, BTreeSet};

use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use super::loader::parse_numeric;
use super::target::column_to_string_vec;
use crate::error::{ChurnError, Result};

/// How the preprocessor treats a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

/// Classify a dtype; `None` means the preprocessor ignores the column
pub fn column_kind(dtype: &DataType) -> Option<ColumnKind> {
    match dtype {
        dt if dt.is_primitive_numeric() => Some(ColumnKind::Numeric),
        DataType::String | DataType::Boolean | DataType::Categorical(..) | DataType::Enum(..) => {
            Some(ColumnKind::Categorical)
        }
        _ => None,
    }
}

/// Column partition taken from the full feature matrix, before any fitting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreprocessorSpec {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
}

impl PreprocessorSpec {
    /// Partition the columns of `df` by runtime dtype
    pub fn from_frame(df: &DataFrame) -> Self {
        let mut spec = Self::default();
        for col in df.get_columns() {
            match column_kind(col.dtype()) {
                Some(ColumnKind::Numeric) => spec.numeric.push(col.name().to_string()),
                Some(ColumnKind::Categorical) => spec.categorical.push(col.name().to_string()),
                None => tracing::debug!(column = %col.name(), dtype = ?col.dtype(), "Ignoring column"),
            }
        }
        spec
    }

    pub fn is_empty(&self) -> bool {
        self.numeric.is_empty() && self.categorical.is_empty()
    }

    /// Learn imputation values, scaling and categories from training rows
    pub fn fit(&self, train: &DataFrame) -> Result<Preprocessor> {
        if self.is_empty() {
            return Err(ChurnError::fit("preprocessor", "no usable feature columns"));
        }
        if train.height() == 0 {
            return Err(ChurnError::fit("preprocessor", "training frame has no rows"));
        }

        let numeric = self
            .numeric
            .iter()
            .map(|name| {
                let values = numeric_values(frame_column(train, name)?)?;
                Ok(NumericTransformer::fit(name, &values))
            })
            .collect::<Result<Vec<_>>>()?;

        let categorical = self
            .categorical
            .iter()
            .map(|name| {
                let values = column_to_string_vec(frame_column(train, name)?)?;
                Ok(CategoricalTransformer::fit(name, &values))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Preprocessor {
            numeric,
            categorical,
        })
    }
}

/// Median imputation followed by standard scaling
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NumericTransformer {
    pub column: String,
    pub median: f64,
    pub mean: f64,
    pub scale: f64,
}

impl NumericTransformer {
    fn fit(column: &str, values: &[Option<f64>]) -> Self {
        let mut present: Vec<f64> = values.iter().flatten().copied().collect();
        let median = median(&mut present).unwrap_or(0.0);

        let imputed: Vec<f64> = values.iter().map(|v| v.unwrap_or(median)).collect();
        let n = imputed.len() as f64;
        let mean = imputed.iter().sum::<f64>() / n;
        let variance = imputed.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std = variance.sqrt();
        let scale = if std > 0.0 && std.is_finite() { std } else { 1.0 };

        Self {
            column: column.to_string(),
            median,
            mean,
            scale,
        }
    }

    fn apply(&self, value: Option<f64>) -> f64 {
        (value.unwrap_or(self.median) - self.mean) / self.scale
    }
}

/// Most-frequent imputation followed by one-hot encoding
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoricalTransformer {
    pub column: String,
    pub fill_value: Option<String>,
    pub categories: Vec<String>,
}

impl CategoricalTransformer {
    fn fit(column: &str, values: &[Option<String>]) -> Self {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for v in values.iter().flatten() {
            *counts.entry(v.as_str()).or_insert(0) += 1;
        }

        // BTreeMap iterates in ascending order, so ties go to the smallest value
        let mut fill_value: Option<(&str, usize)> = None;
        for (value, count) in &counts {
            if fill_value.map_or(true, |(_, best)| *count > best) {
                fill_value = Some((*value, *count));
            }
        }
        let fill_value = fill_value.map(|(v, _)| v.to_string());

        let categories: BTreeSet<String> = values
            .iter()
            .filter_map(|v| v.clone().or_else(|| fill_value.clone()))
            .collect();

        Self {
            column: column.to_string(),
            fill_value,
            categories: categories.into_iter().collect(),
        }
    }

    /// Position of the hot column, or `None` for an all-zero block
    fn position(&self, value: Option<&str>) -> Option<usize> {
        let value = value.or(self.fill_value.as_deref())?;
        self.categories
            .binary_search_by(|c| c.as_str().cmp(value))
            .ok()
    }
}

/// Fitted preprocessor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Preprocessor {
    pub numeric: Vec<NumericTransformer>,
    pub categorical: Vec<CategoricalTransformer>,
}

impl Preprocessor {
    /// Number of output columns
    pub fn n_features_out(&self) -> usize {
        self.numeric.len()
            + self
                .categorical
                .iter()
                .map(|c| c.categories.len())
                .sum::<usize>()
    }

    /// Output feature names: `num__<col>` then `cat__<col>_<category>`
    pub fn feature_names(&self) -> Vec<String> {
        let numeric = self.numeric.iter().map(|t| format!("num__{}", t.column));
        let categorical = self.categorical.iter().flat_map(|t| {
            t.categories
                .iter()
                .map(move |c| format!("cat__{}_{}", t.column, c))
        });
        numeric.chain(categorical).collect()
    }

    /// Transform a frame into the numeric feature matrix
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        let n_rows = df.height();
        let mut out = Array2::<f64>::zeros((n_rows, self.n_features_out()));

        for (j, t) in self.numeric.iter().enumerate() {
            let values = numeric_values(input_column(df, &t.column)?)?;
            for (i, v) in values.into_iter().enumerate() {
                out[[i, j]] = t.apply(v);
            }
        }

        let mut offset = self.numeric.len();
        for t in &self.categorical {
            let values = column_to_string_vec(input_column(df, &t.column)?)?;
            for (i, v) in values.iter().enumerate() {
                if let Some(k) = t.position(v.as_deref()) {
                    out[[i, offset + k]] = 1.0;
                }
            }
            offset += t.categories.len();
        }

        Ok(out)
    }
}

fn frame_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| ChurnError::fit("preprocessor", format!("column '{}' not found", name)))
}

fn input_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| ChurnError::inference(format!("missing input column '{}'", name)))
}

/// Read a column as optional f64 values.
///
/// Numeric and boolean columns are cast; text columns are parsed, with blank
/// cells treated as missing and any other non-numeric token rejected.
fn numeric_values(col: &Column) -> Result<Vec<Option<f64>>> {
    match col.dtype() {
        dt if dt.is_primitive_numeric() || matches!(dt, DataType::Boolean) => {
            let cast = col.cast(&DataType::Float64)?;
            Ok(cast
                .f64()?
                .into_iter()
                .map(|v| v.filter(|x| x.is_finite()))
                .collect())
        }
        DataType::String => col
            .str()?
            .into_iter()
            .map(|v| match v {
                None => Ok(None),
                Some(s) if s.trim().is_empty() => Ok(None),
                Some(s) => parse_numeric(s).map(Some).ok_or_else(|| {
                    ChurnError::inference(format!(
                        "column '{}' expects a number, got '{}'",
                        col.name(),
                        s
                    ))
                }),
            })
            .collect(),
        DataType::Null => Ok(vec![None; col.len()]),
        other => Err(ChurnError::inference(format!(
            "column '{}' has dtype {} where a number is expected",
            col.name(),
            other
        ))),
    }
}

fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}
