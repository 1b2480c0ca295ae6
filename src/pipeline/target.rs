//! Label column normalization
//!
//! This module maps the churn label to the integer 0/1 format the classifiers
//! train on. Textual labels go through a fixed two-value vocabulary first and
//! fall back to numeric coercion; anything still unresolvable is reported as
//! `None` so the loader can drop the row.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Name of the label column in the churn dataset
pub const LABEL_COLUMN: &str = "Churn";

/// Vocabulary for converting textual label values to binary 0/1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelVocabulary {
    /// Value that maps to 1 (customer churned)
    pub event_value: String,
    /// Value that maps to 0 (customer stayed)
    pub non_event_value: String,
}

impl LabelVocabulary {
    /// Create a new label vocabulary
    pub fn new(event_value: String, non_event_value: String) -> Self {
        Self {
            event_value,
            non_event_value,
        }
    }

    /// Resolve one textual label: vocabulary first, then numeric coercion
    pub fn resolve(&self, value: &str) -> Option<i32> {
        if value == self.event_value {
            Some(1)
        } else if value == self.non_event_value {
            Some(0)
        } else {
            value.trim().parse::<f64>().ok().and_then(binary_label)
        }
    }
}

impl Default for LabelVocabulary {
    fn default() -> Self {
        Self::new("Yes".to_string(), "No".to_string())
    }
}

/// Counts produced while normalizing a label column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelCounts {
    pub events: usize,
    pub non_events: usize,
    pub dropped: usize,
}

/// Truncate a numeric label toward zero and keep it only if it is 0 or 1
fn binary_label(value: f64) -> Option<i32> {
    if !value.is_finite() {
        return None;
    }
    match value.trunc() as i64 {
        0 => Some(0),
        1 => Some(1),
        _ => None,
    }
}

/// Normalize a label column to `Some(0)` / `Some(1)`, or `None` for rows that
/// cannot be resolved.
///
/// - String: vocabulary lookup, then numeric coercion
/// - Boolean: true -> 1, false -> 0
/// - Numeric: truncated to an integer
/// - Other dtypes are cast to string and treated as text
pub fn normalize_labels(col: &Column, vocabulary: &LabelVocabulary) -> Result<Vec<Option<i32>>> {
    let labels: Vec<Option<i32>> = match col.dtype() {
        DataType::String => col
            .str()?
            .into_iter()
            .map(|v| v.and_then(|s| vocabulary.resolve(s)))
            .collect(),
        DataType::Boolean => col
            .bool()?
            .into_iter()
            .map(|v| v.map(|b| if b { 1 } else { 0 }))
            .collect(),
        dt if dt.is_primitive_numeric() => {
            let cast = col.cast(&DataType::Float64)?;
            cast.f64()?
                .into_iter()
                .map(|v| v.and_then(binary_label))
                .collect()
        }
        _ => {
            let cast = col.cast(&DataType::String)?;
            cast.str()?
                .into_iter()
                .map(|v| v.and_then(|s| vocabulary.resolve(s)))
                .collect()
        }
    };

    Ok(labels)
}

/// Count events, non-events and unresolvable rows in a normalized label vector
pub fn count_labels(labels: &[Option<i32>]) -> LabelCounts {
    let events = labels.iter().filter(|v| **v == Some(1)).count();
    let non_events = labels.iter().filter(|v| **v == Some(0)).count();
    let dropped = labels.iter().filter(|v| v.is_none()).count();

    LabelCounts {
        events,
        non_events,
        dropped,
    }
}

/// Convert a column to a Vec of Option<String> for categorical handling
pub fn column_to_string_vec(col: &Column) -> Result<Vec<Option<String>>> {
    let values: Vec<Option<String>> = match col.dtype() {
        DataType::String => col
            .str()?
            .into_iter()
            .map(|v| v.map(|s| s.to_string()))
            .collect(),
        DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64 => {
            let cast = col.cast(&DataType::Int64)?;
            cast.i64()?
                .into_iter()
                .map(|v| v.map(|n| n.to_string()))
                .collect()
        }
        DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64 => {
            let cast = col.cast(&DataType::UInt64)?;
            cast.u64()?
                .into_iter()
                .map(|v| v.map(|n| n.to_string()))
                .collect()
        }
        DataType::Float32 | DataType::Float64 => {
            let cast = col.cast(&DataType::Float64)?;
            cast.f64()?
                .into_iter()
                .map(|v| v.map(|n| format!("{}", n)))
                .collect()
        }
        DataType::Boolean => col
            .bool()?
            .into_iter()
            .map(|v| v.map(|b| b.to_string()))
            .collect(),
        DataType::Null => vec![None; col.len()],
        _ => {
            let cast = col.cast(&DataType::String)?;
            cast.str()?
                .into_iter()
                .map(|v| v.map(|s| s.to_string()))
                .collect()
        }
    };

    Ok(values)
}
