//! Evaluation module - metrics, score policy and candidate comparison

pub mod metrics;
pub mod scoring;
pub mod trainer;

pub use metrics::*;
pub use scoring::*;
pub use trainer::*;
