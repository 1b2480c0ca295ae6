//! Churnsight: customer-churn training pipeline
//!
//! Loads and cleans the telco churn dataset, compares three candidate
//! classifiers on a stratified hold-out, persists the best fitted pipeline
//! and serves it over HTTP and an interactive terminal form.

pub mod cli;
pub mod error;
pub mod evaluation;
pub mod inference;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod server;
pub mod utils;

pub use error::{ChurnError, Result};
