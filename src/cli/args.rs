//! Command-line argument definitions using clap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::pipeline::{TrainingConfig, DEFAULT_INFER_SCHEMA_LENGTH};
use crate::server::{ServerConfig, DEFAULT_HOST, DEFAULT_PORT};

/// Churnsight - train, serve and explore a customer-churn classifier
#[derive(Parser, Debug)]
#[command(name = "churnsight")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Training options, used when no subcommand is given
    #[command(flatten)]
    pub train: TrainArgs,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the candidate models and persist the best pipeline (default)
    Train(TrainArgs),

    /// Serve the prediction API over HTTP
    Serve(ServeArgs),

    /// Interactive terminal form for single-customer predictions
    Dashboard(DashboardArgs),
}

#[derive(Args, Debug, Clone)]
pub struct TrainArgs {
    /// Dataset path (CSV or Parquet).
    /// If not provided, data/Telco_Customer_Churn_Dataset.csv, ./Telco_Customer_Churn_Dataset.csv
    /// and the Downloads folder are searched in that order.
    #[arg(short, long)]
    pub data_path: Option<PathBuf>,

    /// Fraction of rows held out for evaluation (exclusive range 0..1)
    #[arg(long, default_value = "0.2", value_parser = validate_test_size)]
    pub test_size: f64,

    /// Seed for the split and every candidate model
    #[arg(long, default_value = "42")]
    pub random_state: u64,

    /// Root directory that receives models/ and reports/
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Skip rendering reports/figures/roc_curve.png
    #[arg(long, default_value = "false")]
    pub skip_plot: bool,

    /// Number of rows to use for schema inference (CSV only).
    /// Use 0 for full table scan.
    #[arg(long, default_value_t = DEFAULT_INFER_SCHEMA_LENGTH)]
    pub infer_schema_length: usize,
}

impl TrainArgs {
    pub fn to_config(&self) -> TrainingConfig {
        TrainingConfig {
            data_path: self.data_path.clone(),
            output_dir: self.output_dir.clone(),
            test_size: self.test_size,
            random_state: self.random_state,
            skip_plot: self.skip_plot,
            infer_schema_length: self.infer_schema_length,
            ..TrainingConfig::default()
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Bind address
    #[arg(long, env = "API_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Bind port
    #[arg(long, env = "API_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Artifact path; defaults to models/best_model_pipeline.bin then ./best_model_pipeline.bin
    #[arg(short, long)]
    pub model_path: Option<PathBuf>,
}

impl ServeArgs {
    pub fn to_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
            model_path: self.model_path.clone(),
            ..ServerConfig::default()
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct DashboardArgs {
    /// Artifact path; defaults to models/best_model_pipeline.bin then ./best_model_pipeline.bin
    #[arg(short, long)]
    pub model_path: Option<PathBuf>,
}

impl Cli {
    /// Training options for the selected command, if it trains
    pub fn train_args(&self) -> Option<&TrainArgs> {
        match &self.command {
            None => Some(&self.train),
            Some(Commands::Train(args)) => Some(args),
            Some(_) => None,
        }
    }
}

/// Validator for test_size parameter
fn validate_test_size(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(format!(
            "test_size must be strictly between 0.0 and 1.0, got {}",
            value
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_test_size() {
        assert_eq!(validate_test_size("0.25"), Ok(0.25));
        assert!(validate_test_size("0").is_err());
        assert!(validate_test_size("1.0").is_err());
        assert!(validate_test_size("abc").is_err());
    }
}
