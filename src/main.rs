//! Churnsight CLI
//!
//! `churnsight` (or `churnsight train`) runs the training workflow,
//! `churnsight serve` starts the prediction API and `churnsight dashboard`
//! opens the interactive form.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::ProgressBar;
use tracing_subscriber::EnvFilter;

use churnsight::cli::{run_dashboard, Cli, Commands, ServeArgs, TrainArgs};
use churnsight::pipeline::{run_training_with, TrainingEvent};
use churnsight::report::TrainingReport;
use churnsight::server::run_server;
use churnsight::utils::{
    create_spinner, finish_with_success, finish_with_warning, print_banner, print_completion,
    print_info, print_step_header, print_step_time, print_training_config,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(args) = cli.train_args() {
        init_tracing("churnsight=warn");
        return train(args);
    }

    match &cli.command {
        Some(Commands::Serve(args)) => {
            init_tracing("churnsight=info,tower_http=info");
            serve(args)
        }
        Some(Commands::Dashboard(args)) => {
            init_tracing("churnsight=warn");
            run_dashboard(args.model_path.as_deref(), Path::new("."))
        }
        // Training commands returned above
        Some(Commands::Train(_)) | None => Ok(()),
    }
}

/// RUST_LOG overrides the per-command default
fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn serve(args: &ServeArgs) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    runtime.block_on(run_server(args.to_config()))
}

fn train(args: &TrainArgs) -> Result<()> {
    let config = args.to_config();

    print_banner(env!("CARGO_PKG_VERSION"));
    print_training_config(&config);

    let run_start = Instant::now();
    let mut step = 0u8;
    let mut stage_start = Instant::now();
    let mut spinner: Option<ProgressBar> = None;

    let result = run_training_with(&config, |event| match event {
        TrainingEvent::StageStarted(title) => {
            step += 1;
            print_step_header(step, title);
            stage_start = Instant::now();
            spinner = Some(create_spinner(title));
        }
        TrainingEvent::StageFinished(message) => {
            if let Some(pb) = spinner.take() {
                finish_with_success(&pb, message);
            }
            print_step_time(stage_start.elapsed());
        }
        TrainingEvent::CandidateEvaluated(r) => {
            let line = format!(
                "      {:<20} ROC AUC {:.4}  ({:.2}s)",
                r.model.name(),
                r.metrics.roc_auc,
                r.fit_time.as_secs_f64()
            );
            match &spinner {
                Some(pb) => pb.println(line),
                None => println!("{}", line),
            }
        }
    });

    if let Some(pb) = spinner.take() {
        finish_with_warning(&pb, "Stopped");
    }
    let artifacts = result.context("Training failed")?;

    let mut report = TrainingReport::new(
        artifacts.outcome.results.clone(),
        artifacts.outcome.best_index,
    )
    .with_selected_features(artifacts.pipeline.selected_feature_names())
    .with_dropped_rows(artifacts.dropped_rows);
    report.add_output("Model pipeline", artifacts.model_path.clone());
    report.add_output("Evaluation report", artifacts.report_path.clone());
    report.add_output("Training summary", artifacts.summary_path.clone());
    if let Some(plot) = &artifacts.plot_path {
        report.add_output("ROC curve", plot.clone());
    }
    report.display();

    print_info(&format!(
        "{} rows from {} ({} train / {} test)",
        artifacts.n_rows,
        artifacts.dataset_path.display(),
        artifacts.train_rows,
        artifacts.test_rows
    ));
    print_step_time(run_start.elapsed());
    print_completion();

    Ok(())
}
