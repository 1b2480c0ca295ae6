//! Report module - evaluation CSV, JSON summary, ROC figure and console tables

pub mod evaluation;
pub mod roc_plot;
pub mod summary;
pub mod training_summary;

pub use evaluation::*;
pub use roc_plot::*;
pub use summary::*;
pub use training_summary::*;

/// Reports directory, relative to the output root
pub const REPORTS_DIR: &str = "reports";

/// Figures subdirectory inside the reports directory
pub const FIGURES_DIR: &str = "figures";

pub const EVALUATION_REPORT_FILE: &str = "model_evaluation_report.csv";
pub const SUMMARY_FILE: &str = "training_summary.json";
pub const ROC_PLOT_FILE: &str = "roc_curve.png";

/// Create the parent directory of `path` if it has one
pub(crate) fn ensure_parent_dir(path: &std::path::Path) -> crate::error::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}
