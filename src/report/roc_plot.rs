//! ROC curve figure rendered with plotters

use std::path::Path;

use plotters::prelude::*;

use super::ensure_parent_dir;
use crate::error::{ChurnError, Result};
use crate::evaluation::RocPoint;

fn plot_error<E: std::fmt::Display>(e: E) -> ChurnError {
    ChurnError::Plot(e.to_string())
}

/// Render the held-out ROC curve of the best model as a PNG
pub fn write_roc_plot(points: &[RocPoint], model_name: &str, roc_auc: f64, output_path: &Path) -> Result<()> {
    ensure_parent_dir(output_path)?;

    let root = BitMapBackend::new(output_path, (800, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("ROC Curve - {}", model_name), ("sans-serif", 28))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0f64..1.0f64, 0.0f64..1.0f64)
        .map_err(plot_error)?;

    chart
        .configure_mesh()
        .x_desc("False Positive Rate")
        .y_desc("True Positive Rate")
        .axis_desc_style(("sans-serif", 16))
        .draw()
        .map_err(plot_error)?;

    // Chance diagonal
    chart
        .draw_series(LineSeries::new(
            vec![(0.0, 0.0), (1.0, 1.0)],
            BLACK.mix(0.4).stroke_width(1),
        ))
        .map_err(plot_error)?;

    chart
        .draw_series(LineSeries::new(
            points.iter().map(|p| (p.fpr, p.tpr)),
            BLUE.stroke_width(2),
        ))
        .map_err(plot_error)?
        .label(format!("AUC = {:.3}", roc_auc))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(2)));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plot_error)?;

    root.present().map_err(plot_error)?;
    tracing::debug!(path = %output_path.display(), "ROC figure written");
    Ok(())
}
