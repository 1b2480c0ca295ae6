//! Console summary of a training run

use std::path::PathBuf;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::evaluation::ModelResult;

/// Model comparison and output listing shown after training
#[derive(Debug, Default)]
pub struct TrainingReport {
    pub results: Vec<ModelResult>,
    pub best_index: usize,
    pub selected_features: Vec<String>,
    pub dropped_rows: usize,
    pub outputs: Vec<(String, PathBuf)>,
}

impl TrainingReport {
    pub fn new(results: Vec<ModelResult>, best_index: usize) -> Self {
        Self {
            results,
            best_index,
            ..Default::default()
        }
    }

    pub fn with_selected_features(mut self, features: Vec<String>) -> Self {
        self.selected_features = features;
        self
    }

    pub fn with_dropped_rows(mut self, dropped: usize) -> Self {
        self.dropped_rows = dropped;
        self
    }

    pub fn add_output(&mut self, label: &str, path: PathBuf) {
        self.outputs.push((label.to_string(), path));
    }

    /// Comparison table, one row per candidate
    pub fn comparison_table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Model").add_attribute(Attribute::Bold),
            Cell::new("Accuracy").add_attribute(Attribute::Bold),
            Cell::new("Precision").add_attribute(Attribute::Bold),
            Cell::new("Recall").add_attribute(Attribute::Bold),
            Cell::new("F1").add_attribute(Attribute::Bold),
            Cell::new("ROC AUC").add_attribute(Attribute::Bold),
            Cell::new("Fit time").add_attribute(Attribute::Bold),
        ]);

        for (i, r) in self.results.iter().enumerate() {
            let is_best = i == self.best_index;
            let name = if is_best {
                Cell::new(format!("★ {}", r.model.name()))
                    .fg(Color::Green)
                    .add_attribute(Attribute::Bold)
            } else {
                Cell::new(r.model.name())
            };
            let auc = Cell::new(format!("{:.4}", r.metrics.roc_auc));
            let auc = if is_best {
                auc.fg(Color::Green).add_attribute(Attribute::Bold)
            } else {
                auc
            };

            table.add_row(vec![
                name,
                Cell::new(format!("{:.4}", r.metrics.accuracy)),
                Cell::new(format!("{:.4}", r.metrics.precision)),
                Cell::new(format!("{:.4}", r.metrics.recall)),
                Cell::new(format!("{:.4}", r.metrics.f1)),
                auc,
                Cell::new(format!("{:.2}s", r.fit_time.as_secs_f64())),
            ]);
        }

        table
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("MODEL COMPARISON").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        for line in self.comparison_table().to_string().lines() {
            println!("    {}", line);
        }

        if self.dropped_rows > 0 {
            println!();
            println!(
                "      {} {} row(s) dropped for an unusable label",
                style("⚠").yellow(),
                style(self.dropped_rows).yellow().bold()
            );
        }

        if !self.selected_features.is_empty() {
            println!();
            println!(
                "    {} {}",
                style("📝").cyan(),
                style("SELECTED FEATURES").white().bold()
            );
            println!("    {}", style("─".repeat(50)).dim());
            for feature in &self.selected_features {
                println!("        {} {}", style("•").dim(), feature);
            }
        }

        if !self.outputs.is_empty() {
            println!();
            println!(
                "    {} {}",
                style("💾").cyan(),
                style("OUTPUTS").white().bold()
            );
            println!("    {}", style("─".repeat(50)).dim());
            for (label, path) in &self.outputs {
                println!("      {:<20} {}", style(label).dim(), path.display());
            }
        }
    }
}
