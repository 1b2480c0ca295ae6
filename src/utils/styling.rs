//! Terminal styling for the training run and the dashboard

use console::{style, Emoji};
use std::path::Path;
use std::time::Duration;

use crate::pipeline::TrainingConfig;

pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");
pub static DICE: Emoji<'_, '_> = Emoji("🎲 ", "");
pub static CHART: Emoji<'_, '_> = Emoji("📊 ", "");

/// Print the application banner
pub fn print_banner(version: &str) {
    println!();
    println!(
        "    {} {}",
        style("churnsight").cyan().bold(),
        style(format!("v{}", version)).dim()
    );
    println!(
        "    {}",
        style("Customer churn training, serving and exploration").dim()
    );
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// Print the configuration card for a training run
pub fn print_training_config(config: &TrainingConfig) {
    let box_width = 56;
    let line = "─".repeat(box_width - 2);
    let data = config
        .data_path
        .as_deref()
        .map(|p| truncate_path(p, 38))
        .unwrap_or_else(|| "(search defaults)".to_string());

    println!("    ┌{}┐", line);
    println!("    │ {:<w$}│", style("Configuration").cyan().bold(), w = box_width - 3);
    println!("    ├{}┤", line);
    println!("    │  {}Data:   {:<41}│", FOLDER, data);
    println!(
        "    │  {}Output: {:<41}│",
        SAVE,
        truncate_path(&config.output_dir, 38)
    );
    println!("    ├{}┤", line);
    println!(
        "    │  {}Test size:    {:<35}│",
        CHART,
        format!("{:.0}%", config.test_size * 100.0)
    );
    println!(
        "    │  {}Random state: {:<35}│",
        DICE, config.random_state
    );
    println!("    └{}┘", line);
    println!();
}

/// Print a step header with styling
pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("    {}{}", INFO, message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("    {}{}", WARN, style(message).yellow());
}

/// Print elapsed time for a step
pub fn print_step_time(elapsed: Duration) {
    println!("      {}", style(format!("({:.2}s)", elapsed.as_secs_f64())).dim());
}

/// Print the final completion message
pub fn print_completion() {
    println!();
    println!(
        "    {}{}",
        ROCKET,
        style("Training complete!").green().bold()
    );
    println!();
}

fn truncate_path(path: &Path, max_len: usize) -> String {
    truncate_string(&path.display().to_string(), max_len)
}

/// Keep the tail of `s`, cutting on a char boundary
fn truncate_string(s: &str, max_len: usize) -> String {
    let count = s.chars().count();
    if count <= max_len {
        s.to_string()
    } else {
        let tail: String = s.chars().skip(count - (max_len - 3)).collect();
        format!("...{}", tail)
    }
}
