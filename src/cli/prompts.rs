//! Interactive prompts using dialoguer

use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

/// Prompt user to confirm proceeding with an action
pub fn confirm_step(message: &str) -> Result<bool> {
    let confirmed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(message)
        .default(true)
        .interact()?;
    Ok(confirmed)
}

/// Pick one of `options`, starting on `current` when it is among them
pub fn select_option(prompt: &str, options: &[&str], current: &str) -> Result<String> {
    let default = options.iter().position(|o| *o == current).unwrap_or(0);
    let index = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(options)
        .default(default)
        .interact()?;
    Ok(options[index].to_string())
}

/// Integer input restricted to an inclusive range
pub fn input_integer(prompt: &str, default: i64, min: i64, max: i64) -> Result<i64> {
    let value = Input::<i64>::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("{} ({}-{})", prompt, min, max))
        .default(default)
        .validate_with(move |v: &i64| -> std::result::Result<(), String> {
            if (min..=max).contains(v) {
                Ok(())
            } else {
                Err(format!("must be between {} and {}", min, max))
            }
        })
        .interact_text()?;
    Ok(value)
}

/// Non-negative amount input
pub fn input_amount(prompt: &str, default: f64) -> Result<f64> {
    let value = Input::<f64>::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(default)
        .validate_with(|v: &f64| -> std::result::Result<(), String> {
            if v.is_finite() && *v >= 0.0 {
                Ok(())
            } else {
                Err("must be a non-negative number".to_string())
            }
        })
        .interact_text()?;
    Ok(value)
}
