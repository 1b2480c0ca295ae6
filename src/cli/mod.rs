//! CLI module - argument parsing, interactive prompts and the dashboard form

mod args;
pub mod dashboard;
mod prompts;

pub use args::{Cli, Commands, DashboardArgs, ServeArgs, TrainArgs};
pub use dashboard::run_dashboard;
pub use prompts::*;
